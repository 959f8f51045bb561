// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lenient parsers for attribute values.
//!
//! Every parser returns `None` on malformed input; callers substitute a
//! documented default instead of failing the conversion.

use core::str::FromStr;

use kurbo::{Affine, Rect};
use svgtypes::LengthUnit;

/// A length that is either absolute or relative to some reference.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Length {
    /// A plain number in user units.
    Number(f64),
    /// A percentage, `50%` is `Percent(50.0)`.
    Percent(f64),
}

impl Length {
    /// Resolves against `reference` (the value `100%` stands for).
    #[must_use]
    pub fn resolve(self, reference: f64) -> f64 {
        match self {
            Self::Number(n) => n,
            Self::Percent(p) => p * reference / 100.0,
        }
    }

    /// Resolves as a fraction, so that both `0.5` and `50%` yield `0.5`.
    #[must_use]
    pub fn fraction(self) -> f64 {
        self.resolve(1.0)
    }
}

/// Parses a plain number, ignoring surrounding whitespace.
#[must_use]
pub fn parse_number(text: &str) -> Option<f64> {
    let svgtypes::Number(value) = svgtypes::Number::from_str(text.trim()).ok()?;
    value.is_finite().then_some(value)
}

/// Parses a number with an optional `%` or `px` suffix.
///
/// Other units (`em`, `mm`, ...) need a font or output resolution and are
/// rejected.
#[must_use]
pub fn parse_length(text: &str) -> Option<Length> {
    let length = svgtypes::Length::from_str(text.trim()).ok()?;
    if !length.number.is_finite() {
        return None;
    }
    match length.unit {
        LengthUnit::None | LengthUnit::Px => Some(Length::Number(length.number)),
        LengthUnit::Percent => Some(Length::Percent(length.number)),
        _ => None,
    }
}

/// Parses an opacity (`0.5` or `50%`), clamped to `[0, 1]`.
#[must_use]
pub fn parse_opacity(text: &str) -> Option<f64> {
    parse_length(text).map(|l| l.fraction().clamp(0.0, 1.0))
}

/// Parses a `viewBox` value (`min-x min-y width height`).
///
/// Negative or zero sizes are rejected.
#[must_use]
pub fn parse_view_box(text: &str) -> Option<Rect> {
    let view_box = svgtypes::ViewBox::from_str(text).ok()?;
    Some(Rect::new(
        view_box.x,
        view_box.y,
        view_box.x + view_box.w,
        view_box.y + view_box.h,
    ))
}

/// Parses an SVG transform list into a single affine transform.
///
/// Supports `matrix`, `translate`, `scale`, `rotate` (with optional centre),
/// `skewX` and `skewY`. Transforms apply left to right, so
/// `translate(10) scale(2)` scales first and then translates.
#[must_use]
pub fn parse_transform(text: &str) -> Option<Affine> {
    let ts = svgtypes::Transform::from_str(text).ok()?;
    let coeffs = [ts.a, ts.b, ts.c, ts.d, ts.e, ts.f];
    coeffs
        .iter()
        .all(|c| c.is_finite())
        .then(|| Affine::new(coeffs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn numbers_and_lengths() {
        assert_eq!(parse_number(" 1.5 "), Some(1.5));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("NaN"), None, "non-finite values are rejected");
        assert_eq!(parse_length("50%"), Some(Length::Percent(50.0)));
        assert_eq!(parse_length("12px"), Some(Length::Number(12.0)));
        assert_eq!(parse_opacity("150%"), Some(1.0));
        assert_eq!(parse_opacity("-2"), Some(0.0));
        assert_eq!(parse_opacity(""), None);
        assert_eq!(parse_length("2em"), None, "font-relative units are not resolved");
        assert_eq!(parse_length("1e2"), Some(Length::Number(100.0)));
    }

    #[test]
    fn view_box() {
        assert_eq!(
            parse_view_box("0 0 20,10"),
            Some(Rect::new(0.0, 0.0, 20.0, 10.0))
        );
        assert_eq!(parse_view_box("0 0 0 10"), None);
        assert_eq!(parse_view_box("0 0 10"), None);
        assert_eq!(parse_view_box("0 0 -5 10"), None);
    }

    #[test]
    fn transform_lists_apply_left_to_right() {
        let t = parse_transform("translate(10, 0) scale(2)").unwrap();
        assert!(close(t * Point::new(1.0, 1.0), Point::new(12.0, 2.0)));

        let t = parse_transform("rotate(90 1 1)").unwrap();
        assert!(close(t * Point::new(2.0, 1.0), Point::new(1.0, 2.0)));

        let t = parse_transform("matrix(1 0 0 1 3 4)").unwrap();
        assert_eq!(t, Affine::translate((3.0, 4.0)));

        let t = parse_transform("skewX(45)").unwrap();
        assert!(close(t * Point::new(0.0, 1.0), Point::new(1.0, 1.0)));
    }

    #[test]
    fn malformed_transforms_are_rejected() {
        assert_eq!(parse_transform("translate(1"), None);
        assert_eq!(parse_transform("wobble(3)"), None);
        assert_eq!(parse_transform("scale(1 2 3)"), None);
        assert_eq!(parse_transform("translate(1 2) junk"), None);
        assert_eq!(parse_transform(""), Some(Affine::IDENTITY));
    }
}
