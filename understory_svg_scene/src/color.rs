// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Color syntax and color-with-alpha resolution for style properties.
//!
//! [`resolve_color`] turns a color-bearing property (`fill`, `stop-color`,
//! `flood-color`, ...) into a final color:
//!
//! - `currentColor` resolves against the *parent* element's computed
//!   `color`, never the element's own.
//! - Unknown or malformed values resolve to opaque black.
//! - Only `stop-color` and `flood-color` have an opacity companion
//!   (`stop-opacity`, `flood-opacity`). The companion is clamped to `[0, 1]`,
//!   multiplied into the color's own alpha and truncated to a byte. Every
//!   other property resolves to an opaque color.

use alloc::string::String;

use peniko::Color;
use peniko::color::Srgb;

use crate::document::{Document, Element};
use crate::parse::{parse_number, parse_opacity};

/// A parsed color value.
#[derive(Copy, Clone, Debug)]
pub enum ColorValue {
    /// A concrete color.
    Color(Color),
    /// The `currentColor` keyword.
    CurrentColor,
}

/// Opaque black, the fallback for anything unresolvable.
pub const BLACK: Color = Color::BLACK;

const OPACITY_COMPANIONS: [(&str, &str); 2] = [
    ("stop-color", "stop-opacity"),
    ("flood-color", "flood-opacity"),
];

/// Returns the opacity property paired with a color property, if any.
#[must_use]
pub fn opacity_companion(property: &str) -> Option<&'static str> {
    OPACITY_COMPANIONS
        .iter()
        .find(|(color, _)| *color == property)
        .map(|(_, opacity)| *opacity)
}

/// Parses a color value.
///
/// `currentColor` is recognized here, case-insensitively. Everything else
/// goes through the CSS color parser: hex forms, `rgb()`/`rgba()`, `hsl()`,
/// named colors and `transparent`.
#[must_use]
pub fn parse_color(text: &str) -> Option<ColorValue> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("currentColor") {
        return Some(ColorValue::CurrentColor);
    }
    peniko::color::parse_color(text)
        .ok()
        .map(|color| ColorValue::Color(color.to_alpha_color::<Srgb>()))
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "channels are clamped to [0, 255] before the cast"
)]
pub(crate) fn channel_byte(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

/// Multiplies the color's alpha by `factor` (clamped to `[0, 1]`),
/// truncating the resulting byte.
#[must_use]
pub fn attenuate(color: Color, factor: f64) -> Color {
    let rgba = color.to_rgba8();
    let alpha = channel_byte(f64::from(rgba.a) * factor.clamp(0.0, 1.0));
    Color::from_rgba8(rgba.r, rgba.g, rgba.b, alpha)
}

/// Resolves `currentColor` for `element`: the computed `color` of its
/// parent, following further `currentColor` values up the tree.
#[must_use]
pub fn current_color<D: Document>(element: Element<'_, D>) -> Color {
    let mut current = element.parent();
    while let Some(ancestor) = current {
        match ancestor.computed("color").and_then(parse_color) {
            Some(ColorValue::Color(color)) => return color,
            Some(ColorValue::CurrentColor) => current = ancestor.parent(),
            None => return BLACK,
        }
    }
    BLACK
}

/// Resolves `property` to a color, ignoring any opacity companion.
#[must_use]
pub fn resolve_base_color<D: Document>(element: Element<'_, D>, property: &str) -> Color {
    match element.computed(property).and_then(parse_color) {
        Some(ColorValue::Color(color)) => color,
        Some(ColorValue::CurrentColor) => current_color(element),
        None => BLACK,
    }
}

/// Opacity of `property` in unit form.
///
/// `1.0` unless `property` has an opacity companion that parses.
#[must_use]
pub fn resolve_opacity<D: Document>(element: Element<'_, D>, property: &str) -> f64 {
    opacity_companion(property)
        .and_then(|companion| element.computed(companion))
        .and_then(parse_opacity)
        .unwrap_or(1.0)
}

/// Opacity of `property` in byte form, truncated.
#[must_use]
pub fn resolve_alpha<D: Document>(element: Element<'_, D>, property: &str) -> u8 {
    channel_byte(255.0 * resolve_opacity(element, property))
}

/// Resolves `property` to its final color, alpha included.
///
/// Without an opacity companion the alpha byte is always 255, even when
/// the value itself carries alpha.
#[must_use]
pub fn resolve_color<D: Document>(element: Element<'_, D>, property: &str) -> Color {
    let color = resolve_base_color(element, property);
    match opacity_companion(property) {
        Some(_) => attenuate(color, resolve_opacity(element, property)),
        None => {
            let rgba = color.to_rgba8();
            Color::from_rgba8(rgba.r, rgba.g, rgba.b, 255)
        }
    }
}

/// Formats a color as `#AARRGGBB`.
#[must_use]
pub fn to_argb_hex(color: Color) -> String {
    let rgba = color.to_rgba8();
    alloc::format!("#{:02X}{:02X}{:02X}{:02X}", rgba.a, rgba.r, rgba.g, rgba.b)
}

/// Parses a number, treating a missing or malformed value as `default`.
pub(crate) fn number_or(text: Option<&str>, default: f64) -> f64 {
    text.and_then(parse_number).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementKind, ElementTree};

    fn rgba(color: Color) -> [u8; 4] {
        let c = color.to_rgba8();
        [c.r, c.g, c.b, c.a]
    }

    fn parsed(text: &str) -> Option<[u8; 4]> {
        match parse_color(text)? {
            ColorValue::Color(color) => Some(rgba(color)),
            ColorValue::CurrentColor => None,
        }
    }

    #[test]
    fn color_syntax() {
        assert_eq!(parsed("#f00"), Some([255, 0, 0, 255]));
        assert_eq!(parsed("#00ff0080"), Some([0, 255, 0, 128]));
        assert_eq!(parsed("RGB(0, 50%, 255)"), Some([0, 128, 255, 255]));
        assert_eq!(parsed("rgba(1,2,3,0.5)"), Some([1, 2, 3, 128]));
        assert_eq!(parsed("CornflowerBlue"), Some([100, 149, 237, 255]));
        assert_eq!(parsed("transparent"), Some([0, 0, 0, 0]));
        assert!(matches!(
            parse_color("currentcolor"),
            Some(ColorValue::CurrentColor)
        ));
        assert!(parse_color("#ggg").is_none());
        assert!(parse_color("notacolor").is_none());
    }

    #[test]
    fn current_color_uses_parent() {
        let mut tree = ElementTree::new(ElementKind::Svg);
        let g = tree.append(tree.root(), ElementKind::Group);
        tree.set_attribute(g, "color", "lime");
        let rect = tree.append_tag(g, "rect");
        tree.with_attributes(rect, &[("fill", "currentColor"), ("color", "red")]);

        let el = Element::new(&tree, rect);
        let parent = Element::new(&tree, g);
        assert_eq!(rgba(resolve_color(el, "fill")), [0, 255, 0, 255]);
        assert_eq!(
            rgba(resolve_color(el, "fill")),
            rgba(resolve_color(parent, "color")),
            "currentColor ignores the element's own color"
        );
    }

    #[test]
    fn companions_only_for_stop_and_flood() {
        let mut tree = ElementTree::new(ElementKind::Svg);
        let stop = tree.append(tree.root(), ElementKind::Stop);
        tree.with_attributes(
            stop,
            &[
                ("stop-color", "blue"),
                ("stop-opacity", "0.5"),
                ("fill", "blue"),
                ("fill-opacity", "0.5"),
            ],
        );
        let el = Element::new(&tree, stop);
        assert_eq!(rgba(resolve_color(el, "stop-color"))[3], 127);
        assert_eq!(resolve_alpha(el, "stop-color"), 127);
        assert_eq!(rgba(resolve_color(el, "fill"))[3], 255, "fill has no companion");
        assert_eq!(resolve_alpha(el, "fill"), 255);
        assert_eq!(resolve_opacity(el, "flood-color"), 1.0);
    }

    #[test]
    fn properties_without_companion_are_opaque() {
        let mut tree = ElementTree::new(ElementKind::Svg);
        let g = tree.append(tree.root(), ElementKind::Group);
        tree.set_attribute(g, "color", "rgba(0, 255, 0, 0.5)");
        let rect = tree.append_tag(g, "rect");
        tree.set_attribute(rect, "fill", "currentColor");
        let el = Element::new(&tree, rect);
        assert_eq!(rgba(resolve_base_color(el, "fill")), [0, 255, 0, 128]);
        assert_eq!(rgba(resolve_color(el, "fill")), [0, 255, 0, 255]);
        assert_eq!(to_argb_hex(resolve_color(el, "fill")), "#FF00FF00");
    }

    #[test]
    fn flood_opacity_attenuates_flood_color() {
        let mut tree = ElementTree::new(ElementKind::Svg);
        let flood = tree.append_tag(tree.root(), "feFlood");
        tree.with_attributes(flood, &[("flood-color", "red"), ("flood-opacity", "0.5")]);
        let el = Element::new(&tree, flood);
        assert_eq!(resolve_alpha(el, "flood-color"), 127);
        assert_eq!(rgba(resolve_color(el, "flood-color")), [255, 0, 0, 127]);

        tree.set_attribute(flood, "flood-color", "rgba(255, 0, 0, 0.5)");
        let el = Element::new(&tree, flood);
        assert_eq!(
            rgba(resolve_color(el, "flood-color")),
            [255, 0, 0, 64],
            "the companion multiplies into the color's own alpha"
        );
    }

    #[test]
    fn unknown_values_are_black() {
        let mut tree = ElementTree::new(ElementKind::Svg);
        let rect = tree.append_tag(tree.root(), "rect");
        tree.set_attribute(rect, "fill", "chartreuse-ish");
        let el = Element::new(&tree, rect);
        assert_eq!(rgba(resolve_color(el, "fill")), [0, 0, 0, 255]);
        assert_eq!(to_argb_hex(resolve_color(el, "fill")), "#FF000000");
    }
}
