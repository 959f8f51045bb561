// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Affine, Rect};
use peniko::{
    Color, ColorStop, Extend, Gradient, GradientKind, LinearGradientPosition,
    RadialGradientPosition,
};

use super::{href_chain, inherited_attribute};
use crate::color::resolve_color;
use crate::document::{Document, Element, ElementKind};
use crate::paint::{GradientPaint, Paint, SceneBrush};
use crate::parse::{Length, parse_length, parse_transform};

/// A `linearGradient` or `radialGradient` paint server.
#[derive(Debug)]
pub struct GradientFill<'a, D: Document> {
    element: Element<'a, D>,
    chain: Vec<Element<'a, D>>,
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "gradient offsets and radii are stored as f32 by peniko"
)]
fn to_f32(value: f64) -> f32 {
    value as f32
}

fn spread(value: Option<&str>) -> Extend {
    match value {
        Some("reflect") => Extend::Reflect,
        Some("repeat") => Extend::Repeat,
        _ => Extend::Pad,
    }
}

impl<'a, D: Document> GradientFill<'a, D> {
    pub(crate) fn new(element: Element<'a, D>) -> Self {
        Self {
            element,
            chain: href_chain(element, ElementKind::is_gradient),
        }
    }

    /// The gradient element.
    #[must_use]
    pub fn element(&self) -> Element<'a, D> {
        self.element
    }

    fn attribute(&self, name: &str) -> Option<&'a str> {
        inherited_attribute(&self.chain, name)
    }

    /// `true` for `gradientUnits="userSpaceOnUse"`.
    #[must_use]
    pub fn is_user_space(&self) -> bool {
        self.attribute("gradientUnits") == Some("userSpaceOnUse")
    }

    /// Resolved stops: offsets clamped to `[0, 1]` and made non-decreasing,
    /// colors from `stop-color` with `stop-opacity` applied.
    ///
    /// Stops come from the first element of the `href` chain that has any.
    #[must_use]
    pub fn stops(&self) -> Vec<(f64, Color)> {
        let Some(owner) = self.chain.iter().find(|element| {
            element
                .children()
                .any(|child| child.kind() == ElementKind::Stop)
        }) else {
            return Vec::new();
        };
        let mut last = 0.0_f64;
        owner
            .children()
            .filter(|child| child.kind() == ElementKind::Stop)
            .map(|stop| {
                let offset = stop
                    .attribute("offset")
                    .and_then(parse_length)
                    .map_or(0.0, Length::fraction)
                    .clamp(0.0, 1.0)
                    .max(last);
                last = offset;
                (offset, resolve_color(stop, "stop-color"))
            })
            .collect()
    }

    /// Builds the brush for an element whose bounding box is `bounds`.
    ///
    /// Without stops nothing is painted; a single stop paints a solid color.
    /// Bounding box units need a non-empty box.
    #[must_use]
    pub fn brush(&self, bounds: Rect, view_transform: Affine) -> Option<SceneBrush> {
        let stops = self.stops();
        match stops.as_slice() {
            [] => return None,
            [(_, color)] => return Some(SceneBrush::solid(*color)),
            _ => {}
        }

        let user_space = self.is_user_space();
        let (width, height) = (bounds.width(), bounds.height());
        if !user_space && (width <= 0.0 || height <= 0.0) {
            return None;
        }
        let units = if user_space {
            Affine::IDENTITY
        } else {
            Affine::new([width, 0.0, 0.0, height, bounds.x0, bounds.y0])
        };
        let diagonal = ((width * width + height * height) / 2.0).sqrt();
        let length = |name: &str, default: Length, reference: f64| {
            let length = self
                .attribute(name)
                .and_then(parse_length)
                .unwrap_or(default);
            if user_space {
                length.resolve(reference)
            } else {
                length.fraction()
            }
        };

        let kind = if self.element.kind() == ElementKind::RadialGradient {
            let cx = length("cx", Length::Percent(50.0), width);
            let cy = length("cy", Length::Percent(50.0), height);
            let r = length("r", Length::Percent(50.0), diagonal);
            if r <= 0.0 {
                let (_, last) = stops[stops.len() - 1];
                return Some(SceneBrush::solid(last));
            }
            let fx = self
                .attribute("fx")
                .map_or(cx, |_| length("fx", Length::Number(cx), width));
            let fy = self
                .attribute("fy")
                .map_or(cy, |_| length("fy", Length::Number(cy), height));
            let fr = length("fr", Length::Number(0.0), diagonal);
            GradientKind::Radial(RadialGradientPosition::new_two_point(
                (fx, fy),
                to_f32(fr),
                (cx, cy),
                to_f32(r),
            ))
        } else {
            let x1 = length("x1", Length::Percent(0.0), width);
            let y1 = length("y1", Length::Percent(0.0), height);
            let x2 = length("x2", Length::Percent(100.0), width);
            let y2 = length("y2", Length::Percent(0.0), height);
            GradientKind::Linear(LinearGradientPosition::new((x1, y1), (x2, y2)))
        };

        let color_stops: Vec<ColorStop> = stops
            .iter()
            .map(|(offset, color)| ColorStop::from((to_f32(*offset), *color)))
            .collect();
        let gradient_transform = self
            .attribute("gradientTransform")
            .and_then(parse_transform)
            .unwrap_or(Affine::IDENTITY);
        Some(SceneBrush {
            paint: Paint::Gradient(GradientPaint {
                gradient: Gradient {
                    kind,
                    extend: spread(self.attribute("spreadMethod")),
                    stops: color_stops.as_slice().into(),
                    ..Gradient::default()
                },
                transform: view_transform * units * gradient_transform,
            }),
            opacity: 1.0,
        })
    }
}
