// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::color::{self, ColorValue, attenuate, parse_color};
use crate::document::{Document, Element};
use crate::paint::SceneBrush;
use crate::parse::parse_opacity;

/// Builds the background brush of a viewport element from `viewport-fill`
/// and `viewport-fill-opacity`.
///
/// `viewport-fill` is read from the element's own attribute; only the value
/// `inherit` consults the computed property. `viewport-fill-opacity` never
/// inherits. Without a fill the background is opaque black.
///
/// An opaque fill color takes the opacity into its alpha channel. A fill
/// color that already has partial alpha keeps it, and the opacity becomes the
/// brush opacity instead. `viewport-fill="none"` yields no brush.
///
/// ```
/// use understory_svg_scene::fill::create_viewport_brush;
/// use understory_svg_scene::{Document, Element, ElementKind, ElementTree};
///
/// let mut tree = ElementTree::new(ElementKind::Svg);
/// tree.set_attribute(tree.root(), "viewport-fill-opacity", "0.2");
/// let brush = create_viewport_brush(Element::root(&tree)).unwrap();
/// assert_eq!(brush.solid_color().unwrap().to_rgba8().a, 51);
/// ```
#[must_use]
pub fn create_viewport_brush<D: Document>(element: Element<'_, D>) -> Option<SceneBrush> {
    let fill = match element.non_blank_attribute("viewport-fill").map(str::trim) {
        Some("inherit") => element.computed("viewport-fill"),
        other => other,
    };
    let color = match fill.map(str::trim) {
        Some("none") => return None,
        Some(text) => match parse_color(text) {
            Some(ColorValue::Color(color)) => color,
            Some(ColorValue::CurrentColor) => color::current_color(element),
            None => color::BLACK,
        },
        None => color::BLACK,
    };
    let opacity = element
        .attribute("viewport-fill-opacity")
        .and_then(parse_opacity);

    match opacity {
        Some(opacity) if color.to_rgba8().a == 255 => {
            Some(SceneBrush::solid(attenuate(color, opacity)))
        }
        Some(opacity) => Some(SceneBrush::solid(color).with_opacity(opacity)),
        None => Some(SceneBrush::solid(color)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementKind, ElementTree};

    fn rgba(brush: &SceneBrush) -> [u8; 4] {
        let c = brush.solid_color().unwrap().to_rgba8();
        [c.r, c.g, c.b, c.a]
    }

    #[test]
    fn defaults_to_opaque_black() {
        let mut tree = ElementTree::new(ElementKind::Svg);
        let root = tree.root();
        tree.with_attributes(root, &[("viewport-fill", ""), ("viewport-fill-opacity", "")]);
        let brush = create_viewport_brush(Element::root(&tree)).unwrap();
        assert_eq!(rgba(&brush), [0, 0, 0, 255]);
        assert_eq!(brush.opacity, 1.0);
    }

    #[test]
    fn partial_alpha_moves_opacity_to_the_brush() {
        let mut tree = ElementTree::new(ElementKind::Svg);
        let root = tree.root();
        tree.with_attributes(
            root,
            &[("viewport-fill", "#ff000080"), ("viewport-fill-opacity", "0.5")],
        );
        let brush = create_viewport_brush(Element::root(&tree)).unwrap();
        assert_eq!(rgba(&brush), [255, 0, 0, 128], "color alpha is kept");
        assert_eq!(brush.opacity, 0.5);
    }

    #[test]
    fn current_color_and_inherit() {
        let mut tree = ElementTree::new(ElementKind::Svg);
        let root = tree.root();
        tree.with_attributes(root, &[("color", "blue"), ("viewport-fill", "lime")]);
        let inner = tree.append_tag(root, "svg");
        tree.set_attribute(inner, "viewport-fill", "currentColor");
        let brush = create_viewport_brush(Element::new(&tree, inner)).unwrap();
        assert_eq!(rgba(&brush), [0, 0, 255, 255], "resolved against the parent");

        tree.set_attribute(inner, "viewport-fill", "inherit");
        let brush = create_viewport_brush(Element::new(&tree, inner)).unwrap();
        assert_eq!(rgba(&brush), [0, 255, 0, 255]);

        tree.set_attribute(inner, "viewport-fill", "none");
        assert!(create_viewport_brush(Element::new(&tree, inner)).is_none());
    }
}
