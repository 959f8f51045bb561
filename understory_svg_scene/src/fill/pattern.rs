// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Affine, Rect};

use super::{href_chain, inherited_attribute};
use crate::document::{Document, Element, ElementKind};
use crate::paint::{Paint, PatternPaint, SceneBrush};
use crate::parse::{Length, parse_length, parse_transform, parse_view_box};

/// A `pattern` paint server.
#[derive(Debug)]
pub struct PatternFill<'a, D: Document> {
    element: Element<'a, D>,
    chain: Vec<Element<'a, D>>,
}

impl<'a, D: Document> PatternFill<'a, D> {
    pub(crate) fn new(element: Element<'a, D>) -> Self {
        Self {
            element,
            chain: href_chain(element, ElementKind::is_pattern),
        }
    }

    /// The pattern element.
    #[must_use]
    pub fn element(&self) -> Element<'a, D> {
        self.element
    }

    fn attribute(&self, name: &str) -> Option<&'a str> {
        inherited_attribute(&self.chain, name)
    }

    /// `true` for `patternUnits="userSpaceOnUse"`.
    #[must_use]
    pub fn is_user_space(&self) -> bool {
        self.attribute("patternUnits") == Some("userSpaceOnUse")
    }

    /// The element providing the tile content: the first element of the
    /// `href` chain with children.
    #[must_use]
    pub fn content_element(&self) -> Element<'a, D> {
        self.chain
            .iter()
            .copied()
            .find(|element| element.children().next().is_some())
            .unwrap_or(self.element)
    }

    /// Builds the brush for an element whose bounding box is `bounds`.
    ///
    /// Returns `None` for an empty tile.
    #[must_use]
    pub fn brush(&self, bounds: Rect, view_transform: Affine) -> Option<SceneBrush> {
        let user_space = self.is_user_space();
        let length = |name: &str, reference: f64| {
            let length = self
                .attribute(name)
                .and_then(parse_length)
                .unwrap_or(Length::Number(0.0));
            if user_space {
                length.resolve(reference)
            } else {
                length.fraction() * reference
            }
        };
        let (width, height) = (bounds.width(), bounds.height());
        let mut tile = Rect::from_origin_size(
            (length("x", width), length("y", height)),
            (length("width", width), length("height", height)),
        );
        if !user_space {
            tile = tile + bounds.origin().to_vec2();
        }
        if tile.width() <= 0.0 || tile.height() <= 0.0 {
            return None;
        }

        let view_box = self.attribute("viewBox").and_then(parse_view_box);
        let content_in_bounding_box = view_box.is_none()
            && self.attribute("patternContentUnits") == Some("objectBoundingBox");
        let pattern_transform = self
            .attribute("patternTransform")
            .and_then(parse_transform)
            .unwrap_or(Affine::IDENTITY);
        Some(SceneBrush {
            paint: Paint::Pattern(PatternPaint {
                tile,
                view_box,
                transform: view_transform * pattern_transform,
                content_in_bounding_box,
                content: String::from(self.content_element().unique_id()),
            }),
            opacity: 1.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ElementTree;

    #[test]
    fn bounding_box_tile() {
        let mut tree = ElementTree::new(ElementKind::Svg);
        let pat = tree.append_tag(tree.root(), "pattern");
        tree.with_attributes(pat, &[("width", "0.5"), ("height", "25%")]);
        let fill = PatternFill::new(Element::new(&tree, pat));
        assert!(!fill.is_user_space());

        let brush = fill
            .brush(Rect::new(10.0, 10.0, 50.0, 30.0), Affine::IDENTITY)
            .unwrap();
        let Paint::Pattern(paint) = brush.paint else {
            panic!("expected a pattern brush");
        };
        assert_eq!(paint.tile, Rect::new(10.0, 10.0, 30.0, 15.0));
        assert!(!paint.content_in_bounding_box);
    }

    #[test]
    fn empty_tile_paints_nothing() {
        let mut tree = ElementTree::new(ElementKind::Svg);
        let pat = tree.append_tag(tree.root(), "pattern");
        tree.with_attributes(pat, &[("patternUnits", "userSpaceOnUse"), ("width", "10")]);
        let fill = PatternFill::new(Element::new(&tree, pat));
        assert!(fill.is_user_space());
        assert!(
            fill.brush(Rect::new(0.0, 0.0, 10.0, 10.0), Affine::IDENTITY)
                .is_none()
        );
    }

    #[test]
    fn inherits_tile_and_content_through_href() {
        let mut tree = ElementTree::new(ElementKind::Svg);
        let root = tree.root();
        let base = tree.append_tag(root, "pattern");
        tree.with_attributes(
            base,
            &[
                ("id", "base"),
                ("patternUnits", "userSpaceOnUse"),
                ("width", "4"),
                ("height", "4"),
                ("viewBox", "0 0 1 1"),
                ("patternContentUnits", "objectBoundingBox"),
            ],
        );
        tree.append_tag(base, "rect");
        let derived = tree.append_tag(root, "pattern");
        tree.with_attributes(derived, &[("href", "#base"), ("patternTransform", "scale(2)")]);

        let fill = PatternFill::new(Element::new(&tree, derived));
        let brush = fill
            .brush(Rect::new(0.0, 0.0, 1.0, 1.0), Affine::IDENTITY)
            .unwrap();
        let Paint::Pattern(paint) = brush.paint else {
            panic!("expected a pattern brush");
        };
        assert_eq!(paint.tile, Rect::new(0.0, 0.0, 4.0, 4.0));
        assert_eq!(paint.transform, Affine::scale(2.0));
        assert!(
            !paint.content_in_bounding_box,
            "a viewBox overrides patternContentUnits"
        );
        assert_eq!(paint.content, tree.unique_id(base));
    }
}
