// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pluggable lookups and their built-in fallbacks.
//!
//! Every hook is optional. When a hook is installed on the
//! [`DrawingContext`], its answer is final (including `None`); when it is
//! absent, the context falls back to the plain functions in this module:
//!
//! - names: [`element_name`], which keeps a valid identifier verbatim and
//!   otherwise collapses each run of non-alphanumeric characters to `_`;
//! - classes: [`element_class`], the trimmed `class` attribute;
//! - font families: [`font_family`], the first listed family;
//! - images: [`image_source`], built from `href` and the placement
//!   attributes.
//!
//! Geometry is never built here. Shapes and text need a [`GeometryBuilder`]
//! or they draw nothing.

use alloc::string::String;

use kurbo::{BezPath, Rect};

use crate::context::DrawingContext;
use crate::document::{Document, Element};
use crate::parse::parse_length;
use crate::scene::{ImageSource, NodeId, Scene};

/// Derives the scene name of an element.
pub trait IdVisitor<D: Document> {
    /// Returns the name for `element`, or `None` to leave it unnamed.
    fn visit(&self, element: Element<'_, D>, cx: &DrawingContext<'_, D>) -> Option<String>;
}

/// Derives the class tag of an element.
pub trait ClassVisitor<D: Document> {
    /// Returns the class for `element`, or `None` for no class.
    fn visit(&self, element: Element<'_, D>, cx: &DrawingContext<'_, D>) -> Option<String>;
}

/// Maps a requested font family to an available one.
pub trait FontFamilyVisitor<D: Document> {
    /// Returns the family to use for `element`, given the `requested` list
    /// as written in `font-family`.
    fn visit(
        &self,
        element: Element<'_, D>,
        requested: &str,
        cx: &DrawingContext<'_, D>,
    ) -> Option<String>;
}

/// Resolves the source of an `image` element.
pub trait ImageVisitor<D: Document> {
    /// Returns the image placement, or `None` to draw nothing.
    fn visit(&self, element: Element<'_, D>, cx: &DrawingContext<'_, D>) -> Option<ImageSource>;
}

/// Attaches link metadata to the group produced for an `a` element.
pub trait LinkVisitor<D: Document> {
    /// Called once the anchor's children have been rendered into `group`.
    fn visit(&self, element: Element<'_, D>, group: NodeId, scene: &mut Scene);
}

/// Builds geometry for shapes and text.
pub trait GeometryBuilder<D: Document> {
    /// Returns the outline of `element` in its own user space.
    fn build(&self, element: Element<'_, D>) -> Option<BezPath>;
}

/// Returns `true` if `name` starts with a letter or `_` and continues with
/// letters, digits or `_`.
///
/// ```
/// use understory_svg_scene::visitors::is_valid_identifier;
///
/// assert!(is_valid_identifier("_layer1"));
/// assert!(is_valid_identifier("café"));
/// assert!(!is_valid_identifier("1st"));
/// assert!(!is_valid_identifier("a-b"));
/// ```
#[must_use]
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Turns an element id into a scene name.
///
/// Valid identifiers are kept as is. Anything else has every run of
/// non-alphanumeric characters replaced by a single `_`.
#[must_use]
pub fn sanitize_name(id: &str) -> String {
    if is_valid_identifier(id) {
        return String::from(id);
    }
    let mut name = String::with_capacity(id.len());
    let mut in_run = false;
    for c in id.chars() {
        if c.is_alphanumeric() {
            name.push(c);
            in_run = false;
        } else if !in_run {
            name.push('_');
            in_run = true;
        }
    }
    name
}

/// Default name of an element: its sanitized id, `None` when the id is blank.
#[must_use]
pub fn element_name<D: Document>(element: Element<'_, D>) -> Option<String> {
    let id = element.id().trim();
    (!id.is_empty()).then(|| sanitize_name(id))
}

/// Default class of an element: the trimmed `class` attribute, `None` when
/// blank.
#[must_use]
pub fn element_class<D: Document>(element: Element<'_, D>) -> Option<String> {
    let class = element.attribute("class")?.trim();
    (!class.is_empty()).then(|| String::from(class))
}

/// Default font family: the first family of a comma separated list, with
/// quotes removed.
#[must_use]
pub fn font_family(requested: &str) -> Option<String> {
    let first = requested
        .split(',')
        .next()?
        .trim()
        .trim_matches(|c: char| c == '\'' || c == '"')
        .trim();
    (!first.is_empty()).then(|| String::from(first))
}

/// Default image placement from `href`, `x`, `y`, `width` and `height`.
///
/// Returns `None` without a reference or with an empty area.
#[must_use]
pub fn image_source<D: Document>(element: Element<'_, D>) -> Option<ImageSource> {
    let uri = element.href()?.trim();
    let length = |name: &str| {
        element
            .attribute(name)
            .and_then(parse_length)
            .map_or(0.0, |l| l.resolve(0.0))
    };
    let (x, y) = (length("x"), length("y"));
    let (width, height) = (length("width"), length("height"));
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    Some(ImageSource {
        uri: String::from(uri),
        bounds: Rect::new(x, y, x + width, y + height),
        ..ImageSource::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementKind, ElementTree};

    #[test]
    fn invalid_ids_collapse_runs() {
        assert_eq!(sanitize_name("layer 1"), "layer_1");
        assert_eq!(sanitize_name("a--b..c"), "a_b_c");
        assert_eq!(sanitize_name("-x_"), "_x_");
        assert_eq!(sanitize_name("1st"), "1st", "digits are alphanumeric");
        assert_eq!(sanitize_name("valid_id"), "valid_id");
    }

    #[test]
    fn blank_ids_and_classes_are_absent() {
        let mut tree = ElementTree::new(ElementKind::Svg);
        let g = tree.append(tree.root(), ElementKind::Group);
        tree.with_attributes(g, &[("id", "  "), ("class", "   ")]);
        let element = Element::new(&tree, g);
        assert_eq!(element_name(element), None);
        assert_eq!(element_class(element), None);

        tree.with_attributes(g, &[("id", "my-group"), ("class", " hot ")]);
        let element = Element::new(&tree, g);
        assert_eq!(element_name(element).as_deref(), Some("my_group"));
        assert_eq!(element_class(element).as_deref(), Some("hot"));
    }

    #[test]
    fn font_family_takes_first_entry() {
        assert_eq!(
            font_family("'Open Sans', Arial, sans-serif").as_deref(),
            Some("Open Sans")
        );
        assert_eq!(font_family(" , Arial"), None);
    }

    #[test]
    fn image_fallback_needs_area() {
        let mut tree = ElementTree::new(ElementKind::Svg);
        let img = tree.append_tag(tree.root(), "image");
        tree.with_attributes(img, &[("href", "a.png"), ("x", "2"), ("width", "10")]);
        assert!(image_source(Element::new(&tree, img)).is_none());

        tree.set_attribute(img, "height", "5");
        let source = image_source(Element::new(&tree, img)).unwrap();
        assert_eq!(source.uri, "a.png");
        assert_eq!(source.bounds, Rect::new(2.0, 0.0, 12.0, 5.0));
    }
}
