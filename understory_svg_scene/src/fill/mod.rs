// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint-server resolution.
//!
//! A paint reference such as `url(#grad)` is resolved once into a [`Fill`],
//! classified by the kind of the referenced element. The classification is
//! an explicit priority list: gradients are checked first, then patterns,
//! then solid colors. Any other referent, or none at all, is no fill.
//!
//! [`paint_brush`] resolves a whole `fill` or `stroke` value (`none`, a
//! color, `currentColor`, or a reference with an optional fallback) into a
//! [`SceneBrush`].

mod gradient;
mod pattern;
mod solid;
mod viewport;

use alloc::vec::Vec;

use kurbo::{Affine, Rect};

use crate::color::{self, ColorValue, parse_color};
use crate::context::DrawingContext;
use crate::document::{Document, Element, ElementKind};
use crate::paint::SceneBrush;
use crate::parse::parse_opacity;

pub use gradient::GradientFill;
pub use pattern::PatternFill;
pub use solid::SolidColorFill;
pub use viewport::create_viewport_brush;

/// Longest `href` chain followed when inheriting paint server attributes.
const MAX_HREF_CHAIN: usize = 16;

/// A classified paint server.
#[derive(Debug)]
pub enum Fill<'a, D: Document> {
    /// `solidColor`.
    Solid(SolidColorFill<'a, D>),
    /// `linearGradient` or `radialGradient`.
    Gradient(GradientFill<'a, D>),
    /// `pattern`.
    Pattern(PatternFill<'a, D>),
}

impl<'a, D: Document> Fill<'a, D> {
    /// Classifies `element`, or returns `None` if it is not a paint server.
    #[must_use]
    pub fn classify(element: Element<'a, D>) -> Option<Self> {
        let kind = element.kind();
        if kind.is_gradient() {
            Some(Self::Gradient(GradientFill::new(element)))
        } else if kind.is_pattern() {
            Some(Self::Pattern(PatternFill::new(element)))
        } else if kind.is_solid_color() {
            Some(Self::Solid(SolidColorFill::new(element)))
        } else {
            None
        }
    }

    /// The paint server element.
    #[must_use]
    pub fn element(&self) -> Element<'a, D> {
        match self {
            Self::Solid(fill) => fill.element(),
            Self::Gradient(fill) => fill.element(),
            Self::Pattern(fill) => fill.element(),
        }
    }

    /// Whether the paint is defined in user space rather than relative to
    /// the bounding box of the painted element.
    #[must_use]
    pub fn is_user_space(&self) -> bool {
        match self {
            Self::Solid(fill) => fill.is_user_space(),
            Self::Gradient(fill) => fill.is_user_space(),
            Self::Pattern(fill) => fill.is_user_space(),
        }
    }

    /// Builds the brush for an element whose bounding box is `bounds`.
    ///
    /// `view_transform` is applied on top of the paint's own transform.
    /// Returns `None` when the paint server cannot paint anything.
    #[must_use]
    pub fn brush(&self, bounds: Rect, view_transform: Affine) -> Option<SceneBrush> {
        match self {
            Self::Solid(fill) => Some(fill.brush()),
            Self::Gradient(fill) => fill.brush(bounds, view_transform),
            Self::Pattern(fill) => fill.brush(bounds, view_transform),
        }
    }
}

/// Resolves `uri` in `doc` and classifies the referenced element.
///
/// ```
/// use understory_svg_scene::fill::{Fill, create_fill};
/// use understory_svg_scene::{Document, ElementKind, ElementTree};
///
/// let mut tree = ElementTree::new(ElementKind::Svg);
/// let grad = tree.append_tag(tree.root(), "linearGradient");
/// tree.set_attribute(grad, "id", "g");
///
/// assert!(matches!(create_fill(&tree, "url(#g)"), Some(Fill::Gradient(_))));
/// assert!(create_fill(&tree, "#missing").is_none());
/// ```
#[must_use]
pub fn create_fill<'a, D: Document>(doc: &'a D, uri: &str) -> Option<Fill<'a, D>> {
    let node = doc.lookup(uri)?;
    Fill::classify(Element::new(doc, node))
}

/// `element` followed by the elements it inherits from through `href`.
///
/// Only elements accepted by `same_family` are followed, and the chain stops
/// at the first repeated element.
pub(crate) fn href_chain<'a, D: Document>(
    element: Element<'a, D>,
    same_family: impl Fn(ElementKind) -> bool,
) -> Vec<Element<'a, D>> {
    let mut chain = alloc::vec![element];
    let mut current = element;
    while chain.len() < MAX_HREF_CHAIN {
        let Some(next) = current.href().and_then(|href| current.lookup(href)) else {
            break;
        };
        if !same_family(next.kind()) || chain.contains(&next) {
            break;
        }
        chain.push(next);
        current = next;
    }
    chain
}

/// First non-blank value of `name` along an `href` chain.
pub(crate) fn inherited_attribute<'a, D: Document>(
    chain: &[Element<'a, D>],
    name: &str,
) -> Option<&'a str> {
    chain
        .iter()
        .find_map(|element| element.non_blank_attribute(name))
        .map(str::trim)
}

/// A parsed `fill` or `stroke` value.
#[derive(Copy, Clone, Debug)]
pub enum PaintValue<'s> {
    /// `none`.
    None,
    /// A color or `currentColor`.
    Color(ColorValue),
    /// A paint server reference with an optional fallback.
    Server {
        /// The `url(...)` part.
        uri: &'s str,
        /// What follows the reference, if anything.
        fallback: Option<&'s str>,
    },
}

/// Parses a paint value.
///
/// Unparseable colors yield `None`, which callers treat as black.
#[must_use]
pub fn parse_paint(text: &str) -> Option<PaintValue<'_>> {
    let text = text.trim();
    if text == "none" {
        return Some(PaintValue::None);
    }
    if text.starts_with("url(") {
        let end = text.find(')')? + 1;
        let fallback = text[end..].trim();
        return Some(PaintValue::Server {
            uri: &text[..end],
            fallback: (!fallback.is_empty()).then_some(fallback),
        });
    }
    parse_color(text).map(PaintValue::Color)
}

fn solid_brush<D: Document>(element: Element<'_, D>, value: Option<ColorValue>) -> SceneBrush {
    let color = match value {
        Some(ColorValue::Color(color)) => color,
        Some(ColorValue::CurrentColor) => color::current_color(element),
        None => color::BLACK,
    };
    SceneBrush::solid(color)
}

/// Resolves the paint property `property` (`fill` or `stroke`) of `element`.
///
/// `default` is the value used when the property is not set at all (`black`
/// for fills, `none` for strokes). The `{property}-opacity` value becomes the
/// brush opacity. Unresolved references use their fallback, or paint nothing
/// without one. `bounds` and `view_transform` are handed to paint servers.
pub fn paint_brush<D: Document>(
    cx: &mut DrawingContext<'_, D>,
    element: Element<'_, D>,
    property: &str,
    default: &str,
    bounds: Rect,
    view_transform: Affine,
) -> Option<SceneBrush> {
    let text = element.computed(property).unwrap_or(default);
    let brush = match parse_paint(text) {
        Some(PaintValue::None) => None,
        Some(PaintValue::Color(value)) => Some(solid_brush(element, Some(value))),
        None => Some(solid_brush(element, None)),
        Some(PaintValue::Server { uri, fallback }) => {
            let resolved = create_fill(element.document(), uri)
                .and_then(|fill| fill.brush(bounds, view_transform));
            match resolved {
                Some(brush) => Some(brush),
                None => {
                    cx.trace(|t| t.unresolved_paint(uri));
                    match fallback.map(parse_paint) {
                        Some(Some(PaintValue::Color(value))) => {
                            Some(solid_brush(element, Some(value)))
                        }
                        _ => None,
                    }
                }
            }
        }
    }?;
    let opacity = element
        .computed(&alloc::format!("{property}-opacity"))
        .and_then(parse_opacity)
        .unwrap_or(1.0);
    let opacity = brush.opacity * opacity;
    Some(brush.with_opacity(opacity))
}
