// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The styled element tree consumed by the conversion.
//!
//! The conversion never parses markup or runs a style cascade. It reads
//! elements through the [`Document`] trait: attribute lookup, computed
//! property lookup (cascade and inheritance already applied), navigation,
//! element kind, and id lookup. [`ElementTree`](crate::ElementTree) is an
//! in-memory implementation suitable for tests and simple hosts.

use core::fmt;

use kurbo::{Affine, BezPath};

use crate::parse::parse_transform;

/// Kind of an element, as far as the conversion cares.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// `svg`: the document root or a nested viewport.
    Svg,
    /// `g`.
    Group,
    /// `switch`.
    Switch,
    /// `use`.
    Use,
    /// `a`.
    Anchor,
    /// `symbol`, rendered only when instantiated by `use`.
    Symbol,
    /// `defs`.
    Defs,
    /// `linearGradient`.
    LinearGradient,
    /// `radialGradient`.
    RadialGradient,
    /// `pattern`.
    Pattern,
    /// `solidColor` (SVG Tiny 1.2 paint server).
    SolidColor,
    /// Gradient `stop`.
    Stop,
    /// `clipPath`.
    ClipPath,
    /// `mask`.
    Mask,
    /// Basic shapes and `path`.
    Shape,
    /// `text`.
    Text,
    /// `image`.
    Image,
    /// Anything else; never rendered.
    Other,
}

impl ElementKind {
    /// Maps an SVG tag name to a kind.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "svg" => Self::Svg,
            "g" => Self::Group,
            "switch" => Self::Switch,
            "use" => Self::Use,
            "a" => Self::Anchor,
            "symbol" => Self::Symbol,
            "defs" => Self::Defs,
            "linearGradient" => Self::LinearGradient,
            "radialGradient" => Self::RadialGradient,
            "pattern" => Self::Pattern,
            "solidColor" | "solidcolor" => Self::SolidColor,
            "stop" => Self::Stop,
            "clipPath" => Self::ClipPath,
            "mask" => Self::Mask,
            "path" | "rect" | "circle" | "ellipse" | "line" | "polyline" | "polygon" => {
                Self::Shape
            }
            "text" => Self::Text,
            "image" => Self::Image,
            _ => Self::Other,
        }
    }

    /// `true` for linear and radial gradients.
    #[must_use]
    pub const fn is_gradient(self) -> bool {
        matches!(self, Self::LinearGradient | Self::RadialGradient)
    }

    /// `true` for patterns.
    #[must_use]
    pub const fn is_pattern(self) -> bool {
        matches!(self, Self::Pattern)
    }

    /// `true` for solid color paint servers.
    #[must_use]
    pub const fn is_solid_color(self) -> bool {
        matches!(self, Self::SolidColor)
    }
}

/// Read access to a styled element tree.
pub trait Document {
    /// Handle of an element.
    type Node: Copy + Eq + fmt::Debug;

    /// The document element.
    fn root(&self) -> Self::Node;

    /// Kind of `node`.
    fn kind(&self, node: Self::Node) -> ElementKind;

    /// Parent element, `None` for the root.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Child elements in document order.
    fn children(&self, node: Self::Node) -> impl Iterator<Item = Self::Node> + '_;

    /// Literal attribute value as written on the element.
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// Computed property value, with cascade and inheritance resolved.
    fn computed_property(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// Element id, empty when the element has none.
    fn element_id(&self, node: Self::Node) -> &str {
        self.attribute(node, "id").unwrap_or("")
    }

    /// Stable machine-readable id, unique within the document.
    fn unique_id(&self, node: Self::Node) -> &str;

    /// Resolves a reference such as `#id`, `url(#id)` or `file.svg#id`.
    fn lookup(&self, uri: &str) -> Option<Self::Node>;

    /// Parses the transform list held by `attribute` (`transform`,
    /// `gradientTransform`, `patternTransform`).
    fn transform(&self, node: Self::Node, attribute: &str) -> Option<Affine> {
        self.attribute(node, attribute).and_then(parse_transform)
    }

    /// Pre-built clip geometry for `node`, in its user space.
    ///
    /// Geometry construction is up to the host; the default has none.
    fn clip_geometry(&self, node: Self::Node) -> Option<BezPath> {
        let _ = node;
        None
    }
}

/// Extracts the fragment from `#id`, `url(#id)`, `url('#id')` or `file#id`.
#[must_use]
pub fn uri_fragment(uri: &str) -> Option<&str> {
    let uri = uri.trim();
    let uri = match uri.strip_prefix("url(") {
        Some(inner) => inner
            .strip_suffix(')')?
            .trim()
            .trim_matches(|c: char| c == '\'' || c == '"'),
        None => uri,
    };
    let (_, fragment) = uri.split_once('#')?;
    (!fragment.is_empty()).then_some(fragment)
}

/// An element of a [`Document`]: a copyable `(document, node)` pair.
pub struct Element<'a, D: Document> {
    doc: &'a D,
    node: D::Node,
}

impl<D: Document> Clone for Element<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: Document> Copy for Element<'_, D> {}

impl<D: Document> PartialEq for Element<'_, D> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.doc, other.doc) && self.node == other.node
    }
}

impl<D: Document> fmt::Debug for Element<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("node", &self.node)
            .field("kind", &self.kind())
            .field("id", &self.id())
            .finish()
    }
}

impl<'a, D: Document> Element<'a, D> {
    /// Wraps `node` of `doc`.
    pub fn new(doc: &'a D, node: D::Node) -> Self {
        Self { doc, node }
    }

    /// The document element of `doc`.
    pub fn root(doc: &'a D) -> Self {
        Self::new(doc, doc.root())
    }

    /// The owning document.
    #[must_use]
    pub fn document(&self) -> &'a D {
        self.doc
    }

    /// The element handle.
    #[must_use]
    pub fn node(&self) -> D::Node {
        self.node
    }

    /// Kind of the element.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.doc.kind(self.node)
    }

    /// Parent element.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.doc.parent(self.node).map(|node| Self::new(self.doc, node))
    }

    /// Child elements in document order.
    pub fn children(self) -> impl Iterator<Item = Self> + 'a {
        let doc = self.doc;
        doc.children(self.node).map(move |node| Self::new(doc, node))
    }

    /// Literal attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.doc.attribute(self.node, name)
    }

    /// Literal attribute value, treating a blank value as absent.
    #[must_use]
    pub fn non_blank_attribute(&self, name: &str) -> Option<&'a str> {
        self.attribute(name).filter(|value| !value.trim().is_empty())
    }

    /// Computed property value.
    #[must_use]
    pub fn computed(&self, name: &str) -> Option<&'a str> {
        self.doc.computed_property(self.node, name)
    }

    /// Element id, empty when absent.
    #[must_use]
    pub fn id(&self) -> &'a str {
        self.doc.element_id(self.node)
    }

    /// Unique id of the element.
    #[must_use]
    pub fn unique_id(&self) -> &'a str {
        self.doc.unique_id(self.node)
    }

    /// `href`, falling back to `xlink:href`.
    #[must_use]
    pub fn href(&self) -> Option<&'a str> {
        self.non_blank_attribute("href")
            .or_else(|| self.non_blank_attribute("xlink:href"))
    }

    /// Resolves a reference against the owning document.
    #[must_use]
    pub fn lookup(&self, uri: &str) -> Option<Self> {
        self.doc.lookup(uri).map(|node| Self::new(self.doc, node))
    }

    /// Transform list held by `attribute`, if present and well formed.
    #[must_use]
    pub fn transform(&self, attribute: &str) -> Option<Affine> {
        self.doc.transform(self.node, attribute)
    }

    /// Pre-built clip geometry.
    #[must_use]
    pub fn clip_geometry(&self) -> Option<BezPath> {
        self.doc.clip_geometry(self.node)
    }
}
