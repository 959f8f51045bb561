// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory [`Document`].
//!
//! [`ElementTree`] keeps elements in a flat arena and implements just enough
//! of the SVG property model for the conversion:
//!
//! - declarations in a `style` attribute override presentation attributes;
//! - inherited properties (and the literal `inherit`) fall back to the parent;
//! - ids are indexed on first use, so the first element to claim an id wins.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::BezPath;

use crate::document::{Document, ElementKind, uri_fragment};

/// Properties that inherit from the parent element when not declared.
const INHERITED_PROPERTIES: &[&str] = &[
    "clip-rule",
    "color",
    "color-interpolation",
    "cursor",
    "direction",
    "fill",
    "fill-opacity",
    "fill-rule",
    "font",
    "font-family",
    "font-size",
    "font-stretch",
    "font-style",
    "font-variant",
    "font-weight",
    "letter-spacing",
    "paint-order",
    "pointer-events",
    "stroke",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-opacity",
    "stroke-width",
    "text-anchor",
    "visibility",
    "word-spacing",
    "writing-mode",
];

/// Returns `true` if `property` inherits by default.
#[must_use]
pub fn is_inherited_property(property: &str) -> bool {
    INHERITED_PROPERTIES.contains(&property)
}

/// Handle of an element in an [`ElementTree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ElementKey(u32);

impl ElementKey {
    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct ElementData {
    kind: ElementKind,
    parent: Option<ElementKey>,
    children: Vec<ElementKey>,
    attributes: Vec<(String, String)>,
    style: Vec<(String, String)>,
    unique_id: String,
    clip: Option<BezPath>,
}

impl ElementData {
    fn new(kind: ElementKind, parent: Option<ElementKey>, index: usize) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            attributes: Vec::new(),
            style: Vec::new(),
            unique_id: format!("u{index}"),
            clip: None,
        }
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn declared(&self, name: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .or_else(|| self.attribute(name))
    }
}

/// Inserts or replaces `name`, returning the replaced value.
fn upsert(list: &mut Vec<(String, String)>, name: &str, value: &str) -> Option<String> {
    match list.iter_mut().find(|(key, _)| key == name) {
        Some((_, existing)) => Some(core::mem::replace(existing, String::from(value))),
        None => {
            list.push((String::from(name), String::from(value)));
            None
        }
    }
}

/// Arena-backed styled element tree.
///
/// ```
/// use understory_svg_scene::{Document, ElementKind, ElementTree};
///
/// let mut tree = ElementTree::new(ElementKind::Svg);
/// let g = tree.append(tree.root(), ElementKind::Group);
/// tree.set_attribute(g, "style", "color: red");
/// let rect = tree.append_tag(g, "rect");
///
/// assert_eq!(tree.computed_property(rect, "color"), Some("red"));
/// assert_eq!(tree.attribute(rect, "color"), None);
/// ```
#[derive(Clone, Debug)]
pub struct ElementTree {
    elements: Vec<ElementData>,
    ids: HashMap<String, ElementKey>,
}

impl ElementTree {
    /// Creates a tree with a single root element of `kind`.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            elements: alloc::vec![ElementData::new(kind, None, 0)],
            ids: HashMap::new(),
        }
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Always `false`: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Appends a new child of `kind` to `parent`.
    pub fn append(&mut self, parent: ElementKey, kind: ElementKind) -> ElementKey {
        let index = self.elements.len();
        let key = ElementKey(u32::try_from(index).expect("too many elements for ElementKey (u32)"));
        self.elements
            .push(ElementData::new(kind, Some(parent), index));
        if let Some(parent) = self.elements.get_mut(parent.idx()) {
            parent.children.push(key);
        }
        key
    }

    /// Appends a new child for an SVG tag name.
    pub fn append_tag(&mut self, parent: ElementKey, tag: &str) -> ElementKey {
        self.append(parent, ElementKind::from_tag(tag))
    }

    /// Sets an attribute.
    ///
    /// `style` is split into declarations; `id` is indexed unless another
    /// element already claimed the same id. Replacing an id releases the old
    /// one if this element held it.
    pub fn set_attribute(&mut self, key: ElementKey, name: &str, value: &str) {
        let Some(element) = self.elements.get_mut(key.idx()) else {
            return;
        };
        let previous = upsert(&mut element.attributes, name, value);
        match name {
            "style" => {
                element.style.clear();
                for declaration in value.split(';') {
                    if let Some((property, value)) = declaration.split_once(':') {
                        let property = property.trim();
                        if !property.is_empty() {
                            upsert(&mut element.style, property, value.trim());
                        }
                    }
                }
            }
            "id" => {
                if let Some(old) = previous {
                    if self.ids.get(&old) == Some(&key) {
                        self.ids.remove(&old);
                    }
                }
                if !value.is_empty() {
                    self.ids.entry(String::from(value)).or_insert(key);
                }
            }
            _ => {}
        }
    }

    /// Builder-style variant of [`ElementTree::set_attribute`].
    pub fn with_attributes(&mut self, key: ElementKey, attributes: &[(&str, &str)]) -> ElementKey {
        for (name, value) in attributes {
            self.set_attribute(key, name, value);
        }
        key
    }

    /// Overrides the generated unique id of an element.
    pub fn set_unique_id(&mut self, key: ElementKey, unique_id: &str) {
        if let Some(element) = self.elements.get_mut(key.idx()) {
            element.unique_id = String::from(unique_id);
        }
    }

    /// Attaches pre-built clip geometry to an element.
    pub fn set_clip_geometry(&mut self, key: ElementKey, clip: BezPath) {
        if let Some(element) = self.elements.get_mut(key.idx()) {
            element.clip = Some(clip);
        }
    }

    fn data(&self, key: ElementKey) -> Option<&ElementData> {
        self.elements.get(key.idx())
    }
}

impl Document for ElementTree {
    type Node = ElementKey;

    fn root(&self) -> ElementKey {
        ElementKey(0)
    }

    fn kind(&self, node: ElementKey) -> ElementKind {
        self.data(node).map_or(ElementKind::Other, |e| e.kind)
    }

    fn parent(&self, node: ElementKey) -> Option<ElementKey> {
        self.data(node)?.parent
    }

    fn children(&self, node: ElementKey) -> impl Iterator<Item = ElementKey> + '_ {
        self.data(node)
            .map_or(&[][..], |e| e.children.as_slice())
            .iter()
            .copied()
    }

    fn attribute(&self, node: ElementKey, name: &str) -> Option<&str> {
        self.data(node)?.attribute(name)
    }

    fn computed_property(&self, node: ElementKey, name: &str) -> Option<&str> {
        let inherited = is_inherited_property(name);
        let mut current = Some(node);
        while let Some(key) = current {
            let element = self.data(key)?;
            match element.declared(name) {
                Some(value) if value.trim() == "inherit" => current = element.parent,
                Some(value) => return Some(value),
                None if inherited => current = element.parent,
                None => return None,
            }
        }
        None
    }

    fn unique_id(&self, node: ElementKey) -> &str {
        self.data(node).map_or("", |e| e.unique_id.as_str())
    }

    fn lookup(&self, uri: &str) -> Option<ElementKey> {
        self.ids.get(uri_fragment(uri)?).copied()
    }

    fn clip_geometry(&self, node: ElementKey) -> Option<BezPath> {
        self.data(node)?.clip.clone()
    }
}
