// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The retained scene graph produced by a conversion.
//!
//! A [`Scene`] is a small arena of [`SceneNode`]s addressed by [`NodeId`].
//! Groups own their children by id; every node records its parent so that
//! cumulative transforms and hit paths can be reconstructed after the walk.
//! The scene also acts as the rendered-element sink: nodes registered with
//! [`Scene::register_rendered`] can later be found by element id or by
//! unique id.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::{Affine, BezPath, Point, Rect, Shape};

use crate::hit_path::HitPath;
use crate::paint::{SceneBrush, StrokePaint};

/// Handle of a node in a [`Scene`].
///
/// Slots are never reused within a scene, so a handle to a removed node stays
/// dead rather than aliasing a newer node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32) -> Self {
        Self(idx)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Naming data attached to a node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tags {
    /// Display name, derived from the element id.
    pub name: Option<String>,
    /// Verbatim element id (only with runtime tagging enabled).
    pub id: Option<String>,
    /// Stable machine-readable id (only with runtime tagging enabled).
    pub unique_id: Option<String>,
    /// Class tag (only with runtime tagging enabled).
    pub class: Option<String>,
}

/// A container node with optional clip, transform and opacity.
#[derive(Clone, Debug, Default)]
pub struct Group {
    /// Naming data.
    pub tags: Tags,
    /// Clip geometry in the coordinate space of the children.
    pub clip: Option<BezPath>,
    /// Transform from the children's space to the parent's space.
    pub transform: Option<Affine>,
    /// Group opacity in `[0, 1]`; `None` means fully opaque.
    pub opacity: Option<f64>,
    children: Vec<NodeId>,
}

impl Group {
    /// Creates an undecorated group with no children.
    #[must_use]
    pub fn new(tags: Tags) -> Self {
        Self {
            tags,
            ..Self::default()
        }
    }

    /// Children in paint order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Effective opacity (`1.0` when unset).
    #[must_use]
    pub fn effective_opacity(&self) -> f64 {
        self.opacity.unwrap_or(1.0)
    }

    /// Returns `true` for a no-op wrapper: no children, no clip, no transform
    /// and full opacity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
            && self.clip.is_none()
            && self.transform.is_none()
            && self.effective_opacity() == 1.0
    }
}

/// A leaf with pre-built geometry and resolved paints.
#[derive(Clone, Debug, Default)]
pub struct Drawing {
    /// Naming data.
    pub tags: Tags,
    /// Geometry in the parent group's space.
    pub geometry: BezPath,
    /// Fill brush, if any.
    pub fill: Option<SceneBrush>,
    /// Stroke, if any.
    pub stroke: Option<StrokePaint>,
    /// Resolved font family for text drawings.
    pub font_family: Option<String>,
}

/// An image placeholder.
///
/// Decoding is left to the host; the scene only records where the image goes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageSource {
    /// Naming data.
    pub tags: Tags,
    /// Image reference as resolved by the image visitor.
    pub uri: String,
    /// Destination rectangle in the parent group's space.
    pub bounds: Rect,
}

/// A node of the scene graph.
#[derive(Clone, Debug)]
pub enum SceneNode {
    /// A container.
    Group(Group),
    /// A geometric leaf.
    Drawing(Drawing),
    /// An image leaf.
    Image(ImageSource),
}

impl SceneNode {
    /// Naming data of the node.
    #[must_use]
    pub fn tags(&self) -> &Tags {
        match self {
            Self::Group(g) => &g.tags,
            Self::Drawing(d) => &d.tags,
            Self::Image(i) => &i.tags,
        }
    }

    /// Returns the group payload, if this is a group.
    #[must_use]
    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Self::Group(g) => Some(g),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
struct Slot {
    node: SceneNode,
    parent: Option<NodeId>,
}

/// Ids a node was registered under.
#[derive(Clone, Debug)]
struct Rendered {
    element_id: String,
    unique_id: Option<String>,
}

/// Arena-backed scene graph.
#[derive(Clone, Debug)]
pub struct Scene {
    slots: Vec<Option<Slot>>,
    root: NodeId,
    by_id: HashMap<String, NodeId>,
    by_unique_id: HashMap<String, NodeId>,
    rendered: HashMap<NodeId, Rendered>,
    background: Option<SceneBrush>,
    display_transform: Affine,
    layer_transform: Affine,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Creates a scene holding only an empty root group.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: alloc::vec![Some(Slot {
                node: SceneNode::Group(Group::default()),
                parent: None,
            })],
            root: NodeId::new(0),
            by_id: HashMap::new(),
            by_unique_id: HashMap::new(),
            rendered: HashMap::new(),
            background: None,
            display_transform: Affine::IDENTITY,
            layer_transform: Affine::IDENTITY,
        }
    }

    /// The root group.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns `true` if the root group has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    /// Returns `true` if `id` refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.slots.get(id.idx()).is_some_and(Option::is_some)
    }

    /// Returns the node for `id`.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.slots.get(id.idx())?.as_ref().map(|slot| &slot.node)
    }

    /// Returns the node for `id` mutably.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.slots
            .get_mut(id.idx())?
            .as_mut()
            .map(|slot| &mut slot.node)
    }

    /// Returns the group for `id`, if it is a live group.
    #[must_use]
    pub fn group(&self, id: NodeId) -> Option<&Group> {
        self.get(id)?.as_group()
    }

    /// Returns the group for `id` mutably, if it is a live group.
    pub fn group_mut(&mut self, id: NodeId) -> Option<&mut Group> {
        match self.get_mut(id)? {
            SceneNode::Group(g) => Some(g),
            _ => None,
        }
    }

    /// Parent of `id`, or `None` for the root and dead nodes.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots.get(id.idx())?.as_ref()?.parent
    }

    /// Children of `id`; empty for leaves and dead nodes.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.group(id).map_or(&[][..], Group::children)
    }

    /// Appends `node` as the last child of the group `parent`.
    ///
    /// If `parent` is not a live group the node is created detached.
    pub fn append(&mut self, parent: NodeId, node: SceneNode) -> NodeId {
        let id = NodeId::new(
            u32::try_from(self.slots.len()).expect("too many scene nodes for NodeId (u32)"),
        );
        let attached = match self.group_mut(parent) {
            Some(group) => {
                group.children.push(id);
                true
            }
            None => false,
        };
        debug_assert!(attached, "scene nodes must be appended to a live group");
        self.slots.push(Some(Slot {
            node,
            parent: attached.then_some(parent),
        }));
        id
    }

    /// Removes `id` and its whole subtree, detaching it from its parent.
    ///
    /// The root cannot be removed. Returns `false` if nothing was removed.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root || !self.is_alive(id) {
            return false;
        }
        if let Some(parent) = self.parent(id)
            && let Some(group) = self.group_mut(parent)
        {
            group.children.retain(|child| *child != id);
        }
        let mut pending = alloc::vec![id];
        while let Some(next) = pending.pop() {
            self.unregister(next);
            if let Some(slot) = self.slots.get_mut(next.idx()).and_then(Option::take)
                && let SceneNode::Group(group) = &slot.node
            {
                pending.extend_from_slice(&group.children);
            }
        }
        true
    }

    fn unregister(&mut self, node: NodeId) {
        let Some(rendered) = self.rendered.remove(&node) else {
            return;
        };
        if self.by_id.get(&rendered.element_id) == Some(&node) {
            self.by_id.remove(&rendered.element_id);
        }
        if let Some(unique_id) = rendered.unique_id
            && self.by_unique_id.get(&unique_id) == Some(&node)
        {
            self.by_unique_id.remove(&unique_id);
        }
    }

    /// Records `node` as the rendering of an element.
    ///
    /// The element id is indexed on first registration only; the unique id,
    /// when present, always points at the latest registration. A node keeps
    /// the ids of its first registration.
    pub fn register_rendered(&mut self, element_id: &str, unique_id: Option<&str>, node: NodeId) {
        let unique_id = unique_id.filter(|uid| !uid.is_empty());
        if !element_id.is_empty() && !self.by_id.contains_key(element_id) {
            self.by_id.insert(String::from(element_id), node);
        }
        if let Some(unique_id) = unique_id {
            self.by_unique_id.insert(String::from(unique_id), node);
        }
        self.rendered.entry(node).or_insert_with(|| Rendered {
            element_id: String::from(element_id),
            unique_id: unique_id.map(String::from),
        });
    }

    /// Unique id `node` was registered under, if any.
    #[must_use]
    pub fn unique_id_of(&self, node: NodeId) -> Option<&str> {
        self.rendered.get(&node)?.unique_id.as_deref()
    }

    /// Looks up a rendered node by element id.
    #[must_use]
    pub fn node_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.by_id.get(element_id).copied()
    }

    /// Looks up a rendered node by unique id.
    #[must_use]
    pub fn node_by_unique_id(&self, unique_id: &str) -> Option<NodeId> {
        self.by_unique_id.get(unique_id).copied()
    }

    /// Looks up a rendered group by unique id.
    #[must_use]
    pub fn group_by_unique_id(&self, unique_id: &str) -> Option<&Group> {
        self.group(self.node_by_unique_id(unique_id)?)
    }

    /// Background brush of the viewport, if the document declares one.
    #[must_use]
    pub fn background(&self) -> Option<&SceneBrush> {
        self.background.as_ref()
    }

    /// Sets the viewport background brush.
    pub fn set_background(&mut self, brush: Option<SceneBrush>) {
        self.background = brush;
    }

    /// Transform from scene space to display space.
    #[must_use]
    pub fn display_transform(&self) -> Affine {
        self.display_transform
    }

    /// Sets the transform from scene space to display space.
    pub fn set_display_transform(&mut self, transform: Affine) {
        self.display_transform = transform;
    }

    /// Transform of the rendering layer holding the scene.
    #[must_use]
    pub fn layer_transform(&self) -> Affine {
        self.layer_transform
    }

    /// Sets the transform of the rendering layer holding the scene.
    pub fn set_layer_transform(&mut self, transform: Affine) {
        self.layer_transform = transform;
    }

    /// Product of the transforms of `id` and all its ancestor groups.
    #[must_use]
    pub fn cumulative_transform(&self, id: NodeId) -> Affine {
        let mut transform = Affine::IDENTITY;
        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(local) = self.group(node).and_then(|g| g.transform) {
                transform = local * transform;
            }
            current = self.parent(node);
        }
        transform
    }

    /// Builds the hit path of `id` from the unique ids its ancestors were
    /// registered under.
    ///
    /// Nodes that were never registered (wrapper groups, for instance) do not
    /// contribute a segment.
    #[must_use]
    pub fn hit_path(&self, id: NodeId) -> HitPath {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            if node != self.root
                && let Some(uid) = self.unique_id_of(node)
            {
                chain.push(uid);
            }
            current = self.parent(node);
        }
        let root_value = self.unique_id_of(self.root).unwrap_or("");
        let mut path = HitPath::new(root_value);
        for uid in chain.into_iter().rev() {
            path = path.add_child(uid);
        }
        path
    }

    /// Topmost drawing or image containing `pt` (in scene space).
    ///
    /// Drawings are hit by their fill area. Groups with zero opacity and
    /// points outside a group's clip are skipped.
    #[must_use]
    pub fn hit_test_point(&self, pt: Point) -> Option<NodeId> {
        self.hit_node(self.root, Affine::IDENTITY, pt)
    }

    fn hit_node(&self, id: NodeId, world: Affine, pt: Point) -> Option<NodeId> {
        match self.get(id)? {
            SceneNode::Group(group) => {
                if group.effective_opacity() <= 0.0 {
                    return None;
                }
                let world = world * group.transform.unwrap_or(Affine::IDENTITY);
                if let Some(clip) = &group.clip
                    && !clip.contains(world.inverse() * pt)
                {
                    return None;
                }
                group
                    .children
                    .iter()
                    .rev()
                    .find_map(|child| self.hit_node(*child, world, pt))
            }
            SceneNode::Drawing(drawing) => drawing
                .geometry
                .contains(world.inverse() * pt)
                .then_some(id),
            SceneNode::Image(image) => image.bounds.contains(world.inverse() * pt).then_some(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_drawing(rect: Rect) -> SceneNode {
        SceneNode::Drawing(Drawing {
            geometry: rect.to_path(0.1),
            ..Drawing::default()
        })
    }

    #[test]
    fn empty_group_detection() {
        let mut group = Group::default();
        assert!(group.is_empty(), "default group is a no-op wrapper");
        group.opacity = Some(1.0);
        assert!(group.is_empty(), "explicit full opacity is still empty");
        group.opacity = Some(0.5);
        assert!(!group.is_empty(), "partial opacity is a decoration");
    }

    #[test]
    fn remove_detaches_subtree_and_indices() {
        let mut scene = Scene::new();
        let root = scene.root();
        let g = scene.append(root, SceneNode::Group(Group::default()));
        let leaf = scene.append(g, rect_drawing(Rect::new(0.0, 0.0, 1.0, 1.0)));
        scene.register_rendered("leaf", Some("u-leaf"), leaf);

        assert!(scene.remove(g));
        assert!(scene.children(root).is_empty());
        assert!(!scene.is_alive(leaf));
        assert_eq!(scene.node_by_id("leaf"), None);
        assert_eq!(scene.node_by_unique_id("u-leaf"), None);
        assert!(!scene.remove(root), "root is permanent");
    }

    #[test]
    fn remove_keeps_ids_owned_by_other_nodes() {
        let mut scene = Scene::new();
        let root = scene.root();
        let first = scene.append(root, rect_drawing(Rect::new(0.0, 0.0, 1.0, 1.0)));
        let second = scene.append(root, rect_drawing(Rect::new(0.0, 0.0, 1.0, 1.0)));
        let other = scene.append(root, rect_drawing(Rect::new(0.0, 0.0, 1.0, 1.0)));
        scene.register_rendered("shared", Some("u-shared"), first);
        scene.register_rendered("shared", Some("u-shared"), second);
        scene.register_rendered("other", Some("u-other"), other);

        assert!(scene.remove(second));
        assert_eq!(scene.node_by_id("shared"), Some(first), "first registration owns the id");
        assert_eq!(scene.node_by_unique_id("u-shared"), None);
        assert_eq!(scene.node_by_id("other"), Some(other));
        assert_eq!(scene.node_by_unique_id("u-other"), Some(other));
        assert_eq!(scene.unique_id_of(second), None);

        assert!(scene.remove(first));
        assert_eq!(scene.node_by_id("shared"), None);
    }

    #[test]
    fn hit_paths_come_from_registrations() {
        let mut scene = Scene::new();
        let root = scene.root();
        let g = scene.append(root, SceneNode::Group(Group::default()));
        let wrapper = scene.append(g, SceneNode::Group(Group::default()));
        let leaf = scene.append(wrapper, rect_drawing(Rect::new(0.0, 0.0, 1.0, 1.0)));
        scene.register_rendered("", Some("g"), g);
        scene.register_rendered("leaf", Some("leaf"), leaf);

        assert_eq!(scene.unique_id_of(wrapper), None);
        assert_eq!(scene.hit_path(leaf).path(), "/g/leaf");
    }

    #[test]
    fn first_registration_wins_for_element_ids() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.append(root, SceneNode::Group(Group::default()));
        let b = scene.append(root, SceneNode::Group(Group::default()));
        scene.register_rendered("dup", None, a);
        scene.register_rendered("dup", None, b);
        assert_eq!(scene.node_by_id("dup"), Some(a));
    }

    #[test]
    fn hit_test_respects_transform_clip_and_order() {
        let mut scene = Scene::new();
        let root = scene.root();
        let moved = scene.append(
            root,
            SceneNode::Group(Group {
                transform: Some(Affine::translate((100.0, 0.0))),
                clip: Some(Rect::new(0.0, 0.0, 5.0, 10.0).to_path(0.1)),
                ..Group::default()
            }),
        );
        let under = scene.append(moved, rect_drawing(Rect::new(0.0, 0.0, 10.0, 10.0)));
        let over = scene.append(moved, rect_drawing(Rect::new(0.0, 0.0, 10.0, 10.0)));

        assert_eq!(scene.hit_test_point(Point::new(102.0, 2.0)), Some(over));
        assert_eq!(
            scene.hit_test_point(Point::new(108.0, 2.0)),
            None,
            "point is clipped away"
        );
        assert_eq!(scene.hit_test_point(Point::new(2.0, 2.0)), None);

        scene.remove(over);
        assert_eq!(scene.hit_test_point(Point::new(102.0, 2.0)), Some(under));
    }

    #[test]
    fn cumulative_transform_composes_outer_first() {
        let mut scene = Scene::new();
        let root = scene.root();
        let outer = scene.append(
            root,
            SceneNode::Group(Group {
                transform: Some(Affine::scale(2.0)),
                ..Group::default()
            }),
        );
        let inner = scene.append(
            outer,
            SceneNode::Group(Group {
                transform: Some(Affine::translate((1.0, 0.0))),
                ..Group::default()
            }),
        );
        let p = scene.cumulative_transform(inner) * Point::ZERO;
        assert_eq!(p, Point::new(2.0, 0.0));
    }
}
