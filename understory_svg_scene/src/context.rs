// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-conversion mutable state.
//!
//! A [`DrawingContext`] is built for exactly one conversion. It owns the
//! scene being produced, the stack of open groups (innermost last), the
//! registry of names already handed out, and the optional hooks.
//!
//! The scene root is pushed when the context is created, so every element
//! visit has a group to attach to. [`DrawingContext::current_group`] reports
//! [`RenderError::NoCurrentGroup`] if a driver pops past it.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashSet;
use kurbo::BezPath;

use crate::document::{Document, Element};
use crate::error::RenderError;
use crate::scene::{ImageSource, NodeId, Scene, Tags};
use crate::settings::DrawingSettings;
use crate::trace::RenderTrace;
use crate::visitors::{
    self, ClassVisitor, FontFamilyVisitor, GeometryBuilder, IdVisitor, ImageVisitor, LinkVisitor,
};

/// Mutable state shared by every element visited during one conversion.
///
/// ```
/// use understory_svg_scene::{DrawingContext, DrawingSettings, ElementTree, RenderError};
///
/// let mut cx = DrawingContext::<ElementTree>::new(DrawingSettings::default());
/// let root = cx.current_group().unwrap();
/// assert_eq!(root, cx.scene().root());
///
/// cx.pop();
/// assert_eq!(cx.current_group(), Err(RenderError::NoCurrentGroup));
/// ```
pub struct DrawingContext<'a, D: Document> {
    scene: Scene,
    stack: Vec<NodeId>,
    registered_ids: HashSet<String>,
    settings: DrawingSettings,
    id_visitor: Option<Box<dyn IdVisitor<D> + 'a>>,
    class_visitor: Option<Box<dyn ClassVisitor<D> + 'a>>,
    font_family_visitor: Option<Box<dyn FontFamilyVisitor<D> + 'a>>,
    image_visitor: Option<Box<dyn ImageVisitor<D> + 'a>>,
    link_visitor: Option<Box<dyn LinkVisitor<D> + 'a>>,
    geometry_builder: Option<Box<dyn GeometryBuilder<D> + 'a>>,
    trace: Option<&'a mut dyn RenderTrace>,
    instances: Vec<D::Node>,
}

impl<D: Document> fmt::Debug for DrawingContext<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawingContext")
            .field("stack", &self.stack)
            .field("registered_ids", &self.registered_ids.len())
            .field("settings", &self.settings)
            .field("instances", &self.instances)
            .finish_non_exhaustive()
    }
}

impl<D: Document> Default for DrawingContext<'_, D> {
    fn default() -> Self {
        Self::new(DrawingSettings::default())
    }
}

impl<'a, D: Document> DrawingContext<'a, D> {
    /// Creates a context with an empty scene whose root is the open group.
    #[must_use]
    pub fn new(settings: DrawingSettings) -> Self {
        let scene = Scene::new();
        let root = scene.root();
        Self {
            scene,
            stack: alloc::vec![root],
            registered_ids: HashSet::new(),
            settings,
            id_visitor: None,
            class_visitor: None,
            font_family_visitor: None,
            image_visitor: None,
            link_visitor: None,
            geometry_builder: None,
            trace: None,
            instances: Vec::new(),
        }
    }

    /// Installs the naming hook.
    #[must_use]
    pub fn with_id_visitor(mut self, visitor: impl IdVisitor<D> + 'a) -> Self {
        self.id_visitor = Some(Box::new(visitor));
        self
    }

    /// Installs the class hook.
    #[must_use]
    pub fn with_class_visitor(mut self, visitor: impl ClassVisitor<D> + 'a) -> Self {
        self.class_visitor = Some(Box::new(visitor));
        self
    }

    /// Installs the font-family hook.
    #[must_use]
    pub fn with_font_family_visitor(mut self, visitor: impl FontFamilyVisitor<D> + 'a) -> Self {
        self.font_family_visitor = Some(Box::new(visitor));
        self
    }

    /// Installs the image hook.
    #[must_use]
    pub fn with_image_visitor(mut self, visitor: impl ImageVisitor<D> + 'a) -> Self {
        self.image_visitor = Some(Box::new(visitor));
        self
    }

    /// Installs the link hook.
    #[must_use]
    pub fn with_link_visitor(mut self, visitor: impl LinkVisitor<D> + 'a) -> Self {
        self.link_visitor = Some(Box::new(visitor));
        self
    }

    /// Installs the geometry builder used for shapes and text.
    #[must_use]
    pub fn with_geometry_builder(mut self, builder: impl GeometryBuilder<D> + 'a) -> Self {
        self.geometry_builder = Some(Box::new(builder));
        self
    }

    /// Installs a trace hook.
    #[must_use]
    pub fn with_trace(mut self, trace: &'a mut dyn RenderTrace) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Conversion settings.
    #[must_use]
    pub fn settings(&self) -> &DrawingSettings {
        &self.settings
    }

    /// Whether nodes also get the element id, unique id and class.
    #[must_use]
    pub fn include_runtime(&self) -> bool {
        self.settings.include_runtime
    }

    /// The scene built so far.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The scene built so far, mutably.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Consumes the context and returns the scene.
    #[must_use]
    pub fn into_scene(self) -> Scene {
        self.scene
    }

    /// Makes `group` the innermost open group.
    pub fn push(&mut self, group: NodeId) {
        self.stack.push(group);
    }

    /// Closes the innermost open group and returns it.
    pub fn pop(&mut self) -> Option<NodeId> {
        self.stack.pop()
    }

    /// The innermost open group, if any.
    #[must_use]
    pub fn peek(&self) -> Option<NodeId> {
        self.stack.last().copied()
    }

    /// Number of open groups.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The innermost open group.
    ///
    /// Every element is visited inside at least the root group, so a missing
    /// group is a fatal traversal error.
    pub fn current_group(&self) -> Result<NodeId, RenderError> {
        self.peek().ok_or(RenderError::NoCurrentGroup)
    }

    /// Pops `expected`, failing if it is not the innermost open group.
    ///
    /// On mismatch the stack is left untouched.
    pub fn pop_group(&mut self, expected: NodeId) -> Result<(), RenderError> {
        match self.peek() {
            Some(top) if top == expected => {
                self.stack.pop();
                self.trace(|t| t.popped(expected));
                Ok(())
            }
            found => Err(RenderError::GroupMismatch { expected, found }),
        }
    }

    /// Returns `true` if `name` was already handed out.
    #[must_use]
    pub fn is_registered_id(&self, name: &str) -> bool {
        self.registered_ids.contains(name)
    }

    /// Records `name` as handed out. Returns `false` if it already was.
    pub fn register_id(&mut self, name: &str) -> bool {
        if self.registered_ids.contains(name) {
            return false;
        }
        self.registered_ids.insert(String::from(name))
    }

    /// Scene name of `element`, through the naming hook if installed.
    #[must_use]
    pub fn element_name(&self, element: Element<'_, D>) -> Option<String> {
        match &self.id_visitor {
            Some(visitor) => visitor.visit(element, self),
            None => visitors::element_name(element),
        }
    }

    /// Class tag of `element`, through the class hook if installed.
    #[must_use]
    pub fn element_class(&self, element: Element<'_, D>) -> Option<String> {
        match &self.class_visitor {
            Some(visitor) => visitor.visit(element, self),
            None => visitors::element_class(element),
        }
    }

    /// Returns `true` if `element` has a name nobody claimed yet.
    #[must_use]
    pub fn has_unregistered_name(&self, element: Element<'_, D>) -> bool {
        self.element_name(element)
            .is_some_and(|name| !self.is_registered_id(&name))
    }

    /// Naming data for the node produced for `element`.
    ///
    /// The display name is only given out once per conversion: the first
    /// element claiming a name registers it and later ones stay unnamed.
    pub fn claim_tags(&mut self, element: Element<'_, D>) -> Tags {
        let name = self
            .element_name(element)
            .filter(|name| self.register_id(name));
        if !self.include_runtime() {
            return Tags {
                name,
                ..Tags::default()
            };
        }
        let id = element.id();
        let unique_id = element.unique_id();
        Tags {
            name,
            id: (!id.is_empty()).then(|| String::from(id)),
            unique_id: (!unique_id.is_empty()).then(|| String::from(unique_id)),
            class: self.element_class(element),
        }
    }

    /// Font family for a text element.
    ///
    /// Uses the font-family hook, then the first family listed on the
    /// element, then [`DrawingSettings::default_font_family`].
    #[must_use]
    pub fn font_family(&self, element: Element<'_, D>) -> String {
        let requested = element.computed("font-family").unwrap_or("");
        let resolved = match &self.font_family_visitor {
            Some(visitor) => visitor.visit(element, requested, self),
            None => visitors::font_family(requested),
        };
        resolved.unwrap_or_else(|| self.settings.default_font_family.clone())
    }

    /// Placement of an `image` element, through the image hook if installed.
    #[must_use]
    pub fn image_source(&self, element: Element<'_, D>) -> Option<ImageSource> {
        match &self.image_visitor {
            Some(visitor) => visitor.visit(element, self),
            None => visitors::image_source(element),
        }
    }

    /// Geometry of a shape or text element, `None` without a builder.
    #[must_use]
    pub fn build_geometry(&self, element: Element<'_, D>) -> Option<BezPath> {
        self.geometry_builder.as_ref()?.build(element)
    }

    /// Hands the group of an anchor to the link hook, if installed.
    pub fn visit_link(&mut self, element: Element<'_, D>, group: NodeId) {
        if let Some(visitor) = &self.link_visitor {
            visitor.visit(element, group, &mut self.scene);
        }
    }

    /// Runs `event` against the trace hook, if installed.
    pub fn trace(&mut self, event: impl FnOnce(&mut dyn RenderTrace)) {
        if let Some(trace) = self.trace.as_deref_mut() {
            event(trace);
        }
    }

    /// Enters a `use` instantiation of `node`.
    ///
    /// Returns `false` (and enters nothing) if `node` is already being
    /// instantiated further up.
    pub(crate) fn enter_instance(&mut self, node: D::Node) -> bool {
        if self.instances.contains(&node) {
            return false;
        }
        self.instances.push(node);
        true
    }

    /// Leaves the innermost `use` instantiation.
    pub(crate) fn leave_instance(&mut self) {
        self.instances.pop();
    }

    /// Number of `use` instantiations currently open.
    pub(crate) fn instance_depth(&self) -> usize {
        self.instances.len()
    }
}
