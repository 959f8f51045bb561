// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The three-phase traversal.
//!
//! Every visited element is wrapped in a short-lived rendering node that
//! implements [`Rendering`]. The driver calls, in order:
//!
//! 1. [`Rendering::need_render`]: `false` skips the element and its subtree.
//! 2. [`Rendering::before_render`]: containers may push a new group here.
//! 3. The driver visits the children against the innermost open group.
//! 4. [`Rendering::render`]: decorations and registration, children done.
//! 5. [`Rendering::after_render`]: pop what was pushed, prune if empty.
//!
//! Which node handles an element is decided by its [`ElementKind`]:
//!
//! | Kind | Node |
//! |------|------|
//! | `svg`, `g`, `symbol` (as a `use` target) | [`GroupRendering`] |
//! | `a` | [`AnchorRendering`] |
//! | `switch` | [`SwitchRendering`] |
//! | `use` | [`UseRendering`] |
//! | shapes, `text`, `image` | [`DrawingRendering`] |
//!
//! Paint servers, `defs`, `symbol`, `clipPath`, `mask`, `stop` and unknown
//! elements are never rendered directly.

mod anchor;
mod drawing;
mod group;
mod reference;
mod switch;

use alloc::string::String;

use kurbo::{Affine, BezPath};

use crate::context::DrawingContext;
use crate::document::{Document, Element, ElementKind};
use crate::error::RenderError;
use crate::fill::create_viewport_brush;
use crate::parse::parse_opacity;
use crate::scene::{Group, NodeId, Scene};
use crate::settings::DrawingSettings;
use crate::trace::SkipReason;

pub use anchor::AnchorRendering;
pub use drawing::DrawingRendering;
pub use group::GroupRendering;
pub use reference::UseRendering;
pub use switch::SwitchRendering;

bitflags::bitflags! {
    /// Why a lazily materialized group was needed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Decorations: u8 {
        /// The element has clip geometry.
        const CLIP          = 0b0000_0001;
        /// The element has a transform.
        const TRANSFORM     = 0b0000_0010;
        /// The element's opacity is strictly between 0 and 1.
        const OPACITY       = 0b0000_0100;
        /// The element has a name nobody has claimed yet.
        const UNREGISTERED  = 0b0000_1000;
    }
}

/// The per-element traversal contract.
pub trait Rendering<'d, D: Document + 'd> {
    /// The element being rendered.
    fn element(&self) -> Element<'d, D>;

    /// Returns `false` when the element's own `display` attribute is `none`.
    ///
    /// Only the literal attribute counts; computed or inherited `display` is
    /// handled by the containers' visibility rule instead.
    fn need_render(&self) -> bool {
        self.element().attribute("display") != Some("none")
    }

    /// Pre-order phase, before children are visited.
    fn before_render(&mut self, cx: &mut DrawingContext<'_, D>) -> Result<(), RenderError>;

    /// Post-order phase, once children have been visited.
    fn render(&mut self, cx: &mut DrawingContext<'_, D>) -> Result<(), RenderError>;

    /// Cleanup phase: pops whatever [`Rendering::before_render`] pushed.
    fn after_render(&mut self, cx: &mut DrawingContext<'_, D>) -> Result<(), RenderError> {
        let _ = cx;
        Ok(())
    }
}

/// Clip, transform and opacity of a container element.
#[derive(Clone, Debug)]
pub(crate) struct Decor {
    pub(crate) clip: Option<BezPath>,
    pub(crate) transform: Option<Affine>,
    pub(crate) opacity: f64,
}

impl Decor {
    /// Reads the decorations of `element`; `extra` is appended after the
    /// element's own transform.
    pub(crate) fn of<D: Document>(element: Element<'_, D>, extra: Option<Affine>) -> Self {
        let transform = match (element.transform("transform"), extra) {
            (Some(own), Some(extra)) => Some(own * extra),
            (own, extra) => own.or(extra),
        };
        Self {
            clip: element.clip_geometry(),
            transform: transform.filter(|t| *t != Affine::IDENTITY),
            opacity: element
                .computed("opacity")
                .and_then(parse_opacity)
                .unwrap_or(1.0),
        }
    }

    /// The reasons this decor needs its own group, ignoring naming.
    pub(crate) fn decorations(&self) -> Decorations {
        let mut decorations = Decorations::empty();
        decorations.set(Decorations::CLIP, self.clip.is_some());
        decorations.set(Decorations::TRANSFORM, self.transform.is_some());
        decorations.set(
            Decorations::OPACITY,
            self.opacity > 0.0 && self.opacity < 1.0,
        );
        decorations
    }

    /// Writes the decorations onto `group`.
    pub(crate) fn apply(self, group: &mut Group) {
        group.clip = self.clip;
        group.transform = self.transform;
        group.opacity = (self.opacity < 1.0).then_some(self.opacity.clamp(0.0, 1.0));
    }
}

/// Applies the visibility and display rules to a container opacity.
///
/// A computed `visibility: hidden` forces the opacity to 0 unless a direct
/// child has the literal attribute `visibility="visible"`. A computed
/// `display: none` then forces it to 0 regardless.
#[must_use]
pub fn suppressed_opacity<D: Document>(element: Element<'_, D>, opacity: f64) -> f64 {
    let mut opacity = opacity.clamp(0.0, 1.0);
    if element.computed("visibility").map(str::trim) == Some("hidden") {
        let overridden = element
            .children()
            .any(|child| child.attribute("visibility").map(str::trim) == Some("visible"));
        if !overridden {
            opacity = 0.0;
        }
    }
    if element.computed("display").map(str::trim) == Some("none") {
        opacity = 0.0;
    }
    opacity
}

/// Applies the visibility rule to the opacity already stored on `group`.
pub(crate) fn suppress<D: Document>(scene: &mut Scene, group: NodeId, element: Element<'_, D>) {
    if let Some(group) = scene.group_mut(group) {
        let opacity = suppressed_opacity(element, group.effective_opacity());
        group.opacity = (opacity < 1.0).then_some(opacity);
    }
}

/// Registers a rendered node under the element's id and unique id.
pub(crate) fn register<D: Document>(scene: &mut Scene, element: Element<'_, D>, node: NodeId) {
    scene.register_rendered(element.id(), Some(element.unique_id()), node);
}

/// Pops `group` and removes it if it ended up as a no-op wrapper.
pub(crate) fn close_group<D: Document>(
    cx: &mut DrawingContext<'_, D>,
    group: NodeId,
) -> Result<(), RenderError> {
    cx.pop_group(group)?;
    if cx.scene().group(group).is_some_and(Group::is_empty) {
        cx.scene_mut().remove(group);
        cx.trace(|t| t.pruned(group));
    }
    Ok(())
}

/// Returns `true` if the conditional processing attributes of `element`
/// pass for the configured languages.
#[must_use]
pub fn passes_conditions<D: Document>(element: Element<'_, D>, settings: &DrawingSettings) -> bool {
    if element.non_blank_attribute("requiredExtensions").is_some() {
        return false;
    }
    let Some(languages) = element.attribute("systemLanguage") else {
        return true;
    };
    languages.split(',').map(primary_subtag).any(|wanted| {
        !wanted.is_empty()
            && settings
                .languages
                .iter()
                .any(|user| primary_subtag(user) == wanted)
    })
}

fn primary_subtag(tag: &str) -> String {
    tag.trim()
        .split('-')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn visit<'d, D: Document + 'd>(
    cx: &mut DrawingContext<'_, D>,
    mut node: impl Rendering<'d, D>,
    children: impl IntoIterator<Item = Element<'d, D>>,
) -> Result<(), RenderError> {
    if !node.need_render() {
        let element = node.element();
        cx.trace(|t| t.skipped(element.unique_id(), SkipReason::DisplayNone));
        return Ok(());
    }
    node.before_render(cx)?;
    for child in children {
        cx.render_element(child)?;
    }
    node.render(cx)?;
    node.after_render(cx)
}

impl<D: Document> DrawingContext<'_, D> {
    /// Converts the whole document into this context's scene.
    ///
    /// The root element's `viewport-fill`, when present, becomes the scene
    /// background. Stops at the first fatal error.
    pub fn render(&mut self, doc: &D) -> Result<(), RenderError> {
        let root = Element::root(doc);
        if root.non_blank_attribute("viewport-fill").is_some() {
            let background = create_viewport_brush(root);
            self.scene_mut().set_background(background);
        }
        self.render_element(root)
    }

    /// Renders `element` and its subtree into the innermost open group.
    pub fn render_element(&mut self, element: Element<'_, D>) -> Result<(), RenderError> {
        match element.kind() {
            ElementKind::Svg | ElementKind::Group => {
                visit(self, GroupRendering::new(element), element.children())
            }
            ElementKind::Anchor => visit(self, AnchorRendering::new(element), element.children()),
            ElementKind::Switch => {
                let chosen = self.choose_switch_child(element);
                visit(self, SwitchRendering::new(element), chosen)
            }
            ElementKind::Use => self.render_use(element),
            ElementKind::Shape | ElementKind::Text | ElementKind::Image => {
                visit(self, DrawingRendering::new(element), None::<Element<'_, D>>)
            }
            ElementKind::Symbol
            | ElementKind::Defs
            | ElementKind::LinearGradient
            | ElementKind::RadialGradient
            | ElementKind::Pattern
            | ElementKind::SolidColor
            | ElementKind::Stop
            | ElementKind::ClipPath
            | ElementKind::Mask
            | ElementKind::Other => {
                self.trace(|t| t.skipped(element.unique_id(), SkipReason::NotRendered));
                Ok(())
            }
        }
    }

    fn choose_switch_child<'d>(&mut self, switch: Element<'d, D>) -> Option<Element<'d, D>> {
        for child in switch.children() {
            if matches!(child.kind(), ElementKind::Other | ElementKind::Stop) {
                continue;
            }
            if passes_conditions(child, self.settings()) {
                return Some(child);
            }
            self.trace(|t| t.skipped(child.unique_id(), SkipReason::ConditionFailed));
        }
        None
    }

    fn render_use(&mut self, element: Element<'_, D>) -> Result<(), RenderError> {
        let Some(target) = element.href().and_then(|href| element.lookup(href)) else {
            self.trace(|t| t.skipped(element.unique_id(), SkipReason::MissingReference));
            return Ok(());
        };
        if self.instance_depth() >= self.settings().max_use_depth {
            self.trace(|t| t.skipped(element.unique_id(), SkipReason::DepthLimit));
            return Ok(());
        }
        if target == element || !self.enter_instance(target.node()) {
            self.trace(|t| t.skipped(element.unique_id(), SkipReason::CyclicReference));
            return Ok(());
        }
        let result = self.instantiate(UseRendering::new(element, target));
        self.leave_instance();
        result
    }

    fn instantiate(&mut self, mut node: UseRendering<'_, D>) -> Result<(), RenderError> {
        if !node.need_render() {
            let element = node.element();
            self.trace(|t| t.skipped(element.unique_id(), SkipReason::DisplayNone));
            return Ok(());
        }
        node.before_render(self)?;
        self.render_instance(node.target())?;
        node.render(self)?;
        node.after_render(self)
    }

    /// Renders the target of a `use` element inside the use group.
    ///
    /// A `symbol` target renders as a plain group; anything else renders as
    /// it would in place.
    fn render_instance(&mut self, target: Element<'_, D>) -> Result<(), RenderError> {
        match target.kind() {
            ElementKind::Symbol => visit(self, GroupRendering::new(target), target.children()),
            _ => self.render_element(target),
        }
    }
}

/// Converts `doc` into a new scene using `settings` and no hooks.
///
/// ```
/// use understory_svg_scene::{
///     Document, DrawingSettings, ElementKind, ElementTree, render_document,
/// };
///
/// let mut tree = ElementTree::new(ElementKind::Svg);
/// let g = tree.append(tree.root(), ElementKind::Group);
/// tree.set_attribute(g, "transform", "translate(5 5)");
///
/// let scene = render_document(&tree, DrawingSettings::default()).unwrap();
/// let svg = scene.children(scene.root())[0];
/// assert_eq!(scene.children(svg).len(), 1, "the transformed group survives");
/// ```
pub fn render_document<D: Document>(
    doc: &D,
    settings: DrawingSettings,
) -> Result<Scene, RenderError> {
    let mut cx = DrawingContext::new(settings);
    cx.render(doc)?;
    Ok(cx.into_scene())
}
