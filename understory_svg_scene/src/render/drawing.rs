// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Affine, Shape};

use super::{Decor, Rendering, register};
use crate::color::number_or;
use crate::context::DrawingContext;
use crate::document::{Document, Element, ElementKind};
use crate::error::RenderError;
use crate::fill::paint_brush;
use crate::paint::{SceneBrush, StrokePaint};
use crate::scene::{Drawing, Group, NodeId, SceneNode};
use crate::trace::SkipReason;

/// Renders shapes, `text` and `image` elements as scene leaves.
///
/// Geometry comes from the context's geometry builder and images from its
/// image hook. A leaf with clip geometry is wrapped in a group carrying its
/// clip, transform and opacity; otherwise the transform is baked into the
/// geometry and the opacity into the brushes. Images get a wrapper whenever
/// they are clipped, transformed or translucent.
#[derive(Debug)]
pub struct DrawingRendering<'d, D: Document> {
    element: Element<'d, D>,
    node: Option<NodeId>,
}

impl<'d, D: Document> DrawingRendering<'d, D> {
    /// Wraps `element`.
    pub fn new(element: Element<'d, D>) -> Self {
        Self {
            element,
            node: None,
        }
    }

    /// The leaf produced by [`Rendering::render`], if any.
    #[must_use]
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    fn skip(&self, cx: &mut DrawingContext<'_, D>, reason: SkipReason) {
        let unique_id = self.element.unique_id();
        cx.trace(|t| t.skipped(unique_id, reason));
    }

    fn render_image(&mut self, cx: &mut DrawingContext<'_, D>) -> Result<(), RenderError> {
        let mut parent = cx.current_group()?;
        let Some(mut image) = cx.image_source(self.element) else {
            self.skip(cx, SkipReason::NoContent);
            return Ok(());
        };
        let decor = Decor::of(self.element, None);
        if decor.opacity <= 0.0 {
            self.skip(cx, SkipReason::Hidden);
            return Ok(());
        }
        if !decor.decorations().is_empty() {
            let mut wrapper = Group::default();
            decor.apply(&mut wrapper);
            parent = cx.scene_mut().append(parent, SceneNode::Group(wrapper));
        }
        image.tags = cx.claim_tags(self.element);
        let node = cx.scene_mut().append(parent, SceneNode::Image(image));
        register(cx.scene_mut(), self.element, node);
        self.node = Some(node);
        Ok(())
    }

    fn render_geometry(&mut self, cx: &mut DrawingContext<'_, D>) -> Result<(), RenderError> {
        let mut parent = cx.current_group()?;
        let Some(mut geometry) = cx.build_geometry(self.element) else {
            self.skip(cx, SkipReason::NoContent);
            return Ok(());
        };
        let bounds = geometry.bounding_box();
        let decor = Decor::of(self.element, None);

        // Clipped leaves keep their own space inside a wrapper group.
        let (view_transform, opacity) = if decor.clip.is_some() {
            let mut wrapper = Group::default();
            decor.apply(&mut wrapper);
            parent = cx.scene_mut().append(parent, SceneNode::Group(wrapper));
            (Affine::IDENTITY, 1.0)
        } else {
            let transform = decor.transform.unwrap_or(Affine::IDENTITY);
            geometry.apply_affine(transform);
            (transform, decor.opacity)
        };
        let fade = |brush: SceneBrush| {
            let faded = brush.opacity * opacity;
            brush.with_opacity(faded)
        };

        let element = self.element;
        let fill = paint_brush(cx, element, "fill", "black", bounds, view_transform).map(fade);
        let width = number_or(element.computed("stroke-width"), 1.0);
        let stroke = paint_brush(cx, element, "stroke", "none", bounds, view_transform)
            .filter(|_| width > 0.0)
            .map(|brush| StrokePaint {
                brush: fade(brush),
                width,
            });
        let font_family =
            (element.kind() == ElementKind::Text).then(|| cx.font_family(element));

        let drawing = Drawing {
            tags: cx.claim_tags(element),
            geometry,
            fill,
            stroke,
            font_family,
        };
        let node = cx.scene_mut().append(parent, SceneNode::Drawing(drawing));
        register(cx.scene_mut(), element, node);
        self.node = Some(node);
        Ok(())
    }
}

impl<'d, D: Document + 'd> Rendering<'d, D> for DrawingRendering<'d, D> {
    fn element(&self) -> Element<'d, D> {
        self.element
    }

    fn before_render(&mut self, cx: &mut DrawingContext<'_, D>) -> Result<(), RenderError> {
        cx.current_group().map(|_| ())
    }

    fn render(&mut self, cx: &mut DrawingContext<'_, D>) -> Result<(), RenderError> {
        if self.element.computed("visibility").map(str::trim) == Some("hidden") {
            self.skip(cx, SkipReason::Hidden);
            return Ok(());
        }
        match self.element.kind() {
            ElementKind::Image => self.render_image(cx),
            _ => self.render_geometry(cx),
        }
    }
}
