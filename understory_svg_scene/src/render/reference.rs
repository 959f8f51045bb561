// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Affine;

use super::{Decor, Decorations, Rendering, close_group, register, suppress};
use crate::color::number_or;
use crate::context::DrawingContext;
use crate::document::{Document, Element};
use crate::error::RenderError;
use crate::scene::{Group, NodeId, SceneNode};

/// Renders `use` elements.
///
/// A group is always pushed as the anchor of the instance. Its `x`/`y`
/// offset is folded into the transform after the element's own transform.
/// Naming and decorations follow the `switch` rules, and the group is only
/// registered when it was decorated or received content.
#[derive(Debug)]
pub struct UseRendering<'d, D: Document> {
    element: Element<'d, D>,
    target: Element<'d, D>,
    group: Option<NodeId>,
    decorated: bool,
}

impl<'d, D: Document> UseRendering<'d, D> {
    /// Wraps `element`, which instantiates `target`.
    pub fn new(element: Element<'d, D>, target: Element<'d, D>) -> Self {
        Self {
            element,
            target,
            group: None,
            decorated: false,
        }
    }

    /// The referenced element.
    #[must_use]
    pub fn target(&self) -> Element<'d, D> {
        self.target
    }

    /// The pushed group, until [`Rendering::after_render`] runs.
    #[must_use]
    pub fn group(&self) -> Option<NodeId> {
        self.group
    }

    fn offset(&self) -> Option<Affine> {
        let x = number_or(self.element.attribute("x"), 0.0);
        let y = number_or(self.element.attribute("y"), 0.0);
        (x != 0.0 || y != 0.0).then(|| Affine::translate((x, y)))
    }
}

impl<'d, D: Document + 'd> Rendering<'d, D> for UseRendering<'d, D> {
    fn element(&self) -> Element<'d, D> {
        self.element
    }

    fn before_render(&mut self, cx: &mut DrawingContext<'_, D>) -> Result<(), RenderError> {
        let parent = cx.current_group()?;
        let decor = Decor::of(self.element, self.offset());
        let mut decorations = decor.decorations();
        decorations.set(
            Decorations::UNREGISTERED,
            cx.has_unregistered_name(self.element),
        );

        let mut group = Group::default();
        self.decorated = !decorations.is_empty();
        if self.decorated {
            group.tags = cx.claim_tags(self.element);
            decor.apply(&mut group);
        }
        let group = cx.scene_mut().append(parent, SceneNode::Group(group));
        cx.push(group);
        self.group = Some(group);
        let unique_id = self.element.unique_id();
        cx.trace(|t| {
            t.pushed(unique_id, group);
            if !decorations.is_empty() {
                t.decorated(group, decorations);
            }
        });
        Ok(())
    }

    fn render(&mut self, cx: &mut DrawingContext<'_, D>) -> Result<(), RenderError> {
        let group = self.group.ok_or(RenderError::NoCurrentGroup)?;
        suppress(cx.scene_mut(), group, self.element);
        if self.decorated || !cx.scene().children(group).is_empty() {
            register(cx.scene_mut(), self.element, group);
        }
        Ok(())
    }

    fn after_render(&mut self, cx: &mut DrawingContext<'_, D>) -> Result<(), RenderError> {
        match self.group.take() {
            Some(group) => close_group(cx, group),
            None => Ok(()),
        }
    }
}
