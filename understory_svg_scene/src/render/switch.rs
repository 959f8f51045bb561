// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{Decor, Decorations, Rendering, close_group, register, suppress};
use crate::context::DrawingContext;
use crate::document::{Document, Element};
use crate::error::RenderError;
use crate::scene::{Group, NodeId, SceneNode};

/// Renders `switch` elements.
///
/// A wrapper group is only created when the switch has clip geometry, a
/// transform, an opacity strictly between 0 and 1, or an unclaimed name.
/// Otherwise the chosen child attaches straight to the current group.
#[derive(Debug)]
pub struct SwitchRendering<'d, D: Document> {
    element: Element<'d, D>,
    group: Option<NodeId>,
}

impl<'d, D: Document> SwitchRendering<'d, D> {
    /// Wraps `element`.
    pub fn new(element: Element<'d, D>) -> Self {
        Self {
            element,
            group: None,
        }
    }

    /// The lazily created group, if one was needed.
    #[must_use]
    pub fn group(&self) -> Option<NodeId> {
        self.group
    }
}

impl<'d, D: Document + 'd> Rendering<'d, D> for SwitchRendering<'d, D> {
    fn element(&self) -> Element<'d, D> {
        self.element
    }

    fn before_render(&mut self, cx: &mut DrawingContext<'_, D>) -> Result<(), RenderError> {
        let parent = cx.current_group()?;
        let decor = Decor::of(self.element, None);
        let mut decorations = decor.decorations();
        decorations.set(
            Decorations::UNREGISTERED,
            cx.has_unregistered_name(self.element),
        );
        let unique_id = self.element.unique_id();
        if decorations.is_empty() {
            cx.trace(|t| t.elided(unique_id));
            return Ok(());
        }

        let mut group = Group::new(cx.claim_tags(self.element));
        decor.apply(&mut group);
        let group = cx.scene_mut().append(parent, SceneNode::Group(group));
        cx.push(group);
        self.group = Some(group);
        cx.trace(|t| {
            t.pushed(unique_id, group);
            t.decorated(group, decorations);
        });
        Ok(())
    }

    fn render(&mut self, cx: &mut DrawingContext<'_, D>) -> Result<(), RenderError> {
        if let Some(group) = self.group {
            suppress(cx.scene_mut(), group, self.element);
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
