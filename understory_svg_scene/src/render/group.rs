// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{Decor, Rendering, close_group, register, suppress};
use crate::context::DrawingContext;
use crate::document::{Document, Element};
use crate::error::RenderError;
use crate::scene::{Group, NodeId, SceneNode};

/// Renders `g`, `svg` and instantiated `symbol` elements.
///
/// Always pushes a group before the children, already named so that
/// descendants can address it. Decorations are applied after the children;
/// the group is pruned on the way out if it is still a no-op wrapper.
#[derive(Debug)]
pub struct GroupRendering<'d, D: Document> {
    element: Element<'d, D>,
    group: Option<NodeId>,
}

impl<'d, D: Document> GroupRendering<'d, D> {
    /// Wraps `element`.
    pub fn new(element: Element<'d, D>) -> Self {
        Self {
            element,
            group: None,
        }
    }

    /// The group pushed by [`Rendering::before_render`], if any.
    #[must_use]
    pub fn group(&self) -> Option<NodeId> {
        self.group
    }
}

impl<'d, D: Document + 'd> Rendering<'d, D> for GroupRendering<'d, D> {
    fn element(&self) -> Element<'d, D> {
        self.element
    }

    fn before_render(&mut self, cx: &mut DrawingContext<'_, D>) -> Result<(), RenderError> {
        let parent = cx.current_group()?;
        let tags = cx.claim_tags(self.element);
        let group = cx
            .scene_mut()
            .append(parent, SceneNode::Group(Group::new(tags)));
        cx.push(group);
        self.group = Some(group);
        let unique_id = self.element.unique_id();
        cx.trace(|t| t.pushed(unique_id, group));
        Ok(())
    }

    fn render(&mut self, cx: &mut DrawingContext<'_, D>) -> Result<(), RenderError> {
        let group = self.group.ok_or(RenderError::NoCurrentGroup)?;
        let decor = Decor::of(self.element, None);
        if let Some(target) = cx.scene_mut().group_mut(group) {
            decor.apply(target);
        }
        suppress(cx.scene_mut(), group, self.element);
        register(cx.scene_mut(), self.element, group);
        Ok(())
    }

    fn after_render(&mut self, cx: &mut DrawingContext<'_, D>) -> Result<(), RenderError> {
        match self.group.take() {
            Some(group) => close_group(cx, group),
            None => Ok(()),
        }
    }
}
