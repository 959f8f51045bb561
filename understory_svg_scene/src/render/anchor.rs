// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{GroupRendering, Rendering};
use crate::context::DrawingContext;
use crate::document::{Document, Element};
use crate::error::RenderError;

/// Renders `a` elements: a group whose node is handed to the link hook once
/// its children are in place.
#[derive(Debug)]
pub struct AnchorRendering<'d, D: Document> {
    inner: GroupRendering<'d, D>,
}

impl<'d, D: Document> AnchorRendering<'d, D> {
    /// Wraps `element`.
    pub fn new(element: Element<'d, D>) -> Self {
        Self {
            inner: GroupRendering::new(element),
        }
    }
}

impl<'d, D: Document + 'd> Rendering<'d, D> for AnchorRendering<'d, D> {
    fn element(&self) -> Element<'d, D> {
        self.inner.element()
    }

    fn before_render(&mut self, cx: &mut DrawingContext<'_, D>) -> Result<(), RenderError> {
        self.inner.before_render(cx)
    }

    fn render(&mut self, cx: &mut DrawingContext<'_, D>) -> Result<(), RenderError> {
        self.inner.render(cx)?;
        if let Some(group) = self.inner.group() {
            cx.visit_link(self.element(), group);
        }
        Ok(())
    }

    fn after_render(&mut self, cx: &mut DrawingContext<'_, D>) -> Result<(), RenderError> {
        self.inner.after_render(cx)
    }
}
