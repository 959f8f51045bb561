// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::color::{attenuate, resolve_base_color};
use crate::document::{Document, Element};
use crate::paint::SceneBrush;
use crate::parse::parse_opacity;

/// A `solidColor` paint server.
#[derive(Debug)]
pub struct SolidColorFill<'a, D: Document> {
    element: Element<'a, D>,
}

impl<'a, D: Document> SolidColorFill<'a, D> {
    pub(crate) fn new(element: Element<'a, D>) -> Self {
        Self { element }
    }

    /// The `solidColor` element.
    #[must_use]
    pub fn element(&self) -> Element<'a, D> {
        self.element
    }

    /// A solid color does not depend on the painted element's bounds.
    #[must_use]
    pub fn is_user_space(&self) -> bool {
        true
    }

    /// `solid-color` attenuated by `solid-opacity`.
    #[must_use]
    pub fn brush(&self) -> SceneBrush {
        let color = resolve_base_color(self.element, "solid-color");
        let opacity = self
            .element
            .computed("solid-opacity")
            .and_then(parse_opacity)
            .unwrap_or(1.0);
        SceneBrush::solid(attenuate(color, opacity))
    }
}
