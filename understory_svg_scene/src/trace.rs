// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostics hooks for a conversion.
//!
//! The conversion degrades silently on malformed input and does not log.
//! Embedders that want to know *why* an element produced nothing (or why a
//! wrapper group disappeared) can install a [`RenderTrace`] on the
//! [`DrawingContext`](crate::DrawingContext). [`TraceRecorder`] simply keeps
//! every event in order.

use alloc::string::String;
use alloc::vec::Vec;

use crate::render::Decorations;
use crate::scene::NodeId;

/// Why an element produced no scene nodes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The element's `display` attribute is literally `none`.
    DisplayNone,
    /// The element kind is never rendered directly (paint servers, `defs`, ...).
    NotRendered,
    /// A `switch` child whose conditional attributes did not pass.
    ConditionFailed,
    /// A `use` element whose reference is missing.
    MissingReference,
    /// A `use` element that (directly or indirectly) references itself.
    CyclicReference,
    /// A `use` element nested deeper than the configured limit.
    DepthLimit,
    /// A leaf for which no geometry or image could be produced.
    NoContent,
    /// A leaf whose computed `visibility` is `hidden`.
    Hidden,
}

/// A recorded conversion event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderEvent {
    /// An element was skipped.
    Skipped {
        /// Unique id of the element.
        unique_id: String,
        /// Why it was skipped.
        reason: SkipReason,
    },
    /// A group was pushed for an element.
    Pushed {
        /// Unique id of the element.
        unique_id: String,
        /// The new group.
        node: NodeId,
    },
    /// A group was popped.
    Popped {
        /// The popped group.
        node: NodeId,
    },
    /// A group was removed because it ended up empty.
    Pruned {
        /// The removed group.
        node: NodeId,
    },
    /// A `switch` rendered its children without a wrapper group.
    Elided {
        /// Unique id of the element.
        unique_id: String,
    },
    /// A lazily created group and the reasons it was created.
    Decorated {
        /// The group.
        node: NodeId,
        /// What made the group necessary.
        decorations: Decorations,
    },
    /// A paint reference did not resolve to a paint server.
    UnresolvedPaint {
        /// The reference as written.
        uri: String,
    },
}

/// Callbacks invoked during a conversion.
///
/// Every method has an empty default so implementors only override what
/// they need.
pub trait RenderTrace {
    /// An element produced nothing.
    fn skipped(&mut self, unique_id: &str, reason: SkipReason) {
        let _ = (unique_id, reason);
    }

    /// A group was pushed for the element with `unique_id`.
    fn pushed(&mut self, unique_id: &str, node: NodeId) {
        let _ = (unique_id, node);
    }

    /// A group was popped.
    fn popped(&mut self, node: NodeId) {
        let _ = node;
    }

    /// An empty group was removed from its parent.
    fn pruned(&mut self, node: NodeId) {
        let _ = node;
    }

    /// A `switch` did not need a wrapper group.
    fn elided(&mut self, unique_id: &str) {
        let _ = unique_id;
    }

    /// A group was created because of `decorations`.
    fn decorated(&mut self, node: NodeId, decorations: Decorations) {
        let _ = (node, decorations);
    }

    /// A paint reference did not resolve.
    fn unresolved_paint(&mut self, uri: &str) {
        let _ = uri;
    }
}

/// Records every event in order.
#[derive(Clone, Debug, Default)]
pub struct TraceRecorder {
    events: Vec<RenderEvent>,
}

impl TraceRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[RenderEvent] {
        &self.events
    }

    /// Forgets all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl RenderTrace for TraceRecorder {
    fn skipped(&mut self, unique_id: &str, reason: SkipReason) {
        self.events.push(RenderEvent::Skipped {
            unique_id: unique_id.into(),
            reason,
        });
    }

    fn pushed(&mut self, unique_id: &str, node: NodeId) {
        self.events.push(RenderEvent::Pushed {
            unique_id: unique_id.into(),
            node,
        });
    }

    fn popped(&mut self, node: NodeId) {
        self.events.push(RenderEvent::Popped { node });
    }

    fn pruned(&mut self, node: NodeId) {
        self.events.push(RenderEvent::Pruned { node });
    }

    fn elided(&mut self, unique_id: &str) {
        self.events.push(RenderEvent::Elided {
            unique_id: unique_id.into(),
        });
    }

    fn decorated(&mut self, node: NodeId, decorations: Decorations) {
        self.events
            .push(RenderEvent::Decorated { node, decorations });
    }

    fn unresolved_paint(&mut self, uri: &str) {
        self.events
            .push(RenderEvent::UnresolvedPaint { uri: uri.into() });
    }
}
