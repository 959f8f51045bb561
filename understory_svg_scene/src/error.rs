// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fatal traversal errors.

use core::fmt;

use crate::scene::NodeId;

/// Error returned when the drawing context's group stack is inconsistent.
///
/// Both variants indicate a push/pop ordering bug in whoever drives the
/// traversal. The produced scene is unreliable once one of these is returned,
/// so the whole conversion is aborted instead of resynchronizing the stack.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum RenderError {
    /// An element was visited while no group was open.
    NoCurrentGroup,
    /// The innermost open group is not the one the rendering node pushed.
    GroupMismatch {
        /// The group the rendering node pushed and expected to pop.
        expected: NodeId,
        /// The group actually found on top of the stack, if any.
        found: Option<NodeId>,
    },
}

impl fmt::Debug for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCurrentGroup => f.write_str("RenderError::NoCurrentGroup"),
            Self::GroupMismatch { expected, found } => write!(
                f,
                "RenderError::GroupMismatch {{ expected: {expected:?}, found: {found:?} }}"
            ),
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCurrentGroup => f.write_str("an existing group is expected"),
            Self::GroupMismatch { expected, found } => match found {
                Some(found) => write!(
                    f,
                    "an existing group is expected: top of stack is {found:?}, not {expected:?}"
                ),
                None => write!(
                    f,
                    "an existing group is expected: stack is empty, {expected:?} was pushed"
                ),
            },
        }
    }
}

impl core::error::Error for RenderError {}
