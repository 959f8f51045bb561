// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Brush values attached to scene drawings.

use alloc::string::String;

use kurbo::{Affine, Rect};
use peniko::{Color, Gradient};

/// What a [`SceneBrush`] paints with.
#[derive(Clone, Debug)]
pub enum Paint {
    /// A single color.
    Solid(Color),
    /// A linear or radial gradient.
    Gradient(GradientPaint),
    /// A repeating tile whose content is drawn by the host.
    Pattern(PatternPaint),
}

/// A gradient together with the transform that maps gradient space to user space.
#[derive(Clone, Debug)]
pub struct GradientPaint {
    /// Gradient geometry, stops and spread method.
    pub gradient: Gradient,
    /// Gradient space to user space. For bounding box units this includes the
    /// bounding box mapping.
    pub transform: Affine,
}

/// A pattern tile.
///
/// Tile content is not converted here; [`PatternPaint::content`] carries the
/// unique id of the pattern element so a host can render its children.
#[derive(Clone, Debug)]
pub struct PatternPaint {
    /// Tile rectangle in user space (after resolving pattern units).
    pub tile: Rect,
    /// Optional `viewBox` mapped onto the tile.
    pub view_box: Option<Rect>,
    /// Pattern space to user space.
    pub transform: Affine,
    /// Whether tile content coordinates are fractions of the bounding box.
    pub content_in_bounding_box: bool,
    /// Unique id of the pattern element providing the tile content.
    pub content: String,
}

/// A paint with a brush-level opacity.
#[derive(Clone, Debug)]
pub struct SceneBrush {
    /// The paint.
    pub paint: Paint,
    /// Brush opacity in `[0, 1]`, applied on top of any color alpha.
    pub opacity: f64,
}

impl SceneBrush {
    /// Creates an opaque solid brush.
    #[must_use]
    pub const fn solid(color: Color) -> Self {
        Self {
            paint: Paint::Solid(color),
            opacity: 1.0,
        }
    }

    /// Returns the brush with `opacity` clamped to `[0, 1]`.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Returns the color if this is a solid brush.
    #[must_use]
    pub fn solid_color(&self) -> Option<Color> {
        match self.paint {
            Paint::Solid(color) => Some(color),
            _ => None,
        }
    }
}

/// Stroke paint and width.
#[derive(Clone, Debug)]
pub struct StrokePaint {
    /// Stroke brush.
    pub brush: SceneBrush,
    /// Stroke width in user units.
    pub width: f64,
}
