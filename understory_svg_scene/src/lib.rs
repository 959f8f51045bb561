// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory SVG Scene: turns a styled SVG element tree into a retained,
//! hit-testable scene graph.
//!
//! The crate sits between "parsed and styled document" and "something that
//! draws". It does not parse markup, run a CSS cascade, tessellate shapes or
//! rasterize anything. It reads elements through the [`Document`] trait and
//! produces a [`Scene`]: nested groups with clip, transform and opacity, and
//! leaves carrying pre-built geometry and resolved brushes.
//!
//! - **Traversal** ([`render`]): each element is wrapped in a rendering node
//!   implementing [`Rendering`] with three phases, `before_render` (push),
//!   `render` (decorate and register, after children) and `after_render`
//!   (pop and prune). Groups, switches and `use` instances each decide
//!   whether a scene group is worth creating.
//! - **Drawing context** ([`DrawingContext`]): the per-conversion group
//!   stack, the registry of scene names already handed out, settings and
//!   optional hooks ([`visitors`]).
//! - **Paint resolution** ([`color`], [`fill`]): `currentColor`, opacity
//!   companions, and the gradient / pattern / solid color dispatcher.
//! - **Hit paths** ([`HitPath`]): chains of unique ids used to rebuild the
//!   cumulative transform of a hit.
//!
//! ## Example
//!
//! ```rust
//! use understory_svg_scene::{
//!     Document, DrawingContext, DrawingSettings, Element, ElementKind, ElementTree,
//!     GeometryBuilder,
//! };
//! use kurbo::{BezPath, Rect, Shape};
//!
//! struct Rects;
//!
//! impl GeometryBuilder<ElementTree> for Rects {
//!     fn build(&self, element: Element<'_, ElementTree>) -> Option<BezPath> {
//!         let size = |name| element.attribute(name)?.parse::<f64>().ok();
//!         Some(Rect::new(0.0, 0.0, size("width")?, size("height")?).to_path(0.1))
//!     }
//! }
//!
//! let mut tree = ElementTree::new(ElementKind::Svg);
//! let g = tree.append(tree.root(), ElementKind::Group);
//! tree.with_attributes(g, &[("id", "layer"), ("transform", "translate(10 0)")]);
//! let rect = tree.append_tag(g, "rect");
//! tree.with_attributes(rect, &[("width", "4"), ("height", "4"), ("fill", "red")]);
//!
//! let mut cx = DrawingContext::new(DrawingSettings::default()).with_geometry_builder(Rects);
//! cx.render(&tree).unwrap();
//! let scene = cx.into_scene();
//!
//! let layer = scene.node_by_id("layer").unwrap();
//! assert_eq!(scene.group(layer).unwrap().tags.name.as_deref(), Some("layer"));
//! assert_eq!(scene.hit_test_point((12.0, 2.0).into()), scene.children(layer).first().copied());
//! ```
//!
//! ## Errors
//!
//! Malformed input never fails a conversion: unparseable numbers, unknown
//! colors and unresolved references fall back to documented defaults.
//! The only errors are [`RenderError`]s, raised when the group stack is out
//! of step with the traversal. They abort the conversion.
//!
//! ## Diagnostics
//!
//! The crate does not log. Install a [`RenderTrace`] (for example a
//! [`TraceRecorder`]) with [`DrawingContext::with_trace`] to observe skipped
//! elements, pruned groups and unresolved paints.
//!
//! ## Features
//!
//! - `std` (default): use `std` for floating point math.
//! - `libm`: use `libm` instead, for `no_std` targets.

#![no_std]

extern crate alloc;

pub mod color;
mod context;
mod document;
mod error;
pub mod fill;
mod hit_path;
mod paint;
pub mod parse;
pub mod render;
mod scene;
mod settings;
mod trace;
mod tree;
pub mod visitors;

pub use context::DrawingContext;
pub use document::{Document, Element, ElementKind, uri_fragment};
pub use error::RenderError;
pub use hit_path::{HitPath, PATH_SEPARATOR};
pub use paint::{GradientPaint, Paint, PatternPaint, SceneBrush, StrokePaint};
pub use render::{Decorations, Rendering, render_document};
pub use scene::{Drawing, Group, ImageSource, NodeId, Scene, SceneNode, Tags};
pub use settings::DrawingSettings;
pub use trace::{RenderEvent, RenderTrace, SkipReason, TraceRecorder};
pub use tree::{ElementKey, ElementTree, is_inherited_property};
pub use visitors::{
    ClassVisitor, FontFamilyVisitor, GeometryBuilder, IdVisitor, ImageVisitor, LinkVisitor,
};
