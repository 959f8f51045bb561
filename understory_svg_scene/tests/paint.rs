// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for color and paint resolution on rendered leaves.

use kurbo::{BezPath, Rect, Shape};
use peniko::Color;
use understory_svg_scene::color::{resolve_alpha, resolve_color, to_argb_hex};
use understory_svg_scene::fill::{Fill, create_fill, create_viewport_brush};
use understory_svg_scene::{
    Document, DrawingContext, DrawingSettings, Element, ElementKind, ElementTree,
    GeometryBuilder, Paint, RenderEvent, Scene, SceneNode, TraceRecorder, render_document,
};

struct Square;

impl GeometryBuilder<ElementTree> for Square {
    fn build(&self, _: Element<'_, ElementTree>) -> Option<BezPath> {
        Some(Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1))
    }
}

fn fill_of(scene: &Scene, id: &str) -> Option<Color> {
    let Some(SceneNode::Drawing(drawing)) = scene.get(scene.node_by_id(id)?) else {
        return None;
    };
    drawing.fill.as_ref()?.solid_color()
}

fn rgba(color: Color) -> [u8; 4] {
    let c = color.to_rgba8();
    [c.r, c.g, c.b, c.a]
}

#[test]
fn current_color_fill_matches_the_parent_color() {
    let mut tree = ElementTree::new(ElementKind::Svg);
    let g = tree.append(tree.root(), ElementKind::Group);
    tree.set_attribute(g, "color", "#336699");
    let rect = tree.append_tag(g, "rect");
    tree.with_attributes(rect, &[("id", "r"), ("fill", "currentColor"), ("color", "red")]);

    let expected = resolve_color(Element::new(&tree, g), "color");
    assert_eq!(
        rgba(resolve_color(Element::new(&tree, rect), "fill")),
        rgba(expected)
    );

    let mut cx = DrawingContext::new(DrawingSettings::default()).with_geometry_builder(Square);
    cx.render(&tree).unwrap();
    let scene = cx.into_scene();
    assert_eq!(fill_of(&scene, "r").map(rgba), Some([0x33, 0x66, 0x99, 255]));
}

#[test]
fn current_color_follows_chains() {
    let mut tree = ElementTree::new(ElementKind::Svg);
    let outer = tree.append(tree.root(), ElementKind::Group);
    tree.set_attribute(outer, "color", "#102030");
    let inner = tree.append(outer, ElementKind::Group);
    tree.set_attribute(inner, "color", "currentColor");
    let rect = tree.append_tag(inner, "rect");
    tree.set_attribute(rect, "fill", "currentColor");

    assert_eq!(
        to_argb_hex(resolve_color(Element::new(&tree, rect), "fill")),
        "#FF102030"
    );
}

#[test]
fn half_stop_opacity_truncates() {
    let mut tree = ElementTree::new(ElementKind::Svg);
    let grad = tree.append_tag(tree.root(), "linearGradient");
    let stop = tree.append_tag(grad, "stop");
    tree.set_attribute(stop, "stop-opacity", "0.5");

    let stop = Element::new(&tree, stop);
    assert_eq!(resolve_alpha(stop, "stop-color"), 127);
    assert_eq!(to_argb_hex(resolve_color(stop, "stop-color")), "#7F000000");
}

#[test]
fn fill_opacity_becomes_brush_opacity() {
    let mut tree = ElementTree::new(ElementKind::Svg);
    let rect = tree.append_tag(tree.root(), "rect");
    tree.with_attributes(rect, &[("id", "r"), ("fill", "navy"), ("fill-opacity", "0.25")]);

    let mut cx = DrawingContext::new(DrawingSettings::default()).with_geometry_builder(Square);
    cx.render(&tree).unwrap();
    let scene = cx.into_scene();
    let Some(SceneNode::Drawing(drawing)) = scene.get(scene.node_by_id("r").unwrap()) else {
        panic!("expected a drawing");
    };
    let fill = drawing.fill.as_ref().unwrap();
    assert_eq!(fill.opacity, 0.25);
    assert_eq!(fill.solid_color().map(rgba), Some([0, 0, 128, 255]));
    assert!(drawing.stroke.is_none(), "strokes default to none");
}

#[test]
fn unresolved_servers_use_their_fallback() {
    let mut tree = ElementTree::new(ElementKind::Svg);
    let root = tree.root();
    let with_fallback = tree.append_tag(root, "rect");
    tree.with_attributes(with_fallback, &[("id", "a"), ("fill", "url(#missing) green")]);
    let without = tree.append_tag(root, "rect");
    tree.with_attributes(without, &[("id", "b"), ("fill", "url(#missing)")]);

    let mut recorder = TraceRecorder::new();
    let mut cx = DrawingContext::new(DrawingSettings::default())
        .with_geometry_builder(Square)
        .with_trace(&mut recorder);
    cx.render(&tree).unwrap();
    let scene = cx.into_scene();

    assert_eq!(fill_of(&scene, "a").map(rgba), Some([0, 128, 0, 255]));
    let Some(SceneNode::Drawing(drawing)) = scene.get(scene.node_by_id("b").unwrap()) else {
        panic!("expected a drawing");
    };
    assert!(drawing.fill.is_none());
    let unresolved = recorder
        .events()
        .iter()
        .filter(|e| matches!(e, RenderEvent::UnresolvedPaint { .. }))
        .count();
    assert_eq!(unresolved, 2);
}

#[test]
fn gradients_inherit_stops_through_href() {
    let mut tree = ElementTree::new(ElementKind::Svg);
    let defs = tree.append_tag(tree.root(), "defs");
    let base = tree.append_tag(defs, "linearGradient");
    tree.set_attribute(base, "id", "base");
    for (offset, color) in [("0", "red"), ("1", "blue")] {
        let stop = tree.append_tag(base, "stop");
        tree.with_attributes(stop, &[("offset", offset), ("stop-color", color)]);
    }
    let derived = tree.append_tag(defs, "radialGradient");
    tree.with_attributes(derived, &[("id", "derived"), ("href", "#base")]);

    let Some(Fill::Gradient(fill)) = create_fill(&tree, "url(#derived)") else {
        panic!("expected a gradient");
    };
    assert_eq!(fill.element().node(), derived);
    assert_eq!(fill.stops().len(), 2);

    let brush = fill
        .brush(Rect::new(0.0, 0.0, 10.0, 10.0), kurbo::Affine::IDENTITY)
        .unwrap();
    assert!(matches!(brush.paint, Paint::Gradient(_)));
    assert!(
        fill.brush(Rect::ZERO, kurbo::Affine::IDENTITY).is_none(),
        "bounding box units need a non-empty box"
    );
}

#[test]
fn viewport_brushes() {
    let mut tree = ElementTree::new(ElementKind::Svg);
    let root = tree.root();
    let black = create_viewport_brush(Element::root(&tree)).unwrap();
    assert_eq!(rgba(black.solid_color().unwrap()), [0, 0, 0, 255]);

    tree.with_attributes(
        root,
        &[("viewport-fill", "red"), ("viewport-fill-opacity", "0.2")],
    );
    let brush = create_viewport_brush(Element::root(&tree)).unwrap();
    assert_eq!(rgba(brush.solid_color().unwrap()), [255, 0, 0, 51]);
    assert_eq!(brush.opacity, 1.0);

    let scene = render_document(&tree, DrawingSettings::default()).unwrap();
    let background = scene.background().unwrap();
    assert_eq!(rgba(background.solid_color().unwrap()), [255, 0, 0, 51]);

    tree.set_attribute(root, "viewport-fill", "none");
    assert!(create_viewport_brush(Element::root(&tree)).is_none());
    let scene = render_document(&tree, DrawingSettings::default()).unwrap();
    assert!(scene.background().is_none());
}

#[test]
fn documents_without_viewport_fill_have_no_background() {
    let tree = ElementTree::new(ElementKind::Svg);
    assert_eq!(tree.kind(tree.root()), ElementKind::Svg);
    let scene = render_document(&tree, DrawingSettings::default()).unwrap();
    assert!(scene.background().is_none());
}
