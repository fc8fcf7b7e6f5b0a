use super::*;
use crate::foundation::core::{Size, Vec2};
use crate::scene::effect::Effect;
use crate::scene::jobs::ImageJobs;
use crate::scene::node::{Node, NodeKind};

fn layer_with(nodes: Vec<Node>) -> Layer {
    let mut layer = Layer::new("test");
    for n in nodes {
        layer.push_node(n);
    }
    layer
}

fn red_square(x: f64, y: f64) -> Node {
    Node::new(
        NodeKind::Rectangle,
        Point::new(x, y),
        Size::new(10.0, 10.0),
        Color::rgb(255, 0, 0),
    )
}

fn frame<'a>(
    layers: &'a [Layer],
    brush: &'a BrushState,
    selection: &'a [NodeId],
    view: ViewTransform,
) -> FrameInput<'a> {
    FrameInput {
        width: 64,
        height: 64,
        view,
        layers,
        tool: Tool::Move,
        brush,
        pointer: None,
        selection,
    }
}

fn plain() -> Renderer {
    Renderer::new(RendererOpts::default().with_safe_zone(false))
}

#[test]
fn clears_to_white_and_draws_nodes() {
    let layers = vec![layer_with(vec![red_square(4.0, 4.0)])];
    let brush = BrushState::new(4.0, Color::BLACK);
    let sel: Vec<NodeId> = Vec::new();
    let mut r = plain();
    let out = r
        .render_frame(&frame(&layers, &brush, &sel, ViewTransform::default()))
        .unwrap();
    assert_eq!(out.pixel(0, 0), Some([255, 255, 255, 255]));
    assert_eq!(out.pixel(8, 8), Some([255, 0, 0, 255]));
    assert_eq!(r.frames_rendered(), 1);
}

#[test]
fn culled_nodes_are_never_baked() {
    let far = red_square(500.0, 500.0);
    let far_id = far.id();
    let layers = vec![layer_with(vec![red_square(0.0, 0.0), far])];
    let brush = BrushState::new(4.0, Color::BLACK);
    let sel: Vec<NodeId> = Vec::new();
    let mut r = plain();
    r.render_frame(&frame(&layers, &brush, &sel, ViewTransform::default()))
        .unwrap();
    assert_eq!(r.cache().len(), 1);
    assert!(!r.cache().contains(far_id));

    // pan so the far node is in view
    let view = ViewTransform::new(Vec2::new(-480.0, -480.0), 1.0);
    r.render_frame(&frame(&layers, &brush, &sel, view)).unwrap();
    assert!(r.cache().contains(far_id));
}

#[test]
fn hidden_layers_are_skipped() {
    let mut layer = layer_with(vec![red_square(4.0, 4.0)]);
    layer.set_visible(false);
    let layers = vec![layer];
    let brush = BrushState::new(4.0, Color::BLACK);
    let sel: Vec<NodeId> = Vec::new();
    let out = plain()
        .render_frame(&frame(&layers, &brush, &sel, ViewTransform::default()))
        .unwrap();
    assert_eq!(out.pixel(8, 8), Some([255, 255, 255, 255]));
}

#[test]
fn later_layers_paint_over_earlier_ones() {
    let mut top = red_square(4.0, 4.0);
    top.set_colour(Color::rgb(0, 0, 255));
    top.set_z_index(-10);
    let mut bottom = red_square(4.0, 4.0);
    bottom.set_z_index(10);
    let layers = vec![layer_with(vec![bottom]), layer_with(vec![top])];
    let brush = BrushState::new(4.0, Color::BLACK);
    let sel: Vec<NodeId> = Vec::new();
    let out = plain()
        .render_frame(&frame(&layers, &brush, &sel, ViewTransform::default()))
        .unwrap();
    assert_eq!(out.pixel(8, 8), Some([0, 0, 255, 255]));
}

#[test]
fn selection_draws_handles() {
    let node = red_square(20.0, 20.0);
    let id = node.id();
    let layers = vec![layer_with(vec![node])];
    let brush = BrushState::new(4.0, Color::BLACK);
    let sel = vec![id];
    let out = plain()
        .render_frame(&frame(&layers, &brush, &sel, ViewTransform::default()))
        .unwrap();
    // outline of the handle square centred on the top-left corner
    let p = out.pixel(16, 18).unwrap();
    assert_ne!(p, [255, 255, 255, 255]);
}

#[test]
fn effects_are_staged_around_the_body() {
    let mut jobs = ImageJobs::new();
    let mut node = red_square(10.0, 10.0);
    node.add_effect(Effect::border(4.0, Color::rgb(0, 255, 0)), &mut jobs);
    node.add_effect(
        Effect::border(4.0, Color::rgb(0, 0, 255)).with_stage(EffectStage::Before),
        &mut jobs,
    );
    let layers = vec![layer_with(vec![node])];
    let brush = BrushState::new(4.0, Color::BLACK);
    let sel: Vec<NodeId> = Vec::new();
    let out = plain()
        .render_frame(&frame(&layers, &brush, &sel, ViewTransform::default()))
        .unwrap();
    // inner half of the outline sits on top of the body
    assert_eq!(out.pixel(11, 15), Some([0, 255, 0, 255]));
    // outer half is drawn by both borders
    assert_eq!(out.pixel(8, 15), Some([0, 255, 0, 255]));
}

#[test]
fn brush_preview_and_cursor() {
    let layers: Vec<Layer> = Vec::new();
    let mut brush = BrushState::new(4.0, Color::BLACK);
    brush.begin(Point::new(5.0, 5.0));
    brush.push(Point::new(30.0, 5.0));
    let sel: Vec<NodeId> = Vec::new();
    let mut input = frame(&layers, &brush, &sel, ViewTransform::default());
    input.tool = Tool::Brush;
    input.pointer = Some(Point::new(50.0, 50.0));
    let out = plain().render_frame(&input).unwrap();
    assert_eq!(out.pixel(15, 5), Some([0, 0, 0, 255]));
    assert_eq!(out.pixel(50, 50), Some([0, 0, 0, 255]));
    assert_eq!(out.pixel(40, 30), Some([255, 255, 255, 255]));
}

#[test]
fn safe_zone_is_cached_until_size_changes() {
    let layers: Vec<Layer> = Vec::new();
    let brush = BrushState::new(4.0, Color::BLACK);
    let sel: Vec<NodeId> = Vec::new();
    let mut r = Renderer::new(RendererOpts::default().with_export_size(32, 32));
    let out = r
        .render_frame(&frame(&layers, &brush, &sel, ViewTransform::default()))
        .unwrap();
    assert!(r.cache().contains(CacheKey::SafeZone));
    // inside the zone: checker, outside: white
    assert_eq!(out.pixel(4, 4), Some([0xfa, 0xfa, 0xfa, 255]));
    assert_eq!(out.pixel(20, 4), Some([0xee, 0xee, 0xee, 255]));
    assert_eq!(out.pixel(50, 50), Some([255, 255, 255, 255]));

    r.render_frame(&frame(&layers, &brush, &sel, ViewTransform::default()))
        .unwrap();
    assert_eq!(r.cache().stats().hits, 1);
}

#[test]
fn debug_rebuilds_safe_zone_every_frame() {
    let layers: Vec<Layer> = Vec::new();
    let brush = BrushState::new(4.0, Color::BLACK);
    let sel: Vec<NodeId> = Vec::new();
    let mut r = Renderer::new(
        RendererOpts::default()
            .with_export_size(16, 16)
            .with_debug(true),
    );
    for _ in 0..3 {
        r.render_frame(&frame(&layers, &brush, &sel, ViewTransform::default()))
            .unwrap();
    }
    assert_eq!(r.cache().stats().hits, 0);
    assert_eq!(r.cache().stats().evictions, 2);
}

#[test]
fn export_uses_export_size_and_no_overlays() {
    let layers = vec![layer_with(vec![red_square(0.0, 0.0)])];
    let mut r = Renderer::new(RendererOpts::default().with_export_size(40, 30).with_debug(true));
    let out = r.export(&layers).unwrap();
    assert_eq!((out.width(), out.height()), (40, 30));
    assert_eq!(out.pixel(5, 5), Some([255, 0, 0, 255]));
    assert_eq!(out.pixel(20, 20), Some([255, 255, 255, 255]));
    assert!(!r.cache().contains(CacheKey::SafeZone));
    assert!(r.opts().debug);
}

#[test]
fn zero_sized_frame_is_a_surface_error() {
    let layers: Vec<Layer> = Vec::new();
    let brush = BrushState::new(4.0, Color::BLACK);
    let sel: Vec<NodeId> = Vec::new();
    let mut input = frame(&layers, &brush, &sel, ViewTransform::default());
    input.width = 0;
    assert!(matches!(
        plain().render_frame(&input),
        Err(crate::foundation::error::EaselError::Surface(_))
    ));
}

#[test]
fn failing_effect_is_skipped_not_fatal() {
    let mut wide = Node::new(
        NodeKind::Rectangle,
        Point::new(0.0, 40.0),
        Size::new(65_535.0, 4.0),
        Color::rgb(0, 0, 255),
    );
    // glow padding pushes its offscreen surface past the u16 limit
    wide.add_effect(Effect::glow(Color::BLACK, 1.0, 0.0, 0.0), &mut ImageJobs::new());
    let layers = vec![layer_with(vec![wide, red_square(4.0, 4.0)])];
    let brush = BrushState::new(4.0, Color::BLACK);
    let sel: Vec<NodeId> = Vec::new();
    let mut r = plain();
    let out = r
        .render_frame(&frame(&layers, &brush, &sel, ViewTransform::default()))
        .unwrap();
    assert_eq!(out.pixel(8, 8), Some([255, 0, 0, 255]));
    assert_eq!(out.pixel(30, 42), Some([0, 0, 255, 255]));
}
