use std::collections::HashSet;
use std::time::Duration;

use crate::assets::decode::decode_image;
use crate::assets::text::TextPainter;
use crate::config::EditorOpts;
use crate::foundation::core::{Color, Point, Size, Vec2, ViewTransform};
use crate::foundation::error::EaselResult;
use crate::foundation::ids::{LayerId, NodeId};
use crate::interaction::tool::{BrushState, Key, Modifiers, PointerButton, Tool};
use crate::raster::bitmap::Bitmap;
use crate::render::renderer::{FrameInput, Renderer};
use crate::scene::effect::Effect;
use crate::scene::graph::{LayerUpdate, Scene};
use crate::scene::jobs::{ImageCompletion, ImageJobs, ImageTarget};
use crate::scene::node::{Node, NodeKind};
use crate::scene::snapshot::NodeSnapshot;

/// Requests for the host, returned from input handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    RenderNeeded,
    /// Show a file picker; hand the chosen files to [`Editor::ingest_files`].
    OpenFilePicker,
    /// Call [`Editor::export`] and deliver the result.
    ExportRequested,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Gesture {
    Idle,
    Panning,
    Dragging,
    Shaping { id: NodeId, anchor: Point },
    Painting,
}

/// The editing session: scene, view, tool state and renderer.
///
/// Mutation happens only through this type's handlers on the caller's thread. Image decode and
/// filter work runs on the rayon pool and lands on the next [`Editor::tick`].
pub struct Editor {
    opts: EditorOpts,
    scene: Scene,
    renderer: Renderer,
    jobs: ImageJobs,
    view: ViewTransform,
    viewport: Size,
    tool: Tool,
    shape_kind: NodeKind,
    shape_colour: Color,
    brush: BrushState,
    gesture: Gesture,
    selection: Vec<NodeId>,
    pointer: Option<Point>,
    canvas_focused: bool,
    elapsed: Duration,
}

impl Editor {
    pub fn new(opts: EditorOpts) -> EaselResult<Self> {
        opts.validate()?;
        let mut renderer = Renderer::new(opts.renderer_opts());
        if let Some(path) = &opts.font_path {
            renderer = renderer.with_text(TextPainter::from_font_path(path)?);
        }
        Ok(Self {
            scene: Scene::new(),
            renderer,
            jobs: ImageJobs::new(),
            view: ViewTransform::default(),
            viewport: Size::new(1280.0, 720.0),
            tool: Tool::Move,
            shape_kind: opts.shape_kind,
            shape_colour: opts.shape_colour,
            brush: BrushState::new(opts.brush_size, opts.brush_colour),
            gesture: Gesture::Idle,
            selection: Vec::new(),
            pointer: None,
            canvas_focused: true,
            elapsed: Duration::ZERO,
            opts,
        })
    }

    pub fn opts(&self) -> &EditorOpts {
        &self.opts
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    pub fn set_view(&mut self, view: ViewTransform) {
        self.view = view;
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Screen surface size in pixels.
    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.viewport = Size::new(f64::from(width), f64::from(height));
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn brush(&self) -> &BrushState {
        &self.brush
    }

    pub fn set_brush(&mut self, size: f64, colour: Color) {
        if size.is_finite() && size > 0.0 {
            self.brush.size = size;
        }
        self.brush.colour = colour;
    }

    /// Kind and colour of nodes placed by the shape tool. Non-shape kinds are ignored.
    pub fn set_shape(&mut self, kind: NodeKind, colour: Color) {
        if kind.is_shape() {
            self.shape_kind = kind;
        }
        self.shape_colour = colour;
    }

    /// Selected node ids, in selection order.
    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    pub fn selected_snapshots(&self) -> Vec<NodeSnapshot> {
        self.selection
            .iter()
            .filter_map(|id| self.scene.node(*id))
            .map(NodeSnapshot::from)
            .collect()
    }

    /// Toggle the debug statistics overlay at runtime.
    pub fn set_debug_overlay(&mut self, on: bool) -> Vec<Action> {
        self.renderer.set_debug(on);
        vec![Action::RenderNeeded]
    }

    pub fn set_canvas_focused(&mut self, focused: bool) {
        self.canvas_focused = focused;
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn pending_images(&self) -> usize {
        self.jobs.in_flight()
    }

    /// Switch tools, abandoning any gesture in progress.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        self.brush.cancel();
        self.gesture = Gesture::Idle;
        self.tool = tool;
        let mut actions = vec![Action::RenderNeeded];
        if tool == Tool::Image {
            actions.push(Action::OpenFilePicker);
        }
        actions
    }

    pub fn on_pointer_down(
        &mut self,
        screen: Point,
        button: PointerButton,
        modifiers: Modifiers,
    ) -> Vec<Action> {
        self.pointer = Some(screen);
        let canvas = self.view.screen_to_canvas(screen);

        match button {
            PointerButton::Middle => {
                self.gesture = Gesture::Panning;
                return Vec::new();
            }
            PointerButton::Secondary => return Vec::new(),
            PointerButton::Primary => {}
        }

        match self.tool {
            Tool::Move => self.select_down(canvas, modifiers),
            Tool::Shape => self.shape_down(canvas),
            Tool::Brush => {
                self.scene.ensure_active_layer();
                self.brush.begin(canvas);
                self.gesture = Gesture::Painting;
                vec![Action::RenderNeeded]
            }
            Tool::Erase | Tool::Image => Vec::new(),
        }
    }

    pub fn on_pointer_move(&mut self, screen: Point, _modifiers: Modifiers) -> Vec<Action> {
        let last = self.pointer.replace(screen).unwrap_or(screen);
        let delta = screen - last;
        let canvas = self.view.screen_to_canvas(screen);

        match self.gesture {
            Gesture::Idle => {
                if self.tool == Tool::Brush {
                    vec![Action::RenderNeeded]
                } else {
                    Vec::new()
                }
            }
            Gesture::Panning => {
                self.view.pan += delta;
                vec![Action::RenderNeeded]
            }
            Gesture::Dragging => {
                let (dx, dy) = (delta.x / self.view.scale, delta.y / self.view.scale);
                for id in &self.selection {
                    if let Some(node) = self.scene.node_mut(*id) {
                        node.move_by(dx, dy);
                    }
                }
                vec![Action::RenderNeeded]
            }
            Gesture::Shaping { id, anchor } => {
                if let Some(node) = self.scene.node_mut(id) {
                    node.move_to(anchor.x.min(canvas.x), anchor.y.min(canvas.y));
                    node.resize((canvas.x - anchor.x).abs(), (canvas.y - anchor.y).abs());
                }
                vec![Action::RenderNeeded]
            }
            Gesture::Painting => {
                if self.scene.active_layer().is_some_and(|l| !l.is_locked()) {
                    self.brush.push(canvas);
                }
                vec![Action::RenderNeeded]
            }
        }
    }

    pub fn on_pointer_up(
        &mut self,
        screen: Point,
        _button: PointerButton,
        _modifiers: Modifiers,
    ) -> Vec<Action> {
        self.pointer = Some(screen);
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => Vec::new(),
            Gesture::Panning | Gesture::Dragging => vec![Action::RenderNeeded],
            Gesture::Shaping { .. } => {
                self.tool = Tool::Move;
                vec![Action::RenderNeeded]
            }
            Gesture::Painting => {
                match self.brush.finish() {
                    Ok(Some(node)) => {
                        let pushed = self
                            .scene
                            .active_layer_mut()
                            .and_then(|l| l.push_node(node));
                        if let Some(id) = pushed {
                            tracing::debug!(node = id.0, "committed brush stroke");
                        }
                    }
                    Ok(None) => {}
                    Err(err) => tracing::warn!(%err, "dropping brush stroke"),
                }
                vec![Action::RenderNeeded]
            }
        }
    }

    /// Wheel pans; with Ctrl/Cmd it zooms toward `screen`.
    pub fn on_wheel(&mut self, screen: Point, delta: Vec2, modifiers: Modifiers) -> Vec<Action> {
        if modifiers.command() {
            let step = self.opts.wheel_zoom_step;
            let factor = if delta.y < 0.0 { step } else { 1.0 / step };
            self.view.zoom_at(screen, factor);
        } else {
            self.view.pan -= delta;
        }
        vec![Action::RenderNeeded]
    }

    /// Keyboard shortcuts. Ignored while the canvas is not focused.
    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        if !self.canvas_focused {
            return Vec::new();
        }
        match key {
            Key::Delete | Key::Backspace => {
                let ids: HashSet<NodeId> = self.selection.drain(..).collect();
                let removed = self.scene.remove_nodes(&ids, self.renderer.cache_mut());
                tracing::debug!(removed, "deleted selection");
                vec![Action::RenderNeeded]
            }
            Key::Escape => {
                self.brush.cancel();
                self.gesture = Gesture::Idle;
                self.selection.clear();
                vec![Action::RenderNeeded]
            }
            Key::Char(c) => match (c.to_ascii_lowercase(), modifiers.command()) {
                ('a', true) => {
                    self.selection = self
                        .scene
                        .active_layer()
                        .map(|l| l.nodes().iter().map(Node::id).collect())
                        .unwrap_or_default();
                    vec![Action::RenderNeeded]
                }
                ('s', true) => vec![Action::ExportRequested],
                ('c', false) => {
                    if self.centre_on_selection() {
                        vec![Action::RenderNeeded]
                    } else {
                        Vec::new()
                    }
                }
                _ => Vec::new(),
            },
        }
    }

    /// Decode `files` in the background. Each becomes an image node at the last pointer
    /// position, offset per file, on the active layer.
    pub fn ingest_files(&mut self, files: Vec<Vec<u8>>) -> Vec<Action> {
        let layer = self.scene.ensure_active_layer();
        let base = self
            .pointer
            .map(|p| self.view.screen_to_canvas(p))
            .unwrap_or_else(|| {
                self.view
                    .screen_to_canvas(Point::new(self.viewport.width / 2.0, self.viewport.height / 2.0))
            });
        let step = self.opts.image_drop_offset;
        for (i, bytes) in files.into_iter().enumerate() {
            let offset = step * i as f64;
            let anchor = Point::new(base.x + offset, base.y + offset);
            self.jobs.spawn(
                ImageTarget::NewImageNode {
                    layer: Some(layer),
                    anchor,
                },
                move || decode_image(&bytes),
            );
        }
        if self.tool == Tool::Image {
            self.tool = Tool::Move;
        }
        vec![Action::RenderNeeded]
    }

    /// Bind `effect` to a node. Returns `false` when the node is missing or locked.
    pub fn add_effect(&mut self, node: NodeId, effect: Effect) -> bool {
        let Some(n) = self.scene.node_mut(node) else {
            return false;
        };
        n.add_effect(effect, &mut self.jobs);
        true
    }

    pub fn remove_effect(&mut self, node: NodeId, index: usize) -> Option<Effect> {
        let n = self.scene.node_mut(node)?;
        n.remove_effect(index, self.renderer.cache_mut())
    }

    /// Mutable access to one node, honouring layer locks.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.scene.node_mut(id)
    }

    pub fn on_layer_create(&mut self) -> LayerId {
        self.scene.on_layer_create()
    }

    pub fn on_layer_update(&mut self, update: LayerUpdate) -> bool {
        self.scene.on_layer_update(update)
    }

    pub fn on_layer_delete(&mut self, id: LayerId) -> bool {
        let deleted = self.scene.on_layer_delete(id, self.renderer.cache_mut());
        if deleted {
            let scene = &self.scene;
            self.selection.retain(|n| scene.contains_node(*n));
        }
        deleted
    }

    pub fn on_layer_reorder(&mut self, order: &[LayerId]) -> bool {
        self.scene.on_layer_reorder(order)
    }

    pub fn set_active_layer(&mut self, id: LayerId) -> bool {
        self.scene.set_active_layer(id)
    }

    /// Advance the clock, apply finished image work, and render a frame.
    pub fn tick(&mut self, dt: Duration) -> EaselResult<Bitmap> {
        self.elapsed += dt;
        let done = self.jobs.drain();
        self.apply_completions(done);
        self.render()
    }

    /// Block until all image work has finished and apply it.
    pub fn wait_for_images(&mut self) {
        let done = self.jobs.wait();
        self.apply_completions(done);
    }

    pub fn render(&mut self) -> EaselResult<Bitmap> {
        let input = FrameInput {
            width: self.viewport.width as u32,
            height: self.viewport.height as u32,
            view: self.view,
            layers: self.scene.layers(),
            tool: self.tool,
            brush: &self.brush,
            pointer: self.pointer,
            selection: &self.selection,
        };
        self.renderer.render_frame(&input)
    }

    /// Render the scene at the export resolution, without selection or tool overlays.
    pub fn export(&mut self) -> EaselResult<Bitmap> {
        let done = self.jobs.drain();
        self.apply_completions(done);
        self.renderer.export(self.scene.layers())
    }

    fn select_down(&mut self, canvas: Point, modifiers: Modifiers) -> Vec<Action> {
        match self.scene.topmost_hit(canvas) {
            Some(id) => {
                if modifiers.additive() {
                    if !self.selection.contains(&id) {
                        self.selection.push(id);
                    }
                } else {
                    self.selection = vec![id];
                }
                self.gesture = Gesture::Dragging;
            }
            None => {
                self.selection.clear();
                self.gesture = Gesture::Idle;
            }
        }
        vec![Action::RenderNeeded]
    }

    fn shape_down(&mut self, canvas: Point) -> Vec<Action> {
        let node = Node::new(self.shape_kind, canvas, Size::ZERO, self.shape_colour);
        let layer = self.scene.ensure_active_layer();
        let Some(id) = self.scene.layer_mut(layer).and_then(|l| l.push_node(node)) else {
            return Vec::new();
        };
        self.selection = vec![id];
        self.gesture = Gesture::Shaping { id, anchor: canvas };
        vec![Action::RenderNeeded]
    }

    fn centre_on_selection(&mut self) -> bool {
        let Some(node) = self.selection.first().and_then(|id| self.scene.node(*id)) else {
            return false;
        };
        let centre = node.bounds().center();
        self.view.pan = Vec2::new(
            self.viewport.width / 2.0 - centre.x * self.view.scale,
            self.viewport.height / 2.0 - centre.y * self.view.scale,
        );
        true
    }

    fn apply_completions(&mut self, done: Vec<ImageCompletion>) {
        for c in done {
            let bitmap = match c.result {
                Ok(b) => b,
                Err(err) => {
                    tracing::warn!(%err, job = ?c.target, "image job failed");
                    continue;
                }
            };
            match c.target {
                ImageTarget::ReplaceImage { node, generation } => {
                    let Some(n) = self.scene.node_mut(node) else {
                        tracing::debug!(node = node.0, "dropping image for missing or locked node");
                        continue;
                    };
                    if n.apply_async_image(bitmap, generation) {
                        self.renderer.cache_mut().invalidate(node);
                    } else {
                        tracing::debug!(node = node.0, "dropping stale image result");
                    }
                }
                ImageTarget::NewImageNode { layer, anchor } => {
                    let layer = match layer.filter(|id| self.scene.layer(*id).is_some()) {
                        Some(id) => id,
                        None => self.scene.ensure_active_layer(),
                    };
                    let node = Node::from_image(anchor, bitmap);
                    if let Some(id) = self.scene.layer_mut(layer).and_then(|l| l.push_node(node)) {
                        tracing::debug!(node = id.0, layer = layer.0, "placed image");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/editor.rs"]
mod tests;
