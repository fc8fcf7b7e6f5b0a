use crate::assets::text::TextPainter;
use crate::foundation::core::{Affine, Color, Point, Rect, ViewTransform};
use crate::foundation::error::EaselResult;
use crate::foundation::ids::{CacheKey, NodeId};
use crate::interaction::tool::{BrushState, Tool, paint_stroke};
use crate::raster::bitmap::Bitmap;
use crate::raster::surface::{StrokeStyle, Surface};
use crate::render::cache::RenderCache;
use crate::render::pipeline::{Background, BackgroundStage, Stage, render};
use crate::scene::effect::EffectStage;
use crate::scene::layer::Layer;
use crate::scene::node::Node;

const CHECKER_SIZE: u32 = 16;
const CHECKER_LIGHT: Color = Color::rgb(0xfa, 0xfa, 0xfa);
const CHECKER_DARK: Color = Color::rgb(0xee, 0xee, 0xee);
const SAFE_ZONE_OUTLINE: Color = Color::rgb(0x94, 0xa3, 0xb8);
const OVERLAY_TEXT: Color = Color::rgb(0x47, 0x55, 0x69);
const OVERLAY_TEXT_PX: f32 = 13.0;

/// Renderer configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RendererOpts {
    /// Draw the export frame checkerboard behind the scene.
    pub safe_zone: bool,
    /// Overlay cache and scene statistics; also rebuilds the safe zone every frame.
    pub debug: bool,
    pub export_width: u32,
    pub export_height: u32,
    pub clear_colour: Color,
}

impl Default for RendererOpts {
    fn default() -> Self {
        Self {
            safe_zone: true,
            debug: false,
            export_width: 1920,
            export_height: 1080,
            clear_colour: Color::WHITE,
        }
    }
}

impl RendererOpts {
    pub fn with_safe_zone(mut self, on: bool) -> Self {
        self.safe_zone = on;
        self
    }

    pub fn with_debug(mut self, on: bool) -> Self {
        self.debug = on;
        self
    }

    pub fn with_export_size(mut self, width: u32, height: u32) -> Self {
        self.export_width = width;
        self.export_height = height;
        self
    }
}

/// Everything one frame reads besides the renderer's own state.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput<'a> {
    pub width: u32,
    pub height: u32,
    pub view: ViewTransform,
    pub layers: &'a [Layer],
    pub tool: Tool,
    pub brush: &'a BrushState,
    /// Last pointer position in screen space.
    pub pointer: Option<Point>,
    /// Selected node ids, in selection order.
    pub selection: &'a [NodeId],
}

/// Draws frames. Owns the render cache.
pub struct Renderer {
    opts: RendererOpts,
    cache: RenderCache,
    text: Option<TextPainter>,
    frames: u64,
}

impl Renderer {
    pub fn new(opts: RendererOpts) -> Self {
        Self {
            opts,
            cache: RenderCache::new(),
            text: None,
            frames: 0,
        }
    }

    /// Enable overlay text (safe-zone hint, debug stats).
    pub fn with_text(mut self, text: TextPainter) -> Self {
        self.text = Some(text);
        self
    }

    pub fn opts(&self) -> &RendererOpts {
        &self.opts
    }

    pub fn set_debug(&mut self, on: bool) {
        self.opts.debug = on;
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut RenderCache {
        &mut self.cache
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    #[tracing::instrument(skip(self, input), fields(w = input.width, h = input.height))]
    pub fn render_frame(&mut self, input: &FrameInput<'_>) -> EaselResult<Bitmap> {
        let mut surface = Surface::new(input.width, input.height)?;
        let screen = Rect::new(0.0, 0.0, f64::from(input.width), f64::from(input.height));
        surface.fill_rect(screen, self.opts.clear_colour);

        if self.opts.safe_zone {
            self.draw_safe_zone(&mut surface, input.view)?;
        }

        let viewport = input.view.visible_rect(screen.width(), screen.height());
        let mut drawn = 0usize;
        for layer in input.layers.iter().filter(|l| l.is_visible()) {
            for node in layer.nodes().iter().filter(|n| n.is_within(viewport)) {
                draw_effects(node, EffectStage::Before, &mut surface, input.view);
                if let Err(err) = node.render(&mut surface, input.view, &mut self.cache) {
                    tracing::warn!(node = node.id().0, %err, "skipping node");
                    continue;
                }
                draw_effects(node, EffectStage::After, &mut surface, input.view);
                if input.selection.contains(&node.id()) {
                    node.render_border(&mut surface, input.view);
                    node.render_handles(&mut surface, input.view);
                }
                drawn += 1;
            }
        }

        if input.tool == Tool::Brush {
            if input.brush.is_active() {
                surface.set_transform(input.view.to_affine());
                paint_stroke(
                    &mut surface,
                    input.brush.points(),
                    input.brush.size,
                    input.brush.colour,
                );
            }
            if let Some(p) = input.pointer {
                surface.set_transform(Affine::IDENTITY);
                paint_stroke(
                    &mut surface,
                    &[p],
                    input.brush.size * input.view.scale,
                    input.brush.colour,
                );
            }
        }

        if self.opts.debug {
            self.draw_debug_stats(&mut surface, input)?;
        }

        self.frames += 1;
        tracing::trace!(drawn, frame = self.frames, "frame rendered");
        surface.finish()
    }

    /// Render `layers` at the export resolution with no view offset, overlays or selection.
    #[tracing::instrument(skip(self, layers))]
    pub fn export(&mut self, layers: &[Layer]) -> EaselResult<Bitmap> {
        let saved = self.opts;
        self.opts.safe_zone = false;
        self.opts.debug = false;
        let brush = BrushState::new(0.0, Color::TRANSPARENT);
        let input = FrameInput {
            width: saved.export_width,
            height: saved.export_height,
            view: ViewTransform::default(),
            layers,
            tool: Tool::Move,
            brush: &brush,
            pointer: None,
            selection: &[],
        };
        let out = self.render_frame(&input);
        self.opts = saved;
        let out = out?;
        tracing::debug!(w = out.width(), h = out.height(), "exported frame");
        Ok(out)
    }

    fn draw_safe_zone(&mut self, surface: &mut Surface, view: ViewTransform) -> EaselResult<()> {
        let (w, h) = (self.opts.export_width, self.opts.export_height);
        let revision = (u64::from(w) << 32) | u64::from(h);
        if self.opts.debug {
            self.cache.invalidate(CacheKey::SafeZone);
        }
        let checker = match self.cache.get(CacheKey::SafeZone, revision) {
            Some(b) => b,
            None => {
                let b = checkerboard(w, h)?;
                tracing::debug!(w, h, "rebuilt safe zone");
                self.cache.insert(CacheKey::SafeZone, revision, b.clone());
                b
            }
        };
        let zone = Rect::new(0.0, 0.0, f64::from(w), f64::from(h));
        surface.set_transform(view.to_affine());
        surface.draw_bitmap(&checker, zone)?;
        surface.stroke_rect(zone, StrokeStyle::new(1.0 / view.scale), SAFE_ZONE_OUTLINE);

        if let Some(text) = self.text.as_mut() {
            let anchor = view.canvas_to_screen(Point::ZERO);
            surface.set_transform(Affine::IDENTITY);
            text.draw(
                surface,
                &format!("Export area {w}x{h}, Ctrl+S to export"),
                Point::new(anchor.x, anchor.y - 20.0),
                OVERLAY_TEXT_PX,
                OVERLAY_TEXT,
            )?;
        }
        Ok(())
    }

    fn draw_debug_stats(&mut self, surface: &mut Surface, input: &FrameInput<'_>) -> EaselResult<()> {
        let stats = self.cache.stats();
        let nodes: usize = input.layers.iter().map(Layer::len).sum();
        let line = format!(
            "layers {} nodes {} | cache {} entries {} KiB | hits {} misses {} evictions {} | zoom {:.2}",
            input.layers.len(),
            nodes,
            stats.entries,
            stats.bytes / 1024,
            stats.hits,
            stats.misses,
            stats.evictions,
            input.view.scale,
        );
        match self.text.as_mut() {
            Some(text) => {
                surface.set_transform(Affine::IDENTITY);
                text.draw(surface, &line, Point::new(8.0, 8.0), OVERLAY_TEXT_PX, OVERLAY_TEXT)
            }
            None => {
                tracing::debug!("{line}");
                Ok(())
            }
        }
    }
}

/// Draw the node's effects of one stage. A failing effect is logged and skipped.
fn draw_effects(node: &Node, stage: EffectStage, surface: &mut Surface, view: ViewTransform) {
    for (index, effect) in node.effects().iter().enumerate() {
        if effect.stage() != stage {
            continue;
        }
        if let Err(err) = effect.render(node, surface, view) {
            tracing::warn!(
                node = node.id().0,
                index,
                effect = effect.name(),
                %err,
                "skipping effect"
            );
        }
    }
}

/// Checkerboard backdrop of the export frame, built through the compositing pipeline.
fn checkerboard(w: u32, h: u32) -> EaselResult<Bitmap> {
    let squares = Stage::transform(|b: &Bitmap| {
        let mut out = b.clone();
        let dark = CHECKER_DARK.to_premul();
        let width = out.width();
        for (i, px) in out.pixels_mut().chunks_exact_mut(4).enumerate() {
            let (x, y) = (i as u32 % width, i as u32 / width);
            if ((x / CHECKER_SIZE) + (y / CHECKER_SIZE)) % 2 == 1 {
                px.copy_from_slice(&dark);
            }
        }
        Ok(out)
    });
    render(
        &Bitmap::transparent(w, h),
        &[
            Stage::Background(BackgroundStage {
                background: Background::Colour(CHECKER_LIGHT),
                ..BackgroundStage::default()
            }),
            squares,
        ],
    )
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
