use std::sync::Arc;

use crate::foundation::core::{Affine, BezPath, Color, Point, Rect};
use crate::foundation::error::{EaselError, EaselResult};
use crate::raster::bitmap::Bitmap;

/// Stroke parameters for [`Surface::stroke_path`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
    /// Round caps and joins (brush strokes); square otherwise.
    pub round: bool,
}

impl StrokeStyle {
    pub fn new(width: f64) -> Self {
        Self {
            width,
            round: false,
        }
    }

    pub fn round(width: f64) -> Self {
        Self { width, round: true }
    }

    fn to_cpu(self) -> vello_cpu::kurbo::Stroke {
        let stroke = vello_cpu::kurbo::Stroke::new(self.width);
        if self.round {
            stroke
                .with_caps(vello_cpu::kurbo::Cap::Round)
                .with_join(vello_cpu::kurbo::Join::Round)
        } else {
            stroke
                .with_caps(vello_cpu::kurbo::Cap::Butt)
                .with_join(vello_cpu::kurbo::Join::Miter)
        }
    }
}

/// Offscreen 2D drawing surface backed by `vello_cpu`.
///
/// Commands are recorded in call order and rasterized by [`Surface::finish`].
pub struct Surface {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    transform: Affine,
}

impl Surface {
    /// Allocate a surface. Zero-sized or oversized (`> u16::MAX`) requests fail with
    /// [`EaselError::Surface`].
    pub fn new(width: u32, height: u32) -> EaselResult<Self> {
        if width == 0 || height == 0 {
            return Err(EaselError::surface(format!(
                "cannot allocate {width}x{height} surface"
            )));
        }
        let w: u16 = width
            .try_into()
            .map_err(|_| EaselError::surface(format!("surface width {width} exceeds u16")))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| EaselError::surface(format!("surface height {height} exceeds u16")))?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(Self {
            width: w,
            height: h,
            ctx,
            transform: Affine::IDENTITY,
        })
    }

    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    pub fn transform(&self) -> Affine {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
        self.ctx.set_transform(affine_to_cpu(transform));
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.fill_rect(&rect_to_cpu(rect));
    }

    /// Fill `rect` with a linear gradient from `start` to `end`. Each stop is an offset in
    /// `0..=1` along that line; the end colours extend past it.
    pub fn fill_rect_linear_gradient(
        &mut self,
        rect: Rect,
        start: Point,
        end: Point,
        stops: &[(f64, Color)],
    ) {
        let stops: Vec<(f32, vello_cpu::peniko::Color)> = stops
            .iter()
            .map(|&(offset, c)| (offset as f32, color_to_cpu(c)))
            .collect();
        let gradient = vello_cpu::peniko::Gradient::new_linear((start.x, start.y), (end.x, end.y))
            .with_stops(stops.as_slice());
        self.ctx.set_paint(gradient);
        self.ctx.fill_rect(&rect_to_cpu(rect));
    }

    pub fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }

    pub fn stroke_path(&mut self, path: &BezPath, style: StrokeStyle, color: Color) {
        if style.width <= 0.0 {
            return;
        }
        self.ctx.set_stroke(style.to_cpu());
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.stroke_path(&bezpath_to_cpu(path));
    }

    pub fn stroke_rect(&mut self, rect: Rect, style: StrokeStyle, color: Color) {
        self.stroke_path(&rect_path(rect), style, color);
    }

    /// Draw `bitmap` stretched onto `dest` (in the current transform's space).
    pub fn draw_bitmap(&mut self, bitmap: &Bitmap, dest: Rect) -> EaselResult<()> {
        if bitmap.width() == 0 || bitmap.height() == 0 || dest.area() == 0.0 {
            return Ok(());
        }
        let paint = bitmap_to_paint(bitmap)?;
        let sx = dest.width() / f64::from(bitmap.width());
        let sy = dest.height() / f64::from(bitmap.height());
        let local = self.transform
            * Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(sx, sy);

        self.ctx.set_transform(affine_to_cpu(local));
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(bitmap.width()),
            f64::from(bitmap.height()),
        ));
        self.ctx.set_transform(affine_to_cpu(self.transform));
        Ok(())
    }

    /// Clip subsequent drawing to `path` until the matching [`Surface::pop_clip`].
    pub fn push_clip(&mut self, path: &BezPath) {
        self.ctx.push_clip_layer(&bezpath_to_cpu(path));
    }

    pub fn pop_clip(&mut self) {
        self.ctx.pop_layer();
    }

    pub(crate) fn context_mut(&mut self) -> &mut vello_cpu::RenderContext {
        &mut self.ctx
    }

    /// Rasterize all recorded commands.
    pub fn finish(mut self) -> EaselResult<Bitmap> {
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        Bitmap::from_premul(
            u32::from(self.width),
            u32::from(self.height),
            pixmap.data_as_u8_slice().to_vec(),
        )
    }
}

pub(crate) fn rect_path(rect: Rect) -> BezPath {
    let mut p = BezPath::new();
    p.move_to((rect.x0, rect.y0));
    p.line_to((rect.x1, rect.y0));
    p.line_to((rect.x1, rect.y1));
    p.line_to((rect.x0, rect.y1));
    p.close_path();
    p
}

fn color_to_cpu(c: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn bitmap_to_paint(bitmap: &Bitmap) -> EaselResult<vello_cpu::Image> {
    let w: u16 = bitmap
        .width()
        .try_into()
        .map_err(|_| EaselError::surface("bitmap width exceeds u16"))?;
    let h: u16 = bitmap
        .height()
        .try_into()
        .map_err(|_| EaselError::surface("bitmap height exceeds u16"))?;

    // Pixmap stores PremulRgba8; bitmap bytes are already premultiplied.
    let pixels = bitmap
        .pixels()
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/raster/surface.rs"]
mod tests;
