//! Bitmap compositing as a left-to-right fold over stages.
//!
//! Used by the renderer for the safe-zone backdrop and by `easel compose` to frame a
//! screenshot: background fill, optional rounded-corner clip, padding inset.

use crate::foundation::core::{BezPath, Color, Point, Rect, Size};
use crate::foundation::error::EaselResult;
use crate::raster::bitmap::Bitmap;
use crate::raster::surface::Surface;

/// What fills the output behind the intermediate bitmap.
#[derive(Clone, Debug, Default)]
pub enum Background {
    #[default]
    Transparent,
    Colour(Color),
    /// Linear gradient from the top-left to the bottom-right corner, stops evenly spaced.
    Gradient(Vec<Color>),
    /// Cover-fitted and centred.
    Image(Bitmap),
}

#[derive(Clone, Debug, Default)]
pub struct BackgroundStage {
    pub background: Background,
    pub corner_radius: f64,
    pub padding: f64,
}

pub type TransformFn = Box<dyn Fn(&Bitmap) -> EaselResult<Bitmap> + Send + Sync>;

pub enum Stage {
    Background(BackgroundStage),
    Transform(TransformFn),
}

impl Stage {
    pub fn transform<F>(f: F) -> Self
    where
        F: Fn(&Bitmap) -> EaselResult<Bitmap> + Send + Sync + 'static,
    {
        Self::Transform(Box::new(f))
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Background(b) => f.debug_tuple("Background").field(b).finish(),
            Self::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

/// An owned stage list.
#[derive(Debug, Default)]
pub struct RenderPipeline {
    stages: Vec<Stage>,
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn push(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn render(&self, source: &Bitmap) -> EaselResult<Bitmap> {
        render(source, &self.stages)
    }
}

/// Fold `source` through `stages`. An empty list returns `source` sharing its pixels.
pub fn render(source: &Bitmap, stages: &[Stage]) -> EaselResult<Bitmap> {
    let mut current = source.clone();
    for stage in stages {
        current = match stage {
            Stage::Background(bg) => apply_background(&current, bg)?,
            Stage::Transform(f) => f(&current)?,
        };
    }
    Ok(current)
}

fn apply_background(src: &Bitmap, stage: &BackgroundStage) -> EaselResult<Bitmap> {
    let (w, h) = (src.width(), src.height());
    let full = Rect::new(0.0, 0.0, f64::from(w), f64::from(h));
    let mut out = Surface::new(w, h)?;

    let clipped = stage.corner_radius > 0.0;
    if clipped {
        out.push_clip(&rounded_rect_path(full, stage.corner_radius));
    }

    match &stage.background {
        Background::Transparent => {}
        Background::Colour(c) => out.fill_rect(full, *c),
        Background::Gradient(stops) => match stops.as_slice() {
            [] => {}
            [only] => out.fill_rect(full, *only),
            _ => {
                let placed: Vec<(f64, Color)> = gradient_stop_offsets(stops.len())
                    .into_iter()
                    .zip(stops.iter().copied())
                    .collect();
                let end = Point::new(full.x1, full.y1);
                out.fill_rect_linear_gradient(full, Point::ZERO, end, &placed);
            }
        },
        Background::Image(img) => {
            let fit = cover_fit(
                full.size(),
                Size::new(f64::from(img.width()), f64::from(img.height())),
            );
            let dest = Rect::from_origin_size(
                (fit.x, fit.y),
                (
                    f64::from(img.width()) * fit.scale,
                    f64::from(img.height()) * fit.scale,
                ),
            );
            out.draw_bitmap(img, dest)?;
        }
    }

    let inner = full.inset(-stage.padding.max(0.0));
    if inner.width() > 0.0 && inner.height() > 0.0 {
        out.draw_bitmap(src, inner)?;
    }

    if clipped {
        out.pop_clip();
    }
    out.finish()
}

/// Placement of an image scaled to fully cover a target while keeping its aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    pub scale: f64,
    pub x: f64,
    pub y: f64,
}

pub fn cover_fit(target: Size, image: Size) -> CoverFit {
    if image.width <= 0.0 || image.height <= 0.0 {
        return CoverFit {
            scale: 1.0,
            x: 0.0,
            y: 0.0,
        };
    }
    let scale = (target.width / image.width).max(target.height / image.height);
    CoverFit {
        scale,
        x: (target.width - image.width * scale) / 2.0,
        y: (target.height - image.height * scale) / 2.0,
    }
}

/// Offsets of `n` evenly spaced gradient stops: `i / (n - 1)`.
pub fn gradient_stop_offsets(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..n).map(|i| i as f64 / (n - 1) as f64).collect(),
    }
}

/// Rounded rectangle: four edges joined by four quarter arcs. The radius is clamped to half
/// the shorter side.
pub fn rounded_rect_path(rect: Rect, radius: f64) -> BezPath {
    // Cubic approximation constant for a quarter circle.
    const K: f64 = 0.552_284_749_831;
    let r = radius.max(0.0).min(rect.width().min(rect.height()) / 2.0);
    let k = r * K;
    let Rect { x0, y0, x1, y1 } = rect;

    let mut p = BezPath::new();
    p.move_to((x0 + r, y0));
    p.line_to((x1 - r, y0));
    p.curve_to((x1 - r + k, y0), (x1, y0 + r - k), (x1, y0 + r));
    p.line_to((x1, y1 - r));
    p.curve_to((x1, y1 - r + k), (x1 - r + k, y1), (x1 - r, y1));
    p.line_to((x0 + r, y1));
    p.curve_to((x0 + r - k, y1), (x0, y1 - r + k), (x0, y1 - r));
    p.line_to((x0, y0 + r));
    p.curve_to((x0, y0 + r - k), (x0 + r - k, y0), (x0 + r, y0));
    p.close_path();
    p
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
