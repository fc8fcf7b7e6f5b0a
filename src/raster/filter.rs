use serde::{Deserialize, Serialize};

use crate::foundation::error::{EaselError, EaselResult};
use crate::raster::bitmap::Bitmap;

/// Named photo filters available to the image-filter effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterName {
    #[serde(alias = "greyscale")]
    Grayscale,
    Sepia,
    Gingham,
    Clarendon,
    Invert,
    Reyes,
    Lofi,
}

impl FilterName {
    pub const ALL: [Self; 7] = [
        Self::Grayscale,
        Self::Sepia,
        Self::Gingham,
        Self::Clarendon,
        Self::Invert,
        Self::Reyes,
        Self::Lofi,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::Sepia => "sepia",
            Self::Gingham => "gingham",
            Self::Clarendon => "clarendon",
            Self::Invert => "invert",
            Self::Reyes => "reyes",
            Self::Lofi => "lofi",
        }
    }

    /// Primitive adjustments, applied in order.
    pub fn adjustments(self) -> &'static [Adjustment] {
        use Adjustment::*;
        match self {
            Self::Grayscale => &[Saturation(0.0)],
            Self::Sepia => &[SepiaMix(1.0)],
            Self::Gingham => &[Brightness(1.05), Contrast(0.9), SepiaMix(0.04)],
            Self::Clarendon => &[Contrast(1.2), Saturation(1.35)],
            Self::Invert => &[Invert],
            Self::Reyes => &[SepiaMix(0.22), Brightness(1.1), Contrast(0.85), Saturation(0.75)],
            Self::Lofi => &[Saturation(1.1), Contrast(1.5)],
        }
    }
}

impl std::str::FromStr for FilterName {
    type Err = EaselError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s == "greyscale" {
            return Ok(Self::Grayscale);
        }
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| EaselError::validation(format!("unknown filter \"{s}\"")))
    }
}

/// A per-pixel colour adjustment on straight RGB in `0..=1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Adjustment {
    Brightness(f32),
    Contrast(f32),
    Saturation(f32),
    SepiaMix(f32),
    Invert,
}

impl Adjustment {
    pub fn apply(self, [r, g, b]: [f32; 3]) -> [f32; 3] {
        match self {
            Self::Brightness(k) => [r * k, g * k, b * k],
            Self::Contrast(k) => {
                let f = |c: f32| (c - 0.5) * k + 0.5;
                [f(r), f(g), f(b)]
            }
            Self::Saturation(s) => [
                (0.213 + 0.787 * s) * r + (0.715 - 0.715 * s) * g + (0.072 - 0.072 * s) * b,
                (0.213 - 0.213 * s) * r + (0.715 + 0.285 * s) * g + (0.072 - 0.072 * s) * b,
                (0.213 - 0.213 * s) * r + (0.715 - 0.715 * s) * g + (0.072 + 0.928 * s) * b,
            ],
            Self::SepiaMix(amount) => {
                let a = 1.0 - amount.clamp(0.0, 1.0);
                [
                    (0.393 + 0.607 * a) * r + (0.769 - 0.769 * a) * g + (0.189 - 0.189 * a) * b,
                    (0.349 - 0.349 * a) * r + (0.686 + 0.314 * a) * g + (0.168 - 0.168 * a) * b,
                    (0.272 - 0.272 * a) * r + (0.534 - 0.534 * a) * g + (0.131 + 0.869 * a) * b,
                ]
            }
            Self::Invert => [1.0 - r, 1.0 - g, 1.0 - b],
        }
    }
}

/// Apply `filter` to every pixel, preserving alpha.
pub fn apply_filter(src: &Bitmap, filter: FilterName) -> EaselResult<Bitmap> {
    let mut rgba = src.to_straight_rgba8();
    let adjustments = filter.adjustments();
    for px in rgba.chunks_exact_mut(4) {
        if px[3] == 0 {
            continue;
        }
        let mut c = [
            f32::from(px[0]) / 255.0,
            f32::from(px[1]) / 255.0,
            f32::from(px[2]) / 255.0,
        ];
        for adj in adjustments {
            c = adj.apply(c);
        }
        for (dst, v) in px[..3].iter_mut().zip(c) {
            *dst = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
    }
    Bitmap::from_straight_rgba8(src.width(), src.height(), rgba)
}

#[cfg(test)]
#[path = "../../tests/unit/raster/filter.rs"]
mod tests;
