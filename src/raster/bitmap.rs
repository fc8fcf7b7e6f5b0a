use std::sync::Arc;

use crate::foundation::core::Color;
use crate::foundation::error::{EaselError, EaselResult};
use crate::foundation::math::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};

/// Raster image in premultiplied RGBA8, row-major, tightly packed.
///
/// Pixels are shared behind an [`Arc`]: cloning a bitmap is cheap, and mutation goes through
/// copy-on-write ([`Bitmap::pixels_mut`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Arc<Vec<u8>>,
}

impl Bitmap {
    /// Fully transparent bitmap.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: Arc::new(vec![0; byte_len(width, height)]),
        }
    }

    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        let px = color.to_premul();
        Self {
            width,
            height,
            data: Arc::new(px.repeat((width as usize) * (height as usize))),
        }
    }

    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> EaselResult<Self> {
        if data.len() != byte_len(width, height) {
            return Err(EaselError::validation(format!(
                "bitmap byte len {} does not match {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data: Arc::new(data),
        })
    }

    pub fn from_straight_rgba8(width: u32, height: u32, mut data: Vec<u8>) -> EaselResult<Self> {
        premultiply_rgba8_in_place(&mut data);
        Self::from_premul(width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        Arc::make_mut(&mut self.data).as_mut_slice()
    }

    /// Premultiplied pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }

    /// Make one pixel fully transparent. Out-of-bounds coordinates are ignored.
    pub fn clear_pixel(&mut self, x: i64, y: i64) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.pixels_mut()[idx..idx + 4].fill(0);
    }

    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.as_ref().clone();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }

    /// True when both bitmaps point at the same pixel buffer.
    pub fn shares_pixels(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

fn byte_len(width: u32, height: u32) -> usize {
    (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4)
}

#[cfg(test)]
#[path = "../../tests/unit/raster/bitmap.rs"]
mod tests;
