use std::io::Cursor;

use anyhow::Context;

use crate::foundation::error::{EaselError, EaselResult};
use crate::raster::bitmap::Bitmap;

/// Decode encoded image bytes (PNG, JPEG, ...) into a premultiplied bitmap.
pub fn decode_image(bytes: &[u8]) -> EaselResult<Bitmap> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| EaselError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Bitmap::from_straight_rgba8(width, height, rgba.into_raw())
}

/// Encode a bitmap as PNG bytes (straight alpha).
pub fn encode_png(bitmap: &Bitmap) -> EaselResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(
        bitmap.width(),
        bitmap.height(),
        bitmap.to_straight_rgba8(),
    )
    .ok_or_else(|| EaselError::decode("bitmap buffer does not match its dimensions"))?;

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
