use std::io::Cursor;

use super::*;
use crate::foundation::core::Color;

fn png_bytes(w: u32, h: u32, rgba: Vec<u8>) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(w, h, rgba).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_png_dimensions_and_premul() {
    let bytes = png_bytes(1, 1, vec![100, 50, 200, 128]);
    let bitmap = decode_image(&bytes).unwrap();
    assert_eq!((bitmap.width(), bitmap.height()), (1, 1));
    assert_eq!(
        bitmap.pixels(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_garbage_is_a_decode_error() {
    assert!(matches!(
        decode_image(b"not an image"),
        Err(EaselError::Decode(_))
    ));
}

#[test]
fn encode_then_decode_preserves_opaque_pixels() {
    let src = Bitmap::solid(3, 2, Color::rgb(9, 99, 199));
    let back = decode_image(&encode_png(&src).unwrap()).unwrap();
    assert_eq!(back, src);
}
