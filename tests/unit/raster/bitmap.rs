use super::*;

#[test]
fn solid_fills_premultiplied() {
    let b = Bitmap::solid(2, 1, Color::rgba(255, 0, 0, 128));
    assert_eq!(b.pixel(0, 0), Some([128, 0, 0, 128]));
    assert_eq!(b.pixel(1, 0), Some([128, 0, 0, 128]));
    assert_eq!(b.pixel(2, 0), None);
}

#[test]
fn from_premul_rejects_wrong_length() {
    assert!(Bitmap::from_premul(2, 2, vec![0; 15]).is_err());
    assert!(Bitmap::from_premul(2, 2, vec![0; 16]).is_ok());
}

#[test]
fn clear_pixel_ignores_out_of_bounds() {
    let mut b = Bitmap::solid(2, 2, Color::WHITE);
    b.clear_pixel(-1, 0);
    b.clear_pixel(2, 2);
    b.clear_pixel(1, 1);
    assert_eq!(b.pixel(0, 0), Some([255, 255, 255, 255]));
    assert_eq!(b.pixel(1, 1), Some([0, 0, 0, 0]));
}

#[test]
fn mutation_is_copy_on_write() {
    let a = Bitmap::solid(1, 1, Color::WHITE);
    let mut b = a.clone();
    assert!(a.shares_pixels(&b));
    b.clear_pixel(0, 0);
    assert!(!a.shares_pixels(&b));
    assert_eq!(a.pixel(0, 0), Some([255, 255, 255, 255]));
}

#[test]
fn straight_roundtrip_for_opaque_pixels() {
    let b = Bitmap::from_straight_rgba8(1, 1, vec![12, 34, 56, 255]).unwrap();
    assert_eq!(b.to_straight_rgba8(), vec![12, 34, 56, 255]);
}
