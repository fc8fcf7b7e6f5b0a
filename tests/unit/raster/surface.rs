use super::*;

#[test]
fn zero_and_oversized_surfaces_are_fatal() {
    assert!(matches!(Surface::new(0, 4), Err(EaselError::Surface(_))));
    assert!(matches!(Surface::new(4, 0), Err(EaselError::Surface(_))));
    assert!(matches!(Surface::new(70_000, 1), Err(EaselError::Surface(_))));
}

#[test]
fn fill_rect_covers_interior_pixels() {
    let mut s = Surface::new(8, 8).unwrap();
    s.fill_rect(Rect::new(2.0, 2.0, 6.0, 6.0), Color::rgb(255, 0, 0));
    let out = s.finish().unwrap();
    assert_eq!(out.pixel(3, 3), Some([255, 0, 0, 255]));
    assert_eq!(out.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(out.pixel(7, 7), Some([0, 0, 0, 0]));
}

#[test]
fn transform_applies_to_fills() {
    let mut s = Surface::new(8, 8).unwrap();
    s.set_transform(Affine::translate((4.0, 4.0)));
    s.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0), Color::WHITE);
    let out = s.finish().unwrap();
    assert_eq!(out.pixel(5, 5), Some([255, 255, 255, 255]));
    assert_eq!(out.pixel(1, 1), Some([0, 0, 0, 0]));
}

#[test]
fn draw_bitmap_stretches_to_destination() {
    let src = Bitmap::solid(2, 2, Color::rgb(0, 0, 255));
    let mut s = Surface::new(8, 8).unwrap();
    s.draw_bitmap(&src, Rect::new(0.0, 0.0, 8.0, 4.0)).unwrap();
    let out = s.finish().unwrap();
    assert_eq!(out.pixel(4, 1), Some([0, 0, 255, 255]));
    assert_eq!(out.pixel(4, 6), Some([0, 0, 0, 0]));
}

#[test]
fn clip_limits_drawing() {
    let mut s = Surface::new(8, 8).unwrap();
    s.push_clip(&rect_path(Rect::new(0.0, 0.0, 4.0, 8.0)));
    s.fill_rect(Rect::new(0.0, 0.0, 8.0, 8.0), Color::WHITE);
    s.pop_clip();
    let out = s.finish().unwrap();
    assert_eq!(out.pixel(1, 4), Some([255, 255, 255, 255]));
    assert_eq!(out.pixel(6, 4), Some([0, 0, 0, 0]));
}

#[test]
fn stroke_with_zero_width_draws_nothing() {
    let mut s = Surface::new(4, 4).unwrap();
    s.stroke_rect(Rect::new(0.0, 0.0, 4.0, 4.0), StrokeStyle::new(0.0), Color::WHITE);
    let out = s.finish().unwrap();
    assert!(out.pixels().iter().all(|&b| b == 0));
}

#[test]
fn linear_gradient_fill_ramps_along_its_axis() {
    let mut s = Surface::new(10, 2).unwrap();
    s.fill_rect_linear_gradient(
        Rect::new(0.0, 0.0, 10.0, 2.0),
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        &[(0.0, Color::BLACK), (1.0, Color::WHITE)],
    );
    let out = s.finish().unwrap();
    let row: Vec<u8> = (0..10).map(|x| out.pixel(x, 0).unwrap()[0]).collect();
    assert!(row[0] < 30);
    assert!(row[9] > 225);
    assert!(row.windows(2).all(|w| w[0] <= w[1]));
    assert!(out.pixels().chunks_exact(4).all(|p| p[3] == 255));
}
