use super::*;

#[test]
fn empty_pipeline_is_identity() {
    let src = Bitmap::solid(3, 2, Color::rgb(9, 8, 7));
    let out = render(&src, &[]).unwrap();
    assert!(out.shares_pixels(&src));
    assert!(RenderPipeline::new().render(&src).unwrap().shares_pixels(&src));
}

#[test]
fn gradient_offsets() {
    assert!(gradient_stop_offsets(0).is_empty());
    assert_eq!(gradient_stop_offsets(1), vec![0.0]);
    assert_eq!(gradient_stop_offsets(3), vec![0.0, 0.5, 1.0]);
}

#[test]
fn cover_fit_fills_target() {
    let fit = cover_fit(Size::new(200.0, 100.0), Size::new(50.0, 50.0));
    assert_eq!(fit.scale, 4.0);
    assert_eq!((fit.x, fit.y), (0.0, -50.0));
}

#[test]
fn single_stop_gradient_is_solid() {
    let src = Bitmap::transparent(4, 4);
    let stage = Stage::Background(BackgroundStage {
        background: Background::Gradient(vec![Color::rgb(10, 20, 30)]),
        ..BackgroundStage::default()
    });
    let out = render(&src, &[stage]).unwrap();
    assert!(out.pixels().chunks_exact(4).all(|p| p == [10, 20, 30, 255]));
}

#[test]
fn two_stop_gradient_runs_corner_to_corner() {
    let src = Bitmap::transparent(16, 16);
    let stage = Stage::Background(BackgroundStage {
        background: Background::Gradient(vec![Color::BLACK, Color::WHITE]),
        ..BackgroundStage::default()
    });
    let out = render(&src, &[stage]).unwrap();
    let tl = out.pixel(0, 0).unwrap()[0];
    let br = out.pixel(15, 15).unwrap()[0];
    let mid = out.pixel(8, 7).unwrap()[0];
    assert!(tl < 20);
    assert!(br > 235);
    assert!((100..156).contains(&mid));
}

#[test]
fn padding_insets_source_over_colour() {
    let src = Bitmap::solid(10, 10, Color::WHITE);
    let stage = Stage::Background(BackgroundStage {
        background: Background::Colour(Color::rgb(255, 0, 0)),
        corner_radius: 0.0,
        padding: 2.0,
    });
    let out = render(&src, &[stage]).unwrap();
    assert_eq!((out.width(), out.height()), (10, 10));
    assert_eq!(out.pixel(0, 5), Some([255, 0, 0, 255]));
    assert_eq!(out.pixel(5, 5), Some([255, 255, 255, 255]));
}

#[test]
fn corner_radius_clears_corners() {
    let src = Bitmap::solid(20, 20, Color::WHITE);
    let stage = Stage::Background(BackgroundStage {
        background: Background::Colour(Color::BLACK),
        corner_radius: 8.0,
        padding: 0.0,
    });
    let out = render(&src, &[stage]).unwrap();
    assert_eq!(out.pixel(0, 0).map(|p| p[3]), Some(0));
    assert_eq!(out.pixel(10, 10), Some([255, 255, 255, 255]));
}

#[test]
fn image_background_is_cover_fitted() {
    let src = Bitmap::transparent(8, 4);
    let stage = Stage::Background(BackgroundStage {
        background: Background::Image(Bitmap::solid(2, 2, Color::rgb(0, 0, 255))),
        ..BackgroundStage::default()
    });
    let out = render(&src, &[stage]).unwrap();
    assert_eq!(out.pixel(0, 0), Some([0, 0, 255, 255]));
    assert_eq!(out.pixel(7, 3), Some([0, 0, 255, 255]));
}

#[test]
fn stages_fold_left_to_right() {
    let src = Bitmap::solid(2, 2, Color::WHITE);
    let pipeline = RenderPipeline::new()
        .with_stage(Stage::transform(|b: &Bitmap| {
            Ok(Bitmap::transparent(b.width() * 2, b.height()))
        }))
        .with_stage(Stage::Background(BackgroundStage {
            background: Background::Colour(Color::BLACK),
            ..BackgroundStage::default()
        }));
    let out = pipeline.render(&src).unwrap();
    assert_eq!((out.width(), out.height()), (4, 2));
    assert_eq!(out.pixel(3, 1), Some([0, 0, 0, 255]));
}

#[test]
fn rounded_rect_has_eight_segments() {
    let path = rounded_rect_path(Rect::new(0.0, 0.0, 10.0, 10.0), 2.0);
    assert_eq!(path.segments().count(), 8);
    // oversized radius clamps to a circle-ish outline
    let p = rounded_rect_path(Rect::new(0.0, 0.0, 10.0, 4.0), 50.0);
    let b = kurbo::Shape::bounding_box(&p);
    assert!((b.width() - 10.0).abs() < 1e-9);
}

#[test]
fn three_stop_gradient_hits_middle_stop_at_centre() {
    let src = Bitmap::transparent(16, 16);
    let stage = Stage::Background(BackgroundStage {
        background: Background::Gradient(vec![Color::BLACK, Color::rgb(255, 0, 0), Color::WHITE]),
        ..BackgroundStage::default()
    });
    let out = render(&src, &[stage]).unwrap();
    let mid = out.pixel(8, 7).unwrap();
    assert!(mid[0] > 225, "{mid:?}");
    assert!(mid[1] < 30 && mid[2] < 30, "{mid:?}");
    assert!(out.pixel(0, 0).unwrap()[0] < 40);
    assert_eq!(out.pixel(15, 15).map(|p| p[1] > 215), Some(true));
}
