use super::*;

#[test]
fn brush_bounds_pad_by_half_size() {
    let mut brush = BrushState::new(4.0, Color::BLACK);
    brush.begin(Point::new(0.0, 0.0));
    brush.push(Point::new(10.0, 0.0));
    brush.push(Point::new(10.0, 10.0));
    assert_eq!(brush.bounds(), Some(Rect::new(-2.0, -2.0, 12.0, 12.0)));
}

#[test]
fn finish_bakes_a_drawing_node() {
    let mut brush = BrushState::new(4.0, Color::rgb(0, 128, 0));
    brush.begin(Point::new(0.0, 0.0));
    brush.push(Point::new(10.0, 0.0));
    brush.push(Point::new(10.0, 10.0));
    let node = brush.finish().unwrap().unwrap();
    assert_eq!(
        (node.x(), node.y(), node.width(), node.height()),
        (-2.0, -2.0, 14.0, 14.0)
    );
    let baked = node.baked().unwrap();
    // (5, 0) in canvas space is on the first segment
    assert_eq!(baked.pixel(7, 2).map(|p| p[3]), Some(255));
    assert_eq!(baked.pixel(2, 12).map(|p| p[3]), Some(0));
    assert!(!brush.is_active());
    assert!(brush.points().is_empty());
}

#[test]
fn samples_are_ignored_until_begin() {
    let mut brush = BrushState::new(2.0, Color::BLACK);
    brush.push(Point::new(1.0, 1.0));
    assert!(brush.points().is_empty());
    assert!(brush.finish().unwrap().is_none());
}

#[test]
fn single_sample_bakes_a_dot() {
    let mut brush = BrushState::new(6.0, Color::BLACK);
    brush.begin(Point::new(5.0, 5.0));
    let node = brush.finish().unwrap().unwrap();
    assert_eq!((node.width(), node.height()), (6.0, 6.0));
    assert_eq!(node.baked().and_then(|b| b.pixel(3, 3)).map(|p| p[3]), Some(255));
}

#[test]
fn modifier_helpers() {
    assert!(Modifiers::CTRL.command());
    assert!(Modifiers { meta: true, ..Modifiers::NONE }.command());
    assert!(Modifiers::SHIFT.additive());
    assert!(!Modifiers::NONE.additive());
}

#[test]
fn keys_deserialize_from_json() {
    let k: Key = serde_json::from_str(r#""delete""#).unwrap();
    assert_eq!(k, Key::Delete);
    let k: Key = serde_json::from_str(r#"{"char":"a"}"#).unwrap();
    assert_eq!(k, Key::Char('a'));
    let t: Tool = serde_json::from_str(r#""brush""#).unwrap();
    assert_eq!(t, Tool::Brush);
}
