use super::*;
use crate::config::EditorOpts;

#[test]
fn parses_every_event_shape() {
    let events = parse_script(
        r##"[
            {"event": "viewport", "width": 200, "height": 100},
            {"event": "set_tool", "tool": "shape"},
            {"event": "set_shape", "kind": "triangle", "colour": "#ff8800"},
            {"event": "pointer_down", "x": 10, "y": 10},
            {"event": "pointer_move", "x": 60, "y": 40},
            {"event": "pointer_up", "x": 60, "y": 40, "button": "primary"},
            {"event": "key_down", "key": {"char": "s"}, "modifiers": {"ctrl": true}},
            {"event": "wheel", "x": 0, "y": 0, "dy": -1, "modifiers": {"meta": true}},
            {"event": "update_layer", "name": "shapes", "locked": true},
            {"event": "add_effect", "effect": {"type": "border", "line_width": 2}},
            {"event": "set_brush", "size": 3, "colour": [0, 0, 0]},
            {"event": "focus", "focused": false},
            {"event": "create_layer"},
            {"event": "tick", "ms": 16},
            {"event": "wait_images"},
            {"event": "debug_overlay", "on": true}
        ]"##,
    )
    .unwrap();
    assert_eq!(events.len(), 16);
    assert_eq!(events[15], ScriptEvent::DebugOverlay { on: true });
    assert_eq!(
        events[3],
        ScriptEvent::PointerDown {
            x: 10.0,
            y: 10.0,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    );
    assert!(matches!(
        &events[8],
        ScriptEvent::UpdateLayer { update } if update.name.as_deref() == Some("shapes")
    ));
}

#[test]
fn unknown_event_is_a_serde_error() {
    assert!(matches!(
        parse_script(r#"[{"event": "teleport"}]"#),
        Err(EaselError::Serde(_))
    ));
}

#[test]
fn replay_builds_scene_and_counts_exports() {
    let events = parse_script(
        r##"[
            {"event": "viewport", "width": 100, "height": 100},
            {"event": "set_tool", "tool": "shape"},
            {"event": "pointer_down", "x": 10, "y": 10},
            {"event": "pointer_move", "x": 60, "y": 40},
            {"event": "pointer_up", "x": 60, "y": 40},
            {"event": "add_effect", "effect": {"type": "glow", "blur": 2}},
            {"event": "key_down", "key": {"char": "s"}, "modifiers": {"ctrl": true}}
        ]"##,
    )
    .unwrap();
    let mut editor = Editor::new(EditorOpts::default()).unwrap();
    let exports = run_script(&mut editor, events, Path::new(".")).unwrap();
    assert_eq!(exports, 1);
    let id = editor.selection()[0];
    let node = editor.scene().node(id).unwrap();
    assert_eq!((node.width(), node.height()), (50.0, 30.0));
    assert_eq!(node.effects().len(), 1);
}

#[test]
fn missing_image_file_fails_the_replay() {
    let events = vec![ScriptEvent::ImportImage {
        path: PathBuf::from("nope/missing.png"),
    }];
    let mut editor = Editor::new(EditorOpts::default()).unwrap();
    let err = run_script(&mut editor, events, Path::new("/nonexistent")).unwrap_err();
    assert!(err.to_string().contains("read image"));
}
