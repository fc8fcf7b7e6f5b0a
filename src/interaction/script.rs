//! JSON input scripts: a recorded list of editor events replayed by `easel script`.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::foundation::core::{Color, Point, Vec2};
use crate::foundation::error::{EaselError, EaselResult};
use crate::interaction::editor::{Action, Editor};
use crate::interaction::tool::{Key, Modifiers, PointerButton, Tool};
use crate::scene::effect::EffectSpec;
use crate::scene::graph::LayerUpdate;
use crate::scene::node::NodeKind;

/// One scripted input. Pointer coordinates are in screen pixels.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    Viewport {
        width: u32,
        height: u32,
    },
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        button: PointerButton,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerUp {
        x: f64,
        y: f64,
        #[serde(default)]
        button: PointerButton,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Wheel {
        x: f64,
        y: f64,
        #[serde(default)]
        dx: f64,
        #[serde(default)]
        dy: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyDown {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Focus {
        focused: bool,
    },
    DebugOverlay {
        on: bool,
    },
    SetTool {
        tool: Tool,
    },
    SetShape {
        kind: NodeKind,
        colour: Color,
    },
    SetBrush {
        size: f64,
        colour: Color,
    },
    CreateLayer,
    UpdateLayer {
        #[serde(flatten)]
        update: LayerUpdate,
    },
    /// Read an image file (relative to the script's directory) and ingest it.
    ImportImage {
        path: PathBuf,
    },
    /// Bind an effect to every selected node.
    AddEffect {
        effect: EffectSpec,
    },
    Tick {
        #[serde(default)]
        ms: u64,
    },
    /// Block until pending image work has landed.
    WaitImages,
}

impl ScriptEvent {
    pub fn apply(self, editor: &mut Editor, base_dir: &Path) -> EaselResult<Vec<Action>> {
        let actions = match self {
            Self::Viewport { width, height } => {
                editor.set_viewport_size(width, height);
                vec![Action::RenderNeeded]
            }
            Self::PointerDown {
                x,
                y,
                button,
                modifiers,
            } => editor.on_pointer_down(Point::new(x, y), button, modifiers),
            Self::PointerMove { x, y, modifiers } => {
                editor.on_pointer_move(Point::new(x, y), modifiers)
            }
            Self::PointerUp {
                x,
                y,
                button,
                modifiers,
            } => editor.on_pointer_up(Point::new(x, y), button, modifiers),
            Self::Wheel {
                x,
                y,
                dx,
                dy,
                modifiers,
            } => editor.on_wheel(Point::new(x, y), Vec2::new(dx, dy), modifiers),
            Self::KeyDown { key, modifiers } => editor.on_key_down(key, modifiers),
            Self::Focus { focused } => {
                editor.set_canvas_focused(focused);
                Vec::new()
            }
            Self::DebugOverlay { on } => editor.set_debug_overlay(on),
            Self::SetTool { tool } => editor.set_tool(tool),
            Self::SetShape { kind, colour } => {
                editor.set_shape(kind, colour);
                Vec::new()
            }
            Self::SetBrush { size, colour } => {
                editor.set_brush(size, colour);
                Vec::new()
            }
            Self::CreateLayer => {
                editor.on_layer_create();
                vec![Action::RenderNeeded]
            }
            Self::UpdateLayer { update } => {
                editor.on_layer_update(update);
                vec![Action::RenderNeeded]
            }
            Self::ImportImage { path } => {
                let full = base_dir.join(&path);
                let bytes = std::fs::read(&full)
                    .with_context(|| format!("read image '{}'", full.display()))?;
                editor.ingest_files(vec![bytes])
            }
            Self::AddEffect { effect } => {
                let targets = editor.selection().to_vec();
                for id in targets {
                    editor.add_effect(id, effect.clone().into_effect());
                }
                vec![Action::RenderNeeded]
            }
            Self::Tick { ms } => {
                editor.tick(Duration::from_millis(ms))?;
                Vec::new()
            }
            Self::WaitImages => {
                editor.wait_for_images();
                vec![Action::RenderNeeded]
            }
        };
        Ok(actions)
    }
}

pub fn parse_script(json: &str) -> EaselResult<Vec<ScriptEvent>> {
    serde_json::from_str(json).map_err(|e| EaselError::serde(e.to_string()))
}

pub fn load_script(path: &Path) -> EaselResult<Vec<ScriptEvent>> {
    let f = File::open(path).with_context(|| format!("open script '{}'", path.display()))?;
    serde_json::from_reader(BufReader::new(f))
        .map_err(|e| EaselError::serde(format!("{}: {e}", path.display())))
}

/// Replay `events` in order, then wait for image work. Returns how many exports were requested.
pub fn run_script(
    editor: &mut Editor,
    events: Vec<ScriptEvent>,
    base_dir: &Path,
) -> EaselResult<usize> {
    let mut exports = 0;
    for (i, event) in events.into_iter().enumerate() {
        tracing::trace!(index = i, ?event, "script event");
        let actions = event.apply(editor, base_dir)?;
        exports += actions
            .iter()
            .filter(|a| **a == Action::ExportRequested)
            .count();
    }
    editor.wait_for_images();
    Ok(exports)
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/script.rs"]
mod tests;
