use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::foundation::core::Color;
use crate::foundation::error::{EaselError, EaselResult};
use crate::render::renderer::RendererOpts;
use crate::scene::node::NodeKind;

/// Environment variable that forces the debug overlay on (`1`, `true`) or off (`0`, `false`).
pub const DEBUG_OVERLAY_ENV: &str = "EASEL_DEBUG_OVERLAY";

/// Editor configuration. Every field has a default, so `{}` is a valid config file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorOpts {
    pub export_width: u32,
    pub export_height: u32,
    pub brush_size: f64,
    pub brush_colour: Color,
    pub shape_kind: NodeKind,
    pub shape_colour: Color,
    pub safe_zone: bool,
    pub debug_overlay: bool,
    /// Font for overlay text. Without one, overlay text is skipped.
    pub font_path: Option<PathBuf>,
    /// Offset between consecutive images ingested in one batch, in canvas units.
    pub image_drop_offset: f64,
    pub selection_poll_ms: u64,
    /// Zoom factor per wheel notch while Ctrl/Cmd is held.
    pub wheel_zoom_step: f64,
}

impl Default for EditorOpts {
    fn default() -> Self {
        Self {
            export_width: 1920,
            export_height: 1080,
            brush_size: 4.0,
            brush_colour: Color::BLACK,
            shape_kind: NodeKind::Rectangle,
            shape_colour: Color::rgb(0x60, 0xa5, 0xfa),
            safe_zone: true,
            debug_overlay: false,
            font_path: None,
            image_drop_offset: 20.0,
            selection_poll_ms: 100,
            wheel_zoom_step: 1.1,
        }
    }
}

impl EditorOpts {
    pub fn from_json_str(s: &str) -> EaselResult<Self> {
        let opts: Self =
            serde_json::from_str(s).map_err(|e| EaselError::serde(e.to_string()))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Load from a JSON file, then apply the environment override.
    pub fn from_json_path(path: &Path) -> EaselResult<Self> {
        let f = File::open(path)
            .with_context(|| format!("open editor options '{}'", path.display()))?;
        let opts: Self = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| EaselError::serde(format!("{}: {e}", path.display())))?;
        opts.validate()?;
        Ok(opts.with_env_overrides())
    }

    pub fn with_env_overrides(self) -> Self {
        let value = std::env::var(DEBUG_OVERLAY_ENV).ok();
        self.with_debug_override(value.as_deref())
    }

    /// Apply a raw `EASEL_DEBUG_OVERLAY` value. Unrecognized values are ignored.
    pub fn with_debug_override(mut self, value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("1" | "true" | "on") => self.debug_overlay = true,
            Some("0" | "false" | "off") => self.debug_overlay = false,
            Some(other) => {
                tracing::warn!(value = other, "ignoring unrecognized EASEL_DEBUG_OVERLAY value");
            }
            None => {}
        }
        self
    }

    pub fn validate(&self) -> EaselResult<()> {
        let max = u32::from(u16::MAX);
        if self.export_width == 0
            || self.export_height == 0
            || self.export_width > max
            || self.export_height > max
        {
            return Err(EaselError::validation(format!(
                "export size must be within 1..={max}, got {}x{}",
                self.export_width, self.export_height
            )));
        }
        if !self.brush_size.is_finite() || self.brush_size <= 0.0 {
            return Err(EaselError::validation("brush_size must be finite and > 0"));
        }
        if !self.shape_kind.is_shape() {
            return Err(EaselError::validation(format!(
                "shape_kind must be rectangle, circle, triangle or line, got {:?}",
                self.shape_kind
            )));
        }
        if !self.wheel_zoom_step.is_finite() || self.wheel_zoom_step <= 1.0 {
            return Err(EaselError::validation("wheel_zoom_step must be finite and > 1"));
        }
        Ok(())
    }

    pub fn selection_poll_interval(&self) -> Duration {
        Duration::from_millis(self.selection_poll_ms)
    }

    pub fn renderer_opts(&self) -> RendererOpts {
        RendererOpts::default()
            .with_safe_zone(self.safe_zone)
            .with_debug(self.debug_overlay)
            .with_export_size(self.export_width, self.export_height)
    }
}
