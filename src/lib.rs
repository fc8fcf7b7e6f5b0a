//! Easel is a scene-graph canvas editor engine.
//!
//! Users place, transform and layer drawable nodes (shapes, freehand strokes, images) on an
//! infinite pannable and zoomable canvas, attach effects, and export a rendered frame.
//!
//! # Architecture
//!
//! 1. **Scene**: [`Scene`] holds ordered [`Layer`]s of [`Node`]s; each node owns its [`Effect`]s.
//! 2. **Interaction**: [`Editor`] turns pointer and keyboard input into scene mutations
//!    according to the active [`Tool`].
//! 3. **Render**: [`Renderer`] draws a frame with viewport culling, a revision-keyed
//!    [`RenderCache`], effect staging and selection overlays.
//! 4. **Compositing**: [`RenderPipeline`] folds a bitmap through background, clip and padding
//!    stages (used for the safe zone and by `easel compose`).
//!
//! Constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single-threaded mutation**: image decode and filter work runs on the rayon pool and is
//!   applied on the next [`Editor::tick`].
//! - **Premultiplied RGBA8** everywhere: [`Bitmap`] pixels are premultiplied.
#![forbid(unsafe_code)]

mod assets;
mod config;
mod foundation;
mod interaction;
mod raster;
mod render;
mod scene;

pub use assets::decode::{decode_image, encode_png};
pub use assets::text::TextPainter;
pub use config::{DEBUG_OVERLAY_ENV, EditorOpts};
pub use foundation::core::{Affine, BezPath, Color, Point, Rect, Size, Vec2, ViewTransform};
pub use foundation::error::{EaselError, EaselResult};
pub use foundation::ids::{CacheKey, LayerId, NodeId};
pub use interaction::editor::{Action, Editor};
pub use interaction::script::{ScriptEvent, load_script, parse_script, run_script};
pub use interaction::selection::SelectionPoller;
pub use interaction::tool::{BrushState, Key, Modifiers, PointerButton, Tool};
pub use raster::bitmap::Bitmap;
pub use raster::blur::blur_bitmap;
pub use raster::filter::{Adjustment, FilterName, apply_filter};
pub use raster::surface::{StrokeStyle, Surface};
pub use render::cache::{CacheStats, RenderCache};
pub use render::pipeline::{
    Background, BackgroundStage, CoverFit, RenderPipeline, Stage, TransformFn, cover_fit,
    gradient_stop_offsets, render as render_pipeline, rounded_rect_path,
};
pub use render::renderer::{FrameInput, Renderer, RendererOpts};
pub use scene::effect::{Effect, EffectKind, EffectSpec, EffectStage};
pub use scene::graph::{LayerUpdate, Scene};
pub use scene::jobs::{ImageCompletion, ImageJobs, ImageTarget};
pub use scene::layer::Layer;
pub use scene::node::{HANDLE_SIZE, LINE_WIDTH, Node, NodeKind, SELECTION_COLOR};
pub use scene::snapshot::{LayerSnapshot, NodeSnapshot};
