use serde::{Deserialize, Serialize};

use crate::foundation::core::{Affine, Color, Rect, ViewTransform};
use crate::foundation::error::EaselResult;
use crate::foundation::ids::NodeId;
use crate::raster::bitmap::Bitmap;
use crate::raster::blur::blur_bitmap;
use crate::raster::filter::{FilterName, apply_filter};
use crate::raster::surface::{StrokeStyle, Surface};
use crate::render::cache::RenderCache;
use crate::scene::jobs::{ImageJobs, ImageTarget};
use crate::scene::node::{LINE_WIDTH, Node, NodeKind};

/// Whether an effect draws before or after the node body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectStage {
    Before,
    After,
}

#[derive(Clone, Debug)]
pub enum EffectKind {
    Border {
        line_width: f64,
        colour: Color,
    },
    Glow {
        colour: Color,
        blur: f64,
        offset_x: f64,
        offset_y: f64,
    },
    /// Replaces the node image when bound. `previous` is the single undo slot.
    ImageFilter {
        filter: FilterName,
        previous: Option<Bitmap>,
    },
}

/// A render modifier bound to at most one node.
#[derive(Clone, Debug)]
pub struct Effect {
    stage: EffectStage,
    kind: EffectKind,
    node: Option<NodeId>,
}

impl Effect {
    pub fn border(line_width: f64, colour: Color) -> Self {
        Self {
            stage: EffectStage::After,
            kind: EffectKind::Border { line_width, colour },
            node: None,
        }
    }

    pub fn glow(colour: Color, blur: f64, offset_x: f64, offset_y: f64) -> Self {
        Self {
            stage: EffectStage::Before,
            kind: EffectKind::Glow {
                colour,
                blur,
                offset_x,
                offset_y,
            },
            node: None,
        }
    }

    pub fn image_filter(filter: FilterName) -> Self {
        Self {
            stage: EffectStage::Before,
            kind: EffectKind::ImageFilter {
                filter,
                previous: None,
            },
            node: None,
        }
    }

    pub fn with_stage(mut self, stage: EffectStage) -> Self {
        self.stage = stage;
        self
    }

    pub fn stage(&self) -> EffectStage {
        self.stage
    }

    pub fn kind(&self) -> &EffectKind {
        &self.kind
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn name(&self) -> &'static str {
        match &self.kind {
            EffectKind::Border { .. } => "border",
            EffectKind::Glow { .. } => "glow",
            EffectKind::ImageFilter { filter, .. } => filter.as_str(),
        }
    }

    /// Bind to `node`. An image filter remembers the node's current image and schedules the
    /// filtered replacement on `jobs`.
    pub fn set_node(&mut self, node: &mut Node, jobs: &mut ImageJobs) {
        self.node = Some(node.id());
        if let EffectKind::ImageFilter { filter, previous } = &mut self.kind {
            let Some(image) = node.image().cloned() else {
                tracing::debug!(node = node.id().0, "image filter bound to node without image");
                return;
            };
            *previous = Some(image.clone());
            let filter = *filter;
            let generation = node.schedule_image();
            jobs.spawn(
                ImageTarget::ReplaceImage {
                    node: node.id(),
                    generation,
                },
                move || apply_filter(&image, filter),
            );
        }
    }

    /// Undo what binding did. Only image filters have state to restore.
    pub fn cleanup(&mut self, node: &mut Node, cache: &mut RenderCache) {
        if self.node != Some(node.id()) {
            return;
        }
        if let EffectKind::ImageFilter { previous, .. } = &mut self.kind
            && let Some(image) = previous.take()
        {
            node.set_image(Some(image));
            cache.invalidate(node.id());
        }
    }

    /// Draw relative to the owning node's transform. Unbound effects draw nothing.
    pub fn render(&self, node: &Node, surface: &mut Surface, view: ViewTransform) -> EaselResult<()> {
        if self.node != Some(node.id()) {
            return Ok(());
        }
        let to_screen = view.to_affine() * node.local_to_canvas();
        match &self.kind {
            EffectKind::Border { line_width, colour } => {
                surface.set_transform(to_screen);
                surface.stroke_path(&node.outline_path(), StrokeStyle::new(*line_width), *colour);
                Ok(())
            }
            EffectKind::Glow {
                colour,
                blur,
                offset_x,
                offset_y,
            } => {
                let glow = glow_bitmap(node, *colour, *blur)?;
                let pad = glow_padding(*blur);
                surface.set_transform(
                    to_screen * Affine::translate((offset_x - pad, offset_y - pad)),
                );
                surface.draw_bitmap(
                    &glow,
                    Rect::new(0.0, 0.0, f64::from(glow.width()), f64::from(glow.height())),
                )
            }
            EffectKind::ImageFilter { .. } => Ok(()),
        }
    }
}

fn glow_padding(blur: f64) -> f64 {
    (blur.max(0.0) * 2.0).ceil().max(1.0)
}

/// Blurred silhouette of the node body, padded so the blur does not clip.
fn glow_bitmap(node: &Node, colour: Color, blur: f64) -> EaselResult<Bitmap> {
    let pad = glow_padding(blur);
    let w = (node.width() + 2.0 * pad).ceil() as u32;
    let h = (node.height() + 2.0 * pad).ceil() as u32;
    let mut off = Surface::new(w, h)?;
    off.set_transform(Affine::translate((pad, pad)));
    let outline = node.outline_path();
    if node.kind() == NodeKind::Line {
        off.stroke_path(&outline, StrokeStyle::round(LINE_WIDTH), colour);
    } else {
        off.fill_path(&outline, colour);
    }
    let silhouette = off.finish()?;
    blur_bitmap(&silhouette, blur.max(0.0).round() as u32)
}

/// Serializable effect description used by scripts and hosts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectSpec {
    Border {
        #[serde(default = "default_border_width")]
        line_width: f64,
        #[serde(default)]
        colour: Color,
        #[serde(default)]
        stage: Option<EffectStage>,
    },
    Glow {
        #[serde(default)]
        colour: Color,
        #[serde(default = "default_glow_blur")]
        blur: f64,
        #[serde(default)]
        offset_x: f64,
        #[serde(default)]
        offset_y: f64,
        #[serde(default)]
        stage: Option<EffectStage>,
    },
    ImageFilter {
        filter: FilterName,
    },
}

fn default_border_width() -> f64 {
    2.0
}

fn default_glow_blur() -> f64 {
    8.0
}

impl EffectSpec {
    pub fn into_effect(self) -> Effect {
        match self {
            Self::Border {
                line_width,
                colour,
                stage,
            } => {
                let e = Effect::border(line_width, colour);
                match stage {
                    Some(s) => e.with_stage(s),
                    None => e,
                }
            }
            Self::Glow {
                colour,
                blur,
                offset_x,
                offset_y,
                stage,
            } => {
                let e = Effect::glow(colour, blur, offset_x, offset_y);
                match stage {
                    Some(s) => e.with_stage(s),
                    None => e,
                }
            }
            Self::ImageFilter { filter } => Effect::image_filter(filter),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/effect.rs"]
mod tests;
