use serde::{Deserialize, Serialize};

use crate::foundation::core::{Affine, BezPath, Color, Point, Rect};
use crate::foundation::error::EaselResult;
use crate::raster::surface::{StrokeStyle, Surface};
use crate::scene::node::Node;

/// Active editing tool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    #[default]
    Move,
    Shape,
    Brush,
    /// Selectable, but pointer input does nothing yet.
    Erase,
    Image,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }

    /// Any modifier that turns a click into an additive selection.
    pub fn additive(self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    Char(char),
}

/// Brush settings plus the in-progress stroke, in canvas units.
#[derive(Clone, Debug, PartialEq)]
pub struct BrushState {
    pub size: f64,
    pub colour: Color,
    points: Vec<Point>,
    active: bool,
}

impl BrushState {
    pub fn new(size: f64, colour: Color) -> Self {
        Self {
            size,
            colour,
            points: Vec::new(),
            active: false,
        }
    }

    pub fn begin(&mut self, p: Point) {
        self.points.clear();
        self.points.push(p);
        self.active = true;
    }

    pub fn push(&mut self, p: Point) {
        if self.active {
            self.points.push(p);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Stop accumulating and discard the samples.
    pub fn cancel(&mut self) {
        self.points.clear();
        self.active = false;
    }

    /// Sample bounding box grown by half the brush size on every side.
    pub fn bounds(&self) -> Option<Rect> {
        let first = *self.points.first()?;
        let bbox = self
            .points
            .iter()
            .fold(Rect::from_points(first, first), |r, p| r.union_pt(*p));
        Some(bbox.inflate(self.size / 2.0, self.size / 2.0))
    }

    /// Finish the stroke: rasterize it with round caps into a Drawing node at its bounds.
    pub fn finish(&mut self) -> EaselResult<Option<Node>> {
        self.active = false;
        let Some(bounds) = self.bounds() else {
            return Ok(None);
        };
        let mut off = Surface::new(bounds.width().ceil() as u32, bounds.height().ceil() as u32)?;
        off.set_transform(Affine::translate((-bounds.x0, -bounds.y0)));
        paint_stroke(&mut off, &self.points, self.size, self.colour);
        let baked = off.finish()?;
        self.points.clear();
        Ok(Some(Node::drawing(bounds.origin(), baked)))
    }
}

/// Round-capped polyline; a lone sample becomes a dot.
pub(crate) fn paint_stroke(surface: &mut Surface, points: &[Point], size: f64, colour: Color) {
    match points {
        [] => {}
        [p] => {
            let dot = kurbo::Shape::to_path(&kurbo::Circle::new(*p, size / 2.0), 0.1);
            surface.fill_path(&dot, colour);
        }
        _ => {
            let mut path = BezPath::new();
            path.move_to(points[0]);
            for p in &points[1..] {
                path.line_to(*p);
            }
            surface.stroke_path(&path, StrokeStyle::round(size), colour);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/tool.rs"]
mod tests;
