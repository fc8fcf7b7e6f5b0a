use kurbo::Shape;
use serde::{Deserialize, Serialize};

use crate::foundation::core::{Affine, BezPath, Color, Point, Rect, Size, ViewTransform};
use crate::foundation::error::EaselResult;
use crate::foundation::ids::NodeId;
use crate::raster::bitmap::Bitmap;
use crate::raster::surface::{StrokeStyle, Surface, rect_path};
use crate::render::cache::RenderCache;
use crate::scene::effect::Effect;
use crate::scene::jobs::ImageJobs;

/// Stroke width of [`NodeKind::Line`] bodies, in canvas units.
pub const LINE_WIDTH: f64 = 2.0;
/// Side of a selection handle square, in screen pixels.
pub const HANDLE_SIZE: f64 = 8.0;
/// Colour of selection outlines and handle borders.
pub const SELECTION_COLOR: Color = Color::rgb(0x3b, 0x82, 0xf6);

const LINE_HIT_SLOP: f64 = 4.0;

/// Variant discriminant of a [`Node`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Rectangle,
    Circle,
    Triangle,
    Line,
    Drawing,
    Image,
    UiElement,
}

impl NodeKind {
    /// Kinds the shape tool can place.
    pub fn is_shape(self) -> bool {
        matches!(
            self,
            Self::Rectangle | Self::Circle | Self::Triangle | Self::Line
        )
    }
}

/// A positioned, sized, rotatable drawable entity.
#[derive(Clone, Debug)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rotation_deg: f64,
    colour: Color,
    image: Option<Bitmap>,
    baked: Option<Bitmap>,
    z_index: i32,
    effects: Vec<Effect>,
    erased_pixels: Vec<Point>,
    // Bumped on every change to baked content; keys the render cache.
    revision: u64,
    // Bumped on every image replacement and every scheduled async replacement; only the
    // latest scheduled result may land.
    image_generation: u64,
}

impl Node {
    pub fn new(kind: NodeKind, origin: Point, size: Size, colour: Color) -> Self {
        Self {
            id: NodeId::fresh(),
            kind,
            x: origin.x,
            y: origin.y,
            width: size.width.max(1.0),
            height: size.height.max(1.0),
            rotation_deg: 0.0,
            colour,
            image: None,
            baked: None,
            z_index: 0,
            effects: Vec::new(),
            erased_pixels: Vec::new(),
            revision: 0,
            image_generation: 0,
        }
    }

    /// Freehand stroke node whose content is the pre-rasterized `baked` bitmap.
    pub fn drawing(origin: Point, baked: Bitmap) -> Self {
        let size = Size::new(f64::from(baked.width()), f64::from(baked.height()));
        let mut node = Self::new(NodeKind::Drawing, origin, size, Color::TRANSPARENT);
        node.baked = Some(baked);
        node
    }

    /// Image node sized to the image's pixel dimensions.
    pub fn from_image(origin: Point, image: Bitmap) -> Self {
        let size = Size::new(f64::from(image.width()), f64::from(image.height()));
        let mut node = Self::new(NodeKind::Image, origin, size, Color::TRANSPARENT);
        node.image = Some(image);
        node
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn rotation(&self) -> f64 {
        self.rotation_deg
    }

    pub fn colour(&self) -> Color {
        self.colour
    }

    pub fn image(&self) -> Option<&Bitmap> {
        self.image.as_ref()
    }

    pub fn baked(&self) -> Option<&Bitmap> {
        self.baked.as_ref()
    }

    /// Stored for hosts; draw order is the layer's node order.
    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    pub fn set_z_index(&mut self, z: i32) {
        self.z_index = z;
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn erased_pixels(&self) -> &[Point] {
        &self.erased_pixels
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn image_generation(&self) -> u64 {
        self.image_generation
    }

    /// Unrotated bounding box in canvas space.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn move_by(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    /// Set the size, clamping each side to at least 1.
    pub fn resize(&mut self, width: f64, height: f64) {
        // NaN also falls back to the minimum.
        let w = if width >= 1.0 { width } else { 1.0 };
        let h = if height >= 1.0 { height } else { 1.0 };
        if w != self.width || h != self.height {
            self.width = w;
            self.height = h;
            self.touch();
        }
    }

    /// Set the rotation in degrees. The value is stored as given.
    pub fn rotate(&mut self, degrees: f64) {
        self.rotation_deg = degrees;
    }

    pub fn set_colour(&mut self, colour: Color) {
        if self.colour != colour {
            self.colour = colour;
            self.touch();
        }
    }

    pub fn set_image(&mut self, image: Option<Bitmap>) {
        self.image = image;
        self.image_generation = self.image_generation.wrapping_add(1);
        self.touch();
    }

    /// Reserve a generation for an async image replacement. Results of earlier reservations
    /// become stale, so the most recently scheduled replacement wins.
    pub fn schedule_image(&mut self) -> u64 {
        self.image_generation = self.image_generation.wrapping_add(1);
        self.image_generation
    }

    /// Apply an asynchronously produced image if nothing replaced or rescheduled the image
    /// since `generation` was reserved.
    pub fn apply_async_image(&mut self, image: Bitmap, generation: u64) -> bool {
        if generation != self.image_generation {
            return false;
        }
        self.set_image(Some(image));
        true
    }

    pub fn set_baked(&mut self, baked: Option<Bitmap>) {
        self.baked = baked;
        self.touch();
    }

    /// Punch a transparent pixel at `local` (node-local, unrotated coordinates) on next bake.
    pub fn erase_at(&mut self, local: Point) {
        self.erased_pixels.push(local);
        self.touch();
    }

    /// Bind `effect` to this node and append it to the effect list.
    pub fn add_effect(&mut self, mut effect: Effect, jobs: &mut ImageJobs) {
        effect.set_node(self, jobs);
        self.effects.push(effect);
    }

    /// Remove the effect at `index`, running its cleanup.
    pub fn remove_effect(&mut self, index: usize, cache: &mut RenderCache) -> Option<Effect> {
        if index >= self.effects.len() {
            return None;
        }
        let mut effect = self.effects.remove(index);
        effect.cleanup(self, cache);
        Some(effect)
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Node-local to canvas: translate to `(x, y)`, then rotate around that point.
    pub fn local_to_canvas(&self) -> Affine {
        Affine::translate((self.x, self.y)) * Affine::rotate(self.rotation_deg.to_radians())
    }

    /// Outline of the node body in node-local coordinates.
    pub fn outline_path(&self) -> BezPath {
        let (w, h) = (self.width, self.height);
        match self.kind {
            NodeKind::Circle => kurbo::Ellipse::from_rect(Rect::new(0.0, 0.0, w, h)).to_path(0.1),
            NodeKind::Triangle => {
                let [a, b, c] = self.triangle_local();
                let mut p = BezPath::new();
                p.move_to(a);
                p.line_to(b);
                p.line_to(c);
                p.close_path();
                p
            }
            NodeKind::Line => {
                let mut p = BezPath::new();
                p.move_to((0.0, 0.0));
                p.line_to((w, h));
                p
            }
            NodeKind::Rectangle | NodeKind::Drawing | NodeKind::Image | NodeKind::UiElement => {
                rect_path(Rect::new(0.0, 0.0, w, h))
            }
        }
    }

    fn triangle_local(&self) -> [Point; 3] {
        [
            Point::new(self.width / 2.0, 0.0),
            Point::new(0.0, self.height),
            Point::new(self.width, self.height),
        ]
    }

    fn handle_points_local(&self) -> Vec<Point> {
        let (w, h) = (self.width, self.height);
        match self.kind {
            NodeKind::Line => vec![Point::ZERO, Point::new(w, h)],
            NodeKind::Triangle => self.triangle_local().to_vec(),
            _ => vec![
                Point::ZERO,
                Point::new(w, 0.0),
                Point::new(w, h),
                Point::new(0.0, h),
            ],
        }
    }

    /// Region overlap test used for viewport culling.
    ///
    /// The default is a strict axis-aligned overlap on the unrotated box, so a node that only
    /// touches the region edge is outside. Circles compare the distance from the centre to the
    /// closest region point against the radius. Triangles require all three rotated vertices
    /// inside the region box.
    pub fn is_within(&self, region: Rect) -> bool {
        match self.kind {
            NodeKind::Circle => {
                let cx = self.x + self.width / 2.0;
                let cy = self.y + self.height / 2.0;
                let r = self.width.min(self.height) / 2.0;
                let qx = cx.max(region.x0).min(region.x1);
                let qy = cy.max(region.y0).min(region.y1);
                let (dx, dy) = (cx - qx, cy - qy);
                dx * dx + dy * dy < r * r
            }
            NodeKind::Triangle => {
                let to_canvas = self.local_to_canvas();
                self.triangle_local().iter().all(|&v| {
                    let p = to_canvas * v;
                    p.x >= region.x0 && p.x <= region.x1 && p.y >= region.y0 && p.y <= region.y1
                })
            }
            _ => {
                self.x + self.width > region.x0
                    && self.x < region.x1
                    && self.y + self.height > region.y0
                    && self.y < region.y1
            }
        }
    }

    /// Precise pointer pick in canvas space, honouring rotation and the variant's shape.
    pub fn hit_point(&self, p: Point) -> bool {
        let local = self.local_to_canvas().inverse() * p;
        let (w, h) = (self.width, self.height);
        match self.kind {
            NodeKind::Circle => {
                let nx = (local.x - w / 2.0) / (w / 2.0);
                let ny = (local.y - h / 2.0) / (h / 2.0);
                nx * nx + ny * ny <= 1.0
            }
            NodeKind::Triangle => {
                let [a, b, c] = self.triangle_local();
                let side = |p1: Point, p2: Point| {
                    (p2.x - p1.x) * (local.y - p1.y) - (p2.y - p1.y) * (local.x - p1.x)
                };
                let (d1, d2, d3) = (side(a, b), side(b, c), side(c, a));
                let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
                let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
                !(has_neg && has_pos)
            }
            NodeKind::Line => {
                distance_to_segment(local, Point::ZERO, Point::new(w, h))
                    <= LINE_HIT_SLOP.max(LINE_WIDTH)
            }
            _ => local.x >= 0.0 && local.x <= w && local.y >= 0.0 && local.y <= h,
        }
    }

    /// Draw the node body, baking it into `cache` on a miss.
    pub fn render(
        &self,
        surface: &mut Surface,
        view: ViewTransform,
        cache: &mut RenderCache,
    ) -> EaselResult<()> {
        let bitmap = match cache.get(self.id, self.revision) {
            Some(b) => b,
            None => {
                let b = self.bake()?;
                tracing::trace!(node = self.id.0, revision = self.revision, "baked node");
                cache.insert(self.id, self.revision, b.clone());
                b
            }
        };
        surface.set_transform(view.to_affine() * self.local_to_canvas());
        let dest = Rect::new(
            0.0,
            0.0,
            f64::from(bitmap.width()),
            f64::from(bitmap.height()),
        );
        surface.draw_bitmap(&bitmap, dest)
    }

    /// Rasterize the node body at 1 canvas unit per pixel, without position or rotation.
    pub fn bake(&self) -> EaselResult<Bitmap> {
        let bw = self.width.ceil() as u32;
        let bh = self.height.ceil() as u32;
        let mut off = Surface::new(bw, bh)?;
        let full = Rect::new(0.0, 0.0, self.width, self.height);

        match self.kind {
            NodeKind::Circle | NodeKind::Triangle => {
                off.fill_path(&self.outline_path(), self.colour);
            }
            NodeKind::Line => {
                off.stroke_path(
                    &self.outline_path(),
                    StrokeStyle::round(LINE_WIDTH),
                    self.colour,
                );
            }
            NodeKind::Rectangle | NodeKind::Drawing | NodeKind::Image | NodeKind::UiElement => {
                if self.colour.a > 0 {
                    off.fill_rect(full, self.colour);
                }
            }
        }
        if let Some(image) = &self.image {
            off.draw_bitmap(image, full)?;
        }
        if let Some(baked) = &self.baked {
            off.draw_bitmap(baked, full)?;
        }

        let mut bitmap = off.finish()?;
        for p in &self.erased_pixels {
            bitmap.clear_pixel(p.x.floor() as i64, p.y.floor() as i64);
        }
        Ok(bitmap)
    }

    /// Selection outline: the unrotated box under the node transform, 1 screen pixel wide.
    pub fn render_border(&self, surface: &mut Surface, view: ViewTransform) {
        surface.set_transform(view.to_affine() * self.local_to_canvas());
        surface.stroke_rect(
            Rect::new(0.0, 0.0, self.width, self.height),
            StrokeStyle::new(1.0 / view.scale),
            SELECTION_COLOR,
        );
    }

    /// Selection handles, drawn as fixed-size squares in screen space.
    pub fn render_handles(&self, surface: &mut Surface, view: ViewTransform) {
        let to_screen = view.to_affine() * self.local_to_canvas();
        surface.set_transform(Affine::IDENTITY);
        let half = HANDLE_SIZE / 2.0;
        for p in self.handle_points_local() {
            let s = to_screen * p;
            let r = Rect::new(s.x - half, s.y - half, s.x + half, s.y + half);
            surface.fill_rect(r, Color::WHITE);
            surface.stroke_rect(r, StrokeStyle::new(1.0), SELECTION_COLOR);
        }
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 == 0.0 {
        return (p - a).hypot();
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).hypot()
}

#[cfg(test)]
#[path = "../../tests/unit/scene/node.rs"]
mod tests;
