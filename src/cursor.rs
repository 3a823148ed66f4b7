// Pointer state in surface pixel space.

use std::time::Duration;

use crate::types::Point;

/// Where the pointer is and whether it is over the image.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cursor {
    pub pos: Point,
    pub active: bool,
}

impl Cursor {
    /// Pointer entered (or first moved over) the image.
    pub fn enter(&mut self, pos: Point) {
        self.pos = pos;
        self.active = true;
    }

    pub fn leave(&mut self) {
        self.active = false;
    }
}

/// Cursor speed tracking for the dust motion boost.
///
/// Moves are folded in once per accepted frame: a per-frame delta above
/// `MOVE_THRESHOLD` keeps the cursor "moving" for `MOVE_HOLD`.
#[derive(Debug, Clone, Default)]
pub struct CursorMotion {
    last: Option<Point>,
    delta: Point,
    moving_until: Option<Duration>,
}

const MOVE_THRESHOLD: f32 = 0.5;
const MOVE_HOLD: Duration = Duration::from_millis(500);

impl CursorMotion {
    /// Fold the cursor position seen by this frame.
    pub fn update(&mut self, cursor: &Cursor, now: Duration) {
        if !cursor.active {
            self.reset();
            return;
        }
        let prev = self.last.unwrap_or(cursor.pos);
        self.delta = Point::new(cursor.pos.x - prev.x, cursor.pos.y - prev.y);
        self.last = Some(cursor.pos);

        if self.delta.x.hypot(self.delta.y) > MOVE_THRESHOLD {
            self.moving_until = Some(now + MOVE_HOLD);
        } else if self.moving_until.is_some_and(|t| now > t) {
            self.moving_until = None;
        }
    }

    pub fn is_moving(&self) -> bool {
        self.moving_until.is_some()
    }

    /// Cursor displacement since the previous frame.
    pub fn delta(&self) -> Point {
        self.delta
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Maps host client coordinates onto the surface.
///
/// The surface has the sampled image's pixel size while the image may be
/// displayed larger or smaller; this is the `surface / displayed` ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Top-left of the displayed image in client space.
    pub origin: Point,
    pub display_width: f32,
    pub display_height: f32,
    pub surface_width: usize,
    pub surface_height: usize,
}

impl Viewport {
    pub fn new(origin: Point, display: (f32, f32), surface: (usize, usize)) -> Self {
        Self {
            origin,
            display_width: display.0,
            display_height: display.1,
            surface_width: surface.0,
            surface_height: surface.1,
        }
    }

    pub fn to_surface(&self, client: Point) -> Point {
        let sx = if self.display_width > 0.0 { self.surface_width as f32 / self.display_width } else { 1.0 };
        let sy = if self.display_height > 0.0 { self.surface_height as f32 / self.display_height } else { 1.0 };
        Point::new((client.x - self.origin.x) * sx, (client.y - self.origin.y) * sy)
    }
}
