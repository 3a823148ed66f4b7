// Influence field: how strongly the cursor affects a cell at a given distance.
// Visual: full strength inside `radius`, a soft fade across `soft_edge`
// shaped by `fade_exp`, and untouched cells from `radius + soft_edge` out.
// Cells past that reach are skipped entirely, which keeps large images cheap.

use crate::types::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Falloff {
    pub radius: f32,
    pub soft_edge: f32,
    pub fade_exp: f32,
}

impl Falloff {
    pub const fn new(radius: f32, soft_edge: f32, fade_exp: f32) -> Self {
        Self { radius, soft_edge, fade_exp }
    }

    /// Distance at and beyond which nothing is drawn.
    #[inline]
    pub fn reach(&self) -> f32 {
        self.radius + self.soft_edge.max(0.0)
    }

    /// Influence in [0, 1] for a distance, or `None` when the cell is out of reach.
    #[inline]
    pub fn at(&self, distance: f32) -> Option<f32> {
        if distance.is_nan() || distance >= self.reach() {
            return None;
        }
        let base = if distance < self.radius {
            1.0
        } else {
            1.0 - (distance - self.radius) / self.soft_edge
        };
        Some(base.clamp(0.0, 1.0).powf(self.fade_exp.max(0.0)).clamp(0.0, 1.0))
    }

    /// Same as [`Falloff::at`], but 0 instead of `None`.
    #[inline]
    pub fn influence(&self, distance: f32) -> f32 {
        self.at(distance).unwrap_or(0.0)
    }

    /// Influence of a point relative to the cursor.
    #[inline]
    pub fn at_point(&self, p: Point, cursor: Point) -> Option<f32> {
        self.at(p.distance(cursor))
    }
}
