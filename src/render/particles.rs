// Particle dust.
// Every sampled cell becomes a particle with a jittered home and random
// drift, wobble, orbit and spin parameters fixed at sampling time.
// Visual: the image with a hole of `radius + soft_edge` at the cursor; the
// particles inside it scatter by their influence and settle back home at 0.

use std::f32::consts::TAU;
use std::time::Duration;

use rand::{Rng, RngCore};

use crate::cursor::{Cursor, CursorMotion};
use crate::influence::Falloff;
use crate::params::DustOptions;
use crate::raster::{ClipDisk, clear_disc, fill_polygon, fill_rect};
use crate::types::{Cell, FrameBuffer, Point, Rgb};

const WOBBLE_AMP: (f32, f32) = (1.5, 3.0);
const WOBBLE_SPEED: (f32, f32) = (0.5, 1.2);
const SPIN_THRESHOLD: f32 = 0.3;
const AGITATION: f32 = 1.5;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub home: Point,
    pub color: Rgb,
    /// Unit vector the particle is blown along.
    pub dir: Point,
    pub wob_vec: Point,
    pub wob_amp: f32,
    pub wob_speed: f32,
    pub phase: f32,
    /// +1 or -1.
    pub spin: f32,
    pub spin_speed: f32,
    pub orbit_radius: f32,
    pub orbit_speed: f32,
    pub orbit_phase: f32,
}

fn unit(angle: f32) -> Point {
    Point::new(angle.cos(), angle.sin())
}

impl Particle {
    pub fn spawn(cell: &Cell, spacing: u32, rng: &mut dyn RngCore) -> Self {
        let s = spacing as f32;
        let jitter = s / 2.0;
        let mut signed = || rng.random::<f32>() * 2.0 - 1.0;
        let home = Point::new(cell.pos.x + signed() * jitter, cell.pos.y + signed() * jitter);
        Self {
            home,
            color: cell.rgb,
            dir: unit(rng.random::<f32>() * TAU),
            wob_vec: unit(rng.random::<f32>() * TAU),
            wob_amp: rng.random_range(WOBBLE_AMP.0..WOBBLE_AMP.1),
            wob_speed: rng.random_range(WOBBLE_SPEED.0..WOBBLE_SPEED.1),
            phase: rng.random::<f32>() * TAU,
            spin: if rng.random::<bool>() { 1.0 } else { -1.0 },
            spin_speed: rng.random_range(0.5..2.0),
            orbit_radius: s * rng.random_range(0.5..1.5),
            orbit_speed: rng.random_range(0.3..1.0),
            orbit_phase: rng.random::<f32>() * TAU,
        }
    }

    /// Displaced position at influence `eased`, `t` seconds into the animation.
    pub fn position(&self, eased: f32, max_drift: f32, t: f32) -> Point {
        let drift = eased * max_drift;
        let wobble = (t * self.wob_speed + self.phase).sin() * self.wob_amp * eased;
        let orbit = t * self.orbit_speed + self.orbit_phase;
        Point::new(
            self.home.x + self.dir.x * drift + self.wob_vec.x * wobble + orbit.cos() * self.orbit_radius * eased,
            self.home.y + self.dir.y * drift + self.wob_vec.y * wobble + orbit.sin() * self.orbit_radius * eased,
        )
    }

    /// Rotation angle for strongly influenced particles.
    pub fn angle(&self, eased: f32, t: f32) -> f32 {
        t * self.spin_speed * self.spin * eased
    }
}

/// All particles of one sample pass.
#[derive(Debug, Clone, Default)]
pub struct ParticleField {
    pub particles: Vec<Particle>,
}

impl ParticleField {
    pub fn from_cells(cells: &[Cell], spacing: u32, rng: &mut dyn RngCore) -> Self {
        let particles = cells.iter().map(|c| Particle::spawn(c, spacing, rng)).collect();
        Self { particles }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

fn rotated_square(center: Point, side: f32, angle: f32) -> [Point; 4] {
    let h = side / 2.0;
    let (sin, cos) = angle.sin_cos();
    [(-h, -h), (h, -h), (h, h), (-h, h)]
        .map(|(x, y)| Point::new(center.x + x * cos - y * sin, center.y + x * sin + y * cos))
}

/// Visual: the picture stays intact except for a disk around the cursor
/// where it has burst into drifting, wobbling, spinning specks.
#[allow(clippy::too_many_arguments)]
pub fn draw_particles(
    fb: &mut FrameBuffer,
    base: Option<&FrameBuffer>,
    field: &ParticleField,
    opts: &DustOptions,
    falloff: &Falloff,
    cursor: &Cursor,
    motion: &CursorMotion,
    now: Duration,
    rng: &mut dyn RngCore,
) {
    if !cursor.active {
        return;
    }
    if let Some(base) = base
        && base.width == fb.width
        && base.height == fb.height
    {
        fb.pixels.copy_from_slice(&base.pixels);
    }

    let clip = ClipDisk { center: cursor.pos, radius: falloff.reach() };
    clear_disc(fb, &clip);

    let t = now.as_secs_f32();
    let s = opts.spacing as f32;
    let boost = motion.is_moving().then(|| motion.delta());

    for p in &field.particles {
        let Some(eased) = falloff.at_point(p.home, cursor.pos) else { continue };
        let mut pos = p.position(eased, opts.max_drift, t);

        if let Some(delta) = boost {
            let push = 0.2 * AGITATION * eased;
            pos.x += delta.x * push + (rng.random::<f32>() * 2.0 - 1.0) * AGITATION * eased;
            pos.y += delta.y * push + (rng.random::<f32>() * 2.0 - 1.0) * AGITATION * eased;
        }

        let alpha = 0.15 + 0.85 * eased;
        if eased > SPIN_THRESHOLD {
            let center = Point::new(pos.x + s / 2.0, pos.y + s / 2.0);
            let quad = rotated_square(center, s, p.angle(eased, t));
            fill_polygon(fb, &quad, p.color, alpha, Some(&clip));
        } else {
            fill_rect(fb, pos.x, pos.y, s, s, p.color, alpha, Some(&clip));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn still_particle(home: Point, dir: Point) -> Particle {
        Particle {
            home,
            color: Rgb::WHITE,
            dir,
            wob_vec: Point::new(1.0, 0.0),
            wob_amp: 0.0,
            wob_speed: 1.0,
            phase: 0.0,
            spin: 1.0,
            spin_speed: 1.0,
            orbit_radius: 0.0,
            orbit_speed: 1.0,
            orbit_phase: 0.0,
        }
    }

    #[test]
    fn test_half_influence_drifts_half_way() {
        let p = still_particle(Point::new(50.0, 50.0), Point::new(1.0, 0.0));
        let pos = p.position(0.5, 28.0, 3.7);
        assert!((pos.x - 64.0).abs() < 1e-4);
        assert!((pos.y - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_influence_stays_home() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        let cell = Cell { pos: Point::new(40.0, 40.0), col: 0, row: 0, rgb: Rgb::WHITE };
        let p = Particle::spawn(&cell, 4, &mut rng);
        for t in [0.0, 0.5, 12.25, 999.0] {
            assert_eq!(p.position(0.0, 28.0, t), p.home);
        }
    }

    #[test]
    fn test_spawn_ranges() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let cell = Cell { pos: Point::new(10.0, 10.0), col: 0, row: 0, rgb: Rgb::WHITE };
        for _ in 0..200 {
            let p = Particle::spawn(&cell, 4, &mut rng);
            assert!((p.home.x - 10.0).abs() <= 2.0 && (p.home.y - 10.0).abs() <= 2.0);
            assert!((p.dir.x.hypot(p.dir.y) - 1.0).abs() < 1e-4);
            assert!((1.5..3.0).contains(&p.wob_amp));
            assert!((2.0..6.0).contains(&p.orbit_radius));
            assert!(p.spin == 1.0 || p.spin == -1.0);
        }
    }

    #[test]
    fn test_seeded_fields_are_identical() {
        let cells: Vec<Cell> =
            (0..10).map(|i| Cell { pos: Point::new(i as f32 * 4.0, 0.0), col: i, row: 0, rgb: Rgb::WHITE }).collect();
        let a = ParticleField::from_cells(&cells, 4, &mut Xoshiro256PlusPlus::seed_from_u64(5));
        let b = ParticleField::from_cells(&cells, 4, &mut Xoshiro256PlusPlus::seed_from_u64(5));
        assert_eq!(a.particles, b.particles);
    }

    #[test]
    fn test_hole_is_punched_and_outside_kept() {
        let mut base = FrameBuffer::new(100, 100);
        base.pixels.fill(Rgb::new(10, 20, 30).to_argb(255));
        let mut fb = FrameBuffer::new(100, 100);
        let cursor = Cursor { pos: Point::new(50.0, 50.0), active: true };
        let opts = DustOptions::default();
        let falloff = Falloff::new(20.0, 10.0, 1.5);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        draw_particles(
            &mut fb,
            Some(&base),
            &ParticleField::default(),
            &opts,
            &falloff,
            &cursor,
            &CursorMotion::default(),
            Duration::ZERO,
            &mut rng,
        );
        assert_eq!(fb.pixels[50 * 100 + 50], 0);
        assert_eq!(fb.pixels[0], base.pixels[0]);
    }
}
