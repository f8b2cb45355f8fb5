use bevy::math::{Vec2, Vec3};
use bevy::prelude::Resource;
use rand::Rng;
use rayon::prelude::*;

use crate::math::wrap_vec3;
use crate::settings::FieldSettings;

/// Ambient dust: slow drifting particles in a few depth layers, pushed
/// vertically by page scrolling (nearer layers move more).
#[derive(Resource, Clone, Debug)]
pub struct ParticleField {
    pub positions: Vec<Vec3>,
    pub velocities: Vec<Vec3>,
    pub sizes: Vec<f32>,
    pub color: Vec3,
    /// Accumulated whole-field rotation around x and y, in radians.
    pub rotation: Vec2,
    bounds: Vec3,
    depth: f32,
    speed: f32,
    parallax_rate: f32,
    spin_per_frame: f32,
}

impl ParticleField {
    pub fn new(settings: &FieldSettings, rng: &mut impl Rng) -> ParticleField {
        let n = settings.particle_count;
        let (half_w, half_h) = settings.half_extent;
        let half_depth = settings.depth / 2.0;
        let layers = settings.layers.max(1);
        let layer_spacing = settings.depth / layers as f32;

        let mut positions = Vec::with_capacity(n);
        let mut velocities = Vec::with_capacity(n);
        let mut sizes = Vec::with_capacity(n);

        for _ in 0..n {
            let layer = rng.random_range(0..layers);
            let position = Vec3::new(
                (rng.random::<f32>() - 0.5) * half_w * 2.0,
                (rng.random::<f32>() - 0.5) * half_h * 2.0,
                -half_depth + layer as f32 * layer_spacing,
            );
            let nearness = depth_factor(position.z, settings.depth);
            sizes.push((0.3 + rng.random::<f32>() * 0.4) * (0.5 + nearness * 0.5));

            let mut component = || {
                let magnitude = rng.random::<f32>() * (settings.max_speed - settings.min_speed) + settings.min_speed;
                if rng.random_bool(0.5) {
                    magnitude
                } else {
                    -magnitude
                }
            };
            velocities.push(Vec3::new(component(), component(), component()));
            positions.push(position);
        }

        ParticleField {
            positions,
            velocities,
            sizes,
            color: settings.color,
            rotation: Vec2::ZERO,
            bounds: Vec3::new(half_w, half_h, half_depth),
            depth: settings.depth,
            speed: settings.speed,
            parallax_rate: settings.parallax_rate,
            spin_per_frame: settings.spin_per_frame,
        }
    }

    pub fn bounds(&self) -> Vec3 {
        self.bounds
    }

    /// One frame: drift, scroll parallax, then wrap. `scroll_y` is the page
    /// scroll position in pixels; the field keeps flowing for as long as the
    /// page stays scrolled.
    pub fn tick(&mut self, scroll_y: f32) {
        let speed = self.speed;
        let depth = self.depth;
        let rate = self.parallax_rate;
        let bounds = self.bounds;

        self.positions
            .par_iter_mut()
            .zip(self.velocities.par_iter())
            .for_each(|(position, velocity)| {
                *position += *velocity * speed;
                let parallax = rate * (0.5 + depth_factor(position.z, depth) * 1.5);
                position.y -= scroll_y * parallax;
                *position = wrap_vec3(*position, bounds);
            });

        self.rotation += Vec2::splat(self.spin_per_frame);
    }
}

/// 0 at the back of the volume, 1 at the front.
pub fn depth_factor(z: f32, depth: f32) -> f32 {
    (z + depth / 2.0) / depth
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn within(field: &ParticleField) -> bool {
        let b = field.bounds();
        field
            .positions
            .iter()
            .all(|p| p.x.abs() <= b.x && p.y.abs() <= b.y && p.z.abs() <= b.z)
    }

    #[test]
    fn spawns_in_discrete_layers() {
        let mut rng = StdRng::seed_from_u64(7);
        let field = ParticleField::new(&FieldSettings::default(), &mut rng);
        assert_eq!(field.positions.len(), 150);
        assert_eq!(field.velocities.len(), 150);
        assert_eq!(field.sizes.len(), 150);
        for p in &field.positions {
            assert!([-25.0, -15.0, -5.0, 5.0, 15.0].contains(&p.z), "z = {}", p.z);
        }
        for v in &field.velocities {
            for c in v.to_array() {
                assert!((0.001..=0.005).contains(&c.abs()));
            }
        }
        assert!(within(&field));
    }

    #[test]
    fn stays_within_bounds_while_scrolling() {
        let mut rng = StdRng::seed_from_u64(11);
        let settings = FieldSettings {
            speed: 400.0,
            ..FieldSettings::default()
        };
        let mut field = ParticleField::new(&settings, &mut rng);
        for frame in 0..2_000 {
            // Scroll down then back up in large jumps.
            let scroll = ((frame % 200) as f32 - 100.0).abs() * 73.0;
            field.tick(scroll);
            assert!(within(&field), "escaped bounds on frame {frame}");
        }
    }

    #[test]
    fn one_drift_step_per_frame() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut field = ParticleField::new(&FieldSettings::default(), &mut rng);
        let before = field.positions.clone();
        field.tick(0.0);
        for ((a, b), v) in before.iter().zip(&field.positions).zip(&field.velocities) {
            let expected = *a + *v * 0.01;
            assert!((b.x - expected.x).abs() < 1e-6);
            assert!((b.y - expected.y).abs() < 1e-6);
            // The back layer sits exactly on the z bound and wraps on its first step outward.
            if expected.z.abs() <= 25.0 {
                assert!((b.z - expected.z).abs() < 1e-6);
            } else {
                assert_eq!(b.z.abs(), 25.0);
            }
        }
    }

    fn still_field(positions: Vec<Vec3>) -> ParticleField {
        let settings = FieldSettings {
            speed: 0.0,
            ..FieldSettings::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let mut field = ParticleField::new(&settings, &mut rng);
        field.velocities = vec![Vec3::ZERO; positions.len()];
        field.positions = positions;
        field
    }

    #[test]
    fn held_scroll_keeps_the_field_flowing() {
        let mut field = still_field(vec![Vec3::new(0.0, 0.0, -25.0)]);
        field.tick(500.0);
        assert!((field.positions[0].y + 5.0).abs() < 1e-4);
        for _ in 1..10 {
            field.tick(500.0);
        }
        assert!((field.positions[0].y + 50.0).abs() < 1e-3);
    }

    #[test]
    fn nearer_layers_move_further_on_scroll() {
        let mut field = still_field(vec![Vec3::new(0.0, 0.0, -25.0), Vec3::new(0.0, 0.0, 15.0)]);
        field.tick(0.0);
        assert_eq!(field.positions[0].y, 0.0);
        field.tick(100.0);
        let back = -field.positions[0].y;
        let front = -field.positions[1].y;
        assert!((back - 1.0).abs() < 1e-4);
        assert!(front > back);
    }
}
