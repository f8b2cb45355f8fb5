use std::f32::consts::PI;

use bevy::math::{Dir3, Ray3d, Vec2, Vec3};
use bevy::prelude::Resource;
use rand::Rng;

use crate::math::{decay_toward, distance_to_ray, lerp_rgb, wrap_vec3};
use crate::settings::HelixSettings;

/// Double-helix point cloud. Particles near the pointer ray take on the hover
/// colour; the rest fade back to the base colour a little every frame.
#[derive(Resource, Clone, Debug)]
pub struct HelixField {
    pub positions: Vec<Vec3>,
    pub velocities: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    pub sizes: Vec<f32>,
    /// Line segments for this frame, rebuilt by every `tick`.
    pub connections: Vec<(Vec3, Vec3)>,
    pointer_ndc: Vec2,
    settings: HelixSettings,
}

/// Un-jittered position of particle `index` out of `count` on the helix.
/// The first half of the indices form one strand, the rest the other strand
/// half a turn behind.
pub fn helix_point(index: usize, count: usize, radius: f32, height: f32, turns: f32) -> Vec3 {
    let half = count / 2;
    let second_strand = index >= half;
    let strand_index = if second_strand { index - half } else { index };
    let progress = if half == 0 { 0.0 } else { strand_index as f32 / half as f32 };

    let angle = progress * PI * 2.0 * turns + if second_strand { PI } else { 0.0 };
    Vec3::new(angle.cos() * radius, progress * height - height / 2.0, angle.sin() * radius)
}

/// Converts a window position (origin top-left, y down) to normalized device
/// coordinates.
pub fn pointer_ndc(position: Vec2, viewport: Vec2) -> Vec2 {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(position.x / viewport.x * 2.0 - 1.0, -(position.y / viewport.y * 2.0 - 1.0))
}

impl HelixField {
    pub fn new(settings: &HelixSettings, rng: &mut impl Rng) -> HelixField {
        let n = settings.particle_count;
        let mut positions = Vec::with_capacity(n);
        let mut velocities = Vec::with_capacity(n);
        let mut sizes = Vec::with_capacity(n);

        for i in 0..n {
            let mut jitter = || (rng.random::<f32>() - 0.5) * settings.jitter;
            let offset = Vec3::new(jitter(), jitter(), jitter());
            positions.push(helix_point(i, n, settings.radius, settings.height, settings.turns) + offset);

            let mut drift = || (rng.random::<f32>() - 0.5) * settings.max_velocity * 2.0;
            velocities.push(Vec3::new(drift(), drift(), drift()));

            sizes.push(rng.random::<f32>() * settings.particle_size + 0.2);
        }

        HelixField {
            positions,
            velocities,
            colors: vec![settings.base_color; n],
            sizes,
            connections: Vec::new(),
            pointer_ndc: Vec2::ZERO,
            settings: settings.clone(),
        }
    }

    pub fn settings(&self) -> &HelixSettings {
        &self.settings
    }

    /// Pointer position in normalized device coordinates. Starts at the
    /// centre of the view.
    pub fn set_pointer(&mut self, ndc: Vec2) {
        self.pointer_ndc = ndc;
    }

    /// Ray from the helix camera through the pointer.
    pub fn pointer_ray(&self, aspect: f32) -> Ray3d {
        let half_height = (self.settings.fov_degrees.to_radians() / 2.0).tan();
        let direction = Vec3::new(
            self.pointer_ndc.x * half_height * aspect,
            self.pointer_ndc.y * half_height,
            -1.0,
        );
        Ray3d::new(
            Vec3::new(0.0, 0.0, self.settings.camera_distance),
            Dir3::new(direction).unwrap_or(Dir3::NEG_Z),
        )
    }

    pub fn tick(&mut self, aspect: f32, rng: &mut impl Rng) {
        let bounds = self.settings.bounds;
        for (position, velocity) in self.positions.iter_mut().zip(&self.velocities) {
            *position = wrap_vec3(*position + *velocity, bounds);
        }

        self.update_colors(aspect);
        self.rebuild_connections(rng);
    }

    fn update_colors(&mut self, aspect: f32) {
        let ray = self.pointer_ray(aspect);
        let s = &self.settings;
        for (position, color) in self.positions.iter().zip(self.colors.iter_mut()) {
            let distance = distance_to_ray(&ray, *position);
            *color = if distance < s.highlight_radius {
                lerp_rgb(s.base_color, s.hover_color, 1.0 - distance / s.highlight_radius)
            } else {
                decay_toward(*color, s.base_color, s.color_decay)
            };
        }
    }

    fn rebuild_connections(&mut self, rng: &mut impl Rng) {
        self.connections.clear();

        let n = self.positions.len();
        let half = n / 2;
        let span = self.settings.neighbour_span;
        let max_distance = self.settings.connection_distance / 8.0;
        let cross_chance = self.settings.cross_link_chance.clamp(0.0, 1.0);

        for i in 0..n {
            let second_strand = i >= half;
            let (strand_start, strand_end) = if second_strand { (half, n) } else { (0, half) };
            let here = self.positions[i];

            let first = strand_start.max(i.saturating_sub(span));
            let last = strand_end.min(i + span + 1);
            for j in first..last {
                if i != j && here.distance(self.positions[j]) < max_distance {
                    self.connections.push((here, self.positions[j]));
                }
            }

            // Base pair to the matching particle on the other strand. With an
            // odd count the last particle has no partner there.
            if rng.random_bool(cross_chance) {
                let opposite = if second_strand { i - half } else { i + half };
                if opposite < n && !(strand_start..strand_end).contains(&opposite) {
                    self.connections.push((here, self.positions[opposite]));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn still(settings: &HelixSettings, positions: Vec<Vec3>) -> HelixField {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = HelixField::new(settings, &mut rng);
        field.velocities = vec![Vec3::ZERO; positions.len()];
        field.colors = vec![settings.base_color; positions.len()];
        field.sizes = vec![0.3; positions.len()];
        field.positions = positions;
        field
    }

    #[test]
    fn first_particle_starts_at_angle_zero() {
        let p = helix_point(0, 10, 20.0, 40.0, 2.0);
        assert!((p.x - 20.0).abs() < 1e-5);
        assert!(p.z.abs() < 1e-5);
        assert!((p.y + 20.0).abs() < 1e-5);

        // The second strand starts half a turn later.
        let q = helix_point(5, 10, 20.0, 40.0, 2.0);
        assert!((q.x + 20.0).abs() < 1e-4);
    }

    #[test]
    fn pointer_ndc_maps_corners() {
        let viewport = Vec2::new(800.0, 600.0);
        assert_eq!(pointer_ndc(Vec2::new(0.0, 0.0), viewport), Vec2::new(-1.0, 1.0));
        assert_eq!(pointer_ndc(Vec2::new(400.0, 300.0), viewport), Vec2::ZERO);
        assert_eq!(pointer_ndc(Vec2::new(800.0, 600.0), viewport), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn hover_colour_on_the_ray() {
        let settings = HelixSettings {
            particle_count: 2,
            ..HelixSettings::default()
        };
        let mut field = still(&settings, vec![Vec3::ZERO, Vec3::new(20.0, 0.0, 0.0)]);
        let mut rng = StdRng::seed_from_u64(2);
        field.tick(1.0, &mut rng);
        assert!((field.colors[0] - settings.hover_color).length() < 1e-5);
        assert_eq!(field.colors[1], settings.base_color);
    }

    #[test]
    fn colour_decays_back_to_base() {
        let settings = HelixSettings {
            particle_count: 1,
            ..HelixSettings::default()
        };
        let mut field = still(&settings, vec![Vec3::new(20.0, 0.0, 0.0)]);
        field.colors[0] = settings.hover_color;
        let mut rng = StdRng::seed_from_u64(3);

        let mut gap = field.colors[0].distance(settings.base_color);
        for _ in 0..120 {
            field.tick(1.0, &mut rng);
            let next = field.colors[0].distance(settings.base_color);
            assert!(next < gap);
            gap = next;
        }
        assert!(gap < 0.01);
    }

    #[test]
    fn partial_highlight_is_proportional() {
        let settings = HelixSettings {
            particle_count: 1,
            ..HelixSettings::default()
        };
        let mut field = still(&settings, vec![Vec3::new(2.5, 0.0, 0.0)]);
        let mut rng = StdRng::seed_from_u64(4);
        field.tick(1.0, &mut rng);
        let expected = lerp_rgb(settings.base_color, settings.hover_color, 0.5);
        assert!((field.colors[0] - expected).length() < 1e-4);
    }

    #[test]
    fn connections_stay_in_strand_without_cross_links() {
        let settings = HelixSettings {
            particle_count: 10,
            cross_link_chance: 0.0,
            connection_distance: 1_000.0,
            ..HelixSettings::default()
        };
        // Everything close together so only the index window limits links.
        let positions: Vec<Vec3> = (0..10).map(|i| Vec3::new(i as f32 * 0.1, 0.0, 0.0)).collect();
        let mut field = still(&settings, positions.clone());
        let mut rng = StdRng::seed_from_u64(5);
        field.tick(1.0, &mut rng);

        let index_of = |p: Vec3| positions.iter().position(|q| q.distance(p) < 1e-6).unwrap();
        assert!(!field.connections.is_empty());
        for (a, b) in &field.connections {
            let (i, j) = (index_of(*a), index_of(*b));
            assert_eq!(i < 5, j < 5, "link {i}-{j} crosses strands");
            assert!(i.abs_diff(j) <= 3);
        }
    }

    #[test]
    fn cross_links_pair_matching_indices() {
        let settings = HelixSettings {
            particle_count: 10,
            cross_link_chance: 1.0,
            connection_distance: 0.0,
            ..HelixSettings::default()
        };
        let positions: Vec<Vec3> = (0..10).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect();
        let mut field = still(&settings, positions);
        let mut rng = StdRng::seed_from_u64(6);
        field.tick(1.0, &mut rng);

        assert_eq!(field.connections.len(), 10);
        for (a, b) in &field.connections {
            assert!((a.x - b.x).abs() == 5.0);
        }

        // Odd count: strands are 0..2 and 2..5, so particle 4 has no partner.
        let settings = HelixSettings {
            particle_count: 5,
            ..settings
        };
        let positions: Vec<Vec3> = (0..5).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect();
        let mut field = still(&settings, positions);
        field.tick(1.0, &mut rng);

        let mut pairs: Vec<(u32, u32)> = field
            .connections
            .iter()
            .map(|(a, b)| (a.x as u32, b.x as u32))
            .collect();
        pairs.sort();
        assert_eq!(pairs, vec![(0, 2), (1, 3), (2, 0), (3, 1)]);
        for (a, b) in pairs {
            assert_ne!(a >= 2, b >= 2, "({a}, {b}) stays on one strand");
        }
    }

    #[test]
    fn positions_wrap_into_bounds() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut field = HelixField::new(&HelixSettings::default(), &mut rng);
        let bounds = field.settings().bounds;
        for _ in 0..5 {
            field.tick(1.5, &mut rng);
        }
        for p in &field.positions {
            assert!(p.x.abs() <= bounds.x && p.y.abs() <= bounds.y && p.z.abs() <= bounds.z);
        }
    }
}
