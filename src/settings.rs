use std::fmt::{Debug, Formatter};

use bevy::color::Srgba;
use bevy::math::Vec3;
use bevy::prelude::Resource;
use thiserror::Error;

use crate::args::Args;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("window size {0:?} is not of the form width,height")]
    WindowSize(String),
    #[error("colour {value:?} for {name} is not a hex colour: {reason}")]
    Color {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone, Debug)]
pub struct FieldSettings {
    pub particle_count: usize,
    pub speed: f32,
    pub depth: f32,
    pub layers: u32,
    /// Half-extent of the spawn and wrap volume in x and y; z uses `depth`.
    pub half_extent: (f32, f32),
    pub min_speed: f32,
    pub max_speed: f32,
    pub parallax_rate: f32,
    pub spin_per_frame: f32,
    pub color: Vec3,
    pub camera_distance: f32,
    pub fov_degrees: f32,
}

impl Default for FieldSettings {
    fn default() -> Self {
        FieldSettings {
            particle_count: 150,
            speed: 0.01,
            depth: 50.0,
            layers: 5,
            half_extent: (60.0, 100.0),
            min_speed: 0.001,
            max_speed: 0.005,
            parallax_rate: 0.02,
            spin_per_frame: 0.0001,
            color: Vec3::ONE,
            camera_distance: 30.0,
            fov_degrees: 75.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HelixSettings {
    pub particle_count: usize,
    pub particle_size: f32,
    pub radius: f32,
    pub height: f32,
    pub turns: f32,
    pub jitter: f32,
    pub max_velocity: f32,
    pub bounds: Vec3,
    pub base_color: Vec3,
    pub hover_color: Vec3,
    pub highlight_radius: f32,
    pub color_decay: f32,
    pub connection_distance: f32,
    pub neighbour_span: usize,
    pub cross_link_chance: f64,
    pub camera_distance: f32,
    pub fov_degrees: f32,
}

impl Default for HelixSettings {
    fn default() -> Self {
        HelixSettings {
            particle_count: 180,
            particle_size: 0.4,
            radius: 20.0,
            height: 40.0,
            turns: 2.0,
            jitter: 5.0,
            max_velocity: 0.005,
            bounds: Vec3::new(25.0, 25.0, 10.0),
            base_color: Vec3::ONE,
            hover_color: Vec3::new(0.0, 240.0 / 255.0, 1.0),
            highlight_radius: 5.0,
            color_decay: 0.05,
            connection_distance: 150.0,
            neighbour_span: 3,
            cross_link_chance: 0.05,
            camera_distance: 30.0,
            fov_degrees: 75.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GridSettings {
    pub cell_size: f32,
    pub coarse_cell_size: f32,
    pub fine_alpha: f32,
    pub coarse_alpha: f32,
    pub highlight_radius: f32,
    pub max_opacity: f32,
    pub glow_distance: f32,
    pub glow_radius: f32,
    pub debounce_millis: u64,
}

impl Default for GridSettings {
    fn default() -> Self {
        GridSettings {
            cell_size: 20.0,
            coarse_cell_size: 100.0,
            fine_alpha: 0.02,
            coarse_alpha: 0.03,
            highlight_radius: 150.0,
            max_opacity: 0.2,
            glow_distance: 30.0,
            glow_radius: 4.0,
            debounce_millis: 100,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NetworkSettings {
    pub node_count: usize,
    pub central_nodes: usize,
    pub connection_count: usize,
    pub flow_speed: f32,
    pub central_radius: f32,
    pub outer_radius: (f32, f32),
    pub outer_height: f32,
    pub peer_link_chance: f64,
    pub spawn_chance: f64,
    pub spin_per_frame: f32,
    pub node_color: Vec3,
    pub connection_color: Vec3,
    pub data_color: Vec3,
    pub camera_distance: f32,
    pub fov_degrees: f32,
    /// Page-space vertical extent of the element hosting the network.
    pub container_top: f32,
    pub container_height: f32,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        NetworkSettings {
            node_count: 15,
            central_nodes: 3,
            connection_count: 25,
            flow_speed: 1.0,
            central_radius: 5.0,
            outer_radius: (10.0, 25.0),
            outer_height: 15.0,
            peer_link_chance: 0.3,
            spawn_chance: 0.03,
            spin_per_frame: 0.001,
            node_color: Vec3::ONE,
            connection_color: Vec3::ONE,
            data_color: Vec3::new(0.0, 240.0 / 255.0, 1.0),
            camera_distance: 40.0,
            fov_degrees: 60.0,
            container_top: 0.0,
            container_height: 900.0,
        }
    }
}

#[derive(Resource, Clone)]
pub struct Settings {
    pub window: (u16, u16),
    pub seed: Option<u64>,
    pub field: FieldSettings,
    pub helix: HelixSettings,
    pub grid: GridSettings,
    pub network: NetworkSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            window: (1280, 800),
            seed: None,
            field: FieldSettings::default(),
            helix: HelixSettings::default(),
            grid: GridSettings::default(),
            network: NetworkSettings::default(),
        }
    }
}

impl Debug for Settings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Settings:")?;
        writeln!(f, "    window: {}x{}", self.window.0, self.window.1)?;
        writeln!(f, "    seed: {:?}", self.seed)?;
        writeln!(f, "    field particles: {}", self.field.particle_count)?;
        writeln!(f, "    field speed: {}", self.field.speed)?;
        writeln!(f, "    field depth: {}", self.field.depth)?;
        writeln!(f, "    helix particles: {}", self.helix.particle_count)?;
        writeln!(f, "    helix connection distance: {}", self.helix.connection_distance)?;
        writeln!(f, "    network nodes: {}", self.network.node_count)?;
        writeln!(f, "    network connections: {}", self.network.connection_count)?;
        writeln!(f, "    flow speed: {}", self.network.flow_speed)
    }
}

impl Settings {
    /// Builds settings from the command line. Values that fail to parse keep
    /// their defaults and are returned alongside so they can be logged.
    pub fn from_args(args: &Args) -> (Settings, Vec<SettingsError>) {
        let mut settings = Settings {
            seed: args.seed,
            ..Settings::default()
        };
        let mut problems = Vec::new();

        match parse_window_size(&args.win) {
            Ok(size) => settings.window = size,
            Err(e) => problems.push(e),
        }

        settings.field.particle_count = args.field_particles;
        settings.field.speed = args.field_speed;
        settings.field.depth = args.field_depth.max(f32::EPSILON);
        settings.helix.particle_count = args.helix_particles;
        settings.helix.connection_distance = args.connection_distance;
        // Never fewer nodes than the central ring.
        settings.network.node_count = args.nodes.max(settings.network.central_nodes);
        settings.network.connection_count = args.connections;
        settings.network.flow_speed = args.flow_speed.max(0.0);

        let colors: [(&'static str, &str, &mut Vec3); 4] = [
            ("field", &args.field_color, &mut settings.field.color),
            ("helix", &args.helix_color, &mut settings.helix.base_color),
            ("hover", &args.hover_color, &mut settings.helix.hover_color),
            ("data", &args.data_color, &mut settings.network.data_color),
        ];
        for (name, value, target) in colors {
            match parse_color(name, value) {
                Ok(rgb) => *target = rgb,
                Err(e) => problems.push(e),
            }
        }

        (settings, problems)
    }
}

pub fn parse_window_size(value: &str) -> Result<(u16, u16), SettingsError> {
    let err = || SettingsError::WindowSize(value.to_string());
    let (w, h) = value.split_once(',').ok_or_else(err)?;
    let w: u16 = w.trim().parse().map_err(|_| err())?;
    let h: u16 = h.trim().parse().map_err(|_| err())?;
    if w == 0 || h == 0 {
        return Err(err());
    }
    Ok((w, h))
}

pub fn parse_color(name: &'static str, value: &str) -> Result<Vec3, SettingsError> {
    Srgba::hex(value)
        .map(|c| Vec3::new(c.red, c.green, c.blue))
        .map_err(|e| SettingsError::Color {
            name,
            value: value.to_string(),
            reason: e.to_string(),
        })
}
