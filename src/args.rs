use clap::Parser;
use once_cell::sync::Lazy;

use crate::backdrop::Backdrop;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Animated backdrops and page shell for the NETiX landing page
pub struct Args {
    /// Initial window size, as width,height
    #[arg(long, default_value = "1280,800")]
    pub win: String,
    /// Backdrop shown at startup
    #[arg(long, value_enum, default_value_t = Backdrop::Network)]
    pub backdrop: Backdrop,
    /// Seed for all random placement (random if omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of dust particles in the particle field
    #[arg(long, default_value = "150")]
    pub field_particles: usize,
    /// Particle field drift speed multiplier
    #[arg(long, default_value = "0.01")]
    pub field_speed: f32,
    /// Depth of the particle field volume
    #[arg(long, default_value = "50")]
    pub field_depth: f32,
    /// Particle field colour, as #rrggbb
    #[arg(long, default_value = "#FFFFFF")]
    pub field_color: String,

    /// Number of helix particles (split evenly between both strands)
    #[arg(long, default_value = "180")]
    pub helix_particles: usize,
    /// Helix base colour, as #rrggbb
    #[arg(long, default_value = "#FFFFFF")]
    pub helix_color: String,
    /// Helix colour near the pointer, as #rrggbb
    #[arg(long, default_value = "#00f0ff")]
    pub hover_color: String,
    /// Connection distance (same-strand links form below an eighth of this)
    #[arg(long, default_value = "150")]
    pub connection_distance: f32,

    /// Number of network nodes, including the three central ones
    #[arg(long, default_value = "15")]
    pub nodes: usize,
    /// Maximum number of network edges
    #[arg(long, default_value = "25")]
    pub connections: usize,
    /// Packet spawn rate and speed multiplier
    #[arg(long, default_value = "1.0")]
    pub flow_speed: f32,
    /// Packet colour, as #rrggbb
    #[arg(long, default_value = "#00f0ff")]
    pub data_color: String,
}

pub static ARGS: Lazy<Args> = Lazy::new(Args::parse);
