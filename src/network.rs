use std::f32::consts::PI;

use bevy::math::Vec3;
use bevy::prelude::Resource;
use rand::Rng;

use crate::settings::NetworkSettings;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    pub position: Vec3,
    pub scale: f32,
    pub central: bool,
}

/// A marker travelling along one edge. `id` is unique for the lifetime of the
/// graph so renderers can tie a pooled marker to it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Packet {
    pub id: u64,
    pub start: usize,
    pub end: usize,
    pub progress: f32,
    pub speed: f32,
}

impl Packet {
    pub fn position(&self, nodes: &[Node]) -> Vec3 {
        nodes[self.start].position.lerp(nodes[self.end].position, self.progress)
    }
}

/// What changed during one tick: packets created and packets that reached the
/// end of their edge and were dropped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetworkTick {
    pub spawned: Vec<u64>,
    pub retired: Vec<u64>,
}

#[derive(Resource, Clone, Debug)]
pub struct NetworkGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<(usize, usize)>,
    pub packets: Vec<Packet>,
    /// Rotation of the whole graph around the y axis, in radians.
    pub rotation: f32,
    next_packet_id: u64,
    settings: NetworkSettings,
}

/// Whether an element spanning `top..top + height` in page pixels overlaps the
/// viewport at the given scroll position.
pub fn container_in_view(top: f32, height: f32, scroll_y: f32, viewport_height: f32) -> bool {
    let on_screen_top = top - scroll_y;
    on_screen_top < viewport_height && on_screen_top + height > 0.0
}

impl NetworkGraph {
    pub fn new(settings: &NetworkSettings, rng: &mut impl Rng) -> NetworkGraph {
        let central = settings.central_nodes.min(settings.node_count);
        let mut nodes = Vec::with_capacity(settings.node_count);

        for i in 0..central {
            let angle = i as f32 / central as f32 * PI * 2.0;
            nodes.push(Node {
                position: Vec3::new(angle.cos(), angle.sin(), 0.0) * settings.central_radius,
                scale: 1.5,
                central: true,
            });
        }
        let (inner, outer) = settings.outer_radius;
        for _ in central..settings.node_count {
            let radius = inner + rng.random::<f32>() * (outer - inner);
            let angle = rng.random::<f32>() * PI * 2.0;
            let height = (rng.random::<f32>() - 0.5) * settings.outer_height;
            nodes.push(Node {
                position: Vec3::new(angle.cos() * radius, angle.sin() * radius, height),
                scale: 0.7 + rng.random::<f32>() * 0.6,
                central: false,
            });
        }

        let edges = build_edges(settings, central, rng);

        NetworkGraph {
            nodes,
            edges,
            packets: Vec::new(),
            rotation: 0.0,
            next_packet_id: 0,
            settings: settings.clone(),
        }
    }

    pub fn settings(&self) -> &NetworkSettings {
        &self.settings
    }

    pub fn tick(&mut self, in_view: bool, rng: &mut impl Rng) -> NetworkTick {
        let mut outcome = NetworkTick::default();
        if !in_view {
            return outcome;
        }

        self.rotation += self.settings.spin_per_frame;

        let flow = self.settings.flow_speed;
        let spawn_chance = (self.settings.spawn_chance * flow as f64).clamp(0.0, 1.0);
        if !self.edges.is_empty() && rng.random_bool(spawn_chance) {
            let (start, end) = self.edges[rng.random_range(0..self.edges.len())];
            let id = self.next_packet_id;
            self.next_packet_id += 1;
            self.packets.push(Packet {
                id,
                start,
                end,
                progress: 0.0,
                speed: 0.01 + rng.random::<f32>() * 0.02 * flow,
            });
            outcome.spawned.push(id);
        }

        for packet in &mut self.packets {
            packet.progress += packet.speed;
        }
        let retired = &mut outcome.retired;
        self.packets.retain(|packet| {
            if packet.progress >= 1.0 {
                retired.push(packet.id);
                false
            } else {
                true
            }
        });

        outcome
    }
}

/// Central nodes form a clique; every other node hangs off a random central
/// node and sometimes links to another peripheral node. Truncated to the
/// configured edge count.
fn build_edges(settings: &NetworkSettings, central: usize, rng: &mut impl Rng) -> Vec<(usize, usize)> {
    let n = settings.node_count;
    let cap = settings.connection_count;
    let mut edges = Vec::new();

    for i in 0..central {
        for j in i + 1..central {
            edges.push((i, j));
        }
    }

    let peripheral = n.saturating_sub(central);
    for i in central..n {
        if central > 0 {
            edges.push((rng.random_range(0..central), i));
        }
        // A peer link needs some other peripheral node to point at.
        if peripheral >= 2 && rng.random_bool(settings.peer_link_chance.clamp(0.0, 1.0)) && edges.len() < cap {
            let mut other = rng.random_range(central..n);
            while other == i {
                other = rng.random_range(central..n);
            }
            edges.push((i, other));
        }
    }

    edges.truncate(cap);
    edges
}
