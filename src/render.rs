use std::collections::HashMap;

use bevy::math::{Isometry2d, Isometry3d};
use bevy::prelude::*;
use bevy::window::{CursorMoved, PrimaryWindow};

use crate::backdrop::{Backdrop, BackdropScoped, BackdropSet, PacketsChanged, PointerMoved, Viewport};
use crate::field::ParticleField;
use crate::grid::InteractiveGrid;
use crate::helix::HelixField;
use crate::network::NetworkGraph;
use crate::settings::Settings;

const BACKGROUND: Color = Color::srgb(26.0 / 255.0, 26.0 / 255.0, 26.0 / 255.0);

#[derive(Component)]
struct FieldRoot;

#[derive(Component)]
struct FieldParticle(usize);

#[derive(Component)]
struct NetworkRoot;

#[derive(Component)]
struct NetworkNode(usize);

#[derive(Component)]
struct PacketMarker;

/// Packet markers by live packet id, plus hidden markers waiting to be reused.
#[derive(Resource, Default)]
struct MarkerPool {
    live: HashMap<u64, Entity>,
    free: Vec<Entity>,
}

impl MarkerPool {
    /// Takes back the marker of a finished packet.
    fn retire(&mut self, packet: u64) -> Option<Entity> {
        let entity = self.live.remove(&packet)?;
        self.free.push(entity);
        Some(entity)
    }

    /// Hands a pooled marker to a new packet. `None` means the pool is empty
    /// and the caller has to spawn one and [`MarkerPool::insert`] it.
    fn reuse(&mut self, packet: u64) -> Option<Entity> {
        let entity = self.free.pop()?;
        self.live.insert(packet, entity);
        Some(entity)
    }

    fn insert(&mut self, packet: u64, entity: Entity) {
        self.live.insert(packet, entity);
    }

    fn marker(&self, packet: u64) -> Option<Entity> {
        self.live.get(&packet).copied()
    }
}

/// Mesh and material shared by every packet marker.
#[derive(Resource)]
struct PacketAssets {
    mesh: Handle<Mesh>,
    material: Handle<StandardMaterial>,
}

/// Window input, cameras and drawing for whichever backdrop is mounted.
pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(BACKGROUND))
            .add_systems(PreUpdate, track_viewport)
            .add_systems(Update, forward_cursor.before(BackdropSet::Input))
            .add_systems(OnEnter(Backdrop::Field), spawn_field_view)
            .add_systems(OnEnter(Backdrop::Helix), spawn_helix_camera)
            .add_systems(OnEnter(Backdrop::Grid), spawn_grid_camera)
            .add_systems(OnEnter(Backdrop::Network), spawn_network_view)
            .add_systems(OnExit(Backdrop::Network), release_packet_assets)
            .add_systems(
                Update,
                (
                    sync_field_view.run_if(in_state(Backdrop::Field)),
                    draw_helix.run_if(in_state(Backdrop::Helix)),
                    draw_grid.run_if(in_state(Backdrop::Grid)),
                    (sync_network_view, sync_packet_markers, draw_network_edges)
                        .run_if(in_state(Backdrop::Network)),
                )
                    .after(BackdropSet::Simulate),
            );
    }
}

fn track_viewport(windows: Query<&Window, With<PrimaryWindow>>, mut viewport: ResMut<Viewport>) {
    let Ok(window) = windows.single() else {
        return;
    };
    let size = Vec2::new(window.width(), window.height());
    if viewport.size != size {
        debug!("Viewport resized to {}x{}", size.x, size.y);
        viewport.size = size;
    }
}

fn forward_cursor(mut cursor: MessageReader<CursorMoved>, mut moved: MessageWriter<PointerMoved>) {
    for event in cursor.read() {
        moved.write(PointerMoved {
            position: event.position,
        });
    }
}

fn perspective_camera(distance: f32, fov_degrees: f32) -> impl Bundle {
    (
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: fov_degrees.to_radians(),
            near: 0.1,
            far: 1000.0,
            ..default()
        }),
        Transform::from_xyz(0.0, 0.0, distance).looking_at(Vec3::ZERO, Vec3::Y),
        BackdropScoped,
    )
}

fn rgb(c: Vec3) -> Color {
    Color::srgb(c.x, c.y, c.z)
}

fn spawn_field_view(
    mut commands: Commands,
    settings: Res<Settings>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn(perspective_camera(settings.field.camera_distance, settings.field.fov_degrees));

    let mesh = meshes.add(Sphere::new(0.1));
    let material = materials.add(StandardMaterial {
        base_color: rgb(settings.field.color).with_alpha(0.4),
        unlit: true,
        alpha_mode: AlphaMode::Add,
        ..default()
    });

    // Particle placement comes from the controller on the first sync.
    commands
        .spawn((Transform::default(), Visibility::default(), FieldRoot, BackdropScoped))
        .with_children(|parent| {
            for i in 0..settings.field.particle_count {
                parent.spawn((
                    Mesh3d(mesh.clone()),
                    MeshMaterial3d(material.clone()),
                    Transform::default(),
                    FieldParticle(i),
                ));
            }
        });
}

fn sync_field_view(
    field: Option<Res<ParticleField>>,
    mut roots: Query<&mut Transform, (With<FieldRoot>, Without<FieldParticle>)>,
    mut particles: Query<(&FieldParticle, &mut Transform), Without<FieldRoot>>,
) {
    let Some(field) = field else {
        return;
    };
    for mut root in &mut roots {
        root.rotation = Quat::from_euler(EulerRot::XYZ, field.rotation.x, field.rotation.y, 0.0);
    }
    for (particle, mut transform) in &mut particles {
        if let (Some(position), Some(size)) = (field.positions.get(particle.0), field.sizes.get(particle.0)) {
            transform.translation = *position;
            transform.scale = Vec3::splat(*size);
        }
    }
}

fn spawn_helix_camera(mut commands: Commands, settings: Res<Settings>) {
    commands.spawn(perspective_camera(settings.helix.camera_distance, settings.helix.fov_degrees));
}

fn draw_helix(helix: Option<Res<HelixField>>, mut gizmos: Gizmos) {
    let Some(helix) = helix else {
        return;
    };
    let line_color = Color::srgba(1.0, 1.0, 1.0, 0.08);
    for (a, b) in &helix.connections {
        gizmos.line(*a, *b, line_color);
    }
    for ((position, color), size) in helix.positions.iter().zip(&helix.colors).zip(&helix.sizes) {
        gizmos.sphere(Isometry3d::from_translation(*position), size * 0.25, rgb(*color).with_alpha(0.5));
    }
}

fn spawn_grid_camera(mut commands: Commands) {
    commands.spawn((Camera2d, BackdropScoped));
}

fn draw_grid(grid: Option<Res<InteractiveGrid>>, mut gizmos: Gizmos) {
    let Some(grid) = grid else {
        return;
    };
    let viewport = grid.viewport();
    // Window pixels (origin top left, y down) to 2D world space centred on the camera.
    let to_world = |p: Vec2| Vec2::new(p.x - viewport.x / 2.0, viewport.y / 2.0 - p.y);

    for line in grid.lines() {
        gizmos.line_2d(to_world(line.from), to_world(line.to), Color::srgba(1.0, 1.0, 1.0, line.alpha));
    }

    let Some(highlight) = grid.highlight() else {
        return;
    };
    let cell = grid.settings().cell_size;
    let glow_radius = grid.settings().glow_radius;
    for c in &highlight.cells {
        let color = Color::hsla(highlight.hue, 1.0, 0.7, c.opacity);
        gizmos.line_2d(to_world(c.at - Vec2::Y * cell), to_world(c.at + Vec2::Y * cell), color);
        gizmos.line_2d(to_world(c.at - Vec2::X * cell), to_world(c.at + Vec2::X * cell), color);
        if let Some(glow) = c.glow {
            gizmos.circle_2d(
                Isometry2d::from_translation(to_world(c.at)),
                glow_radius,
                Color::hsla(highlight.hue, 1.0, 0.7, glow),
            );
        }
    }
}

fn spawn_network_view(
    mut commands: Commands,
    settings: Res<Settings>,
    graph: Option<Res<NetworkGraph>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let s = &settings.network;
    commands.spawn(perspective_camera(s.camera_distance, s.fov_degrees));

    let node_mesh = meshes.add(Sphere::new(0.4));
    let node_material = materials.add(StandardMaterial {
        base_color: rgb(s.node_color).with_alpha(0.6),
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        ..default()
    });
    commands.insert_resource(PacketAssets {
        mesh: meshes.add(Sphere::new(0.15)),
        material: materials.add(StandardMaterial {
            base_color: rgb(s.data_color).with_alpha(0.7),
            unlit: true,
            alpha_mode: AlphaMode::Blend,
            ..default()
        }),
    });
    commands.insert_resource(MarkerPool::default());

    let node_count = graph.map_or(s.node_count, |g| g.nodes.len());
    commands
        .spawn((Transform::default(), Visibility::default(), NetworkRoot, BackdropScoped))
        .with_children(|parent| {
            for i in 0..node_count {
                parent.spawn((
                    Mesh3d(node_mesh.clone()),
                    MeshMaterial3d(node_material.clone()),
                    Transform::default(),
                    NetworkNode(i),
                ));
            }
        });
}

fn release_packet_assets(mut commands: Commands) {
    commands.remove_resource::<PacketAssets>();
    commands.remove_resource::<MarkerPool>();
}

fn sync_network_view(
    graph: Option<Res<NetworkGraph>>,
    mut roots: Query<&mut Transform, (With<NetworkRoot>, Without<NetworkNode>)>,
    mut nodes: Query<(&NetworkNode, &mut Transform), Without<NetworkRoot>>,
) {
    let Some(graph) = graph else {
        return;
    };
    for mut root in &mut roots {
        root.rotation = Quat::from_rotation_y(graph.rotation);
    }
    for (node, mut transform) in &mut nodes {
        if let Some(n) = graph.nodes.get(node.0) {
            transform.translation = n.position;
            transform.scale = Vec3::splat(n.scale);
        }
    }
}

/// Hands markers to spawned packets and hides the markers of retired ones,
/// then moves every live marker to its packet.
fn sync_packet_markers(
    mut commands: Commands,
    mut changes: MessageReader<PacketsChanged>,
    graph: Option<Res<NetworkGraph>>,
    assets: Option<Res<PacketAssets>>,
    pool: Option<ResMut<MarkerPool>>,
    roots: Query<Entity, With<NetworkRoot>>,
    mut markers: Query<(&mut Transform, &mut Visibility), With<PacketMarker>>,
) {
    let (Some(graph), Some(assets), Some(mut pool)) = (graph, assets, pool) else {
        return;
    };
    let Ok(root) = roots.single() else {
        return;
    };

    for change in changes.read() {
        for &id in &change.0.spawned {
            match pool.reuse(id) {
                Some(entity) => {
                    if let Ok((_, mut visibility)) = markers.get_mut(entity) {
                        *visibility = Visibility::Inherited;
                    }
                }
                None => {
                    let start = graph
                        .packets
                        .iter()
                        .find(|p| p.id == id)
                        .map(|p| p.position(&graph.nodes))
                        .unwrap_or_default();
                    let entity = commands
                        .spawn((
                            Mesh3d(assets.mesh.clone()),
                            MeshMaterial3d(assets.material.clone()),
                            Transform::from_translation(start),
                            Visibility::Inherited,
                            PacketMarker,
                        ))
                        .id();
                    commands.entity(root).add_child(entity);
                    pool.insert(id, entity);
                }
            }
        }
        for &id in &change.0.retired {
            if let Some(entity) = pool.retire(id) {
                if let Ok((_, mut visibility)) = markers.get_mut(entity) {
                    *visibility = Visibility::Hidden;
                }
            }
        }
    }

    for packet in &graph.packets {
        let Some(entity) = pool.marker(packet.id) else {
            continue;
        };
        if let Ok((mut transform, _)) = markers.get_mut(entity) {
            transform.translation = packet.position(&graph.nodes);
        }
    }
}

fn draw_network_edges(graph: Option<Res<NetworkGraph>>, settings: Res<Settings>, mut gizmos: Gizmos) {
    let Some(graph) = graph else {
        return;
    };
    let spin = Quat::from_rotation_y(graph.rotation);
    let color = rgb(settings.network.connection_color).with_alpha(0.2);
    for &(a, b) in &graph.edges {
        let (Some(start), Some(end)) = (graph.nodes.get(a), graph.nodes.get(b)) else {
            continue;
        };
        gizmos.line(spin * start.position, spin * end.position, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn retired_markers_are_reused() {
        let e = entities(2);
        let mut pool = MarkerPool::default();
        assert_eq!(pool.reuse(0), None);
        pool.insert(0, e[0]);
        pool.insert(1, e[1]);

        assert_eq!(pool.retire(0), Some(e[0]));
        assert_eq!(pool.marker(0), None);
        // Retiring twice does not put the marker in the pool twice.
        assert_eq!(pool.retire(0), None);

        assert_eq!(pool.reuse(2), Some(e[0]));
        assert_eq!(pool.marker(2), Some(e[0]));
        assert_eq!(pool.marker(1), Some(e[1]));
        assert_eq!(pool.reuse(3), None);
    }

    #[test]
    fn pool_never_grows_past_the_live_peak() {
        let mut world = World::new();
        let mut pool = MarkerPool::default();
        let mut spawned = 0;
        // Three packets in flight at a time, each retiring two ticks after it starts.
        for id in 0..50u64 {
            if pool.reuse(id).is_none() {
                pool.insert(id, world.spawn_empty().id());
                spawned += 1;
            }
            if id >= 2 {
                pool.retire(id - 2);
            }
        }
        assert_eq!(spawned, 3);
        assert_eq!(pool.live.len(), 2);
    }
}
