use bevy::prelude::*;
use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::field::ParticleField;
use crate::grid::InteractiveGrid;
use crate::helix::{pointer_ndc, HelixField};
use crate::network::{container_in_view, NetworkGraph, NetworkTick};
use crate::settings::Settings;

/// The animated background currently mounted. Exactly one is live at a time;
/// leaving a state tears its controller down.
#[derive(States, ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Backdrop {
    Field,
    Helix,
    Grid,
    #[default]
    Network,
}

impl Backdrop {
    pub const ALL: [Backdrop; 4] = [Backdrop::Field, Backdrop::Helix, Backdrop::Grid, Backdrop::Network];

    /// 1-based, matching the digit keys.
    pub fn from_number(n: u32) -> Option<Backdrop> {
        Self::ALL.get((n as usize).checked_sub(1)?).copied()
    }

    pub fn next(self) -> Backdrop {
        let i = Self::ALL.iter().position(|b| *b == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Backdrop::Field => "Particle field",
            Backdrop::Helix => "Helix",
            Backdrop::Grid => "Interactive grid",
            Backdrop::Network => "Network",
        }
    }
}

/// Marks root entities owned by the mounted backdrop; they are despawned on exit.
#[derive(Component, Default)]
pub struct BackdropScoped;

/// Size of the host surface in logical pixels.
#[derive(Resource, Clone, Copy, Debug)]
pub struct Viewport {
    pub size: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            size: Vec2::new(1280.0, 800.0),
        }
    }
}

impl Viewport {
    pub fn aspect(&self) -> f32 {
        if self.size.y > 0.0 {
            self.size.x / self.size.y
        } else {
            1.0
        }
    }
}

/// Vertical page scroll in pixels.
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct PageScroll {
    pub y: f32,
}

/// Pointer moved, in window pixels with the origin at the top left.
#[derive(Message, Clone, Copy, Debug)]
pub struct PointerMoved {
    pub position: Vec2,
}

/// Rebuild the mounted controller from scratch.
#[derive(Message, Clone, Copy, Debug, Default)]
pub struct ResetBackdrop;

/// Packets created and dropped by the network graph, in the order it happened.
/// Renderers use it to hand out and take back packet markers.
#[derive(Message, Clone, Debug)]
pub struct PacketsChanged(pub NetworkTick);

/// How many more frames the controllers may advance. `u32::MAX` means free
/// running, 0 means paused.
#[derive(Resource, Clone, Copy, Debug)]
pub struct FrameBudget {
    pub frames_to_show: u32,
}

impl Default for FrameBudget {
    fn default() -> Self {
        FrameBudget {
            frames_to_show: u32::MAX,
        }
    }
}

impl FrameBudget {
    pub fn is_paused(&self) -> bool {
        self.frames_to_show == 0
    }

    pub fn toggle_pause(&mut self) {
        self.frames_to_show = if self.is_paused() { u32::MAX } else { 0 };
    }

    pub fn step(&mut self, frames: u32) {
        self.frames_to_show = frames;
    }

    fn spend(&mut self) {
        if self.frames_to_show != u32::MAX {
            self.frames_to_show = self.frames_to_show.saturating_sub(1);
        }
    }
}

#[derive(Resource)]
pub struct BackdropRng(pub StdRng);

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum BackdropSet {
    /// Pointer and resize handling.
    Input,
    /// Controller ticks.
    Simulate,
}

/// Controller state, mounting and per-frame updates. Drawing lives in
/// [`crate::render::RenderPlugin`] so this plugin runs headless.
pub struct BackdropPlugin {
    pub settings: Settings,
    pub initial: Backdrop,
}

impl Plugin for BackdropPlugin {
    fn build(&self, app: &mut App) {
        let rng = match self.settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        app.insert_resource(self.settings.clone())
            .insert_resource(BackdropRng(rng))
            .init_resource::<Viewport>()
            .init_resource::<PageScroll>()
            .init_resource::<FrameBudget>()
            .add_message::<PointerMoved>()
            .add_message::<ResetBackdrop>()
            .add_message::<PacketsChanged>()
            .insert_state(self.initial)
            .configure_sets(Update, (BackdropSet::Input, BackdropSet::Simulate).chain())
            .add_systems(OnEnter(Backdrop::Field), mount_field)
            .add_systems(OnEnter(Backdrop::Helix), mount_helix)
            .add_systems(OnEnter(Backdrop::Grid), mount_grid)
            .add_systems(OnEnter(Backdrop::Network), mount_network)
            .add_systems(OnExit(Backdrop::Field), (unmount::<ParticleField>, despawn_scoped))
            .add_systems(OnExit(Backdrop::Helix), (unmount::<HelixField>, despawn_scoped))
            .add_systems(OnExit(Backdrop::Grid), (unmount::<InteractiveGrid>, despawn_scoped))
            .add_systems(OnExit(Backdrop::Network), (unmount::<NetworkGraph>, despawn_scoped))
            .add_systems(
                Update,
                (
                    reset_backdrop,
                    track_helix_pointer.run_if(in_state(Backdrop::Helix)),
                    track_grid_pointer.run_if(in_state(Backdrop::Grid)),
                )
                    .in_set(BackdropSet::Input),
            )
            .add_systems(
                Update,
                (
                    tick_field.run_if(in_state(Backdrop::Field)),
                    tick_helix.run_if(in_state(Backdrop::Helix)),
                    tick_grid.run_if(in_state(Backdrop::Grid)),
                    tick_network.run_if(in_state(Backdrop::Network)),
                )
                    .run_if(frames_remaining)
                    .in_set(BackdropSet::Simulate),
            )
            .add_systems(PostUpdate, spend_frame);
    }
}

fn frames_remaining(budget: Res<FrameBudget>) -> bool {
    !budget.is_paused()
}

fn spend_frame(mut budget: ResMut<FrameBudget>) {
    budget.spend();
}

fn mount_field(mut commands: Commands, settings: Res<Settings>, mut rng: ResMut<BackdropRng>) {
    info!("Mounting particle field ({} particles)", settings.field.particle_count);
    commands.insert_resource(ParticleField::new(&settings.field, &mut rng.0));
}

fn mount_helix(mut commands: Commands, settings: Res<Settings>, mut rng: ResMut<BackdropRng>) {
    info!("Mounting helix ({} particles)", settings.helix.particle_count);
    commands.insert_resource(HelixField::new(&settings.helix, &mut rng.0));
}

fn mount_grid(mut commands: Commands, settings: Res<Settings>, viewport: Res<Viewport>) {
    info!("Mounting interactive grid");
    commands.insert_resource(InteractiveGrid::new(&settings.grid, viewport.size));
}

fn mount_network(mut commands: Commands, settings: Res<Settings>, mut rng: ResMut<BackdropRng>) {
    let graph = NetworkGraph::new(&settings.network, &mut rng.0);
    info!("Mounting network ({} nodes, {} edges)", graph.nodes.len(), graph.edges.len());
    commands.insert_resource(graph);
}

fn unmount<T: Resource>(mut commands: Commands) {
    debug!("Unmounting {}", std::any::type_name::<T>());
    commands.remove_resource::<T>();
}

fn despawn_scoped(mut commands: Commands, scoped: Query<Entity, With<BackdropScoped>>) {
    for entity in &scoped {
        commands.entity(entity).despawn();
    }
}

fn reset_backdrop(
    mut requests: MessageReader<ResetBackdrop>,
    mut commands: Commands,
    state: Res<State<Backdrop>>,
    settings: Res<Settings>,
    viewport: Res<Viewport>,
    graph: Option<Res<NetworkGraph>>,
    mut changes: MessageWriter<PacketsChanged>,
    mut rng: ResMut<BackdropRng>,
) {
    if requests.read().last().is_none() {
        return;
    }
    info!("Resetting {}", state.get().label());
    match state.get() {
        Backdrop::Field => commands.insert_resource(ParticleField::new(&settings.field, &mut rng.0)),
        Backdrop::Helix => commands.insert_resource(HelixField::new(&settings.helix, &mut rng.0)),
        Backdrop::Grid => commands.insert_resource(InteractiveGrid::new(&settings.grid, viewport.size)),
        Backdrop::Network => {
            // The new graph starts its packet ids over, so the old packets go first.
            if let Some(old) = graph {
                let retired: Vec<u64> = old.packets.iter().map(|p| p.id).collect();
                if !retired.is_empty() {
                    changes.write(PacketsChanged(NetworkTick {
                        spawned: Vec::new(),
                        retired,
                    }));
                }
            }
            commands.insert_resource(NetworkGraph::new(&settings.network, &mut rng.0));
        }
    }
}

fn track_helix_pointer(
    mut moves: MessageReader<PointerMoved>,
    viewport: Res<Viewport>,
    helix: Option<ResMut<HelixField>>,
) {
    let Some(mut helix) = helix else {
        return;
    };
    if let Some(last) = moves.read().last() {
        helix.set_pointer(pointer_ndc(last.position, viewport.size));
    }
}

fn track_grid_pointer(mut moves: MessageReader<PointerMoved>, time: Res<Time>, grid: Option<ResMut<InteractiveGrid>>) {
    let Some(mut grid) = grid else {
        return;
    };
    for moved in moves.read() {
        grid.pointer_moved(moved.position, time.elapsed());
    }
}

fn tick_field(field: Option<ResMut<ParticleField>>, scroll: Res<PageScroll>) {
    if let Some(mut field) = field {
        field.tick(scroll.y);
    }
}

fn tick_helix(helix: Option<ResMut<HelixField>>, viewport: Res<Viewport>, mut rng: ResMut<BackdropRng>) {
    if let Some(mut helix) = helix {
        helix.tick(viewport.aspect(), &mut rng.0);
    }
}

fn tick_grid(grid: Option<ResMut<InteractiveGrid>>, viewport: Res<Viewport>, time: Res<Time>) {
    let Some(mut grid) = grid else {
        return;
    };
    if grid.viewport() != viewport.size {
        grid.resize(viewport.size);
    }
    grid.tick(time.elapsed());
}

fn tick_network(
    graph: Option<ResMut<NetworkGraph>>,
    viewport: Res<Viewport>,
    scroll: Res<PageScroll>,
    mut changes: MessageWriter<PacketsChanged>,
    mut rng: ResMut<BackdropRng>,
) {
    let Some(mut graph) = graph else {
        return;
    };
    let s = graph.settings();
    let in_view = container_in_view(s.container_top, s.container_height, scroll.y, viewport.size.y);
    let outcome = graph.tick(in_view, &mut rng.0);
    if !outcome.spawned.is_empty() || !outcome.retired.is_empty() {
        trace!("packets: +{:?} -{:?}", outcome.spawned, outcome.retired);
        changes.write(PacketsChanged(outcome));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::state::app::StatesPlugin;

    fn headless(initial: Backdrop) -> App {
        headless_with(Settings::default(), initial)
    }

    fn headless_with(settings: Settings, initial: Backdrop) -> App {
        let mut app = App::new();
        app.add_plugins((
            MinimalPlugins,
            StatesPlugin,
            BackdropPlugin {
                settings: Settings {
                    seed: Some(99),
                    ..settings
                },
                initial,
            },
        ));
        app.update();
        app
    }

    #[derive(Resource, Default)]
    struct PacketLog {
        spawned: Vec<u64>,
        retired: Vec<u64>,
    }

    fn log_packets(mut changes: MessageReader<PacketsChanged>, mut log: ResMut<PacketLog>) {
        for change in changes.read() {
            log.spawned.extend(&change.0.spawned);
            log.retired.extend(&change.0.retired);
        }
    }

    fn busy_network() -> App {
        let mut settings = Settings::default();
        settings.network.spawn_chance = 1.0;
        let mut app = headless_with(settings, Backdrop::Network);
        app.init_resource::<PacketLog>()
            .add_systems(Update, log_packets.after(BackdropSet::Simulate));
        app
    }

    #[test]
    fn network_ticks_report_packet_changes() {
        let mut app = busy_network();
        for _ in 0..4 {
            app.update();
        }
        let live: Vec<u64> = app.world().resource::<NetworkGraph>().packets.iter().map(|p| p.id).collect();
        let log = app.world().resource::<PacketLog>();
        assert_eq!(log.spawned.len(), 4);
        for id in &log.spawned {
            assert!(live.contains(id));
        }
        assert!(log.retired.is_empty());
    }

    #[test]
    fn reset_retires_live_packets() {
        let mut app = busy_network();
        for _ in 0..3 {
            app.update();
        }
        let live: Vec<u64> = app.world().resource::<NetworkGraph>().packets.iter().map(|p| p.id).collect();
        assert!(!live.is_empty());

        app.world_mut().write_message(ResetBackdrop);
        app.update();
        let log = app.world().resource::<PacketLog>();
        for id in &live {
            assert!(log.retired.contains(id), "packet {id} kept its marker after reset");
        }
    }

    fn switch_to(app: &mut App, backdrop: Backdrop) {
        app.world_mut().resource_mut::<NextState<Backdrop>>().set(backdrop);
        app.update();
    }

    #[test]
    fn backdrop_numbering() {
        assert_eq!(Backdrop::from_number(1), Some(Backdrop::Field));
        assert_eq!(Backdrop::from_number(4), Some(Backdrop::Network));
        assert_eq!(Backdrop::from_number(0), None);
        assert_eq!(Backdrop::from_number(5), None);
        assert_eq!(Backdrop::Network.next(), Backdrop::Field);
    }

    #[test]
    fn frame_budget_counts_down() {
        let mut budget = FrameBudget::default();
        budget.spend();
        assert_eq!(budget.frames_to_show, u32::MAX);
        budget.step(2);
        budget.spend();
        budget.spend();
        budget.spend();
        assert!(budget.is_paused());
        budget.toggle_pause();
        assert!(!budget.is_paused());
    }

    #[test]
    fn mounts_and_tears_down() {
        let mut app = headless(Backdrop::Helix);
        assert!(app.world().contains_resource::<HelixField>());
        app.world_mut().spawn(BackdropScoped);

        switch_to(&mut app, Backdrop::Grid);
        assert!(!app.world().contains_resource::<HelixField>());
        assert!(app.world().contains_resource::<InteractiveGrid>());
        let mut scoped = app.world_mut().query_filtered::<Entity, With<BackdropScoped>>();
        assert_eq!(scoped.iter(app.world()).count(), 0);

        for backdrop in Backdrop::ALL {
            switch_to(&mut app, backdrop);
        }
        assert!(app.world().contains_resource::<NetworkGraph>());
        assert!(!app.world().contains_resource::<ParticleField>());
        assert!(!app.world().contains_resource::<HelixField>());
        assert!(!app.world().contains_resource::<InteractiveGrid>());
    }

    #[test]
    fn pointer_listener_stops_after_teardown() {
        let mut app = headless(Backdrop::Grid);
        app.world_mut().write_message(PointerMoved {
            position: Vec2::new(100.0, 100.0),
        });
        app.update();
        assert!(app.world().resource::<InteractiveGrid>().activity.is_moving());

        switch_to(&mut app, Backdrop::Field);
        app.world_mut().write_message(PointerMoved {
            position: Vec2::new(200.0, 100.0),
        });
        app.update();
        assert!(!app.world().contains_resource::<InteractiveGrid>());
    }

    #[test]
    fn paused_controllers_do_not_advance() {
        let mut app = headless(Backdrop::Field);
        app.world_mut().resource_mut::<FrameBudget>().step(0);
        let before = app.world().resource::<ParticleField>().positions.clone();
        app.update();
        app.update();
        assert_eq!(app.world().resource::<ParticleField>().positions, before);

        app.world_mut().resource_mut::<FrameBudget>().step(1);
        app.update();
        let after = app.world().resource::<ParticleField>().positions.clone();
        assert_ne!(after, before);
        app.update();
        assert_eq!(app.world().resource::<ParticleField>().positions, after);
    }

    #[test]
    fn reset_rebuilds_controller() {
        let mut app = headless(Backdrop::Network);
        let before = app.world().resource::<NetworkGraph>().nodes.clone();
        app.world_mut().write_message(ResetBackdrop);
        app.update();
        let after = &app.world().resource::<NetworkGraph>().nodes;
        assert_eq!(after.len(), before.len());
        assert_ne!(after[5].position, before[5].position);
    }
}
