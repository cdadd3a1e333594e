//! Frame-driven systems that keep `CaveWorld` moving.
//!
//! The world itself is clock-free; these systems feed it time. Construction
//! ticks on a fixed repeating timer, motion advances by the frame delta, the
//! camera entity follows the rig, and world events are re-published as Bevy
//! events for anything else that wants them.
use crate::controls::MainCamera;
use crate::settings::Settings;
use crate::world::{CaveWorld, WorldEvent};
use bevy::log::{debug, info, warn};
use bevy::prelude::*;
use std::time::Duration;

/// Shortest accepted tick interval.
const MIN_TICK_SECS: f32 = 0.01;

/// Repeating timer for construction ticks.
#[derive(Resource)]
pub struct SimulationTimer(pub Timer);

impl SimulationTimer {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        SimulationTimer(Timer::from_seconds(
            tick_interval(settings),
            TimerMode::Repeating,
        ))
    }
}

/// Tick interval from settings, falling back to the default for bad values.
#[must_use]
pub fn tick_interval(settings: &Settings) -> f32 {
    let secs = settings.simulation.tick_seconds;
    if secs.is_finite() && secs >= MIN_TICK_SECS {
        secs
    } else {
        crate::settings::SimulationSettings::default().tick_seconds
    }
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let timer = app
            .world()
            .get_resource::<Settings>()
            .map_or_else(|| SimulationTimer::from_settings(&Settings::default()), SimulationTimer::from_settings);
        app.add_event::<WorldEvent>()
            .insert_resource(timer)
            .add_systems(
                Update,
                (
                    sync_tick_interval,
                    simulation_tick,
                    advance_motion,
                    sync_camera,
                    forward_world_events,
                    log_world_events,
                )
                    .chain(),
            );
    }
}

/// Run one construction tick per elapsed timer period.
#[allow(clippy::needless_pass_by_value)]
pub fn simulation_tick(time: Res<Time>, mut timer: ResMut<SimulationTimer>, mut world: ResMut<CaveWorld>) {
    timer.0.tick(time.delta());
    for _ in 0..timer.0.times_finished_this_tick() {
        world.tick();
    }
}

/// Keep the tick timer in step with hot-reloaded settings.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_tick_interval(settings: Res<Settings>, mut timer: ResMut<SimulationTimer>) {
    if !settings.is_changed() {
        return;
    }
    let secs = tick_interval(&settings);
    if (timer.0.duration().as_secs_f32() - secs).abs() > f32::EPSILON {
        timer.0.set_duration(Duration::from_secs_f32(secs));
        info!("simulation tick interval set to {secs}s");
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn advance_motion(time: Res<Time>, mut world: ResMut<CaveWorld>) {
    world.advance_motion(time.delta_seconds());
}

/// Copy the rig's pose onto the main camera.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_camera(world: Res<CaveWorld>, mut cameras: Query<&mut Transform, With<MainCamera>>) {
    let pose = world.camera().to_transform();
    for mut transform in &mut cameras {
        *transform = pose;
    }
}

/// Publish queued world events on the Bevy event bus.
pub fn forward_world_events(mut world: ResMut<CaveWorld>, mut writer: EventWriter<WorldEvent>) {
    let events = world.drain_events();
    if !events.is_empty() {
        writer.send_batch(events);
    }
}

pub fn log_world_events(mut reader: EventReader<WorldEvent>) {
    for event in reader.read() {
        match event {
            WorldEvent::BuildFailed { id, building, reason } => warn!("build #{id} ({building}) failed: {reason}"),
            WorldEvent::BuildCompleted { .. } | WorldEvent::WorldRebuilt { .. } => info!("{event:?}"),
            _ => debug!("{event:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockKind, ResourceKind};
    use crate::grid::{GridDims, VoxelGrid};
    use crate::placement::BuildingCatalog;

    fn small_settings() -> Settings {
        let mut settings = Settings::default();
        settings.world.width = 12;
        settings.world.height = 10;
        settings.world.depth = 12;
        settings.world.seed = Some(3);
        settings
    }

    #[test]
    fn bad_tick_interval_falls_back() {
        let mut settings = Settings::default();
        settings.simulation.tick_seconds = 0.0;
        assert_eq!(tick_interval(&settings), 0.5);
        settings.simulation.tick_seconds = f32::NAN;
        assert_eq!(tick_interval(&settings), 0.5);
        settings.simulation.tick_seconds = 2.0;
        assert_eq!(tick_interval(&settings), 2.0);
    }

    #[test]
    fn events_reach_the_bevy_bus() {
        let settings = small_settings();
        let mut app = App::new();
        app.insert_resource(settings.clone())
            .insert_resource(CaveWorld::new(&settings))
            .add_event::<WorldEvent>()
            .add_systems(Update, forward_world_events);

        app.world_mut().resource_mut::<CaveWorld>().rebuild(None);
        app.update();

        let events = app.world().resource::<Events<WorldEvent>>();
        let mut cursor = events.get_reader();
        assert!(cursor.read(events).any(|e| matches!(e, WorldEvent::WorldRebuilt { .. })));
        assert!(app.world_mut().resource_mut::<CaveWorld>().drain_events().is_empty());
    }

    #[test]
    fn tick_runs_queued_builds() {
        let settings = small_settings();
        let mut grid = VoxelGrid::new(GridDims::new(8, 6, 8));
        for c in grid.dims().iter_columns().collect::<Vec<_>>() {
            grid.set(c.x, 0, c.y, BlockKind::Den);
            grid.set(c.x, 1, c.y, BlockKind::Soil);
        }
        let mut world = CaveWorld::from_grid(grid, &settings);
        world.credit(ResourceKind::Soil, 10);
        let burrow = BuildingCatalog::default().get("burrow").cloned().unwrap();
        world.begin_placement(burrow);
        world.update_preview(IVec2::new(1, 1));
        assert!(world.commit_placement().is_some());

        let mut app = App::new();
        app.insert_resource(settings)
            .insert_resource(world)
            .insert_resource(SimulationTimer(Timer::from_seconds(0.5, TimerMode::Repeating)))
            .insert_resource(Time::<()>::default())
            .add_systems(Update, simulation_tick);

        app.world_mut().resource_mut::<Time>().advance_by(Duration::from_secs_f32(0.6));
        app.update();
        let world = app.world().resource::<CaveWorld>();
        assert_eq!(world.construction().pending().count(), 0);
        assert_eq!(world.construction().placed().len(), 1);
        assert_eq!(world.ledger().amount(ResourceKind::Soil), 6);
    }
}
