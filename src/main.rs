use bevy::diagnostic::{FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin};
use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin};
use cave_of_nations::block::loader as block_loader;
use cave_of_nations::controls::ControlsPlugin;
use cave_of_nations::debug::DebugDumpPlugin;
use cave_of_nations::placement::loader as building_loader;
use cave_of_nations::settings::loader as settings_loader;
use cave_of_nations::simulation::SimulationPlugin;
use cave_of_nations::world::CaveWorld;

mod app;
use app::{draw_avatar, draw_placement_preview, draw_terrain, setup, sync_window_title};

fn main() {
    let settings = settings_loader::load_settings_from_dir(settings_loader::SETTINGS_DIR);
    let settings_watcher = settings_loader::setup_settings_watcher(settings_loader::SETTINGS_DIR)
        .unwrap_or_else(|_| settings_loader::SettingsWatcher::stub());

    let world = CaveWorld::new(&settings);

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Cave of Nations".into(),
                position: WindowPosition::Centered(MonitorSelection::Primary),
                present_mode: PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(FrameTimeDiagnosticsPlugin)
        .add_plugins(LogDiagnosticsPlugin::default());

    app.insert_resource(settings);
    app.insert_resource(settings_watcher);
    app.insert_resource(world);

    app.insert_resource(block_loader::load_palette_from_dir(block_loader::BLOCKS_DIR));
    app.insert_resource(
        block_loader::setup_palette_watcher(block_loader::BLOCKS_DIR).unwrap_or_else(|_| {
            block_loader::PaletteWatcher::stub()
        }),
    );
    app.insert_resource(building_loader::load_buildings_from_dir(building_loader::BUILDINGS_DIR));
    app.insert_resource(
        building_loader::setup_building_watcher(building_loader::BUILDINGS_DIR).unwrap_or_else(|_| {
            building_loader::BuildingWatcher::stub()
        }),
    );

    app.add_plugins(ControlsPlugin)
        .add_plugins(SimulationPlugin)
        .add_plugins(DebugDumpPlugin);

    app.add_systems(Startup, setup);

    app.add_systems(Update, settings_loader::check_settings_changes);
    app.add_systems(Update, block_loader::check_palette_changes);
    app.add_systems(Update, building_loader::check_building_changes);

    app.add_systems(Update, draw_terrain);
    app.add_systems(Update, draw_avatar);
    app.add_systems(Update, draw_placement_preview);
    app.add_systems(Update, sync_window_title);

    app.run();
}
