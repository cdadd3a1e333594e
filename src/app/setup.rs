//! Startup systems for the scene around the cave.
//!
//! The world resource is inserted before the app runs; this only spawns the
//! camera driven by the rig and the lights.
use bevy::prelude::*;
use cave_of_nations::controls::MainCamera;
use cave_of_nations::world::CaveWorld;

/// Spawn the main camera at the rig's pose plus a key light and ambient fill.
///
/// # Arguments
/// - `commands`: Commands used to spawn entities and insert resources.
/// - `world`: The cave; its camera rig gives the initial camera transform.
#[allow(clippy::needless_pass_by_value)]
pub fn setup(mut commands: Commands, world: Res<CaveWorld>) {
    commands.spawn((
        Camera3dBundle {
            transform: world.camera().to_transform(),
            ..default()
        },
        MainCamera,
    ));

    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight {
            shadows_enabled: false,
            illuminance: 6000.0,
            ..default()
        },
        transform: Transform::from_xyz(1.0, 3.0, 2.0).looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });

    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.72, 0.78, 0.90),
        brightness: 400.0,
    });
    commands.insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.07)));
}
