//! Input systems translating keyboard and pointer input into `CaveWorld`
//! commands.
//!
//! * keys: single steps, dig, build mode toggle/cycle, cancel, rebuild
//! * right drag orbits, middle drag pans, the wheel zooms
//! * left click walks to the picked column, or commits the preview in build mode
//!
//! Bindings come from `Settings::controls`; arrow keys always step as well.

use crate::block::pick_surface_point;
use crate::placement::BuildingCatalog;
use crate::settings::{ControlsSettings, Settings};
use crate::world::CaveWorld;
use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

/// Pixels per wheel "line" when the platform reports pixel scrolling.
const PIXELS_PER_LINE: f32 = 100.0;
/// Longest pick ray, in tiles.
const PICK_REACH_TILES: f32 = 500.0;

/// Marks the camera entity driven by the rig.
#[derive(Component)]
pub struct MainCamera;

/// Which catalog entry build mode uses.
#[derive(Resource, Default, Debug)]
pub struct BuildSelection {
    pub index: usize,
}

pub struct ControlsPlugin;

impl Plugin for ControlsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BuildSelection>()
            .add_systems(Update, (keyboard_commands, pointer_gestures, pointer_pick));
    }
}

/// Apply axis inversion from settings to a raw drag delta.
#[must_use]
pub fn gesture_delta(raw: Vec2, controls: &ControlsSettings) -> Vec2 {
    let mut d = raw;
    if controls.invert_x {
        d.x = -d.x;
    }
    if controls.invert_y {
        d.y = -d.y;
    }
    d
}

/// Wheel movement in lines, positive when scrolling up (toward the scene).
#[must_use]
pub fn scroll_lines(unit: MouseScrollUnit, y: f32) -> f32 {
    match unit {
        MouseScrollUnit::Line => y,
        MouseScrollUnit::Pixel => y / PIXELS_PER_LINE,
    }
}

/// Grid step requested by the movement keys pressed this frame.
fn step_from_keys(keys: &ButtonInput<KeyCode>, controls: &ControlsSettings) -> Option<IVec2> {
    let bindings = [
        (controls.key("forward", KeyCode::KeyW), KeyCode::ArrowUp, IVec2::new(0, -1)),
        (controls.key("back", KeyCode::KeyS), KeyCode::ArrowDown, IVec2::new(0, 1)),
        (controls.key("left", KeyCode::KeyA), KeyCode::ArrowLeft, IVec2::new(-1, 0)),
        (controls.key("right", KeyCode::KeyD), KeyCode::ArrowRight, IVec2::new(1, 0)),
    ];
    bindings
        .into_iter()
        .find(|(key, arrow, _)| keys.just_pressed(*key) || keys.just_pressed(*arrow))
        .map(|(_, _, step)| step)
}

/// Discrete keyboard commands.
#[allow(clippy::needless_pass_by_value)]
pub fn keyboard_commands(
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    catalog: Res<BuildingCatalog>,
    mut selection: ResMut<BuildSelection>,
    mut world: ResMut<CaveWorld>,
) {
    let controls = &settings.controls;

    if let Some(step) = step_from_keys(&keys, controls) {
        world.move_by(step);
    }
    if keys.just_pressed(controls.key("dig", KeyCode::Space)) {
        world.dig_forward();
    }
    if keys.just_pressed(controls.key("cycle_building", KeyCode::Tab)) {
        selection.index = selection.index.wrapping_add(1);
        if world.is_placing() {
            if let Some(template) = catalog.cycle(selection.index) {
                world.begin_placement(template.clone());
            }
        }
    }
    if keys.just_pressed(controls.key("build_mode", KeyCode::KeyB)) {
        if world.is_placing() {
            world.cancel_placement();
        } else if let Some(template) = catalog.cycle(selection.index) {
            world.begin_placement(template.clone());
        }
    }
    if keys.just_pressed(controls.key("cancel", KeyCode::Escape)) {
        world.cancel_placement();
    }
    if keys.just_pressed(controls.key("rebuild", KeyCode::KeyR)) {
        world.rebuild(None);
    }
}

/// Orbit, pan and zoom from mouse drags and the wheel.
#[allow(clippy::needless_pass_by_value)]
pub fn pointer_gestures(
    buttons: Res<ButtonInput<MouseButton>>,
    mut motion: EventReader<MouseMotion>,
    mut wheel: EventReader<MouseWheel>,
    settings: Res<Settings>,
    mut world: ResMut<CaveWorld>,
) {
    let drag: Vec2 = motion.read().map(|e| e.delta).sum();
    let scroll: f32 = wheel.read().map(|e| scroll_lines(e.unit, e.y)).sum();

    if drag != Vec2::ZERO {
        let delta = gesture_delta(drag, &settings.controls);
        if buttons.pressed(MouseButton::Right) {
            world.orbit(delta);
        } else if buttons.pressed(MouseButton::Middle) {
            world.pan(delta);
        }
    }
    if scroll != 0.0 {
        world.zoom(scroll);
    }
}

/// Cursor picking: preview or commit in build mode, otherwise click-to-move.
#[allow(clippy::needless_pass_by_value)]
pub fn pointer_pick(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut world: ResMut<CaveWorld>,
) {
    let placing = world.is_placing();
    let clicked = buttons.just_pressed(MouseButton::Left);
    if !placing && !clicked {
        return;
    }

    let Ok(window) = windows.get_single() else { return };
    let Some(cursor) = window.cursor_position() else { return };
    let Ok((camera, camera_tf)) = cameras.get_single() else { return };
    let Some(ray) = camera.viewport_to_world(camera_tf, cursor) else { return };

    let tile = world.tile_size();
    let Some(point) = pick_surface_point(world.grid(), tile, ray.origin, *ray.direction, PICK_REACH_TILES * tile) else {
        return;
    };

    if placing {
        world.update_preview_at(point);
        if clicked {
            world.commit_placement();
        }
    } else {
        world.move_to(point);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use crate::grid::{GridDims, VoxelGrid};

    fn flat_world() -> CaveWorld {
        let mut grid = VoxelGrid::new(GridDims::new(8, 6, 8));
        for c in grid.dims().iter_columns().collect::<Vec<_>>() {
            grid.set(c.x, 0, c.y, BlockKind::Den);
            grid.set(c.x, 1, c.y, BlockKind::Soil);
        }
        CaveWorld::from_grid(grid, &Settings::default())
    }

    fn app() -> App {
        let mut app = App::new();
        app.insert_resource(Settings::default())
            .insert_resource(BuildingCatalog::default())
            .insert_resource(ButtonInput::<KeyCode>::default())
            .init_resource::<BuildSelection>()
            .insert_resource(flat_world())
            .add_systems(Update, keyboard_commands);
        app
    }

    fn press(app: &mut App, key: KeyCode) {
        let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        keys.release_all();
        keys.clear();
        keys.press(key);
        app.update();
    }

    #[test]
    fn inversion_flips_axes() {
        let mut controls = ControlsSettings::default();
        assert_eq!(gesture_delta(Vec2::new(3.0, -2.0), &controls), Vec2::new(3.0, -2.0));
        controls.invert_x = true;
        controls.invert_y = true;
        assert_eq!(gesture_delta(Vec2::new(3.0, -2.0), &controls), Vec2::new(-3.0, 2.0));
    }

    #[test]
    fn pixel_scroll_is_scaled_to_lines() {
        assert_eq!(scroll_lines(MouseScrollUnit::Line, 2.0), 2.0);
        assert_eq!(scroll_lines(MouseScrollUnit::Pixel, 250.0), 2.5);
    }

    #[test]
    fn step_key_schedules_a_move() {
        let mut app = app();
        let start = app.world().resource::<CaveWorld>().avatar().unwrap();
        press(&mut app, KeyCode::KeyD);
        let mut world = app.world_mut().resource_mut::<CaveWorld>();
        assert!(world.motion().is_moving());
        world.finish_motion();
        assert_eq!(world.avatar(), Some(start + IVec2::new(1, 0)));
    }

    #[test]
    fn dig_key_digs_the_faced_column() {
        let mut app = app();
        press(&mut app, KeyCode::Space);
        let world = app.world().resource::<CaveWorld>();
        assert_eq!(world.block_counts().get(&BlockKind::Soil), Some(&63));
    }

    #[test]
    fn build_keys_toggle_and_cycle() {
        let mut app = app();
        press(&mut app, KeyCode::KeyB);
        assert!(app.world().resource::<CaveWorld>().is_placing());

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.world().resource::<BuildSelection>().index, 1);
        assert!(app.world().resource::<CaveWorld>().is_placing());

        press(&mut app, KeyCode::Escape);
        assert!(!app.world().resource::<CaveWorld>().is_placing());

        press(&mut app, KeyCode::KeyB);
        press(&mut app, KeyCode::KeyB);
        assert!(!app.world().resource::<CaveWorld>().is_placing());
    }
}
