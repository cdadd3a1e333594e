//! Debug utilities, including a system (F3 default) to dump the world state
//! and frame diagnostics to a timestamped text file in './debug-dumps/'.
//!
//! Useful for capturing a snapshot of a layout (seed, avatar, relics, depth
//! map) to reproduce a bug without attaching a debugger.
use crate::settings::Settings;
use crate::world::CaveWorld;
use bevy::diagnostic::{Diagnostic, DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use chrono::{DateTime, Utc};
use std::fmt::Write;
use std::fs;

/// Directory dumps are written to.
pub const DUMP_DIR: &str = "debug-dumps";

pub struct DebugDumpPlugin;

impl Plugin for DebugDumpPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, debug_input_system);
    }
}

/// Human-readable snapshot of the world.
///
/// # Arguments
/// * `world` - world to describe (mutable only to build the depth map lazily)
/// * `now` - timestamp written in the header
#[must_use]
pub fn world_snapshot_text(world: &mut CaveWorld, now: DateTime<Utc>) -> String {
    let dims = world.dims();
    let mut out = String::new();
    writeln!(out, "Timestamp: {} (epoch secs: {})", now.format("%Y-%m-%d %H:%M:%S"), now.timestamp()).ok();
    writeln!(out, "Grid: {}x{}x{} tile {} seed {}", dims.width, dims.height, dims.depth, world.tile_size(), world.seed()).ok();
    match world.avatar() {
        Some(at) => writeln!(out, "Avatar: ({}, {}) facing {:?}", at.x, at.y, world.facing()).ok(),
        None => writeln!(out, "Avatar: none").ok(),
    };
    let cam = world.camera();
    writeln!(
        out,
        "Camera: target {} pitch {:.3} yaw {:.3} distance {:.2}",
        cam.target(),
        cam.pitch(),
        cam.yaw(),
        cam.distance()
    )
    .ok();

    writeln!(out, "\nBlock counts:").ok();
    for (kind, count) in world.block_counts() {
        writeln!(out, "  {kind}: {count}").ok();
    }

    writeln!(out, "\nLedger (population {}):", world.ledger().population()).ok();
    for (kind, amount) in world.ledger().iter() {
        writeln!(out, "  {kind}: {amount}").ok();
    }
    writeln!(
        out,
        "Buildings: {} placed, {} pending",
        world.construction().placed().len(),
        world.construction().pending().count()
    )
    .ok();

    let relics: Vec<String> = world.relics().cells().map(|c| format!("({},{},{})", c.x, c.y, c.z)).collect();
    writeln!(out, "\nRelic cells ({}): {}", relics.len(), relics.join(" ")).ok();
    let exposed: Vec<String> = world.exposed_relics().iter().map(|c| format!("({},{})", c.x, c.y)).collect();
    writeln!(out, "Exposed relic columns: {}", exposed.join(" ")).ok();

    writeln!(out, "\nDepth map (rows by z):").ok();
    for row in world.surface_depth_map().to_rows() {
        let cells: Vec<String> = row.iter().map(|v| format!("{v:>3}")).collect();
        writeln!(out, "{}", cells.join("")).ok();
    }
    out
}

/// Write a dump when the `dump_debug` key (default F3) is pressed.
#[allow(clippy::needless_pass_by_value)]
fn debug_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    diagnostics: Option<Res<DiagnosticsStore>>,
    mut world: ResMut<CaveWorld>,
) {
    if !keys.just_pressed(settings.controls.key("dump_debug", KeyCode::F3)) {
        return;
    }

    let now = Utc::now();
    let fname = format!("{DUMP_DIR}/debug-{}.txt", now.timestamp());

    let mut out = String::new();
    if let Some(diagnostics) = diagnostics {
        let fps = diagnostics
            .get(&FrameTimeDiagnosticsPlugin::FPS)
            .and_then(Diagnostic::smoothed)
            .unwrap_or(0.0);
        let frame_time = diagnostics
            .get(&FrameTimeDiagnosticsPlugin::FRAME_TIME)
            .and_then(Diagnostic::smoothed)
            .unwrap_or(0.0);
        writeln!(out, "FPS: {fps:.1}, frame_time: {frame_time:.2} ms").ok();
    }
    out.push_str(&world_snapshot_text(&mut world, now));

    if let Err(e) = fs::create_dir_all(DUMP_DIR) {
        error!("debug dump: failed to create dir '{DUMP_DIR}': {e}");
        return;
    }
    if let Err(e) = fs::write(&fname, out) {
        error!("debug dump: failed to write {fname}: {e}");
    } else {
        info!("wrote debug dump: {fname}");
    }
}
