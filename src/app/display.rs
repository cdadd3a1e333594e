//! Window title status line.
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use cave_of_nations::block::ResourceKind;
use cave_of_nations::world::CaveWorld;

/// Show seed, population, stock and build mode in the window title.
///
/// Only writes when the text actually changes, to avoid touching the window
/// every frame.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_window_title(
    world: Res<CaveWorld>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mut last: Local<String>,
) {
    let ledger = world.ledger();
    let stock: Vec<String> = ResourceKind::ALL
        .iter()
        .map(|k| format!("{k} {}", ledger.amount(*k)))
        .collect();
    let mode = match world.placement_preview() {
        Some(p) if p.evaluation.valid => format!(" | placing {}", p.building),
        Some(p) => format!(" | placing {} (blocked)", p.building),
        None if world.is_placing() => " | placing".to_string(),
        None => String::new(),
    };
    let title = format!(
        "Cave of Nations | seed {} | pop {} | {}{mode}",
        world.seed(),
        ledger.population(),
        stock.join(", ")
    );
    if *last == title {
        return;
    }
    for mut w in &mut windows {
        w.title.clone_from(&title);
    }
    *last = title;
}
