//! Settings loading and hot-reloading.
//! This module provides utilities for loading settings from RON files and watching
//! for changes to enable hot-reloading of settings at runtime.
//!
//! Settings are loaded from RON files in the `data/settings` directory. If multiple
//! RON files are present, the first successfully parsed `Settings` (in file-name
//! order) will be used. If no RON files are found or if no parsing succeeds,
//! default settings will be used.
use crate::ron_loader::{load_ron_files, setup_ron_watcher};
use crate::settings::Settings;
use crate::world::CaveWorld;
use bevy::log::info;
use bevy::prelude::{Res, ResMut, Resource};

/// Directory scanned for settings files.
pub const SETTINGS_DIR: &str = "data/settings";

#[derive(Resource)]
pub struct SettingsWatcher(pub crate::ron::RonWatcher);

impl SettingsWatcher {
    #[must_use]
    pub fn stub() -> Self {
        SettingsWatcher(crate::ron::RonWatcher::stub())
    }
}

/// Load settings from `path` (directory).
///
/// # Arguments
/// * `path` - The directory path where settings RON files are located (e.g., "data/settings").
///
/// # Returns
/// A `Settings` struct loaded from the first successfully parsed RON file in the specified directory
/// or default settings if no valid RON files are found.
#[must_use]
pub fn load_settings_from_dir(path: &str) -> Settings {
    let items: Vec<Settings> = load_ron_files(path);
    items.into_iter().next().unwrap_or_else(Settings::defaults)
}

/// Create a watcher for the settings directory (hot-reload).
///
/// # Errors
/// Returns the underlying `notify::Error` when the directory cannot be watched.
pub fn setup_settings_watcher(path: &str) -> Result<SettingsWatcher, notify::Error> {
    setup_ron_watcher(path).map(SettingsWatcher)
}

/// Reload settings when files change and push them into the world.
///
/// A change to world dimensions or seed rebuilds the world; other sections
/// are applied in place.
#[allow(clippy::needless_pass_by_value)]
pub fn check_settings_changes(
    watcher: Res<SettingsWatcher>,
    mut settings: ResMut<Settings>,
    mut world: ResMut<CaveWorld>,
) {
    if !watcher.0.take_changed() {
        return;
    }
    let reloaded = load_settings_from_dir(SETTINGS_DIR);
    if reloaded == *settings {
        return;
    }
    let rebuilt = world.apply_settings(&reloaded);
    info!("settings reloaded{}", if rebuilt { ", world rebuilt" } else { "" });
    *settings = reloaded;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_settings_parse() {
        let settings = load_settings_from_dir(SETTINGS_DIR);
        assert_eq!(settings.world.dims(), crate::grid::GridDims::new(32, 24, 32));
        assert_eq!(settings.simulation.tick_seconds, 0.5);
    }

    #[test]
    fn missing_directory_gives_defaults() {
        assert_eq!(load_settings_from_dir("data/not-a-dir"), Settings::default());
    }
}
