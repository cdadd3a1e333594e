//! Settings, types and defaults.
//!
//! Settings are stored as a RON file under `data/settings/` and are hot-reloadable
//! using the existing RON watcher utilities (see `ron::setup_ron_watcher`).
//! Every field has a serde default, so a settings file only needs the values
//! it changes.
use crate::grid::GridDims;
use crate::player::{CameraTuning, MotionTimings};
use crate::terrain::TerrainParams;
use bevy::prelude::{KeyCode, Resource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Smallest accepted size along any grid axis.
pub const MIN_GRID_AXIS: i32 = 4;
/// Largest accepted size along any grid axis.
pub const MAX_GRID_AXIS: i32 = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSettings {
    #[serde(default = "WorldSettings::default_width")]
    pub width: i32, // Cells along x
    #[serde(default = "WorldSettings::default_height")]
    pub height: i32, // Cells along y
    #[serde(default = "WorldSettings::default_depth")]
    pub depth: i32, // Cells along z
    #[serde(default = "WorldSettings::default_tile_size")]
    pub tile_size: f32, // World units per cell
    #[serde(default)]
    pub seed: Option<u64>, // Fixed seed for reproducible layouts; entropy when absent
}

impl WorldSettings {
    fn default_width() -> i32 { 32 }
    fn default_height() -> i32 { 24 }
    fn default_depth() -> i32 { 32 }
    fn default_tile_size() -> f32 { 1.0 }

    /// Grid dimensions with each axis clamped into the accepted range.
    #[must_use]
    pub fn dims(&self) -> GridDims {
        let clamp = |v: i32| v.clamp(MIN_GRID_AXIS, MAX_GRID_AXIS);
        GridDims::new(clamp(self.width), clamp(self.height), clamp(self.depth))
    }

    /// Tile size, falling back to the default for non-positive values.
    #[must_use]
    pub fn tile_size(&self) -> f32 {
        if self.tile_size.is_finite() && self.tile_size > 0.0 {
            self.tile_size
        } else {
            Self::default_tile_size()
        }
    }
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            height: Self::default_height(),
            depth: Self::default_depth(),
            tile_size: Self::default_tile_size(),
            seed: None,
        }
    }
}

/// Controls / input settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlsSettings {
    #[serde(default)]
    pub invert_y: bool, // Invert vertical drag for orbit and pan
    #[serde(default)]
    pub invert_x: bool, // Invert horizontal drag for orbit and pan
    #[serde(default = "ControlsSettings::default_keybinds")]
    pub keybinds: HashMap<String, String>, // Map of action names to key identifiers (editable by user)
}

impl ControlsSettings {
    fn default_keybinds() -> HashMap<String, String> {
        [
            ("forward", "W"),
            ("back", "S"),
            ("left", "A"),
            ("right", "D"),
            ("dig", "Space"),
            ("build_mode", "B"),
            ("cycle_building", "Tab"),
            ("cancel", "Escape"),
            ("rebuild", "R"),
            ("dump_debug", "F3"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    /// Key bound to `action`, or `fallback` if unbound or unparseable.
    #[must_use]
    pub fn key(&self, action: &str, fallback: KeyCode) -> KeyCode {
        self.keybinds
            .get(action)
            .and_then(|s| Settings::keycode_from_str(s))
            .unwrap_or(fallback)
    }
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            invert_y: false,
            invert_x: false,
            keybinds: Self::default_keybinds(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    #[serde(default = "SimulationSettings::default_tick_seconds")]
    pub tick_seconds: f32, // Interval of the simulation tick (build orders)
}

impl SimulationSettings {
    fn default_tick_seconds() -> f32 { 0.5 }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_seconds: Self::default_tick_seconds(),
        }
    }
}

/// Top-level Settings
#[derive(Resource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub world: WorldSettings,
    #[serde(default)]
    pub terrain: TerrainParams,
    #[serde(default)]
    pub camera: CameraTuning,
    #[serde(default)]
    pub motion: MotionTimings,
    #[serde(default)]
    pub controls: ControlsSettings,
    #[serde(default)]
    pub simulation: SimulationSettings,
}

impl Settings {
    #[must_use]
    pub fn defaults() -> Self { Settings::default() }

    /// Convert a string key identifier (e.g., from `controls.keybinds`) into a `KeyCode` that
    /// can be used with Bevy's input system.
    ///
    /// # Arguments
    /// * `name` - The string key identifier to convert (e.g., "W", "Space", "F1").
    ///
    /// # Returns
    /// An `Option<KeyCode>` corresponding to the provided string, or `None` if the string
    /// does not match any known key.
    #[must_use]
    pub fn keycode_from_str(name: &str) -> Option<KeyCode> {
        const LETTERS: [KeyCode; 26] = [
            KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyC, KeyCode::KeyD, KeyCode::KeyE, KeyCode::KeyF,
            KeyCode::KeyG, KeyCode::KeyH, KeyCode::KeyI, KeyCode::KeyJ, KeyCode::KeyK, KeyCode::KeyL,
            KeyCode::KeyM, KeyCode::KeyN, KeyCode::KeyO, KeyCode::KeyP, KeyCode::KeyQ, KeyCode::KeyR,
            KeyCode::KeyS, KeyCode::KeyT, KeyCode::KeyU, KeyCode::KeyV, KeyCode::KeyW, KeyCode::KeyX,
            KeyCode::KeyY, KeyCode::KeyZ,
        ];
        const DIGITS: [KeyCode; 10] = [
            KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4,
            KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9,
        ];
        const FUNCTION: [KeyCode; 12] = [
            KeyCode::F1, KeyCode::F2, KeyCode::F3, KeyCode::F4, KeyCode::F5, KeyCode::F6,
            KeyCode::F7, KeyCode::F8, KeyCode::F9, KeyCode::F10, KeyCode::F11, KeyCode::F12,
        ];

        let s = name.trim().to_ascii_uppercase();
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.clone().next()) {
            if c.is_ascii_uppercase() {
                return LETTERS.get(usize::from(c as u8 - b'A')).copied();
            }
            if c.is_ascii_digit() {
                return DIGITS.get(usize::from(c as u8 - b'0')).copied();
            }
        }
        if let Some(n) = s.strip_prefix('F').and_then(|n| n.parse::<usize>().ok()) {
            return n.checked_sub(1).and_then(|i| FUNCTION.get(i)).copied();
        }

        Some(match s.as_str() {
            // Arrows / navigation
            "LEFT" | "ARROWLEFT" => KeyCode::ArrowLeft,
            "RIGHT" | "ARROWRIGHT" => KeyCode::ArrowRight,
            "UP" | "ARROWUP" => KeyCode::ArrowUp,
            "DOWN" | "ARROWDOWN" => KeyCode::ArrowDown,
            "DELETE" | "DEL" => KeyCode::Delete,

            // Whitespace / control
            "ESC" | "ESCAPE" => KeyCode::Escape,
            "SPACE" => KeyCode::Space,
            "TAB" => KeyCode::Tab,
            "ENTER" | "RETURN" => KeyCode::Enter,
            "BACKSPACE" | "BACK" => KeyCode::Backspace,

            // Modifiers
            "LSHIFT" | "SHIFT" => KeyCode::ShiftLeft,
            "RSHIFT" => KeyCode::ShiftRight,
            "LCTRL" | "CTRL" | "CONTROL" => KeyCode::ControlLeft,
            "RCTRL" => KeyCode::ControlRight,
            "LALT" | "ALT" => KeyCode::AltLeft,
            "RALT" => KeyCode::AltRight,

            _ => return None,
        })
    }
}

pub mod loader;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dims_are_clamped_per_axis() {
        let world = WorldSettings {
            width: 1,
            height: 500,
            depth: 12,
            ..WorldSettings::default()
        };
        assert_eq!(world.dims(), GridDims::new(MIN_GRID_AXIS, MAX_GRID_AXIS, 12));
    }

    #[test]
    fn bad_tile_size_falls_back() {
        let world = WorldSettings {
            tile_size: -2.0,
            ..WorldSettings::default()
        };
        assert_eq!(world.tile_size(), 1.0);
    }

    #[test]
    fn partial_ron_fills_defaults() {
        let s: Settings = ron::from_str("(world: (width: 10, seed: Some(7)), simulation: (tick_seconds: 0.25))").unwrap();
        assert_eq!(s.world.width, 10);
        assert_eq!(s.world.height, 24);
        assert_eq!(s.world.seed, Some(7));
        assert_eq!(s.simulation.tick_seconds, 0.25);
        assert_eq!(s.camera, CameraTuning::default());
        assert_eq!(s.controls.key("dig", KeyCode::KeyX), KeyCode::Space);
    }

    #[test]
    fn keycodes_parse() {
        assert_eq!(Settings::keycode_from_str("w"), Some(KeyCode::KeyW));
        assert_eq!(Settings::keycode_from_str("7"), Some(KeyCode::Digit7));
        assert_eq!(Settings::keycode_from_str("F3"), Some(KeyCode::F3));
        assert_eq!(Settings::keycode_from_str("F"), Some(KeyCode::KeyF));
        assert_eq!(Settings::keycode_from_str("escape"), Some(KeyCode::Escape));
        assert_eq!(Settings::keycode_from_str("F0"), None);
        assert_eq!(Settings::keycode_from_str("nope"), None);
    }

    #[test]
    fn unknown_binding_uses_fallback() {
        let mut controls = ControlsSettings::default();
        controls.keybinds.insert("dig".into(), "???".into());
        assert_eq!(controls.key("dig", KeyCode::KeyE), KeyCode::KeyE);
        assert_eq!(controls.key("missing", KeyCode::KeyQ), KeyCode::KeyQ);
    }
}
