//! This module defines the `BlockAppearance` and `BlockPalette` types used
//! by renderers to draw grid cells. The core never reads colours; it only
//! hands out `BlockKind` values, and the palette maps those to something
//! visible. Every kind always has an entry: kinds missing from data files
//! keep their built-in defaults.
//!
//! Example:
//! ```rust
//! use cave_of_nations::block::{BlockKind, BlockPalette};
//!
//! let palette = BlockPalette::default();
//! let relic = palette.get(BlockKind::Relic);
//! assert_eq!(relic.name, "Relic");
//! assert!(relic.size < 1.0);
//! ```
use super::BlockKind;
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Edge length of a block cube relative to one grid tile.
pub const DEFAULT_BLOCK_SIZE: f32 = 0.98;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockAppearance {
    pub kind: BlockKind,
    pub name: String,
    pub color: (f32, f32, f32), // Linear-ish RGB in 0..=1
    #[serde(default = "BlockAppearance::default_size")]
    pub size: f32, // Cube edge relative to the tile size
}

impl BlockAppearance {
    fn default_size() -> f32 {
        DEFAULT_BLOCK_SIZE
    }

    fn builtin(kind: BlockKind) -> Self {
        let (name, color) = match kind {
            BlockKind::Soil => ("Soil", (0.52, 0.33, 0.18)),
            BlockKind::Rock => ("Rock", (0.35, 0.35, 0.4)),
            BlockKind::Relic => ("Relic", (0.93, 0.78, 0.25)),
            BlockKind::Tunnel => ("Tunnel", (0.10, 0.10, 0.12)),
            BlockKind::Den => ("Den", (0.88, 0.70, 0.50)),
            BlockKind::Pipestone => ("Pipestone", (0.72, 0.18, 0.20)),
            BlockKind::Air => ("Air", (0.0, 0.0, 0.0)),
        };
        Self {
            kind,
            name: name.to_string(),
            color,
            size: DEFAULT_BLOCK_SIZE,
        }
    }
}

#[derive(Resource, Clone, Debug)]
pub struct BlockPalette {
    entries: HashMap<BlockKind, BlockAppearance>,
}

impl BlockPalette {
    /// Insert or replace the appearance for `appearance.kind`.
    pub fn register(&mut self, appearance: BlockAppearance) {
        self.entries.insert(appearance.kind, appearance);
    }

    /// Appearance for a kind. Always present.
    #[must_use]
    pub fn get(&self, kind: BlockKind) -> &BlockAppearance {
        // Every kind is inserted by `Default` and `register` only replaces.
        &self.entries[&kind]
    }

    /// Lookup a kind by its display name (case-insensitive).
    #[must_use]
    pub fn kind_for_name(&self, name: &str) -> Option<BlockKind> {
        self.entries
            .values()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.kind)
    }
}

impl Default for BlockPalette {
    fn default() -> Self {
        let entries = BlockKind::ALL
            .iter()
            .map(|&k| (k, BlockAppearance::builtin(k)))
            .collect();
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_kind() {
        let palette = BlockPalette::default();
        for kind in BlockKind::ALL {
            assert_eq!(palette.get(kind).kind, kind);
        }
    }

    #[test]
    fn register_overrides_one_entry() {
        let mut palette = BlockPalette::default();
        palette.register(BlockAppearance {
            kind: BlockKind::Soil,
            name: "Loam".to_string(),
            color: (0.1, 0.2, 0.3),
            size: 1.0,
        });
        assert_eq!(palette.get(BlockKind::Soil).name, "Loam");
        assert_eq!(palette.kind_for_name("loam"), Some(BlockKind::Soil));
        assert_eq!(palette.get(BlockKind::Rock).name, "Rock");
    }
}
