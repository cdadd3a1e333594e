//! Block palette loader and watcher for loading block appearances from RON
//! files and monitoring changes for hot reloading during runtime.
//!
//! # Example
//! ```ignore
//! let palette = block_loader::load_palette_from_dir("data/blocks");
//! app.insert_resource(palette);
//! let watcher = block_loader::setup_palette_watcher("data/blocks")
//!     .unwrap_or_else(|_| block_loader::PaletteWatcher::stub());
//! app.insert_resource(watcher);
//! app.add_systems(Update, block_loader::check_palette_changes);
//! ```

use super::{BlockAppearance, BlockPalette};
use crate::ron_loader::{load_ron_files, setup_ron_watcher};
use bevy::log::info;
use bevy::prelude::{Res, ResMut, Resource};

/// Directory scanned for block appearance files.
pub const BLOCKS_DIR: &str = "data/blocks";

#[derive(Resource)]
pub struct PaletteWatcher(pub crate::ron::RonWatcher);

impl PaletteWatcher {
    #[must_use]
    pub fn stub() -> Self {
        PaletteWatcher(crate::ron::RonWatcher::stub())
    }
}

/// Load block appearances from RON files on top of the built-in palette.
///
/// # Arguments
/// * `path` - The directory path where block RON files are located (e.g., "data/blocks").
///
/// # Returns
/// A `BlockPalette` with every kind present; entries found on disk replace
/// the defaults for their kind.
#[must_use]
pub fn load_palette_from_dir(path: &str) -> BlockPalette {
    let mut palette = BlockPalette::default();
    let appearances: Vec<BlockAppearance> = load_ron_files(path);
    for appearance in appearances {
        palette.register(appearance);
    }
    palette
}

/// Create a watcher for the block palette directory.
///
/// # Errors
/// Propagates the `notify::Error` if the directory cannot be watched.
pub fn setup_palette_watcher(path: &str) -> Result<PaletteWatcher, notify::Error> {
    setup_ron_watcher(path).map(PaletteWatcher)
}

/// Reload the palette resource when files change.
#[allow(clippy::needless_pass_by_value)]
pub fn check_palette_changes(watcher: Res<PaletteWatcher>, mut palette: ResMut<BlockPalette>) {
    if watcher.0.take_changed() {
        info!("block palette changed, reloading");
        *palette = load_palette_from_dir(BLOCKS_DIR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;

    #[test]
    fn shipped_palette_files_parse() {
        let palette = load_palette_from_dir(BLOCKS_DIR);
        assert_eq!(palette.get(BlockKind::Pipestone).kind, BlockKind::Pipestone);
        assert!(palette.get(BlockKind::Relic).size > 0.0);
    }
}
