//! This module contains the core block types and helpers.
//! It exposes the closed set of block kinds stored in the voxel grid
//! (`BlockKind`), the resources digging yields (`ResourceKind`), the
//! `BlockPalette` describing how each kind is drawn, and the loader used for
//! hot-reloading palette data from RON files.
//!
//! Example:
//!
//! ```rust
//! use cave_of_nations::block::{BlockKind, ResourceKind};
//!
//! assert!(BlockKind::Rock.is_solid());
//! assert!(!BlockKind::Air.is_solid());
//! assert_eq!(BlockKind::Rock.resource_yield(), Some(ResourceKind::Stone));
//! assert_eq!(BlockKind::Den.resource_yield(), None);
//! ```

pub mod interaction;
pub use interaction::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a single grid cell.
///
/// Stored one byte per cell inside `VoxelGrid`, so the enum is `repr(u8)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum BlockKind {
    Soil,
    Rock,
    Relic,
    Tunnel,
    Den,
    Pipestone,
    #[default]
    Air,
}

impl BlockKind {
    /// Every kind, in declaration order.
    pub const ALL: [BlockKind; 7] = [
        BlockKind::Soil,
        BlockKind::Rock,
        BlockKind::Relic,
        BlockKind::Tunnel,
        BlockKind::Den,
        BlockKind::Pipestone,
        BlockKind::Air,
    ];

    /// Whether the cell counts as terrain for surface and navigation queries.
    #[must_use]
    pub fn is_solid(self) -> bool {
        self != BlockKind::Air
    }

    /// Resource credited when a block of this kind is dug out.
    ///
    /// # Return
    /// * `Option<ResourceKind>` - `None` for kinds that yield nothing
    #[must_use]
    pub fn resource_yield(self) -> Option<ResourceKind> {
        match self {
            BlockKind::Soil => Some(ResourceKind::Soil),
            BlockKind::Rock => Some(ResourceKind::Stone),
            BlockKind::Relic => Some(ResourceKind::Relic),
            BlockKind::Pipestone => Some(ResourceKind::Pipestone),
            BlockKind::Tunnel | BlockKind::Den | BlockKind::Air => None,
        }
    }

    /// Lowercase identifier used in data files and debug output.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Soil => "soil",
            BlockKind::Rock => "rock",
            BlockKind::Relic => "relic",
            BlockKind::Tunnel => "tunnel",
            BlockKind::Den => "den",
            BlockKind::Pipestone => "pipestone",
            BlockKind::Air => "air",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Counted resources gathered by digging and spent on buildings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Soil,
    Stone,
    Relic,
    Pipestone,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Soil,
        ResourceKind::Stone,
        ResourceKind::Relic,
        ResourceKind::Pipestone,
    ];
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceKind::Soil => "soil",
            ResourceKind::Stone => "stone",
            ResourceKind::Relic => "relic",
            ResourceKind::Pipestone => "pipestone",
        };
        f.write_str(s)
    }
}

/// Loader/watchers for block palette RON files.
pub mod loader;

/// Block palette and related data structures.
pub mod registry;

pub use registry::{BlockAppearance, BlockPalette};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_air_is_empty() {
        for kind in BlockKind::ALL {
            assert_eq!(kind.is_solid(), kind != BlockKind::Air, "{kind}");
        }
    }

    #[test]
    fn default_kind_is_air() {
        assert_eq!(BlockKind::default(), BlockKind::Air);
    }

    #[test]
    fn den_and_tunnel_yield_nothing() {
        assert_eq!(BlockKind::Den.resource_yield(), None);
        assert_eq!(BlockKind::Tunnel.resource_yield(), None);
        assert_eq!(BlockKind::Relic.resource_yield(), Some(ResourceKind::Relic));
    }
}
