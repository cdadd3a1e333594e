//! Building templates and footprint validation.
//!
//! A `BuildingTemplate` is authored content (loaded from `data/buildings`).
//! Placing one means evaluating its footprint at a grid column with
//! `evaluate_placement`; a valid evaluation turns the template into a
//! `Blueprint` carrying the resolved world position.
//!
//! # Example
//!
//! ```
//! use bevy::math::IVec2;
//! use cave_of_nations::block::BlockKind;
//! use cave_of_nations::grid::{GridDims, VoxelGrid};
//! use cave_of_nations::placement::{evaluate_placement, Footprint};
//!
//! let mut grid = VoxelGrid::new(GridDims::new(4, 4, 4));
//! for c in grid.dims().iter_columns().collect::<Vec<_>>() {
//!     grid.set(c.x, 0, c.y, BlockKind::Den);
//! }
//! let eval = evaluate_placement(&grid, IVec2::new(1, 1), Footprint::new(2, 2), 1.0);
//! assert!(eval.valid);
//! assert_eq!(eval.world_position.y, 1.0);
//! ```

pub mod loader;
pub use loader::BuildingCatalog;

use crate::block::ResourceKind;
use crate::grid::VoxelGrid;
use bevy::math::{IVec2, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Footprint size in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    #[serde(default = "Footprint::one")]
    pub width: i32, // Cells along x
    #[serde(default = "Footprint::one")]
    pub depth: i32, // Cells along z
}

impl Footprint {
    fn one() -> i32 { 1 }

    #[must_use]
    pub const fn new(width: i32, depth: i32) -> Self {
        Self { width, depth }
    }

    /// Same footprint with each axis at least one cell.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self::new(self.width.max(1), self.depth.max(1))
    }

    /// Columns covered when the footprint's min corner sits on `origin`.
    pub fn cells(self, origin: IVec2) -> impl Iterator<Item = IVec2> {
        let f = self.clamped();
        (0..f.depth).flat_map(move |dz| (0..f.width).map(move |dx| origin + IVec2::new(dx, dz)))
    }
}

impl Default for Footprint {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Authoring record for something the player can build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingTemplate {
    pub kind: String, // Stable identifier, e.g. "granary"
    pub name: String, // Display name
    #[serde(default)]
    pub cost: BTreeMap<ResourceKind, u32>, // Charged when the build order executes
    #[serde(default)]
    pub population_bonus: u32,
    #[serde(default)]
    pub footprint: Footprint,
}

impl BuildingTemplate {
    /// Resolve this template against an evaluated site.
    #[must_use]
    pub fn blueprint(&self, evaluation: &PlacementEvaluation) -> Blueprint {
        Blueprint {
            kind: self.kind.clone(),
            name: self.name.clone(),
            cost: self.cost.clone(),
            population_bonus: self.population_bonus,
            footprint: evaluation.footprint,
            origin: evaluation.origin,
            world_position: evaluation.world_position,
        }
    }
}

/// A template pinned to a site.
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    pub kind: String,
    pub name: String,
    pub cost: BTreeMap<ResourceKind, u32>,
    pub population_bonus: u32,
    pub footprint: Footprint,
    pub origin: IVec2,
    pub world_position: Vec3,
}

impl Blueprint {
    /// Columns this blueprint occupies.
    pub fn cells(&self) -> impl Iterator<Item = IVec2> {
        self.footprint.cells(self.origin)
    }
}

/// Outcome of checking a footprint at one origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementEvaluation {
    pub origin: IVec2,
    pub world_position: Vec3,
    pub footprint: Footprint,
    pub valid: bool,
}

/// Check whether `footprint` can stand with its min corner on `origin`.
///
/// Every covered column must be on the grid, have a surface, and have an
/// `Air` cell directly above that surface; all surfaces must be within one
/// cell of the first one seen. Scanning continues past failures so the world
/// position is still meaningful for an invalid preview.
///
/// # Arguments
/// * `grid` - terrain to test against (never mutated)
/// * `origin` - min (x, z) corner of the footprint
/// * `footprint` - size in cells; axes below one are treated as one
/// * `tile_size` - world units per cell
///
/// # Return
/// * `PlacementEvaluation` - resting position on the highest surface, centred
///   on the rectangle, plus the validity flag
#[must_use]
pub fn evaluate_placement(grid: &VoxelGrid, origin: IVec2, footprint: Footprint, tile_size: f32) -> PlacementEvaluation {
    let footprint = footprint.clamped();
    let dims = grid.dims();
    let mut valid = true;
    let mut surfaces: Vec<i32> = Vec::with_capacity(footprint.cells(origin).size_hint().0);

    for cell in footprint.cells(origin) {
        if !dims.contains_column(cell.x, cell.y) {
            valid = false;
            continue;
        }
        let Some(surface) = grid.surface_level(cell.x, cell.y) else {
            valid = false;
            continue;
        };
        surfaces.push(surface);
        let head = surface + 1;
        if head >= dims.height || grid.get_or_air(cell.x, head, cell.y).is_solid() {
            valid = false;
        }
    }

    let highest = surfaces.iter().copied().max();
    match surfaces.first() {
        Some(&first) => valid &= surfaces.iter().all(|s| (s - first).abs() <= 1),
        None => valid = false,
    }

    #[allow(clippy::cast_precision_loss)]
    let world_position = Vec3::new(
        (origin.x as f32 + footprint.width as f32 * 0.5) * tile_size,
        highest.map_or(0.0, |s| (s + 1) as f32 * tile_size),
        (origin.y as f32 + footprint.depth as f32 * 0.5) * tile_size,
    );

    PlacementEvaluation {
        origin,
        world_position,
        footprint,
        valid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use crate::grid::GridDims;

    /// Flat terrain of `level + 1` solid layers.
    fn flat(level: i32) -> VoxelGrid {
        let mut grid = VoxelGrid::new(GridDims::new(6, 6, 6));
        for c in grid.dims().iter_columns().collect::<Vec<_>>() {
            for y in 0..=level {
                grid.set(c.x, y, c.y, BlockKind::Soil);
            }
        }
        grid
    }

    #[test]
    fn flat_clear_footprint_is_valid() {
        let grid = flat(1);
        let eval = evaluate_placement(&grid, IVec2::new(2, 2), Footprint::new(2, 2), 1.0);
        assert!(eval.valid);
        assert_eq!(eval.world_position, Vec3::new(3.0, 2.0, 3.0));
    }

    #[test]
    fn column_filled_to_the_top_has_no_headroom() {
        let mut grid = flat(1);
        for y in 2..6 {
            grid.set(2, y, 2, BlockKind::Rock);
        }
        let eval = evaluate_placement(&grid, IVec2::new(2, 2), Footprint::new(1, 1), 1.0);
        assert!(!eval.valid);
        assert_eq!(eval.world_position.y, 6.0);
    }

    #[test]
    fn step_of_two_is_invalid_and_rests_on_the_highest_point() {
        let mut grid = flat(1);
        grid.set(3, 2, 2, BlockKind::Soil);
        grid.set(3, 3, 2, BlockKind::Soil);
        let eval = evaluate_placement(&grid, IVec2::new(2, 2), Footprint::new(2, 2), 1.0);
        assert!(!eval.valid);
        assert_eq!(eval.world_position.y, 4.0);
    }

    #[test]
    fn step_of_one_is_level_enough() {
        let mut grid = flat(1);
        grid.set(3, 2, 3, BlockKind::Soil);
        assert!(evaluate_placement(&grid, IVec2::new(2, 2), Footprint::new(2, 2), 1.0).valid);
    }

    #[test]
    fn partially_off_grid_is_invalid() {
        let grid = flat(1);
        let eval = evaluate_placement(&grid, IVec2::new(5, 5), Footprint::new(2, 2), 1.0);
        assert!(!eval.valid);
        // the in-bounds corner still resolves a height
        assert_eq!(eval.world_position.y, 2.0);
    }

    #[test]
    fn empty_column_is_invalid() {
        let mut grid = flat(0);
        grid.set(0, 0, 0, BlockKind::Air);
        assert!(!evaluate_placement(&grid, IVec2::ZERO, Footprint::new(1, 1), 1.0).valid);
    }

    #[test]
    fn fully_off_grid_is_invalid() {
        let grid = flat(1);
        let eval = evaluate_placement(&grid, IVec2::new(-5, -5), Footprint::new(2, 2), 1.0);
        assert!(!eval.valid);
        assert_eq!(eval.world_position.y, 0.0);
    }

    #[test]
    fn degenerate_footprint_is_one_cell() {
        let grid = flat(1);
        let eval = evaluate_placement(&grid, IVec2::new(1, 1), Footprint::new(0, -3), 2.0);
        assert_eq!(eval.footprint, Footprint::new(1, 1));
        assert_eq!(eval.world_position, Vec3::new(3.0, 4.0, 3.0));
    }

    #[test]
    fn evaluation_does_not_touch_the_grid() {
        let grid = flat(2);
        let before = grid.block_counts();
        let _ = evaluate_placement(&grid, IVec2::new(1, 1), Footprint::new(3, 3), 1.0);
        assert_eq!(grid.block_counts(), before);
    }

    #[test]
    fn blueprint_copies_template_and_site() {
        let template = BuildingTemplate {
            kind: "granary".into(),
            name: "Granary".into(),
            cost: BTreeMap::from([(ResourceKind::Soil, 4)]),
            population_bonus: 2,
            footprint: Footprint::new(2, 1),
        };
        let grid = flat(0);
        let eval = evaluate_placement(&grid, IVec2::new(1, 1), template.footprint, 1.0);
        let bp = template.blueprint(&eval);
        assert_eq!(bp.origin, IVec2::new(1, 1));
        assert_eq!(bp.cells().collect::<Vec<_>>(), vec![IVec2::new(1, 1), IVec2::new(2, 1)]);
        assert_eq!(bp.cost.get(&ResourceKind::Soil), Some(&4));
    }
}
