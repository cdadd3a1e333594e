//! Index of relic cells.
//!
//! Filled once from the generator's report and kept in step with digs after
//! that; it is never rebuilt by scanning the grid.

use crate::block::BlockKind;
use crate::grid::VoxelGrid;
use bevy::math::{IVec2, IVec3};
use std::collections::BTreeSet;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RelicIndex {
    cells: BTreeSet<(i32, i32, i32)>, // (x, z, y) so columns sort together
}

impl RelicIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with freshly generated relic cells.
    pub fn reset(&mut self, cells: impl IntoIterator<Item = IVec3>) {
        self.cells = cells.into_iter().map(|c| (c.x, c.z, c.y)).collect();
    }

    pub fn insert(&mut self, cell: IVec3) -> bool {
        self.cells.insert((cell.x, cell.z, cell.y))
    }

    pub fn remove(&mut self, cell: IVec3) -> bool {
        self.cells.remove(&(cell.x, cell.z, cell.y))
    }

    #[must_use]
    pub fn contains(&self, cell: IVec3) -> bool {
        self.cells.contains(&(cell.x, cell.z, cell.y))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Every indexed cell, ordered by column then height.
    pub fn cells(&self) -> impl Iterator<Item = IVec3> + '_ {
        self.cells.iter().map(|&(x, z, y)| IVec3::new(x, y, z))
    }

    /// Distinct columns holding at least one relic.
    #[must_use]
    pub fn columns(&self) -> Vec<IVec2> {
        let mut out: Vec<IVec2> = Vec::new();
        for &(x, z, _) in &self.cells {
            let c = IVec2::new(x, z);
            if out.last() != Some(&c) {
                out.push(c);
            }
        }
        out
    }

    /// Columns whose topmost solid cell is an indexed relic.
    #[must_use]
    pub fn exposed(&self, grid: &VoxelGrid) -> Vec<IVec2> {
        self.columns()
            .into_iter()
            .filter(|c| {
                grid.surface_level(c.x, c.y)
                    .is_some_and(|y| self.contains(IVec3::new(c.x, y, c.y)))
            })
            .collect()
    }

    /// Whether the index matches the grid's relic cells exactly.
    #[must_use]
    pub fn matches(&self, grid: &VoxelGrid) -> bool {
        let mut count = 0;
        for cell in grid.cells_of_kind(BlockKind::Relic) {
            if !self.contains(cell) {
                return false;
            }
            count += 1;
        }
        count == self.len()
    }
}
