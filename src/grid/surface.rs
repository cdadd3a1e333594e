//! Lazily built surface depth map.
//!
//! The cache is either absent (stale) or exactly matches the grid it was
//! built from. Single-cell edits are repaired one column at a time; anything
//! bigger (regeneration, resize) drops the whole map.

use super::{GridDims, VoxelGrid};

/// Depth-map value for a column with no solid cell.
pub const EMPTY_COLUMN: i32 = -1;

/// Per-column surface heights, `depth` rows of `width` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthMap {
    width: i32,
    depth: i32,
    levels: Vec<i32>,
}

impl DepthMap {
    /// Compute the map from scratch.
    #[must_use]
    pub fn compute(grid: &VoxelGrid) -> Self {
        let dims = grid.dims();
        let levels = dims
            .iter_columns()
            .map(|c| grid.surface_level(c.x, c.y).unwrap_or(EMPTY_COLUMN))
            .collect();
        Self {
            width: dims.width,
            depth: dims.depth,
            levels,
        }
    }

    /// Surface level at `(x, z)`; `EMPTY_COLUMN` for empty columns, `None`
    /// outside the map.
    #[must_use]
    pub fn get(&self, x: i32, z: i32) -> Option<i32> {
        self.index(x, z).map(|i| self.levels[i])
    }

    /// Surface level as an option, folding the sentinel.
    #[must_use]
    pub fn surface(&self, x: i32, z: i32) -> Option<i32> {
        self.get(x, z).filter(|&l| l != EMPTY_COLUMN)
    }

    fn index(&self, x: i32, z: i32) -> Option<usize> {
        if !(0..self.width).contains(&x) || !(0..self.depth).contains(&z) {
            return None;
        }
        usize::try_from(z * self.width + x).ok()
    }

    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[must_use]
    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// One row of the map (fixed z).
    #[must_use]
    pub fn row(&self, z: i32) -> Option<&[i32]> {
        let start = self.index(0, z)?;
        let len = usize::try_from(self.width).ok()?;
        Some(&self.levels[start..start + len])
    }

    /// Copy out as nested rows for UI consumers.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<i32>> {
        (0..self.depth).filter_map(|z| self.row(z).map(<[i32]>::to_vec)).collect()
    }
}

/// Surface cache with whole-map and per-column invalidation.
#[derive(Debug, Default, Clone)]
pub struct SurfaceCache {
    map: Option<DepthMap>,
}

impl SurfaceCache {
    #[must_use]
    pub fn new() -> Self {
        Self { map: None }
    }

    /// Whether a map is currently held.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.map.is_some()
    }

    /// Return the cached map, building it first if stale.
    pub fn get(&mut self, grid: &VoxelGrid) -> &DepthMap {
        let stale = self.map.as_ref().is_none_or(|m| !Self::matches_dims(m, grid.dims()));
        if stale {
            self.map = Some(DepthMap::compute(grid));
        }
        self.map.get_or_insert_with(|| DepthMap::compute(grid))
    }

    /// Cached map if already built; never computes.
    #[must_use]
    pub fn peek(&self) -> Option<&DepthMap> {
        self.map.as_ref()
    }

    /// Drop the whole map (regeneration, resize).
    pub fn invalidate_all(&mut self) {
        self.map = None;
    }

    /// Recompute one column after a single-cell edit.
    ///
    /// With no map held this builds the full map instead of a partial one.
    pub fn invalidate_column(&mut self, grid: &VoxelGrid, x: i32, z: i32) {
        match self.map.as_mut() {
            Some(map) if Self::matches_dims(map, grid.dims()) => {
                if let Some(i) = map.index(x, z) {
                    map.levels[i] = grid.surface_level(x, z).unwrap_or(EMPTY_COLUMN);
                }
            }
            _ => self.map = Some(DepthMap::compute(grid)),
        }
    }

    fn matches_dims(map: &DepthMap, dims: GridDims) -> bool {
        map.width == dims.width && map.depth == dims.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use crate::grid::GridDims;

    fn stepped_grid() -> VoxelGrid {
        let mut grid = VoxelGrid::new(GridDims::new(3, 6, 2));
        for (x, z, top) in [(0, 0, 1), (1, 0, 3), (2, 0, 0), (0, 1, 4), (1, 1, 2)] {
            for y in 0..=top {
                grid.set(x, y, z, BlockKind::Soil);
            }
        }
        grid
    }

    #[test]
    fn builds_lazily_with_sentinel_for_empty_columns() {
        let grid = stepped_grid();
        let mut cache = SurfaceCache::new();
        assert!(!cache.is_built());
        let map = cache.get(&grid);
        assert_eq!(map.to_rows(), vec![vec![1, 3, 0], vec![4, 2, EMPTY_COLUMN]]);
        assert!(cache.is_built());
    }

    #[test]
    fn column_patch_matches_full_recompute_after_digs() {
        let mut grid = stepped_grid();
        let mut cache = SurfaceCache::new();
        cache.get(&grid);

        let digs = [(1, 0), (1, 0), (0, 1), (2, 0), (2, 0), (1, 1)];
        for (x, z) in digs {
            if let Some(top) = grid.surface_level(x, z) {
                grid.set(x, top, z, BlockKind::Air);
            }
            cache.invalidate_column(&grid, x, z);
            assert_eq!(cache.get(&grid), &DepthMap::compute(&grid));
        }
        assert_eq!(cache.get(&grid).get(2, 0), Some(EMPTY_COLUMN));
    }

    #[test]
    fn column_invalidation_without_map_builds_everything() {
        let grid = stepped_grid();
        let mut cache = SurfaceCache::new();
        cache.invalidate_column(&grid, 0, 0);
        assert_eq!(cache.peek(), Some(&DepthMap::compute(&grid)));
    }

    #[test]
    fn invalidate_all_drops_map() {
        let grid = stepped_grid();
        let mut cache = SurfaceCache::new();
        cache.get(&grid);
        cache.invalidate_all();
        assert!(cache.peek().is_none());
    }

    #[test]
    fn resized_grid_is_never_served_a_stale_map() {
        let grid = stepped_grid();
        let mut cache = SurfaceCache::new();
        cache.get(&grid);
        let bigger = VoxelGrid::new(GridDims::new(4, 6, 4));
        assert_eq!(cache.get(&bigger).width(), 4);
    }
}
