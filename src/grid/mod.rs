//! Voxel grid storage and column queries.
//!
//! `VoxelGrid` owns a fixed-size 3D array of `BlockKind` values stored as a
//! flat `Vec` (x fastest, then y, then z). Coordinates are signed so callers
//! can probe neighbours past the edges; every public accessor bounds-checks
//! and answers "absent" instead of panicking. Derived views (the surface
//! depth map, the relic index) are owned by the caller, not the grid.
//!
//! # Example
//!
//! ```
//! use cave_of_nations::block::BlockKind;
//! use cave_of_nations::grid::{GridDims, VoxelGrid};
//!
//! let mut grid = VoxelGrid::new(GridDims::new(4, 6, 4));
//! grid.set(1, 0, 2, BlockKind::Den);
//! grid.set(1, 3, 2, BlockKind::Soil);
//! assert_eq!(grid.surface_level(1, 2), Some(3));
//! assert!(grid.is_navigable(1, 2));
//! assert_eq!(grid.surface_level(0, 0), None);
//! ```

pub mod surface;
pub use surface::{DepthMap, SurfaceCache, EMPTY_COLUMN};

use crate::block::BlockKind;
use bevy::math::{IVec2, IVec3, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Grid dimensions in cells. Width runs along x, height along y, depth along z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDims {
    pub width: i32,
    pub height: i32,
    pub depth: i32,
}

impl GridDims {
    #[must_use]
    pub const fn new(width: i32, height: i32, depth: i32) -> Self {
        Self { width, height, depth }
    }

    /// Total number of cells.
    #[must_use]
    pub fn volume(&self) -> usize {
        usize::try_from(self.width.max(0)).unwrap_or(0)
            * usize::try_from(self.height.max(0)).unwrap_or(0)
            * usize::try_from(self.depth.max(0)).unwrap_or(0)
    }

    /// Number of (x, z) columns.
    #[must_use]
    pub fn columns(&self) -> usize {
        usize::try_from(self.width.max(0)).unwrap_or(0) * usize::try_from(self.depth.max(0)).unwrap_or(0)
    }

    #[must_use]
    pub fn contains_column(&self, x: i32, z: i32) -> bool {
        (0..self.width).contains(&x) && (0..self.depth).contains(&z)
    }

    #[must_use]
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        self.contains_column(x, z) && (0..self.height).contains(&y)
    }

    /// Column at the middle of the x/z plane.
    #[must_use]
    pub fn center_column(&self) -> IVec2 {
        IVec2::new(self.width / 2, self.depth / 2)
    }

    /// Iterate columns row by row (z outer, x inner).
    pub fn iter_columns(&self) -> impl Iterator<Item = IVec2> + '_ {
        (0..self.depth).flat_map(move |z| (0..self.width).map(move |x| IVec2::new(x, z)))
    }

    /// Flat index of a column in row-major (z, x) order.
    #[must_use]
    pub fn column_index(&self, x: i32, z: i32) -> Option<usize> {
        if !self.contains_column(x, z) {
            return None;
        }
        usize::try_from(z * self.width + x).ok()
    }

    /// World-space point on top of cell `(x, y, z)`, centred in x and z.
    #[must_use]
    pub fn cell_top_world(&self, cell: IVec3, tile_size: f32) -> Vec3 {
        Vec3::new(
            (cell.x as f32 + 0.5) * tile_size,
            (cell.y + 1) as f32 * tile_size,
            (cell.z as f32 + 0.5) * tile_size,
        )
    }

    /// Column containing a world-space point, if it lies over the grid.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn world_to_column(&self, point: Vec3, tile_size: f32) -> Option<IVec2> {
        if !point.x.is_finite() || !point.z.is_finite() || tile_size <= 0.0 {
            return None;
        }
        let x = (point.x / tile_size).floor();
        let z = (point.z / tile_size).floor();
        if x < 0.0 || z < 0.0 || x >= self.width as f32 || z >= self.depth as f32 {
            return None;
        }
        Some(IVec2::new(x as i32, z as i32))
    }

    /// World-space extent of the grid: `(min, max)` corners.
    #[must_use]
    pub fn world_bounds(&self, tile_size: f32) -> (Vec3, Vec3) {
        (
            Vec3::ZERO,
            Vec3::new(self.width as f32, self.height as f32, self.depth as f32) * tile_size,
        )
    }
}

impl Default for GridDims {
    fn default() -> Self {
        Self::new(32, 24, 32)
    }
}

/// Mutable 3D block grid.
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    dims: GridDims,
    cells: Vec<BlockKind>,
}

impl VoxelGrid {
    /// Allocate a grid filled with `Air`.
    ///
    /// # Arguments
    /// * `dims` - positive dimensions; the caller clamps them beforehand
    #[must_use]
    pub fn new(dims: GridDims) -> Self {
        debug_assert!(dims.width > 0 && dims.height > 0 && dims.depth > 0, "grid dims must be positive: {dims:?}");
        Self {
            dims,
            cells: vec![BlockKind::Air; dims.volume()],
        }
    }

    #[must_use]
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Reset every cell to `Air`, keeping the allocation.
    pub fn clear(&mut self) {
        self.cells.fill(BlockKind::Air);
    }

    #[inline]
    fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if !self.dims.contains(x, y, z) {
            return None;
        }
        usize::try_from(x + y * self.dims.width + z * self.dims.width * self.dims.height).ok()
    }

    /// Block at `(x, y, z)`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, x: i32, y: i32, z: i32) -> Option<BlockKind> {
        self.index(x, y, z).map(|i| self.cells[i])
    }

    /// Block at `(x, y, z)`, treating everything outside the grid as `Air`.
    #[must_use]
    pub fn get_or_air(&self, x: i32, y: i32, z: i32) -> BlockKind {
        self.get(x, y, z).unwrap_or(BlockKind::Air)
    }

    /// Overwrite one cell.
    ///
    /// # Return
    /// * `Option<BlockKind>` - the previous kind, or `None` if out of bounds
    ///   (nothing is written in that case)
    pub fn set(&mut self, x: i32, y: i32, z: i32, kind: BlockKind) -> Option<BlockKind> {
        let i = self.index(x, y, z)?;
        Some(std::mem::replace(&mut self.cells[i], kind))
    }

    /// Topmost non-`Air` y in the column, scanning from the top down.
    #[must_use]
    pub fn surface_level(&self, x: i32, z: i32) -> Option<i32> {
        if !self.dims.contains_column(x, z) {
            return None;
        }
        (0..self.dims.height).rev().find(|&y| self.get_or_air(x, y, z).is_solid())
    }

    /// Whether a column has a surface and Air directly above it.
    #[must_use]
    pub fn is_navigable(&self, x: i32, z: i32) -> bool {
        self.surface_level(x, z)
            .is_some_and(|s| s + 1 < self.dims.height && self.get_or_air(x, s + 1, z) == BlockKind::Air)
    }

    /// Count cells of every kind (kinds with zero cells are omitted).
    #[must_use]
    pub fn block_counts(&self) -> BTreeMap<BlockKind, usize> {
        let mut counts = BTreeMap::new();
        for &kind in &self.cells {
            *counts.entry(kind).or_insert(0) += 1;
        }
        counts
    }

    /// Iterate all cells holding `kind`.
    pub fn cells_of_kind(&self, kind: BlockKind) -> impl Iterator<Item = IVec3> + '_ {
        let w = self.dims.width;
        let h = self.dims.height;
        self.cells.iter().enumerate().filter(move |(_, k)| **k == kind).map(move |(i, _)| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let i = i as i32;
            IVec3::new(i % w, (i / w) % h, i / (w * h))
        })
    }
}
