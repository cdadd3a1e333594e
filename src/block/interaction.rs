//! Pointer picking against the voxel grid.
//!
//! Casts a world-space ray (usually from the camera through the cursor)
//! through the grid one cell boundary at a time and reports the first solid
//! cell it enters together with the empty cell it came from. The controls
//! turn a hit into a move-to target or a placement origin.
//!
//! # Examples
//!
//! ```rust
//! use bevy::math::{IVec3, Vec3};
//! use cave_of_nations::block::{raycast_block, BlockKind};
//! use cave_of_nations::grid::{GridDims, VoxelGrid};
//!
//! let mut grid = VoxelGrid::new(GridDims::new(4, 4, 4));
//! grid.set(1, 1, 0, BlockKind::Rock);
//!
//! // Cast from z=-1 towards +z; should hit the block at (1,1,0).
//! let hit = raycast_block(&grid, 1.0, Vec3::new(1.5, 1.5, -1.0), Vec3::Z, 10.0).expect("should hit");
//! assert_eq!(hit.cell, IVec3::new(1, 1, 0));
//! assert_eq!(hit.previous, IVec3::new(1, 1, -1));
//! ```
use crate::grid::VoxelGrid;
use bevy::math::{IVec2, IVec3, Vec3};

/// Result of a grid raycast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// First solid cell along the ray.
    pub cell: IVec3,
    /// Cell the ray was in just before `cell`.
    pub previous: IVec3,
    /// World-space distance from the origin to the entry point.
    pub distance: f32,
}

impl RayHit {
    /// Column of the hit cell.
    #[must_use]
    pub fn column(&self) -> IVec2 {
        IVec2::new(self.cell.x, self.cell.z)
    }
}

#[inline]
fn f32_floor_to_i32(v: f32) -> i32 {
    debug_assert!(
        v.is_finite() && (-2_147_483_648.0_f32..=2_147_483_647.0_f32).contains(&v),
        "coordinate out of i32 range",
    );
    #[allow(clippy::cast_possible_truncation)]
    {
        v.floor() as i32
    }
}

/// Walk a ray through the grid cell by cell.
///
/// Cells outside the grid count as empty, so a ray starting above the
/// terrain (the usual camera case) passes through until it reaches it.
///
/// # Arguments
/// * `grid` - cells to test
/// * `tile_size` - world units per cell
/// * `origin` - ray start in world space
/// * `direction` - ray direction; need not be normalized
/// * `max_distance` - world-space reach
///
/// # Returns
/// The first solid cell hit within reach, or `None`.
#[must_use]
pub fn raycast_block(
    grid: &VoxelGrid,
    tile_size: f32,
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
) -> Option<RayHit> {
    if tile_size <= 0.0 || !origin.is_finite() {
        return None;
    }
    let dir = direction.try_normalize()?;
    let o = origin / tile_size;
    let reach = max_distance / tile_size;

    let mut cell = IVec3::new(f32_floor_to_i32(o.x), f32_floor_to_i32(o.y), f32_floor_to_i32(o.z));
    let step = IVec3::new(sign(dir.x), sign(dir.y), sign(dir.z));
    let boundary = |c: i32, s: i32| if s > 0 { (c + 1) as f32 } else { c as f32 };
    let axis_t = |c: i32, s: i32, o: f32, d: f32| {
        if s == 0 { f32::INFINITY } else { (boundary(c, s) - o) / d }
    };
    let mut t_max = Vec3::new(
        axis_t(cell.x, step.x, o.x, dir.x),
        axis_t(cell.y, step.y, o.y, dir.y),
        axis_t(cell.z, step.z, o.z, dir.z),
    );
    let t_delta = Vec3::new(inv_abs(dir.x), inv_abs(dir.y), inv_abs(dir.z));

    let mut previous = cell;
    let mut t = 0.0;
    while t <= reach {
        if grid.get_or_air(cell.x, cell.y, cell.z).is_solid() {
            return Some(RayHit {
                cell,
                previous,
                distance: t * tile_size,
            });
        }
        previous = cell;
        if t_max.x <= t_max.y && t_max.x <= t_max.z {
            t = t_max.x;
            t_max.x += t_delta.x;
            cell.x += step.x;
        } else if t_max.y <= t_max.z {
            t = t_max.y;
            t_max.y += t_delta.y;
            cell.y += step.y;
        } else {
            t = t_max.z;
            t_max.z += t_delta.z;
            cell.z += step.z;
        }
    }
    None
}

fn sign(v: f32) -> i32 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

fn inv_abs(v: f32) -> f32 {
    if v == 0.0 { f32::INFINITY } else { 1.0 / v.abs() }
}

/// World point on top of the first solid cell along the ray.
#[must_use]
pub fn pick_surface_point(grid: &VoxelGrid, tile_size: f32, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3> {
    let hit = raycast_block(grid, tile_size, origin, direction, max_distance)?;
    Some(grid.dims().cell_top_world(hit.cell, tile_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use crate::grid::GridDims;

    fn floor_grid() -> VoxelGrid {
        let mut grid = VoxelGrid::new(GridDims::new(8, 8, 8));
        for c in grid.dims().iter_columns().collect::<Vec<_>>() {
            grid.set(c.x, 0, c.y, BlockKind::Den);
        }
        grid
    }

    #[test]
    fn straight_down_hits_the_floor() {
        let grid = floor_grid();
        let hit = raycast_block(&grid, 1.0, Vec3::new(3.5, 20.0, 4.5), Vec3::NEG_Y, 50.0).unwrap();
        assert_eq!(hit.cell, IVec3::new(3, 0, 4));
        assert_eq!(hit.previous, IVec3::new(3, 1, 4));
        assert!((hit.distance - 19.0).abs() < 1e-4);
        assert_eq!(hit.column(), IVec2::new(3, 4));
    }

    #[test]
    fn diagonal_ray_from_above_lands_on_the_right_column() {
        let mut grid = floor_grid();
        grid.set(5, 1, 5, BlockKind::Rock);
        let origin = Vec3::new(1.5, 5.5, 1.5);
        let target = Vec3::new(5.5, 1.5, 5.5);
        let hit = raycast_block(&grid, 1.0, origin, target - origin, 100.0).unwrap();
        assert_eq!(hit.cell, IVec3::new(5, 1, 5));
    }

    #[test]
    fn tile_size_scales_the_walk() {
        let grid = floor_grid();
        let hit = raycast_block(&grid, 2.0, Vec3::new(5.0, 10.0, 5.0), Vec3::NEG_Y, 20.0).unwrap();
        assert_eq!(hit.cell, IVec3::new(2, 0, 2));
        let point = pick_surface_point(&grid, 2.0, Vec3::new(5.0, 10.0, 5.0), Vec3::NEG_Y, 20.0).unwrap();
        assert_eq!(point, Vec3::new(5.0, 2.0, 5.0));
    }

    #[test]
    fn out_of_reach_or_away_misses() {
        let grid = floor_grid();
        assert!(raycast_block(&grid, 1.0, Vec3::new(3.5, 20.0, 3.5), Vec3::NEG_Y, 5.0).is_none());
        assert!(raycast_block(&grid, 1.0, Vec3::new(3.5, 20.0, 3.5), Vec3::Y, 100.0).is_none());
        assert!(raycast_block(&grid, 1.0, Vec3::new(3.5, 20.0, 3.5), Vec3::ZERO, 100.0).is_none());
    }
}
