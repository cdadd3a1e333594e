//! Immediate-mode drawing of the cave with gizmos.
//!
//! Every frame draws the exposed part of each column (its surface cell plus
//! any cliff face down to the lowest neighbouring surface), the avatar, and
//! the placement preview. Colours and cube sizes come from `BlockPalette`.
use bevy::prelude::*;
use cave_of_nations::block::{BlockKind, BlockPalette};
use cave_of_nations::world::CaveWorld;

const VALID_PREVIEW: Color = Color::srgb(0.2, 0.9, 0.3);
const BLOCKED_PREVIEW: Color = Color::srgb(0.9, 0.2, 0.2);
const AVATAR_COLOR: Color = Color::srgb(0.95, 0.95, 1.0);

fn palette_color(palette: &BlockPalette, kind: BlockKind) -> (Color, f32) {
    let a = palette.get(kind);
    (Color::srgb(a.color.0, a.color.1, a.color.2), a.size)
}

/// Draw the visible voxels.
#[allow(clippy::needless_pass_by_value)]
pub fn draw_terrain(world: Res<CaveWorld>, palette: Res<BlockPalette>, mut gizmos: Gizmos) {
    let grid = world.grid();
    let dims = grid.dims();
    let tile = world.tile_size();

    for column in dims.iter_columns() {
        let Some(top) = grid.surface_level(column.x, column.y) else { continue };
        let lowest_neighbour = [IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y]
            .into_iter()
            .map(|d| column + d)
            .filter(|n| dims.contains_column(n.x, n.y))
            .map(|n| grid.surface_level(n.x, n.y).unwrap_or(-1))
            .min()
            .unwrap_or(top);
        let bottom = (lowest_neighbour + 1).clamp(0, top);

        for y in bottom..=top {
            let kind = grid.get_or_air(column.x, y, column.y);
            if !kind.is_solid() {
                continue;
            }
            let (color, size) = palette_color(&palette, kind);
            let center = dims.cell_top_world(IVec3::new(column.x, y, column.y), tile) - Vec3::Y * (tile * 0.5);
            gizmos.cuboid(
                Transform::from_translation(center).with_scale(Vec3::splat(tile * size)),
                color,
            );
        }
    }
}

/// Draw the avatar at its interpolated pose with a facing arrow.
#[allow(clippy::needless_pass_by_value)]
pub fn draw_avatar(world: Res<CaveWorld>, mut gizmos: Gizmos) {
    let Some((feet, yaw)) = world.avatar_world_position() else { return };
    let tile = world.tile_size();
    let body = feet + Vec3::Y * (tile * 0.4);
    gizmos.sphere(body, Quat::from_rotation_y(yaw), tile * 0.35, AVATAR_COLOR);
    let forward = Vec3::new(yaw.sin(), 0.0, yaw.cos());
    gizmos.arrow(body, body + forward * (tile * 0.7), AVATAR_COLOR);
}

/// Outline the footprint under the cursor, green when it can be built.
#[allow(clippy::needless_pass_by_value)]
pub fn draw_placement_preview(world: Res<CaveWorld>, mut gizmos: Gizmos) {
    let Some(preview) = world.placement_preview() else { return };
    let eval = preview.evaluation;
    let tile = world.tile_size();
    let color = if eval.valid { VALID_PREVIEW } else { BLOCKED_PREVIEW };
    let size = Vec3::new(
        eval.footprint.width as f32 * tile,
        tile,
        eval.footprint.depth as f32 * tile,
    );
    gizmos.cuboid(
        Transform::from_translation(eval.world_position + Vec3::Y * (tile * 0.5)).with_scale(size),
        color,
    );
}
