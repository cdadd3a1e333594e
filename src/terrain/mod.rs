//! Procedural terrain fill for a freshly sized `VoxelGrid`.
//!
//! Each (x, z) column samples a coherent 2D height field to pick a column
//! height, then walks y upward choosing a kind per cell:
//!
//! * `y == 0` is always `Den` (the floor of the cave).
//! * the deep band (`y < height - 3`) is `Rock` with `rock_chance`, else `Soil`.
//! * the near-surface band holds `Relic` with `relic_chance`, else
//!   `Pipestone` with `pipestone_chance`, else `Soil`.
//! * everything from `height` up is `Air`.
//!
//! Generation is reseeded on every call. A fixed seed reproduces the same
//! layout: the noise field and the per-cell rolls both derive from it.

pub mod noise;
pub use self::noise::FbmHeightNoise;

use crate::block::BlockKind;
use crate::grid::VoxelGrid;
use bevy::math::IVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Smooth, reseedable 2D height field with values in [0, 1].
pub trait HeightNoise: Send + Sync {
    /// Normalized height fraction for column `(x, z)`.
    fn sample(&self, x: i32, z: i32) -> f32;
    /// Replace the field with the one for `seed`.
    fn reseed(&mut self, seed: u32);
}

/// Tunables for terrain generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainParams {
    #[serde(default = "TerrainParams::default_frequency")]
    pub frequency: f64, // Base frequency of the height field (cycles per cell)
    #[serde(default = "TerrainParams::default_octaves")]
    pub octaves: usize, // fBm octave count
    #[serde(default = "TerrainParams::default_persistence")]
    pub persistence: f64, // Amplitude falloff per octave
    #[serde(default = "TerrainParams::default_lacunarity")]
    pub lacunarity: f64, // Frequency growth per octave
    #[serde(default = "TerrainParams::default_base_fraction")]
    pub base_fraction: f32, // Column height fraction at noise 0
    #[serde(default = "TerrainParams::default_amplitude")]
    pub amplitude: f32, // Extra height fraction at noise 1
    #[serde(default = "TerrainParams::default_rock_chance")]
    pub rock_chance: f64, // Chance a deep cell is rock
    #[serde(default = "TerrainParams::default_relic_chance")]
    pub relic_chance: f64, // Chance a near-surface cell is a relic
    #[serde(default = "TerrainParams::default_pipestone_chance")]
    pub pipestone_chance: f64, // Chance a near-surface non-relic cell is pipestone
}

impl TerrainParams {
    fn default_frequency() -> f64 { 0.08 }
    fn default_octaves() -> usize { 4 }
    fn default_persistence() -> f64 { 0.5 }
    fn default_lacunarity() -> f64 { 2.0 }
    fn default_base_fraction() -> f32 { 0.45 }
    fn default_amplitude() -> f32 { 0.35 }
    fn default_rock_chance() -> f64 { 0.12 }
    fn default_relic_chance() -> f64 { 0.06 }
    fn default_pipestone_chance() -> f64 { 0.04 }
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            frequency: Self::default_frequency(),
            octaves: Self::default_octaves(),
            persistence: Self::default_persistence(),
            lacunarity: Self::default_lacunarity(),
            base_fraction: Self::default_base_fraction(),
            amplitude: Self::default_amplitude(),
            rock_chance: Self::default_rock_chance(),
            relic_chance: Self::default_relic_chance(),
            pipestone_chance: Self::default_pipestone_chance(),
        }
    }
}

/// Result of one generation pass.
#[derive(Debug, Default, Clone)]
pub struct GeneratedTerrain {
    /// Relic cells in the order they were placed.
    pub relics: Vec<IVec3>,
}

pub struct TerrainGenerator {
    params: TerrainParams,
    noise: Box<dyn HeightNoise>,
}

impl TerrainGenerator {
    /// Generator backed by fractal Perlin noise.
    #[must_use]
    pub fn new(params: TerrainParams) -> Self {
        let noise = Box::new(FbmHeightNoise::new(&params, 0));
        Self { params, noise }
    }

    /// Generator backed by a caller-supplied height field.
    #[must_use]
    pub fn with_noise(params: TerrainParams, noise: Box<dyn HeightNoise>) -> Self {
        Self { params, noise }
    }

    #[must_use]
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Swap tunables and rebuild the noise source from them. The new field is
    /// reseeded on the next `generate`.
    pub fn set_params(&mut self, params: TerrainParams) {
        self.params = params;
        self.noise = Box::new(FbmHeightNoise::new(&self.params, 0));
    }

    /// Column height for a normalized noise value.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn column_height(&self, noise: f32, grid_height: i32) -> i32 {
        let fraction = self.params.base_fraction + self.params.amplitude * noise;
        let h = (grid_height as f32 * fraction).round() as i32;
        h.max(2).min(grid_height)
    }

    /// Fill `grid` (assumed all `Air`) from `seed`.
    ///
    /// # Return
    /// * `GeneratedTerrain` - relic cells placed during the pass
    pub fn generate(&mut self, grid: &mut VoxelGrid, seed: u64) -> GeneratedTerrain {
        #[allow(clippy::cast_possible_truncation)]
        self.noise.reseed((seed ^ (seed >> 32)) as u32);
        let mut rng = StdRng::seed_from_u64(seed);
        let dims = grid.dims();
        let mut out = GeneratedTerrain::default();

        for column in dims.iter_columns() {
            let height = self.column_height(self.noise.sample(column.x, column.y), dims.height);
            for y in 0..height {
                let kind = self.pick_kind(y, height, &mut rng);
                grid.set(column.x, y, column.y, kind);
                if kind == BlockKind::Relic {
                    out.relics.push(IVec3::new(column.x, y, column.y));
                }
            }
        }
        out
    }

    fn pick_kind(&self, y: i32, height: i32, rng: &mut StdRng) -> BlockKind {
        let p = &self.params;
        if y == 0 {
            BlockKind::Den
        } else if y < height - 3 {
            if rng.gen_bool(p.rock_chance.clamp(0.0, 1.0)) {
                BlockKind::Rock
            } else {
                BlockKind::Soil
            }
        } else if rng.gen_bool(p.relic_chance.clamp(0.0, 1.0)) {
            BlockKind::Relic
        } else if rng.gen_bool(p.pipestone_chance.clamp(0.0, 1.0)) {
            BlockKind::Pipestone
        } else {
            BlockKind::Soil
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridDims;

    /// Height field that returns one constant everywhere.
    struct Flat(f32);

    impl HeightNoise for Flat {
        fn sample(&self, _x: i32, _z: i32) -> f32 {
            self.0
        }
        fn reseed(&mut self, _seed: u32) {}
    }

    fn flat_generator(level: f32) -> TerrainGenerator {
        TerrainGenerator::with_noise(TerrainParams::default(), Box::new(Flat(level)))
    }

    #[test]
    fn column_height_follows_formula() {
        let generator = flat_generator(0.0);
        // 24 * 0.45 = 10.8 -> 11
        assert_eq!(generator.column_height(0.0, 24), 11);
        // 24 * 0.80 = 19.2 -> 19
        assert_eq!(generator.column_height(1.0, 24), 19);
        // tiny grids still get two layers
        assert_eq!(generator.column_height(0.0, 2), 2);
    }

    #[test]
    fn layers_follow_band_rules() {
        let mut generator = flat_generator(0.5);
        let mut grid = VoxelGrid::new(GridDims::new(6, 20, 6));
        generator.generate(&mut grid, 11);
        let height = generator.column_height(0.5, 20);

        for c in grid.dims().iter_columns() {
            assert_eq!(grid.get(c.x, 0, c.y), Some(BlockKind::Den));
            for y in 1..height {
                let kind = grid.get(c.x, y, c.y).unwrap();
                if y < height - 3 {
                    assert!(matches!(kind, BlockKind::Rock | BlockKind::Soil), "deep {kind} at {y}");
                } else {
                    assert!(
                        matches!(kind, BlockKind::Relic | BlockKind::Pipestone | BlockKind::Soil),
                        "surface band {kind} at {y}"
                    );
                }
            }
            for y in height..20 {
                assert_eq!(grid.get(c.x, y, c.y), Some(BlockKind::Air));
            }
            assert_eq!(grid.surface_level(c.x, c.y), Some(height - 1));
        }
    }

    #[test]
    fn reported_relics_match_grid_contents() {
        let mut generator = TerrainGenerator::new(TerrainParams {
            relic_chance: 0.5,
            ..TerrainParams::default()
        });
        let mut grid = VoxelGrid::new(GridDims::new(12, 16, 12));
        let generated = generator.generate(&mut grid, 3);
        let mut from_grid: Vec<IVec3> = grid.cells_of_kind(BlockKind::Relic).collect();
        let mut reported = generated.relics.clone();
        from_grid.sort_by_key(|c| (c.x, c.y, c.z));
        reported.sort_by_key(|c| (c.x, c.y, c.z));
        assert!(!reported.is_empty());
        assert_eq!(reported, from_grid);
    }

    #[test]
    fn fixed_seed_is_reproducible_and_seeds_differ() {
        let dims = GridDims::new(10, 12, 10);
        let mut generator = TerrainGenerator::new(TerrainParams::default());

        let mut a = VoxelGrid::new(dims);
        let mut b = VoxelGrid::new(dims);
        let mut c = VoxelGrid::new(dims);
        generator.generate(&mut a, 1234);
        generator.generate(&mut b, 1234);
        generator.generate(&mut c, 4321);

        let cells = |g: &VoxelGrid| -> Vec<Option<BlockKind>> {
            let d = g.dims();
            (0..d.depth)
                .flat_map(|z| (0..d.height).flat_map(move |y| (0..d.width).map(move |x| (x, y, z))))
                .map(|(x, y, z)| g.get(x, y, z))
                .collect()
        };
        assert_eq!(cells(&a), cells(&b));
        assert_ne!(cells(&a), cells(&c));
    }

    #[test]
    fn zero_chances_give_plain_soil() {
        let mut generator = TerrainGenerator::with_noise(
            TerrainParams {
                rock_chance: 0.0,
                relic_chance: 0.0,
                pipestone_chance: 0.0,
                ..TerrainParams::default()
            },
            Box::new(Flat(0.2)),
        );
        let mut grid = VoxelGrid::new(GridDims::new(4, 10, 4));
        let generated = generator.generate(&mut grid, 5);
        assert!(generated.relics.is_empty());
        let counts = grid.block_counts();
        assert!(!counts.contains_key(&BlockKind::Rock));
        assert!(!counts.contains_key(&BlockKind::Pipestone));
        assert_eq!(counts.get(&BlockKind::Den), Some(&16));
    }
}
