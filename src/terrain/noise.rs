//! Fractal Perlin height noise.
//!
//! Wraps `noise::Fbm<Perlin>` so the generator only sees the `HeightNoise`
//! capability. Raw fBm output sits roughly in [-1, 1]; it is remapped and
//! clamped into [0, 1].

use super::{HeightNoise, TerrainParams};
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

pub struct FbmHeightNoise {
    fbm: Fbm<Perlin>,
    frequency: f64,
    octaves: usize,
    persistence: f64,
    lacunarity: f64,
}

impl FbmHeightNoise {
    /// Build a noise source from terrain parameters.
    #[must_use]
    pub fn new(params: &TerrainParams, seed: u32) -> Self {
        let mut noise = Self {
            fbm: Fbm::new(seed),
            frequency: params.frequency,
            octaves: params.octaves.max(1),
            persistence: params.persistence,
            lacunarity: params.lacunarity,
        };
        noise.reseed(seed);
        noise
    }

    fn configured(&self, seed: u32) -> Fbm<Perlin> {
        Fbm::<Perlin>::new(seed)
            .set_octaves(self.octaves)
            .set_frequency(self.frequency)
            .set_persistence(self.persistence)
            .set_lacunarity(self.lacunarity)
    }
}

impl HeightNoise for FbmHeightNoise {
    fn sample(&self, x: i32, z: i32) -> f32 {
        // Offset by half a cell: Perlin is zero on integer lattice points.
        let v = self.fbm.get([f64::from(x) + 0.5, f64::from(z) + 0.5]);
        #[allow(clippy::cast_possible_truncation)]
        let t = ((v + 1.0) * 0.5) as f32;
        t.clamp(0.0, 1.0)
    }

    fn reseed(&mut self, seed: u32) {
        self.fbm = self.configured(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_stay_normalized() {
        let noise = FbmHeightNoise::new(&TerrainParams::default(), 42);
        for z in -20..20 {
            for x in -20..20 {
                let v = noise.sample(x, z);
                assert!((0.0..=1.0).contains(&v), "{v} at {x},{z}");
            }
        }
    }

    #[test]
    fn same_seed_same_field() {
        let a = FbmHeightNoise::new(&TerrainParams::default(), 7);
        let b = FbmHeightNoise::new(&TerrainParams::default(), 7);
        for i in 0..50 {
            assert_eq!(a.sample(i, i * 3), b.sample(i, i * 3));
        }
    }

    #[test]
    fn reseeding_changes_the_field() {
        let mut noise = FbmHeightNoise::new(&TerrainParams::default(), 1);
        let before: Vec<f32> = (0..64).map(|i| noise.sample(i, 2 * i)).collect();
        noise.reseed(2);
        let after: Vec<f32> = (0..64).map(|i| noise.sample(i, 2 * i)).collect();
        assert_ne!(before, after);
    }

    #[test]
    fn field_is_smooth_between_neighbours() {
        let noise = FbmHeightNoise::new(&TerrainParams::default(), 99);
        for x in 0..40 {
            let d = (noise.sample(x, 5) - noise.sample(x + 1, 5)).abs();
            assert!(d < 0.5, "jump of {d} at x={x}");
        }
    }
}
