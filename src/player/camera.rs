//! Orbit camera driven by pointer gestures.
//!
//! `CameraRig` keeps a target point, a pitch/yaw pair and a distance. Orbit,
//! pan and zoom gestures mutate that state and clamp it; the camera pose is
//! derived from it on demand with `transform`/`to_transform`.

use crate::grid::GridDims;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Gesture sensitivities and limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraTuning {
    #[serde(default = "CameraTuning::default_min_pitch")]
    pub min_pitch: f32, // Radians above the ground plane
    #[serde(default = "CameraTuning::default_max_pitch")]
    pub max_pitch: f32,
    #[serde(default = "CameraTuning::default_pitch")]
    pub default_pitch: f32,
    #[serde(default = "CameraTuning::default_yaw")]
    pub default_yaw: f32,
    #[serde(default = "CameraTuning::default_min_distance")]
    pub min_distance: f32,
    #[serde(default = "CameraTuning::default_max_distance")]
    pub max_distance: f32,
    #[serde(default = "CameraTuning::default_orbit_sensitivity")]
    pub orbit_sensitivity: f32, // Radians per pixel
    #[serde(default = "CameraTuning::default_pan_sensitivity")]
    pub pan_sensitivity: f32, // World units per pixel per unit of distance
    #[serde(default = "CameraTuning::default_zoom_sensitivity")]
    pub zoom_sensitivity: f32, // Distance fraction per wheel notch
    #[serde(default = "CameraTuning::default_bounds_padding")]
    pub bounds_padding: f32, // World units the target may leave the grid by
}

impl CameraTuning {
    fn default_min_pitch() -> f32 { 0.2 }
    fn default_max_pitch() -> f32 { 1.45 }
    fn default_pitch() -> f32 { 0.85 }
    fn default_yaw() -> f32 { std::f32::consts::FRAC_PI_4 }
    fn default_min_distance() -> f32 { 4.0 }
    fn default_max_distance() -> f32 { 80.0 }
    fn default_orbit_sensitivity() -> f32 { 0.005 }
    fn default_pan_sensitivity() -> f32 { 0.0015 }
    fn default_zoom_sensitivity() -> f32 { 0.1 }
    fn default_bounds_padding() -> f32 { 4.0 }
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            min_pitch: Self::default_min_pitch(),
            max_pitch: Self::default_max_pitch(),
            default_pitch: Self::default_pitch(),
            default_yaw: Self::default_yaw(),
            min_distance: Self::default_min_distance(),
            max_distance: Self::default_max_distance(),
            orbit_sensitivity: Self::default_orbit_sensitivity(),
            pan_sensitivity: Self::default_pan_sensitivity(),
            zoom_sensitivity: Self::default_zoom_sensitivity(),
            bounds_padding: Self::default_bounds_padding(),
        }
    }
}

/// Camera position and the point it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    pub position: Vec3,
    pub look_at: Vec3,
}

#[derive(Debug, Clone)]
pub struct CameraRig {
    tuning: CameraTuning,
    target: Vec3,
    pitch: f32,
    yaw: f32,
    distance: f32,
    bounds_min: Vec3,
    bounds_max: Vec3,
}

impl CameraRig {
    #[must_use]
    pub fn new(tuning: CameraTuning) -> Self {
        let mut rig = Self {
            target: Vec3::ZERO,
            pitch: tuning.default_pitch,
            yaw: tuning.default_yaw,
            distance: tuning.max_distance,
            bounds_min: Vec3::splat(f32::MIN),
            bounds_max: Vec3::splat(f32::MAX),
            tuning,
        };
        rig.clamp_state();
        rig
    }

    #[must_use]
    pub fn tuning(&self) -> &CameraTuning {
        &self.tuning
    }

    /// Replace tuning and re-clamp the current state into the new limits.
    pub fn set_tuning(&mut self, tuning: CameraTuning) {
        self.tuning = tuning;
        self.clamp_state();
    }

    #[must_use]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    #[must_use]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    #[must_use]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[must_use]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Padded box the target is kept inside.
    #[must_use]
    pub fn bounds(&self) -> (Vec3, Vec3) {
        (self.bounds_min, self.bounds_max)
    }

    /// Frame a freshly built grid: target `focus`, default angles, and a
    /// distance proportional to the larger horizontal extent.
    pub fn reset(&mut self, focus: Vec3, dims: GridDims, tile_size: f32) {
        let pad = self.tuning.bounds_padding;
        let (lo, hi) = dims.world_bounds(tile_size);
        self.bounds_min = Vec3::new(lo.x - pad, lo.y, lo.z - pad);
        self.bounds_max = Vec3::new(hi.x + pad, hi.y, hi.z + pad);

        #[allow(clippy::cast_precision_loss)]
        let extent = dims.width.max(dims.depth) as f32 * tile_size;
        self.target = focus;
        self.pitch = self.tuning.default_pitch;
        self.yaw = self.tuning.default_yaw;
        self.distance = extent * 1.75;
        self.clamp_state();
    }

    /// Rotate around the target by a screen-space drag.
    pub fn orbit(&mut self, delta: Vec2) {
        self.yaw -= delta.x * self.tuning.orbit_sensitivity;
        self.pitch += delta.y * self.tuning.orbit_sensitivity;
        self.clamp_state();
    }

    /// Slide the target across the ground plane by a screen-space drag.
    pub fn pan(&mut self, delta: Vec2) {
        let k = self.distance * self.tuning.pan_sensitivity;
        let right = self.ground_right();
        let forward = self.ground_forward();
        self.target -= right * delta.x * k;
        self.target += forward * delta.y * k;
        self.clamp_state();
    }

    /// Scale distance by a wheel delta; positive moves closer.
    pub fn zoom(&mut self, delta: f32) {
        let factor = (1.0 - delta * self.tuning.zoom_sensitivity).clamp(0.25, 1.75);
        self.distance *= factor;
        self.clamp_state();
    }

    /// Unit vector from the camera toward the target, flattened to the ground.
    #[must_use]
    pub fn ground_forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    /// Camera right vector, flattened to the ground.
    #[must_use]
    pub fn ground_right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    /// Camera pose derived from the current state.
    #[must_use]
    pub fn transform(&self) -> CameraTransform {
        let offset = self.distance
            * Vec3::new(
                self.yaw.sin() * self.pitch.cos(),
                self.pitch.sin(),
                self.yaw.cos() * self.pitch.cos(),
            );
        CameraTransform {
            position: self.target + offset,
            look_at: self.target,
        }
    }

    /// Bevy transform looking at the target with +y up.
    #[must_use]
    pub fn to_transform(&self) -> Transform {
        let t = self.transform();
        Transform::from_translation(t.position).looking_at(t.look_at, Vec3::Y)
    }

    fn clamp_state(&mut self) {
        let t = &self.tuning;
        let (min_pitch, max_pitch) = (t.min_pitch.min(t.max_pitch), t.max_pitch.max(t.min_pitch));
        let (min_dist, max_dist) = (t.min_distance.min(t.max_distance), t.max_distance.max(t.min_distance));
        self.pitch = self.pitch.clamp(min_pitch, max_pitch);
        self.distance = self.distance.clamp(min_dist, max_dist);
        self.target = self.target.clamp(self.bounds_min, self.bounds_max);
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(CameraTuning::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framed(dims: GridDims) -> CameraRig {
        let mut rig = CameraRig::default();
        let (lo, hi) = dims.world_bounds(1.0);
        rig.reset((lo + hi) * 0.5, dims, 1.0);
        rig
    }

    #[test]
    fn reset_frames_the_grid() {
        let rig = framed(GridDims::new(16, 12, 20));
        let t = CameraTuning::default();
        assert!((rig.distance() - 35.0).abs() < 1e-4);
        assert_eq!(rig.pitch(), t.default_pitch);
        assert_eq!(rig.yaw(), t.default_yaw);
    }

    #[test]
    fn reset_distance_is_clamped() {
        let rig = framed(GridDims::new(64, 8, 64));
        assert_eq!(rig.distance(), CameraTuning::default().max_distance);
    }

    #[test]
    fn zoom_out_saturates_at_max_distance() {
        let mut rig = framed(GridDims::new(8, 8, 8));
        for _ in 0..200 {
            rig.zoom(-3.0);
            assert!(rig.distance() <= rig.tuning().max_distance);
        }
        assert_eq!(rig.distance(), rig.tuning().max_distance);
    }

    #[test]
    fn zoom_in_saturates_at_min_distance() {
        let mut rig = framed(GridDims::new(8, 8, 8));
        for _ in 0..200 {
            rig.zoom(50.0);
        }
        assert_eq!(rig.distance(), rig.tuning().min_distance);
    }

    #[test]
    fn orbit_keeps_pitch_in_range() {
        let mut rig = framed(GridDims::default());
        let t = CameraTuning::default();
        for i in 0..500 {
            let dy = if i % 7 < 4 { 90.0 } else { -130.0 };
            rig.orbit(Vec2::new(13.0, dy));
            assert!((t.min_pitch..=t.max_pitch).contains(&rig.pitch()));
        }
    }

    #[test]
    fn pan_never_changes_height_and_stays_in_bounds() {
        let mut rig = framed(GridDims::new(10, 10, 10));
        let y = rig.target().y;
        for _ in 0..100 {
            rig.pan(Vec2::new(400.0, -250.0));
        }
        let (lo, hi) = rig.bounds();
        let target = rig.target();
        assert_eq!(target.y, y);
        assert!(target.cmpge(lo).all() && target.cmple(hi).all());
    }

    #[test]
    fn pan_moves_opposite_to_the_drag() {
        let mut rig = framed(GridDims::new(30, 10, 30));
        let before = rig.target();
        rig.pan(Vec2::new(20.0, 0.0));
        let moved = rig.target() - before;
        assert!(moved.dot(rig.ground_right()) < 0.0);
    }

    #[test]
    fn transform_sits_on_the_orbit_sphere() {
        let rig = framed(GridDims::new(12, 12, 12));
        let t = rig.transform();
        assert_eq!(t.look_at, rig.target());
        assert!(((t.position - t.look_at).length() - rig.distance()).abs() < 1e-3);
        assert!(t.position.y > t.look_at.y);

        let bevy_t = rig.to_transform();
        let facing = bevy_t.forward();
        let expected = (t.look_at - t.position).normalize();
        assert!(facing.dot(expected) > 0.999);
    }
}
