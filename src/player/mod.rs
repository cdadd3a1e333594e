//! Avatar motion and the observing camera.
//!
//! The avatar lives on grid columns and moves in discrete, timed
//! transitions (`movement`). The camera orbits a target point and is driven
//! by continuous pointer gestures (`camera`). Neither module touches the
//! grid directly; the world facade hands them what they need.
//!
//! # Example:
//!
//! ```
//! use bevy::math::IVec2;
//! use cave_of_nations::player::Facing;
//!
//! let facing = Facing::from_step(IVec2::new(-1, 0)).unwrap();
//! assert_eq!(facing, Facing::West);
//! assert_eq!(facing.step(), IVec2::new(-1, 0));
//! assert!(Facing::from_step(IVec2::new(1, 1)).is_none());
//! ```
pub mod camera;
pub mod movement;

pub use camera::*;
pub use movement::*;

use bevy::math::IVec2;

/// One of the four grid directions the avatar can face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Facing {
    North,
    #[default]
    South,
    West,
    East,
}

impl Facing {
    /// Unit step `(dx, dz)` for this direction. North is -z.
    #[must_use]
    pub fn step(self) -> IVec2 {
        match self {
            Facing::North => IVec2::new(0, -1),
            Facing::South => IVec2::new(0, 1),
            Facing::West => IVec2::new(-1, 0),
            Facing::East => IVec2::new(1, 0),
        }
    }

    /// Direction of a unit grid step, `None` for anything else.
    #[must_use]
    pub fn from_step(step: IVec2) -> Option<Self> {
        match (step.x, step.y) {
            (0, -1) => Some(Facing::North),
            (0, 1) => Some(Facing::South),
            (-1, 0) => Some(Facing::West),
            (1, 0) => Some(Facing::East),
            _ => None,
        }
    }

    /// Yaw in radians about +y for a model whose forward axis is +z.
    #[must_use]
    pub fn yaw(self) -> f32 {
        let s = self.step();
        (s.x as f32).atan2(s.y as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn steps_round_trip() {
        for f in [Facing::North, Facing::South, Facing::West, Facing::East] {
            assert_eq!(Facing::from_step(f.step()), Some(f));
        }
    }

    #[test]
    fn yaw_matches_atan2_of_step() {
        assert!((Facing::South.yaw() - 0.0).abs() < 1e-6);
        assert!((Facing::East.yaw() - FRAC_PI_2).abs() < 1e-6);
        assert!((Facing::West.yaw() + FRAC_PI_2).abs() < 1e-6);
        assert!((Facing::North.yaw().abs() - PI).abs() < 1e-6);
    }
}
