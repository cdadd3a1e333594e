pub mod block;
pub mod controls;
pub mod grid;
pub mod pathfinding;
pub mod placement;
pub mod player;
pub mod ron;
pub use crate::ron as ron_loader;
pub mod simulation;
pub mod terrain;
pub mod world;

pub mod settings;
pub mod debug;
