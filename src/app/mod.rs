pub mod setup;
pub mod render;
pub mod display;

pub use setup::setup;
pub use render::{draw_avatar, draw_placement_preview, draw_terrain};
pub use display::sync_window_title;
