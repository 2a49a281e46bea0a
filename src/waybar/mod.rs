/// Waybar JSON line formatting for player state
pub mod output;

pub use output::*;
