//! Player module - the target every hostile actor perceives and attacks.

mod components;
mod plugin;

pub use components::*;
pub use plugin::{spawn_player, PlayerPlugin};
