//! Core game module - states, events, configuration, and system ordering.
//!
//! This module provides the foundation that all other game systems build upon.

mod config;
mod events;
mod plugin;
mod states;

pub use config::*;
pub use events::*;
pub use plugin::{CorePlugin, SimulationSet};
pub use states::*;
