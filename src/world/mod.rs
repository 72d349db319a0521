//! World module - encounter data and spawning.

mod data;
mod error;
mod plugin;
mod spawning;

pub use data::{ActorSpawn, CurrentEncounter, EncounterDefinition, EncounterRegistry, ObstacleDef};
pub use error::DataLoadError;
pub use plugin::{setup_encounter, WorldPlugin};
pub use spawning::{spawn_encounter, EncounterEntity};
