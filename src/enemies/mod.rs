//! Enemies module - perception, decisions, attacks, damage and bosses.

pub mod animation;
mod ai;
pub mod boss;
mod components;
pub mod data;
mod health;
pub mod navigation;
pub mod perception;
mod plugin;
pub mod sequencer;
mod spawning;
pub mod victory;

pub use ai::select_state;
pub use animation::{Animator, AnimationCommand};
pub use boss::{BossPhase, BossReveal, Egg};
pub use components::*;
pub use data::{EnemyDefinition, EnemyRegistry};
pub use navigation::{NavAgent, Patrol};
pub use perception::Perception;
pub use plugin::EnemyPlugin;
pub use sequencer::{AttackSequence, AttackSequencer, Phase, PhaseAction};
pub use spawning::{actor_bundle, spawn_actor};
pub use victory::{VictoryWatch, WatchState};
