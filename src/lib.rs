//! Nest Siege - real-time enemy combat and perception in Bevy.
//!
//! Hostile actors perceive the player, chase, run timed multi-phase attacks,
//! take hits with cooldowns and die exactly once. A boss escalates at a
//! health threshold, and a victory poller ends the encounter once it falls.
//!
//! # Architecture
//!
//! The game is organized into plugins, each handling a specific aspect:
//!
//! - **Core**: Game states, global events, combat config, tick ordering
//! - **Player**: The combat target
//! - **Combat**: Health, damage windows, the shared projectile pool
//! - **Enemies**: Perception, decisions, attack sequences, bosses, victory
//! - **World**: Encounter data and spawning

pub mod combat;
pub mod core;
pub mod enemies;
pub mod player;
pub mod world;

use bevy::prelude::*;

/// Main game plugin that adds all sub-plugins.
pub struct NestSiegePlugin;

impl Plugin for NestSiegePlugin {
    fn build(&self, app: &mut App) {
        app
            // Core systems (must be first)
            .add_plugins(core::CorePlugin)

            // Player systems
            .add_plugins(player::PlayerPlugin)

            // Combat systems
            .add_plugins(combat::CombatPlugin)

            // Enemy systems
            .add_plugins(enemies::EnemyPlugin)

            // World systems
            .add_plugins(world::WorldPlugin);
    }
}
