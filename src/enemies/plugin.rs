//! Enemy plugin - registers all enemy systems.

use bevy::prelude::*;

use super::ai;
use super::animation;
use super::boss;
use super::data::{load_enemy_definitions, EnemyRegistry};
use super::health;
use super::navigation;
use super::perception;
use super::victory::{self, VictoryWatch};
use crate::core::{GameState, SimulationSet};

/// Enemy plugin - handles perception, AI, attacks, death, bosses and animations.
pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app
            .init_resource::<EnemyRegistry>()
            .init_resource::<VictoryWatch>()
            // Definitions are on disk before any encounter is built
            .add_systems(Startup, load_enemy_definitions)
            .add_systems(OnEnter(GameState::InGame), victory::reset_victory_watch)
            .add_systems(
                Update,
                (perception::update_perception, boss::reveal_boss_health_bar)
                    .chain()
                    .in_set(SimulationSet::Perception),
            )
            .add_systems(
                Update,
                (
                    health::take_enemy_damage,
                    boss::watch_boss_health,
                    health::recover_from_hits,
                )
                    .chain()
                    .in_set(SimulationSet::Damage),
            )
            .add_systems(Update, ai::decide_actions.in_set(SimulationSet::Decision))
            .add_systems(Update, ai::run_attack_sequences.in_set(SimulationSet::Sequence))
            .add_systems(
                Update,
                (
                    health::finalize_deaths,
                    victory::arm_on_boss_death,
                    victory::poll_for_victory,
                    victory::enter_victory_state,
                )
                    .chain()
                    .in_set(SimulationSet::Resolve),
            )
            .add_systems(
                Update,
                navigation::follow_nav_destinations.in_set(SimulationSet::Movement),
            )
            .add_systems(
                Update,
                (
                    animation::setup_enemy_animations,
                    animation::play_animator_commands,
                    health::run_death_grace,
                    boss::destroy_eggs,
                )
                    .chain()
                    .in_set(SimulationSet::Feedback),
            );
    }
}
