//! Core plugin that sets up game states, events, and simulation ordering.

use bevy::prelude::*;

use super::config::*;
use super::events::*;
use super::states::*;

/// Per-tick ordering of the combat simulation.
///
/// Perception is recomputed before any decision is taken, and attack
/// sequences advance after the decision step of the same tick.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Perception,
    Damage,
    Decision,
    Sequence,
    Resolve,
    Movement,
    Feedback,
}

/// Core plugin - must be added first as other plugins depend on it.
///
/// This plugin sets up:
/// - Game states (Loading, InGame, GameOver, Victory)
/// - Global events (DamageEvent, DeathEvent, etc.)
/// - The combat config resource and system set ordering
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app
            // Initialize game states
            .init_state::<GameState>()

            // Register global events
            .add_event::<DamageEvent>()
            .add_event::<DeathEvent>()
            .add_event::<FireProjectileEvent>()
            .add_event::<BossPhaseEvent>()
            .add_event::<BossRevealedEvent>()
            .add_event::<VictoryEvent>()

            .init_resource::<CombatConfig>()
            .add_systems(Startup, load_combat_config)

            .configure_sets(
                Update,
                (
                    SimulationSet::Perception,
                    SimulationSet::Damage,
                    SimulationSet::Decision,
                    SimulationSet::Sequence,
                    SimulationSet::Resolve,
                    SimulationSet::Movement,
                    SimulationSet::Feedback,
                )
                    .chain()
                    .run_if(in_state(GameState::InGame)),
            )

            // Data is read synchronously at startup, so loading completes
            // on the first frame
            .add_systems(Update, finish_loading.run_if(in_state(GameState::Loading)))
            .add_systems(OnEnter(GameState::GameOver), announce_game_over)
            .add_systems(OnEnter(GameState::Victory), announce_victory);
    }
}

fn finish_loading(mut next_state: ResMut<NextState<GameState>>) {
    next_state.set(GameState::InGame);
}

fn announce_game_over() {
    info!("Player died - game over");
}

fn announce_victory() {
    info!("No hostiles remain - encounter won");
}
