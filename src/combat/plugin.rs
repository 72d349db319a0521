//! Combat plugin - damage windows, projectiles, and player damage.

use bevy::prelude::*;

use super::projectiles;
use super::systems;
use crate::core::{GameState, SimulationSet};

/// Combat plugin - handles all hit delivery and the shared projectile pool.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app
            // The pool is sized once per encounter and never resized
            .add_systems(OnEnter(GameState::InGame), projectiles::init_projectile_pool)
            .add_systems(
                Update,
                (projectiles::launch_projectiles, projectiles::move_projectiles)
                    .chain()
                    .in_set(SimulationSet::Movement),
            )
            .add_systems(
                Update,
                systems::strike_with_damage_windows.in_set(SimulationSet::Resolve),
            )
            .add_systems(
                Update,
                (
                    systems::apply_player_damage,
                    systems::check_player_death,
                )
                    .chain()
                    .in_set(SimulationSet::Damage),
            )
            .add_systems(
                Update,
                (projectiles::tick_impact_effects, projectiles::sync_pool_visuals)
                    .chain()
                    .in_set(SimulationSet::Feedback),
            );
    }
}
