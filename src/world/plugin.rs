//! World plugin - encounter loading and setup.

use bevy::prelude::*;

use crate::core::{CombatConfig, GameState};
use crate::enemies::EnemyRegistry;
use crate::player::PlayerConfig;

use super::data::{load_encounter_definitions, CurrentEncounter, EncounterRegistry};
use super::spawning::{spawn_encounter, EncounterEntity};

/// World plugin - handles encounter loading and world setup.
pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EncounterRegistry>()
            .init_resource::<CurrentEncounter>()
            .add_systems(Startup, load_encounter_definitions)
            .add_systems(OnEnter(GameState::InGame), (setup_encounter, spawn_overview))
            .add_systems(OnExit(GameState::InGame), cleanup_encounter);
    }
}

/// Build the current encounter from data.
pub fn setup_encounter(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<CombatConfig>,
    player_config: Res<PlayerConfig>,
    enemy_registry: Res<EnemyRegistry>,
    encounter_registry: Res<EncounterRegistry>,
    current: Res<CurrentEncounter>,
) {
    let Some(encounter) = encounter_registry.get(&current.name) else {
        error!("Encounter '{}' not found in registry!", current.name);
        return;
    };

    info!("Building encounter: {}", encounter.name);

    spawn_encounter(
        &mut commands,
        &asset_server,
        &config,
        &player_config,
        &enemy_registry,
        encounter,
    );
}

/// Fixed camera and light over the arena.
fn spawn_overview(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 18.0, 18.0).looking_at(Vec3::ZERO, Vec3::Y),
        EncounterEntity,
    ));
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 10.0, 2.0).looking_at(Vec3::ZERO, Vec3::Y),
        EncounterEntity,
    ));
}

/// Clean up encounter entities when leaving InGame state.
fn cleanup_encounter(mut commands: Commands, query: Query<Entity, With<EncounterEntity>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}
