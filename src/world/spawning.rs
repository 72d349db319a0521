//! Entity spawning for encounter construction.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::data::EncounterDefinition;
use crate::core::CombatConfig;
use crate::enemies::{spawn_actor, BossPhase, BossReveal, Egg, EnemyRegistry};
use crate::player::{spawn_player, PlayerConfig};

/// Marker for everything built for the current encounter, cleaned up when
/// leaving the game.
#[derive(Component)]
pub struct EncounterEntity;

fn vec3((x, y, z): (f32, f32, f32)) -> Vec3 {
    Vec3::new(x, y, z)
}

/// Spawn static obstacles that block movement and line of sight.
pub fn spawn_obstacles(commands: &mut Commands, encounter: &EncounterDefinition) {
    for obstacle in &encounter.obstacles {
        let (hx, hy, hz) = obstacle.half_extents;
        commands.spawn((
            Transform::from_translation(vec3(obstacle.center)),
            Collider::cuboid(hx, hy, hz),
            RigidBody::Fixed,
            EncounterEntity,
        ));
    }
}

/// Spawn the boss eggs, returning them in destruction order.
pub fn spawn_eggs(commands: &mut Commands, encounter: &EncounterDefinition) -> Vec<Entity> {
    encounter
        .eggs
        .iter()
        .map(|&position| {
            commands
                .spawn((
                    Egg,
                    Transform::from_translation(vec3(position)),
                    Visibility::default(),
                    Collider::ball(0.3),
                    RigidBody::Fixed,
                    EncounterEntity,
                ))
                .id()
        })
        .collect()
}

/// Build the whole encounter: player, obstacles, eggs and actors.
///
/// The eggs belong to the first boss in the encounter.
pub fn spawn_encounter(
    commands: &mut Commands,
    asset_server: &AssetServer,
    config: &CombatConfig,
    player_config: &PlayerConfig,
    registry: &EnemyRegistry,
    encounter: &EncounterDefinition,
) {
    spawn_player(commands, player_config, vec3(encounter.player_start));
    spawn_obstacles(commands, encounter);
    let mut eggs = spawn_eggs(commands, encounter);

    for (spawn, definition) in encounter.resolve_actors(registry) {
        let definition = match definition {
            Ok(definition) => definition,
            Err(e) => {
                warn!("{} in encounter '{}'", e, encounter.name);
                continue;
            }
        };

        let entity = spawn_actor(
            commands,
            asset_server,
            config,
            &spawn.enemy_type,
            definition,
            vec3(spawn.position),
            spawn.yaw.to_radians(),
        );

        if definition.archetype.has_second_phase() {
            commands.entity(entity).insert((
                BossPhase::new(config.boss_phase_threshold, std::mem::take(&mut eggs)),
                BossReveal::default(),
            ));
        }
    }

    if !eggs.is_empty() {
        warn!("Encounter '{}' has eggs but no boss", encounter.name);
    }
}
