//! Enemy spawning - assembles actor entities from their definitions.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::animation::{Animator, NeedsAnimationSetup};
use super::components::{AiState, CombatStatus, Enemy, EnemyType, HealthDisplay};
use super::data::EnemyDefinition;
use super::navigation::{NavAgent, Patrol};
use super::perception::Perception;
use super::sequencer::AttackSequencer;
use crate::combat::{DamageWindow, Health, Tag};
use crate::core::CombatConfig;
use crate::world::EncounterEntity;

/// Every component an actor needs to take part in combat, without visuals.
///
/// `yaw` is the initial heading in radians; zero faces -Z.
pub fn actor_bundle(enemy_type: &str, definition: &EnemyDefinition, position: Vec3, yaw: f32) -> impl Bundle {
    let collider = definition.collider.clone().unwrap_or_default();
    let archetype = definition.archetype;

    (
        (
            Enemy,
            Tag::Enemy,
            EnemyType(enemy_type.to_string()),
            archetype,
            AiState::default(),
            definition.to_stats(),
            Health::new(definition.max_health),
            CombatStatus::new(definition.is_stunnable(), archetype.has_second_phase()),
        ),
        (
            Perception::default(),
            NavAgent::new(definition.move_speed, definition.attack_range * 0.5),
            AttackSequencer::default(),
            Animator::default(),
            DamageWindow::new(definition.attack_range, definition.damage),
            // Boss health bars stay hidden until the boss is first seen
            HealthDisplay::new(!archetype.has_second_phase()),
        ),
        (
            Transform::from_translation(position)
                .with_rotation(Quat::from_rotation_y(yaw))
                .with_scale(Vec3::splat(definition.scale)),
            Visibility::default(),
            Collider::capsule_y(collider.half_height, collider.radius),
            RigidBody::KinematicPositionBased,
        ),
    )
}

/// Spawn one actor with its model, patrol behaviour and encounter marker.
pub fn spawn_actor(
    commands: &mut Commands,
    asset_server: &AssetServer,
    config: &CombatConfig,
    enemy_type: &str,
    definition: &EnemyDefinition,
    position: Vec3,
    yaw: f32,
) -> Entity {
    let mut entity = commands.spawn((actor_bundle(enemy_type, definition, position, yaw), EncounterEntity));

    if let Some(radius) = definition.patrol_radius {
        entity.insert(Patrol::new(position, radius, config.patrol_wait));
    }

    match &definition.model_path {
        Some(model_path) => {
            entity.insert(SceneRoot(asset_server.load(model_path.clone())));
            if definition.animations.is_some() {
                entity.insert(NeedsAnimationSetup);
            }
        }
        None => warn!("Enemy '{}' has no model; spawning without visuals", enemy_type),
    }

    info!("Spawned {} ({:?}) at {}", definition.name, definition.archetype, position);
    entity.id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemies::components::{Archetype, EnemyStats};

    #[test]
    fn boss_spawns_hidden_and_unstunnable() {
        let definition = EnemyDefinition::from_ron(
            r#"(
                name: "Broodmother",
                archetype: Boss,
                max_health: 400.0,
                damage: 25.0,
                move_speed: 2.0,
                sight_range: 16.0,
                attack_range: 3.0,
                time_between_attacks: 2.5,
            )"#,
            "broodmother.ron",
        )
        .unwrap();

        let mut world = World::new();
        let boss = world.spawn(actor_bundle("broodmother", &definition, Vec3::ZERO, 0.0)).id();

        assert_eq!(*world.get::<Archetype>(boss).unwrap(), Archetype::Boss);
        assert!(!world.get::<HealthDisplay>(boss).unwrap().visible);
        let status = world.get::<CombatStatus>(boss).unwrap();
        assert!(!status.is_stunnable);
        assert!(status.has_second_phase);
        assert_eq!(world.get::<Health>(boss).unwrap().current, 400.0);
        assert_eq!(world.get::<EnemyStats>(boss).unwrap().attack_range, 3.0);
    }
}
