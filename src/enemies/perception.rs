//! Perception - sight range, attack range, and line of sight.
//!
//! Recomputed from scratch every tick; nothing is remembered between ticks.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::components::{CombatStatus, Enemy, EnemyStats};
use crate::core::{CombatConfig, Tag};
use crate::player::Player;

/// What an actor knows about the player this tick.
#[derive(Component, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Perception {
    pub in_sight_range: bool,
    pub in_attack_range: bool,
    pub has_line_of_sight: bool,
}

/// Ray intersection capability used for line of sight.
pub trait SpatialQuery {
    /// Nearest entity hit by the ray, if any.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Entity>;
}

/// Line of sight through the physics world, ignoring the caster and sensors.
pub struct RapierSight<'a> {
    pub context: &'a RapierContext,
    pub caster: Entity,
}

impl SpatialQuery for RapierSight<'_> {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Entity> {
        let filter = QueryFilter::default()
            .exclude_sensors()
            .exclude_collider(self.caster);
        self.context
            .cast_ray(origin, direction, max_distance, true, filter)
            .map(|(entity, _)| entity)
    }
}

/// Used when no physics world exists: nothing can occlude the target.
pub struct ClearSight {
    pub target: Entity,
}

impl SpatialQuery for ClearSight {
    fn raycast(&self, _origin: Vec3, _direction: Vec3, _max_distance: f32) -> Option<Entity> {
        Some(self.target)
    }
}

/// Compute perception from positions.
///
/// Ranges compare squared distances between body positions. The ray leaves
/// from `eye_height` above the actor and is only cast when the target is
/// within sight range; it only counts when the nearest hit is the target.
pub fn perceive(
    position: Vec3,
    target_position: Vec3,
    eye_height: f32,
    sight_range: f32,
    attack_range: f32,
    world: &impl SpatialQuery,
    is_target: impl Fn(Entity) -> bool,
) -> Perception {
    let distance_squared = position.distance_squared(target_position);

    let in_sight_range = distance_squared <= sight_range * sight_range;
    let in_attack_range = distance_squared <= attack_range * attack_range;

    let has_line_of_sight = in_sight_range && {
        let eye = position + Vec3::Y * eye_height;
        let to_target = target_position - eye;
        world
            .raycast(eye, to_target.normalize_or_zero(), sight_range + eye_height)
            .is_some_and(is_target)
    };

    Perception {
        in_sight_range,
        in_attack_range,
        has_line_of_sight,
    }
}

/// Refresh perception of every living actor.
pub fn update_perception(
    config: Res<CombatConfig>,
    player_query: Query<(Entity, &Transform), (With<Player>, Without<Enemy>)>,
    mut enemy_query: Query<
        (Entity, &Transform, &EnemyStats, &CombatStatus, &mut Perception),
        (With<Enemy>, Without<Player>),
    >,
    tags: Query<&Tag>,
    rapier_context: Query<&RapierContext>,
) {
    let context = rapier_context.get_single().ok();
    let player = player_query.get_single().ok();

    for (entity, transform, stats, status, mut perception) in enemy_query.iter_mut() {
        if status.is_dead {
            *perception = Perception::default();
            continue;
        }

        // A missing target perceives as nothing at all
        let Some((player_entity, player_transform)) = player else {
            *perception = Perception::default();
            continue;
        };

        let is_target = |hit: Entity| {
            hit == player_entity || tags.get(hit).is_ok_and(|tag| *tag == Tag::Player)
        };

        *perception = match context {
            Some(context) => perceive(
                transform.translation,
                player_transform.translation,
                config.eye_height,
                stats.sight_range,
                stats.attack_range,
                &RapierSight { context, caster: entity },
                is_target,
            ),
            None => perceive(
                transform.translation,
                player_transform.translation,
                config.eye_height,
                stats.sight_range,
                stats.attack_range,
                &ClearSight { target: player_entity },
                is_target,
            ),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Scripted world: the ray hits `hit` and records how often it was cast.
    struct Scripted {
        hit: Option<Entity>,
        casts: Cell<usize>,
    }

    impl SpatialQuery for Scripted {
        fn raycast(&self, _origin: Vec3, _direction: Vec3, _max_distance: f32) -> Option<Entity> {
            self.casts.set(self.casts.get() + 1);
            self.hit
        }
    }

    const TARGET: Entity = Entity::from_raw(1);
    const WALL: Entity = Entity::from_raw(2);

    fn scripted(hit: Option<Entity>) -> Scripted {
        Scripted {
            hit,
            casts: Cell::new(0),
        }
    }

    fn at(distance: f32) -> Vec3 {
        Vec3::new(0.0, 0.0, -distance)
    }

    #[test]
    fn wall_blocks_line_of_sight() {
        let world = scripted(Some(WALL));
        let seen = perceive(Vec3::ZERO, at(5.0), 0.5, 10.0, 2.0, &world, |e| e == TARGET);
        assert!(seen.in_sight_range);
        assert!(!seen.has_line_of_sight);
    }

    #[test]
    fn no_ray_beyond_sight_range() {
        let world = scripted(Some(TARGET));
        let seen = perceive(Vec3::ZERO, at(15.0), 0.5, 10.0, 2.0, &world, |e| e == TARGET);
        assert_eq!(seen, Perception::default());
        assert_eq!(world.casts.get(), 0);
    }

    #[test]
    fn clear_line_inside_attack_range() {
        let world = scripted(Some(TARGET));
        let seen = perceive(Vec3::ZERO, at(1.5), 0.5, 10.0, 2.0, &world, |e| e == TARGET);
        assert!(seen.in_sight_range && seen.in_attack_range && seen.has_line_of_sight);
        assert_eq!(world.casts.get(), 1);
    }

    #[test]
    fn range_flags_imply_distance_bounds() {
        let world = scripted(Some(TARGET));
        let (sight, attack) = (6.0, 2.5);

        for x in -10..=10 {
            for z in -10..=10 {
                let target = Vec3::new(x as f32 * 0.7, 0.3, z as f32 * 0.7);
                let distance = target.length();
                let seen = perceive(Vec3::ZERO, target, 0.5, sight, attack, &world, |e| e == TARGET);

                if seen.in_sight_range {
                    assert!(distance <= sight + 1e-4);
                }
                if seen.in_attack_range {
                    assert!(distance <= attack + 1e-4);
                }
                if seen.has_line_of_sight {
                    assert!(seen.in_sight_range);
                }
            }
        }
    }
}
