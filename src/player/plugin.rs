//! Player plugin - spawning of the player as a combat target.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::components::*;
use crate::combat::Health;
use crate::core::Tag;
use crate::world::EncounterEntity;

/// Player plugin - registers player resources.
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerConfig>();
    }
}

/// Spawn the player at the given position.
pub fn spawn_player(commands: &mut Commands, config: &PlayerConfig, position: Vec3) -> Entity {
    commands
        .spawn((
            Player,
            Tag::Player,
            Health::new(config.max_health),
            Transform::from_translation(position),
            Visibility::default(),
            Collider::capsule_y(config.half_height, config.radius),
            RigidBody::KinematicPositionBased,
            EncounterEntity,
        ))
        .id()
}
