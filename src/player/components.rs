//! Player-related components.

use bevy::prelude::*;

/// Marker component for the player entity.
#[derive(Component)]
pub struct Player;

/// Player tuning.
#[derive(Resource)]
pub struct PlayerConfig {
    pub max_health: f32,
    /// Capsule collider half height
    pub half_height: f32,
    pub radius: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            half_height: 0.5,
            radius: 0.3,
        }
    }
}
