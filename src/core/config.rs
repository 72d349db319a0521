//! Combat tuning loaded from an external RON file.
//!
//! Allows tweaking timings and capacities without recompilation.

use bevy::prelude::*;
use serde::Deserialize;
use std::fs;

use crate::enemies::Archetype;

/// Combat configuration loaded from assets/data/combat.ron.
#[derive(Resource, Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    // Health/damage controller
    pub hit_cooldown: f32,
    pub death_deactivate_delay: f32,
    pub health_bar_hide_delay: f32,
    // Perception and decision
    pub facing_tolerance_degrees: f32,
    /// Height of the eyes above an actor's body center
    pub eye_height: f32,
    pub patrol_wait: f32,
    // Projectile/effect pool
    pub projectile_pool_capacity: usize,
    pub impact_pool_capacity: usize,
    pub projectile_speed: f32,
    pub projectile_lifetime: f32,
    pub projectile_radius: f32,
    pub target_radius: f32,
    pub impact_lifetime: f32,
    // Boss phase controller
    pub boss_phase_threshold: f32,
    pub egg_destroy_interval: f32,
    // Victory poller
    pub victory_poll_interval: f32,
    pub victory_archetype: Archetype,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            hit_cooldown: 1.0,
            death_deactivate_delay: 30.0,
            health_bar_hide_delay: 2.0,
            facing_tolerance_degrees: 15.0,
            eye_height: 0.5,
            patrol_wait: 2.0,
            projectile_pool_capacity: 24,
            impact_pool_capacity: 12,
            projectile_speed: 14.0,
            projectile_lifetime: 3.0,
            projectile_radius: 0.25,
            target_radius: 0.6,
            impact_lifetime: 0.4,
            boss_phase_threshold: 0.7,
            egg_destroy_interval: 0.75,
            victory_poll_interval: 5.0,
            victory_archetype: Archetype::Melee,
        }
    }
}

impl CombatConfig {
    /// Load combat config from RON file.
    pub fn load() -> Self {
        let path = "assets/data/combat.ron";
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_ron(&contents, path),
            Err(e) => {
                warn!("Could not read {}: {}. Using defaults.", path, e);
                Self::default()
            }
        }
    }

    fn from_ron(contents: &str, path: &str) -> Self {
        match ron::from_str(contents) {
            Ok(config) => {
                info!("Loaded combat config from {}", path);
                config
            }
            Err(e) => {
                error!("Failed to parse {}: {}. Using defaults.", path, e);
                Self::default()
            }
        }
    }

    /// Facing tolerance in radians.
    pub fn facing_tolerance(&self) -> f32 {
        self.facing_tolerance_degrees.to_radians()
    }
}

/// System to load combat config at startup.
pub fn load_combat_config(mut commands: Commands) {
    commands.insert_resource(CombatConfig::load());
}
