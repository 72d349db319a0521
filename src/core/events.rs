//! Global events used for cross-system communication.
//!
//! Damage is delivered exclusively through [`DamageEvent`]: melee damage
//! windows, projectiles and any external weapon all send one, and the health
//! controllers of actors and the player consume it.

use bevy::prelude::*;
use serde::Deserialize;

/// Faction tag used for line-of-sight matching and projectile ownership.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Tag {
    Player,
    Enemy,
}

/// Sent whenever something should take damage.
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageEvent {
    /// Entity receiving damage
    pub target: Entity,
    /// Entity that caused the damage, if it still exists
    pub source: Option<Entity>,
    /// Damage amount
    pub amount: f32,
}

/// Sent exactly once when an entity dies.
#[derive(Event, Debug, Clone, Copy)]
pub struct DeathEvent {
    /// Entity that died
    pub entity: Entity,
}

/// Request to launch a pooled projectile.
///
/// Shared by ranged actors and the player. Dropped silently when the pool
/// has no free slot.
#[derive(Event, Debug, Clone, Copy)]
pub struct FireProjectileEvent {
    pub owner: Option<Entity>,
    pub owner_tag: Tag,
    pub origin: Vec3,
    pub direction: Vec3,
    pub damage: f32,
}

/// Sent when a boss crosses its phase threshold.
#[derive(Event, Debug, Clone, Copy)]
pub struct BossPhaseEvent {
    pub boss: Entity,
}

/// Sent the first time a boss gains line of sight to the player.
#[derive(Event, Debug, Clone, Copy)]
pub struct BossRevealedEvent {
    pub boss: Entity,
}

/// Win signal, sent by the victory watch at most once per encounter.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct VictoryEvent;
