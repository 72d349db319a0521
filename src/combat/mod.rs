//! Combat module - health, damage windows, projectiles, and the player's damage sink.

mod components;
mod plugin;
pub mod pool;
mod projectiles;
mod systems;

pub use components::*;
pub use plugin::CombatPlugin;
pub use pool::{ImpactEffect, Pool, Poolable, Projectile, ProjectilePool};
pub use projectiles::{
    init_projectile_pool, launch_projectiles, move_projectiles, sync_pool_visuals,
    tick_impact_effects, PoolKind, PoolVisual,
};
pub use systems::{apply_player_damage, check_player_death, strike_with_damage_windows};
