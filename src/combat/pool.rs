//! Fixed-capacity pools of projectiles and impact effects.
//!
//! Slots are created once and recycled, never destroyed. Acquisition takes the
//! first inactive slot; when every slot is busy the request is dropped.

use bevy::prelude::*;

use crate::core::{CombatConfig, Tag};

/// A slot type that can live in a [`Pool`].
pub trait Poolable: Default {
    fn is_active(&self) -> bool;
    fn recycle(&mut self);
}

/// Fixed-capacity slot store.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<T>,
}

impl<T: Poolable> Pool<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| T::default()).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_active()).count()
    }

    /// First inactive slot, if any.
    pub fn acquire(&mut self) -> Option<(usize, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| !slot.is_active())
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    #[cfg(test)]
    pub fn release(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.recycle();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut()
    }
}

/// A pooled projectile.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub active: bool,
    pub position: Vec3,
    pub direction: Vec3,
    pub speed: f32,
    pub damage: f32,
    pub owner_tag: Tag,
    pub owner: Option<Entity>,
    pub elapsed: f32,
    pub lifetime: f32,
}

impl Default for Projectile {
    fn default() -> Self {
        Self {
            active: false,
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            speed: 0.0,
            damage: 0.0,
            owner_tag: Tag::Enemy,
            owner: None,
            elapsed: 0.0,
            lifetime: 0.0,
        }
    }
}

impl Poolable for Projectile {
    fn is_active(&self) -> bool {
        self.active
    }

    fn recycle(&mut self) {
        *self = Self::default();
    }
}

impl Projectile {
    /// Moves the projectile one step. Returns false once its lifetime is spent.
    pub fn advance(&mut self, delta: f32) -> bool {
        self.elapsed += delta;
        if self.elapsed >= self.lifetime {
            return false;
        }
        self.position += self.direction * self.speed * delta;
        true
    }
}

/// A pooled impact effect.
#[derive(Debug, Clone, Default)]
pub struct ImpactEffect {
    pub active: bool,
    pub position: Vec3,
    pub elapsed: f32,
    pub lifetime: f32,
}

impl Poolable for ImpactEffect {
    fn is_active(&self) -> bool {
        self.active
    }

    fn recycle(&mut self) {
        *self = Self::default();
    }
}

/// Projectile and impact-effect pool shared by ranged actors and the player.
#[derive(Resource, Debug, Clone)]
pub struct ProjectilePool {
    pub projectiles: Pool<Projectile>,
    pub impacts: Pool<ImpactEffect>,
    pub speed: f32,
    pub lifetime: f32,
    pub impact_lifetime: f32,
}

impl ProjectilePool {
    pub fn from_config(config: &CombatConfig) -> Self {
        Self {
            projectiles: Pool::new(config.projectile_pool_capacity),
            impacts: Pool::new(config.impact_pool_capacity),
            speed: config.projectile_speed,
            lifetime: config.projectile_lifetime,
            impact_lifetime: config.impact_lifetime,
        }
    }

    /// Launches a projectile from the first free slot.
    ///
    /// Returns `None` without side effects when the pool is exhausted.
    pub fn launch(
        &mut self,
        position: Vec3,
        direction: Vec3,
        damage: f32,
        owner_tag: Tag,
        owner: Option<Entity>,
    ) -> Option<usize> {
        let (speed, lifetime) = (self.speed, self.lifetime);
        let (index, slot) = self.projectiles.acquire()?;
        *slot = Projectile {
            active: true,
            position,
            direction: direction.normalize_or_zero(),
            speed,
            damage,
            owner_tag,
            owner,
            elapsed: 0.0,
            lifetime,
        };
        Some(index)
    }

    /// Shows an impact effect, dropped when every effect slot is busy.
    pub fn spawn_impact(&mut self, position: Vec3) -> Option<usize> {
        let lifetime = self.impact_lifetime;
        let (index, slot) = self.impacts.acquire()?;
        *slot = ImpactEffect {
            active: true,
            position,
            elapsed: 0.0,
            lifetime,
        };
        Some(index)
    }
}
