//! Combat-related components.

use bevy::prelude::*;

pub use crate::core::{DamageEvent, DeathEvent, Tag};

/// Component for entities that can take damage.
#[derive(Component, Debug, Clone)]
pub struct Health {
    pub current: f32,
    pub maximum: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            maximum: max,
        }
    }

    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let actual = amount.max(0.0).min(self.current);
        self.current -= actual;
        actual
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    pub fn fraction(&self) -> f32 {
        if self.maximum <= 0.0 {
            return 0.0;
        }
        self.current / self.maximum
    }
}

/// Marker for the player after its death has been processed.
#[derive(Component)]
pub struct Dead;

/// Melee hit volume toggled by an attack sequence.
///
/// While open, a target within `reach` of the owner is struck at most once
/// per opening.
#[derive(Component, Debug, Clone)]
pub struct DamageWindow {
    pub reach: f32,
    pub damage: f32,
    open: bool,
    struck: bool,
}

impl DamageWindow {
    pub fn new(reach: f32, damage: f32) -> Self {
        Self {
            reach,
            damage,
            open: false,
            struck: false,
        }
    }

    pub fn open(&mut self) {
        self.open = true;
        self.struck = false;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Claims this opening's single hit. Returns false when closed or spent.
    pub fn try_strike(&mut self) -> bool {
        if !self.open || self.struck {
            return false;
        }
        self.struck = true;
        true
    }
}
