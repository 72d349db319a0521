//! Enemy-related components.

use bevy::prelude::*;
use serde::Deserialize;

use crate::combat::Health;

/// Marker component for all hostile actors.
#[derive(Component)]
pub struct Enemy;

/// Enemy type identifier (matches RON file name).
#[derive(Component, Clone, Debug)]
pub struct EnemyType(pub String);

/// Attack behaviour family. Selects the phase table an attack runs.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum Archetype {
    /// Toggles a melee damage window.
    #[default]
    Melee,
    /// Launches a pooled projectile at the target.
    Ranged,
    /// Melee strike followed by a dizzy spell.
    Brute,
    /// Melee strike with a long pause; has a second phase.
    Boss,
}

impl Archetype {
    /// Whether navigation is halted while an attack sequence runs.
    pub fn halts_during_attack(self) -> bool {
        !matches!(self, Archetype::Boss)
    }

    pub fn has_second_phase(self) -> bool {
        matches!(self, Archetype::Boss)
    }
}

/// AI state machine for enemy behavior.
#[derive(Component, Default, PartialEq, Eq, Clone, Copy, Debug)]
pub enum AiState {
    /// Patrolling or standing still, facing forward.
    #[default]
    Idle,
    /// Moving toward the player.
    Chasing,
    /// Turning toward the player and attacking.
    Attacking,
    /// Terminal.
    Dead,
}

/// Timings of one attack, in seconds.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct AttackTiming {
    /// Trigger to damage window (or projectile launch)
    pub windup: f32,
    /// Damage window duration
    pub active: f32,
    /// Window close to return-to-idle
    pub recovery: f32,
    /// Extra rest after the attack (boss)
    pub post_attack_pause: f32,
}

impl Default for AttackTiming {
    fn default() -> Self {
        Self {
            windup: 0.4,
            active: 0.3,
            recovery: 0.4,
            post_attack_pause: 0.0,
        }
    }
}

impl AttackTiming {
    pub fn strike_duration(&self) -> f32 {
        self.windup + self.active + self.recovery
    }
}

/// Enemy stats loaded from RON data files.
#[derive(Component, Clone, Debug)]
pub struct EnemyStats {
    pub max_health: f32,
    pub damage: f32,
    pub move_speed: f32,
    pub sight_range: f32,
    pub attack_range: f32,
    pub time_between_attacks: f32,
    /// Degrees per second
    pub turn_speed: f32,
    pub attack: AttackTiming,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            damage: 10.0,
            move_speed: 3.0,
            sight_range: 10.0,
            attack_range: 2.0,
            time_between_attacks: 1.5,
            turn_speed: 240.0,
            attack: AttackTiming::default(),
        }
    }
}

/// Result of a damage application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Dead or inside the hit cooldown; nothing changed.
    Ignored,
    /// Damaged and now inside the hit cooldown.
    Hurt,
    /// This hit killed the actor.
    Killed,
}

/// Combat flags of an actor.
#[derive(Component, Debug, Clone, Default)]
pub struct CombatStatus {
    pub is_dead: bool,
    pub attack_cooldown_active: bool,
    pub hit_cooldown_active: bool,
    pub is_stunnable: bool,
    pub has_second_phase: bool,
}

impl CombatStatus {
    pub fn new(is_stunnable: bool, has_second_phase: bool) -> Self {
        Self {
            is_stunnable,
            has_second_phase,
            ..default()
        }
    }

    /// Subtract `amount` unless dead or cooling down from a previous hit.
    pub fn take_damage(&mut self, health: &mut Health, amount: f32) -> DamageOutcome {
        if self.hit_cooldown_active || self.is_dead {
            return DamageOutcome::Ignored;
        }

        health.take_damage(amount);

        if health.is_dead() {
            self.begin_death();
            DamageOutcome::Killed
        } else {
            self.hit_cooldown_active = true;
            DamageOutcome::Hurt
        }
    }

    /// Enter the terminal state. Returns false if already dead.
    pub fn begin_death(&mut self) -> bool {
        if self.is_dead {
            return false;
        }
        self.is_dead = true;
        self.hit_cooldown_active = false;
        true
    }

    /// No decision is taken while either cooldown runs.
    pub fn is_busy(&self) -> bool {
        self.attack_cooldown_active || self.hit_cooldown_active
    }
}

/// Hit reaction timer; runs while `hit_cooldown_active` is set.
#[derive(Component, Debug, Clone)]
pub struct HitReaction(pub Timer);

impl HitReaction {
    pub fn new(duration: f32) -> Self {
        Self(Timer::from_seconds(duration, TimerMode::Once))
    }
}

/// Grace timers started by the death transition.
#[derive(Component, Debug, Clone)]
pub struct DeathGrace {
    pub deactivate: Timer,
    pub hide_health_bar: Timer,
}

impl DeathGrace {
    pub fn new(deactivate_after: f32, hide_health_bar_after: f32) -> Self {
        Self {
            deactivate: Timer::from_seconds(deactivate_after, TimerMode::Once),
            hide_health_bar: Timer::from_seconds(hide_health_bar_after, TimerMode::Once),
        }
    }
}

/// Marker for actors removed from the world after their death grace period.
#[derive(Component)]
pub struct Inactive;

/// Displayed health of an actor.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct HealthDisplay {
    pub fraction: f32,
    pub visible: bool,
}

impl HealthDisplay {
    pub fn new(visible: bool) -> Self {
        Self {
            fraction: 1.0,
            visible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_cooldown_blocks_second_hit() {
        let mut status = CombatStatus::new(true, false);
        let mut health = Health::new(100.0);

        assert_eq!(status.take_damage(&mut health, 30.0), DamageOutcome::Hurt);
        assert_eq!(health.current, 70.0);
        assert!(status.hit_cooldown_active);

        assert_eq!(status.take_damage(&mut health, 30.0), DamageOutcome::Ignored);
        assert_eq!(health.current, 70.0);
    }

    #[test]
    fn death_fires_once() {
        let mut status = CombatStatus::new(true, false);
        let mut health = Health::new(10.0);

        let outcomes: Vec<_> = (0..5)
            .map(|_| {
                status.hit_cooldown_active = false;
                status.take_damage(&mut health, 25.0)
            })
            .collect();

        assert_eq!(
            outcomes.iter().filter(|o| **o == DamageOutcome::Killed).count(),
            1
        );
        assert!(status.is_dead);
        assert!(!status.begin_death());
    }

    #[test]
    fn only_the_boss_keeps_moving_while_attacking() {
        assert!(Archetype::Melee.halts_during_attack());
        assert!(Archetype::Ranged.halts_during_attack());
        assert!(Archetype::Brute.halts_during_attack());
        assert!(!Archetype::Boss.halts_during_attack());
        assert!(Archetype::Boss.has_second_phase());
    }
}
