//! Boss phase controller - the one-shot second phase and the health bar reveal.

use bevy::prelude::*;
use std::collections::VecDeque;

use super::perception::Perception;
use super::components::HealthDisplay;
use crate::combat::Health;
use crate::core::{BossPhaseEvent, BossRevealedEvent, CombatConfig};

/// Destructible object tied to a boss, removed when its second phase begins.
#[derive(Component)]
pub struct Egg;

/// Watches a boss's health for the phase threshold.
#[derive(Component, Debug, Clone)]
pub struct BossPhase {
    /// Fraction of max health below which the second phase begins
    pub threshold: f32,
    pub triggered: bool,
    pub eggs: Vec<Entity>,
}

impl BossPhase {
    pub fn new(threshold: f32, eggs: Vec<Entity>) -> Self {
        Self {
            threshold,
            triggered: false,
            eggs,
        }
    }

    /// Returns true exactly once, the first time health drops strictly below
    /// the threshold.
    pub fn observe(&mut self, health: &Health) -> bool {
        if self.triggered || health.current >= health.maximum * self.threshold {
            return false;
        }
        self.triggered = true;
        true
    }
}

/// In-flight egg destruction of a boss that entered its second phase.
#[derive(Component, Debug)]
pub struct EggDestruction {
    queue: VecDeque<Entity>,
    timer: Timer,
    started: bool,
}

impl EggDestruction {
    pub fn new(eggs: impl IntoIterator<Item = Entity>, interval: f32) -> Self {
        Self {
            queue: eggs.into_iter().collect(),
            timer: Timer::from_seconds(interval, TimerMode::Repeating),
            started: false,
        }
    }

    /// Number of eggs due this tick. The first one is due immediately.
    fn due(&mut self, delta: std::time::Duration) -> u32 {
        if !self.started {
            self.started = true;
            return 1;
        }
        self.timer.tick(delta);
        self.timer.times_finished_this_tick()
    }

    /// Next queued egg still alive according to `alive`.
    fn next_alive(&mut self, alive: impl Fn(Entity) -> bool) -> Option<Entity> {
        while let Some(egg) = self.queue.pop_front() {
            if alive(egg) {
                return Some(egg);
            }
        }
        None
    }

    pub fn is_done(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Boss health bar gate; revealed on first line of sight.
#[derive(Component, Debug, Default)]
pub struct BossReveal {
    pub revealed: bool,
}

/// Start the second phase the instant a boss crosses its threshold.
pub fn watch_boss_health(
    mut commands: Commands,
    config: Res<CombatConfig>,
    mut query: Query<(Entity, &Health, &mut BossPhase), Changed<Health>>,
    mut phase_events: EventWriter<BossPhaseEvent>,
) {
    for (entity, health, mut phase) in query.iter_mut() {
        if !phase.observe(health) {
            continue;
        }

        info!(
            "Boss {:?} entered its second phase ({} eggs)",
            entity,
            phase.eggs.len()
        );
        let eggs = std::mem::take(&mut phase.eggs);
        commands
            .entity(entity)
            .insert(EggDestruction::new(eggs, config.egg_destroy_interval));
        phase_events.send(BossPhaseEvent { boss: entity });
    }
}

/// Destroy eggs one at a time; runs alongside the boss's own behaviour.
pub fn destroy_eggs(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut EggDestruction)>,
    eggs: Query<(), With<Egg>>,
) {
    for (entity, mut destruction) in query.iter_mut() {
        for _ in 0..destruction.due(time.delta()) {
            let Some(egg) = destruction.next_alive(|egg| eggs.contains(egg)) else {
                break;
            };
            commands.entity(egg).despawn_recursive();
            debug!("Egg {:?} destroyed", egg);
        }

        if destruction.is_done() {
            commands.entity(entity).remove::<EggDestruction>();
        }
    }
}

/// Reveal a boss's health bar the first tick it sees the player.
pub fn reveal_boss_health_bar(
    mut query: Query<(Entity, &Perception, &mut BossReveal, &mut HealthDisplay)>,
    mut reveal_events: EventWriter<BossRevealedEvent>,
) {
    for (entity, perception, mut reveal, mut display) in query.iter_mut() {
        if reveal.revealed || !perception.has_line_of_sight {
            continue;
        }
        reveal.revealed = true;
        display.visible = true;
        reveal_events.send(BossRevealedEvent { boss: entity });
        info!("Boss {:?} revealed", entity);
    }
}
