//! Victory poller - once a boss falls, periodically checks whether any
//! tracked actors remain and signals the win.

use bevy::prelude::*;
use std::time::Duration;

use super::components::{Archetype, CombatStatus, Enemy, Inactive};
use crate::core::{CombatConfig, DeathEvent, GameState, VictoryEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchState {
    #[default]
    Unarmed,
    Polling,
    /// Terminal: the win fired or polling was stopped by hand.
    Disarmed,
}

/// Low-frequency watchdog for the win condition.
#[derive(Resource, Debug)]
pub struct VictoryWatch {
    pub state: WatchState,
    pub target: Archetype,
    /// Remaining count seen by the last poll
    pub last_count: Option<usize>,
    timer: Timer,
}

impl VictoryWatch {
    pub fn new(target: Archetype, poll_interval: f32) -> Self {
        Self {
            state: WatchState::Unarmed,
            target,
            last_count: None,
            timer: Timer::from_seconds(poll_interval, TimerMode::Repeating),
        }
    }

    pub fn from_config(config: &CombatConfig) -> Self {
        Self::new(config.victory_archetype, config.victory_poll_interval)
    }

    /// Start polling. Only the first call has an effect.
    pub fn arm(&mut self) -> bool {
        if self.state != WatchState::Unarmed {
            return false;
        }
        self.state = WatchState::Polling;
        self.timer.reset();
        true
    }

    /// Stop polling regardless of the remaining count.
    pub fn disarm(&mut self) {
        self.state = WatchState::Disarmed;
    }

    /// Advance the poll timer; true when a poll is due.
    pub fn tick(&mut self, delta: Duration) -> bool {
        if self.state != WatchState::Polling {
            return false;
        }
        self.timer.tick(delta);
        self.timer.just_finished()
    }

    /// Record a poll result. True exactly once, when nothing remains.
    pub fn resolve(&mut self, remaining: usize) -> bool {
        if self.state != WatchState::Polling {
            return false;
        }
        self.last_count = Some(remaining);
        if remaining > 0 {
            return false;
        }
        self.state = WatchState::Disarmed;
        true
    }
}

impl Default for VictoryWatch {
    fn default() -> Self {
        Self::from_config(&CombatConfig::default())
    }
}

/// Fresh watch for each encounter.
pub fn reset_victory_watch(mut commands: Commands, config: Res<CombatConfig>) {
    commands.insert_resource(VictoryWatch::from_config(&config));
}

/// Arm the watch when a boss dies.
pub fn arm_on_boss_death(
    mut events: EventReader<DeathEvent>,
    archetypes: Query<&Archetype>,
    mut watch: ResMut<VictoryWatch>,
) {
    for event in events.read() {
        let is_boss = archetypes
            .get(event.entity)
            .is_ok_and(|archetype| archetype.has_second_phase());
        if is_boss && watch.arm() {
            info!("Boss down; watching for remaining {:?} enemies", watch.target);
        }
    }
}

/// Count the tracked actors still standing and signal the win at zero.
pub fn poll_for_victory(
    time: Res<Time>,
    mut watch: ResMut<VictoryWatch>,
    actors: Query<(&Archetype, &CombatStatus), (With<Enemy>, Without<Inactive>)>,
    mut victory_events: EventWriter<VictoryEvent>,
) {
    if !watch.tick(time.delta()) {
        return;
    }

    let target = watch.target;
    let remaining = actors
        .iter()
        .filter(|(archetype, status)| **archetype == target && !status.is_dead)
        .count();

    if watch.resolve(remaining) {
        info!("No {:?} enemies remain - victory", target);
        victory_events.send(VictoryEvent);
    } else {
        debug!("{} {:?} enemies remain", remaining, target);
    }
}

pub fn enter_victory_state(
    mut events: EventReader<VictoryEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if events.read().next().is_some() {
        next_state.set(GameState::Victory);
    }
}
