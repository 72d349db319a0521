//! Attack sequencing - timed phase lists per archetype.
//!
//! An [`AttackSequence`] is an explicit resumable state machine: each phase
//! waits its delay, then emits its action. The tick driver feeds elapsed time
//! in and applies whatever actions became due. Cancelling on death emits only
//! the actions needed to leave the world consistent (closing an open damage
//! window) and nothing else.

use bevy::prelude::*;

use super::animation::clips;
use super::components::{Archetype, EnemyStats};

/// Side effect of one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseAction {
    /// Fire an animation trigger.
    Trigger(&'static str),
    OpenDamageWindow,
    CloseDamageWindow,
    /// Spawn a pooled projectile toward the target.
    LaunchProjectile,
    /// Force the actor immobile.
    Stagger,
    /// End of the forced immobility.
    Recover,
    /// Back to the idle animation; skipped once dead.
    ReturnToIdle,
    /// Pure wait.
    Rest,
}

/// A phase fires `action` once `delay` seconds passed since the previous phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phase {
    pub delay: f32,
    pub action: PhaseAction,
}

impl Phase {
    pub fn now(action: PhaseAction) -> Self {
        Self { delay: 0.0, action }
    }

    pub fn after(delay: f32, action: PhaseAction) -> Self {
        Self {
            delay: delay.max(0.0),
            action,
        }
    }
}

/// Phase list for one attack of `archetype`.
///
/// Every list ends once `time_between_attacks` has passed since the trigger
/// (the boss additionally rests for `post_attack_pause`).
pub fn attack_phases(archetype: Archetype, stats: &EnemyStats) -> Vec<Phase> {
    let timing = stats.attack;
    let rest = (stats.time_between_attacks - timing.strike_duration()).max(0.0);

    let strike = |trigger| {
        vec![
            Phase::now(PhaseAction::Trigger(trigger)),
            Phase::after(timing.windup, PhaseAction::OpenDamageWindow),
            Phase::after(timing.active, PhaseAction::CloseDamageWindow),
        ]
    };

    match archetype {
        Archetype::Melee => {
            let mut phases = strike(clips::ATTACK);
            phases.push(Phase::after(timing.recovery, PhaseAction::ReturnToIdle));
            phases.push(Phase::after(rest, PhaseAction::Rest));
            phases
        }
        Archetype::Ranged => vec![
            Phase::now(PhaseAction::Trigger(clips::SHOOT)),
            Phase::after(timing.windup, PhaseAction::LaunchProjectile),
            Phase::after(timing.active + timing.recovery, PhaseAction::ReturnToIdle),
            Phase::after(rest, PhaseAction::Rest),
        ],
        Archetype::Brute => {
            let mut phases = strike(clips::ATTACK);
            phases.push(Phase::after(timing.recovery, PhaseAction::Stagger));
            phases.push(Phase::after(stats.time_between_attacks, PhaseAction::Recover));
            phases.push(Phase::now(PhaseAction::ReturnToIdle));
            phases
        }
        Archetype::Boss => {
            let mut phases = strike(clips::ATTACK);
            phases.push(Phase::after(timing.recovery, PhaseAction::ReturnToIdle));
            phases.push(Phase::after(rest + timing.post_attack_pause, PhaseAction::Rest));
            phases
        }
    }
}

/// One in-flight attack.
#[derive(Debug, Clone)]
pub struct AttackSequence {
    phases: Vec<Phase>,
    index: usize,
    elapsed: f32,
    window_open: bool,
    cancelled: bool,
}

impl AttackSequence {
    pub fn new(phases: Vec<Phase>) -> Self {
        Self {
            phases,
            index: 0,
            elapsed: 0.0,
            window_open: false,
            cancelled: false,
        }
    }

    /// Feed `delta` seconds and collect every action that became due.
    pub fn advance(&mut self, delta: f32) -> Vec<PhaseAction> {
        let mut due = Vec::new();
        if self.cancelled {
            return due;
        }

        self.elapsed += delta;
        while let Some(phase) = self.phases.get(self.index) {
            if self.elapsed < phase.delay {
                break;
            }
            self.elapsed -= phase.delay;
            self.index += 1;

            match phase.action {
                PhaseAction::OpenDamageWindow => self.window_open = true,
                PhaseAction::CloseDamageWindow => self.window_open = false,
                _ => {}
            }
            due.push(phase.action);
        }
        due
    }

    /// Stop the sequence. Returns the close action if a window is still open.
    pub fn cancel(&mut self) -> Option<PhaseAction> {
        self.cancelled = true;
        if std::mem::take(&mut self.window_open) {
            Some(PhaseAction::CloseDamageWindow)
        } else {
            None
        }
    }

    pub fn is_finished(&self) -> bool {
        self.cancelled || self.index >= self.phases.len()
    }

    #[cfg(test)]
    pub fn is_window_open(&self) -> bool {
        self.window_open
    }
}

/// Holder of the actor's single in-flight attack.
#[derive(Component, Debug, Default)]
pub struct AttackSequencer {
    pub active: Option<AttackSequence>,
}

impl AttackSequencer {
    /// Start a sequence unless one is already running.
    pub fn start(&mut self, phases: Vec<Phase>) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.active = Some(AttackSequence::new(phases));
        true
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> EnemyStats {
        EnemyStats {
            time_between_attacks: 2.0,
            ..default()
        }
    }

    fn run_to_end(sequence: &mut AttackSequence, step: f32) -> Vec<PhaseAction> {
        let mut fired = Vec::new();
        for _ in 0..1000 {
            if sequence.is_finished() {
                break;
            }
            fired.extend(sequence.advance(step));
        }
        fired
    }

    fn count(actions: &[PhaseAction], action: PhaseAction) -> usize {
        actions.iter().filter(|a| **a == action).count()
    }

    #[test]
    fn melee_shape_is_trigger_open_close_idle() {
        let mut sequence = AttackSequence::new(attack_phases(Archetype::Melee, &stats()));
        let fired = run_to_end(&mut sequence, 0.05);
        assert_eq!(
            fired,
            vec![
                PhaseAction::Trigger(clips::ATTACK),
                PhaseAction::OpenDamageWindow,
                PhaseAction::CloseDamageWindow,
                PhaseAction::ReturnToIdle,
                PhaseAction::Rest,
            ]
        );
    }

    #[test]
    fn phases_wait_for_their_delay() {
        let mut sequence = AttackSequence::new(attack_phases(Archetype::Melee, &stats()));
        assert_eq!(sequence.advance(0.0), vec![PhaseAction::Trigger(clips::ATTACK)]);
        assert!(sequence.advance(0.39).is_empty());
        assert_eq!(sequence.advance(0.02), vec![PhaseAction::OpenDamageWindow]);
        assert!(sequence.is_window_open());
    }

    #[test]
    fn one_long_tick_fires_every_due_phase() {
        let mut sequence = AttackSequence::new(attack_phases(Archetype::Melee, &stats()));
        let fired = sequence.advance(10.0);
        assert_eq!(fired.len(), 5);
        assert!(sequence.is_finished());
    }

    #[test]
    fn sequence_lasts_time_between_attacks() {
        let mut sequence = AttackSequence::new(attack_phases(Archetype::Ranged, &stats()));
        sequence.advance(1.9);
        assert!(!sequence.is_finished());
        sequence.advance(0.11);
        assert!(sequence.is_finished());
    }

    #[test]
    fn ranged_launches_once_without_window() {
        let mut sequence = AttackSequence::new(attack_phases(Archetype::Ranged, &stats()));
        let fired = run_to_end(&mut sequence, 0.1);
        assert_eq!(count(&fired, PhaseAction::LaunchProjectile), 1);
        assert_eq!(count(&fired, PhaseAction::OpenDamageWindow), 0);
        assert_eq!(fired[0], PhaseAction::Trigger(clips::SHOOT));
    }

    #[test]
    fn brute_is_dizzy_for_time_between_attacks() {
        let phases = attack_phases(Archetype::Brute, &stats());
        let recover = phases
            .iter()
            .find(|p| p.action == PhaseAction::Recover)
            .unwrap();
        assert_eq!(recover.delay, 2.0);

        let mut sequence = AttackSequence::new(phases);
        let fired = run_to_end(&mut sequence, 0.1);
        let stagger = fired.iter().position(|a| *a == PhaseAction::Stagger).unwrap();
        let close = fired.iter().position(|a| *a == PhaseAction::CloseDamageWindow).unwrap();
        assert!(stagger > close);
        assert_eq!(fired.last(), Some(&PhaseAction::ReturnToIdle));
    }

    #[test]
    fn boss_rests_longer_than_melee() {
        let mut boss_stats = stats();
        boss_stats.attack.post_attack_pause = 1.5;
        let total = |archetype| -> f32 {
            attack_phases(archetype, &boss_stats)
                .iter()
                .map(|p| p.delay)
                .sum()
        };
        assert!((total(Archetype::Boss) - total(Archetype::Melee) - 1.5).abs() < 1e-5);
    }

    #[test]
    fn damage_window_pairs_even_when_cancelled() {
        for archetype in [Archetype::Melee, Archetype::Brute, Archetype::Boss, Archetype::Ranged] {
            for cancel_at in 0..40 {
                let mut sequence = AttackSequence::new(attack_phases(archetype, &stats()));
                let mut fired = Vec::new();
                for tick in 0..200 {
                    if tick == cancel_at {
                        fired.extend(sequence.cancel());
                        break;
                    }
                    fired.extend(sequence.advance(0.05));
                }
                fired.extend(run_to_end(&mut sequence, 0.05));

                assert_eq!(
                    count(&fired, PhaseAction::OpenDamageWindow),
                    count(&fired, PhaseAction::CloseDamageWindow),
                    "{archetype:?} cancelled at tick {cancel_at}"
                );
            }
        }
    }

    #[test]
    fn cancelled_sequence_fires_nothing_more() {
        let mut sequence = AttackSequence::new(attack_phases(Archetype::Melee, &stats()));
        sequence.advance(0.5);
        assert_eq!(sequence.cancel(), Some(PhaseAction::CloseDamageWindow));
        assert!(sequence.advance(10.0).is_empty());
        assert!(sequence.is_finished());
        assert_eq!(sequence.cancel(), None);
    }

    #[test]
    fn sequencer_refuses_a_second_attack() {
        let mut sequencer = AttackSequencer::default();
        assert!(sequencer.start(attack_phases(Archetype::Melee, &stats())));
        assert!(!sequencer.start(attack_phases(Archetype::Melee, &stats())));
        assert!(sequencer.is_running());
    }
}
