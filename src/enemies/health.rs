//! Health/damage controller of actors - hit cooldowns, stagger and the
//! death transition.

use bevy::prelude::*;
use bevy_rapier3d::prelude::ColliderDisabled;

use super::animation::{clips, Animator};
use super::components::{
    CombatStatus, DamageOutcome, DeathGrace, Enemy, HealthDisplay, HitReaction, Inactive,
};
use super::navigation::NavAgent;
use crate::combat::Health;
use crate::core::{CombatConfig, DamageEvent, DeathEvent};

/// Apply incoming damage events to actors.
pub fn take_enemy_damage(
    mut commands: Commands,
    config: Res<CombatConfig>,
    mut events: EventReader<DamageEvent>,
    mut enemy_query: Query<
        (
            &mut Health,
            &mut CombatStatus,
            &mut NavAgent,
            Option<&mut HealthDisplay>,
            Option<&mut Animator>,
        ),
        (With<Enemy>, Without<Inactive>),
    >,
) {
    for event in events.read() {
        let Ok((mut health, mut status, mut nav, display, animator)) = enemy_query.get_mut(event.target) else {
            continue;
        };

        // Ignored hits must not flag Health as changed
        let outcome = status.take_damage(health.bypass_change_detection(), event.amount);
        if outcome == DamageOutcome::Ignored {
            continue;
        }
        health.set_changed();

        if let Some(mut display) = display {
            display.fraction = health.fraction();
        }

        if outcome == DamageOutcome::Hurt {
            commands.entity(event.target).insert(HitReaction::new(config.hit_cooldown));
            if let Some(mut animator) = animator {
                animator.set_trigger(clips::HIT);
            }
            if status.is_stunnable {
                nav.set_stopped(true);
            }
            debug!("{:?} hit for {} ({} left)", event.target, event.amount, health.current);
        }
    }
}

/// Run hit cooldowns to completion.
pub fn recover_from_hits(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(
        Entity,
        &mut HitReaction,
        &mut CombatStatus,
        &mut NavAgent,
        Option<&mut Animator>,
    )>,
) {
    for (entity, mut reaction, mut status, mut nav, animator) in query.iter_mut() {
        reaction.0.tick(time.delta());
        if !reaction.0.finished() {
            continue;
        }

        commands.entity(entity).remove::<HitReaction>();
        status.hit_cooldown_active = false;

        // Death may have happened while the cooldown ran
        if status.is_dead {
            continue;
        }
        if let Some(mut animator) = animator {
            animator.set_trigger(clips::IDLE);
        }
        if status.is_stunnable && !status.attack_cooldown_active {
            nav.set_stopped(false);
        }
    }
}

/// Apply the side effects of every death exactly once.
pub fn finalize_deaths(
    mut commands: Commands,
    config: Res<CombatConfig>,
    mut query: Query<
        (Entity, &CombatStatus, &mut NavAgent, Option<&mut Animator>),
        (With<Enemy>, Without<DeathGrace>, Without<Inactive>),
    >,
    mut death_events: EventWriter<DeathEvent>,
) {
    for (entity, status, mut nav, animator) in query.iter_mut() {
        if !status.is_dead {
            continue;
        }

        if let Some(mut animator) = animator {
            animator.reset_all_triggers();
            animator.cross_fade(clips::DEATH, 0.0);
        }
        nav.disable();

        commands.entity(entity).remove::<HitReaction>().insert((
            ColliderDisabled,
            DeathGrace::new(config.death_deactivate_delay, config.health_bar_hide_delay),
        ));
        death_events.send(DeathEvent { entity });
        info!("Enemy {:?} died", entity);
    }
}

/// Hide health bars and deactivate actors once their grace periods elapse.
pub fn run_death_grace(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<
        (Entity, &mut DeathGrace, Option<&mut HealthDisplay>, &mut Visibility),
        Without<Inactive>,
    >,
) {
    for (entity, mut grace, display, mut visibility) in query.iter_mut() {
        grace.hide_health_bar.tick(time.delta());
        grace.deactivate.tick(time.delta());

        if grace.hide_health_bar.just_finished() {
            if let Some(mut display) = display {
                display.visible = false;
            }
        }

        if grace.deactivate.finished() {
            *visibility = Visibility::Hidden;
            commands.entity(entity).insert(Inactive);
            debug!("Enemy {:?} deactivated", entity);
        }
    }
}
