//! Enemy AI behavior systems - the per-tick decision step and the attack driver.

use bevy::prelude::*;

use super::animation::{clips, Animator};
use super::components::{AiState, Archetype, CombatStatus, Enemy, EnemyStats, Inactive};
use super::navigation::{facing_angle, search_patrol_point, turn_toward, NavAgent, Patrol};
use super::perception::Perception;
use super::sequencer::{attack_phases, AttackSequencer, PhaseAction};
use crate::combat::{DamageWindow, Health};
use crate::core::{CombatConfig, FireProjectileEvent, Tag};
use crate::player::Player;

/// Pick the behaviour state from this tick's perception.
pub fn select_state(perception: &Perception) -> AiState {
    let Perception {
        in_sight_range,
        in_attack_range,
        has_line_of_sight,
    } = *perception;

    if in_sight_range && in_attack_range && has_line_of_sight {
        AiState::Attacking
    } else if in_sight_range && !in_attack_range && has_line_of_sight {
        AiState::Chasing
    } else {
        AiState::Idle
    }
}

/// Top-level decision step.
///
/// Dead actors stay dead, an actor whose health ran out dies, and nothing is
/// decided while an attack or hit cooldown is running.
pub fn decide_actions(
    time: Res<Time>,
    config: Res<CombatConfig>,
    player_query: Query<&Transform, (With<Player>, Without<Enemy>)>,
    mut enemy_query: Query<
        (
            &mut Transform,
            &EnemyStats,
            &Archetype,
            &Health,
            &Perception,
            &mut CombatStatus,
            &mut AiState,
            &mut NavAgent,
            &mut AttackSequencer,
            Option<&mut Animator>,
            Option<&mut Patrol>,
        ),
        (With<Enemy>, Without<Player>, Without<Inactive>),
    >,
) {
    let target = player_query.get_single().ok().map(|t| t.translation);
    let delta = time.delta_secs();

    for (
        mut transform,
        stats,
        archetype,
        health,
        perception,
        mut status,
        mut ai_state,
        mut nav,
        mut sequencer,
        mut animator,
        patrol,
    ) in enemy_query.iter_mut()
    {
        if status.is_dead {
            *ai_state = AiState::Dead;
            continue;
        }

        if health.is_dead() {
            // Death side effects are applied once by finalize_deaths
            status.begin_death();
            *ai_state = AiState::Dead;
            continue;
        }

        if status.is_busy() {
            continue;
        }

        // A vanished target reads as an empty perception
        let intent = match target {
            Some(_) => select_state(perception),
            None => AiState::Idle,
        };

        match (intent, target) {
            (AiState::Attacking, Some(target)) => {
                *ai_state = AiState::Attacking;
                nav.set_stopped(true);
                turn_toward(&mut transform, target, stats.turn_speed.to_radians() * delta);

                let facing = facing_angle(&transform, target) <= config.facing_tolerance();
                if facing && !status.attack_cooldown_active && sequencer.start(attack_phases(*archetype, stats)) {
                    status.attack_cooldown_active = true;
                    if !archetype.halts_during_attack() {
                        nav.set_destination(target);
                        nav.set_stopped(false);
                    }
                    debug!("{:?} attack started", archetype);
                }
            }
            (AiState::Chasing, Some(target)) => {
                *ai_state = AiState::Chasing;
                nav.set_destination(target);
                nav.set_stopped(false);
            }
            _ => {
                *ai_state = AiState::Idle;
                match patrol {
                    Some(mut patrol) => step_patrol(&mut patrol, &mut nav, transform.translation, &time),
                    None => {
                        nav.set_stopped(true);
                        nav.destination = None;
                    }
                }
            }
        }

        if let Some(animator) = animator.as_mut() {
            animator.set_bool(clips::WALK, !nav.stopped && nav.destination.is_some());
        }
    }
}

/// Walk to the current patrol point, or wait and then search a new one.
fn step_patrol(patrol: &mut Patrol, nav: &mut NavAgent, position: Vec3, time: &Time) {
    if let Some(point) = patrol.point {
        if nav.has_arrived(position, point) {
            patrol.point = None;
            patrol.wait.reset();
            nav.set_stopped(true);
        } else {
            nav.set_destination(point);
            nav.set_stopped(false);
        }
        return;
    }

    nav.set_stopped(true);
    patrol.wait.tick(time.delta());
    if patrol.wait.finished() {
        patrol.wait.reset();
        patrol.point = search_patrol_point(nav, patrol.home, patrol.radius);
        if let Some(point) = patrol.point {
            nav.set_destination(point);
            nav.set_stopped(false);
        }
    }
}

/// Advance every in-flight attack sequence and apply the phases that came due.
///
/// A sequence whose actor died is cancelled: it only closes a still-open
/// damage window and never returns the actor to idle.
pub fn run_attack_sequences(
    time: Res<Time>,
    config: Res<CombatConfig>,
    player_query: Query<&Transform, (With<Player>, Without<Enemy>)>,
    mut enemy_query: Query<
        (
            Entity,
            &Transform,
            &EnemyStats,
            &Archetype,
            &mut CombatStatus,
            &mut AttackSequencer,
            &mut NavAgent,
            Option<&mut DamageWindow>,
            Option<&mut Animator>,
        ),
        With<Enemy>,
    >,
    mut fire_events: EventWriter<FireProjectileEvent>,
) {
    let target = player_query.get_single().ok().map(|t| t.translation);
    let delta = time.delta_secs();

    for (entity, transform, stats, archetype, mut status, mut sequencer, mut nav, mut window, mut animator) in
        enemy_query.iter_mut()
    {
        let Some(sequence) = sequencer.active.as_mut() else {
            continue;
        };

        let due: Vec<PhaseAction> = if status.is_dead {
            debug!("Attack of {:?} cancelled by death", entity);
            sequence.cancel().into_iter().collect()
        } else {
            sequence.advance(delta)
        };
        let finished = sequence.is_finished();

        for action in due {
            match action {
                PhaseAction::Trigger(name) => {
                    if let Some(animator) = animator.as_mut() {
                        animator.set_trigger(name);
                    }
                }
                PhaseAction::OpenDamageWindow => {
                    if let Some(window) = window.as_mut() {
                        window.open();
                    }
                }
                PhaseAction::CloseDamageWindow => {
                    if let Some(window) = window.as_mut() {
                        window.close();
                    }
                }
                PhaseAction::LaunchProjectile => {
                    let Some(target) = target else {
                        continue;
                    };
                    let origin = transform.translation
                        + Vec3::Y * config.eye_height
                        + transform.forward().as_vec3() * 0.6;
                    fire_events.send(FireProjectileEvent {
                        owner: Some(entity),
                        owner_tag: Tag::Enemy,
                        origin,
                        direction: (target - origin).normalize_or_zero(),
                        damage: stats.damage,
                    });
                }
                PhaseAction::Stagger => {
                    nav.set_stopped(true);
                    if let Some(animator) = animator.as_mut() {
                        animator.set_bool(clips::DIZZY, true);
                    }
                }
                PhaseAction::Recover => {
                    if let Some(animator) = animator.as_mut() {
                        animator.set_bool(clips::DIZZY, false);
                    }
                }
                PhaseAction::ReturnToIdle => {
                    if !status.is_dead {
                        if let Some(animator) = animator.as_mut() {
                            animator.set_trigger(clips::IDLE);
                        }
                    }
                }
                PhaseAction::Rest => {}
            }
        }

        if finished {
            sequencer.active = None;
            status.attack_cooldown_active = false;
            if !status.is_dead && !status.hit_cooldown_active && archetype.halts_during_attack() {
                nav.set_stopped(false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemies::perception::update_perception;
    use crate::enemies::spawning::actor_bundle;
    use crate::enemies::data::EnemyDefinition;
    use bevy::time::TimePlugin;
    use std::time::Duration;

    fn definition(archetype: Archetype) -> EnemyDefinition {
        EnemyDefinition::from_ron(
            &format!(
                r#"(
                    name: "Test",
                    archetype: {archetype:?},
                    max_health: 100.0,
                    damage: 10.0,
                    move_speed: 3.0,
                    sight_range: 10.0,
                    attack_range: 2.0,
                    time_between_attacks: 1.5,
                )"#
            ),
            "test.ron",
        )
        .unwrap()
    }

    fn setup_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins.build().disable::<TimePlugin>());
        app.insert_resource(Time::<()>::default());
        app.insert_resource(CombatConfig::default());
        app.add_event::<FireProjectileEvent>();
        app.add_systems(
            Update,
            (update_perception, decide_actions, run_attack_sequences).chain(),
        );
        app
    }

    fn tick(app: &mut App, seconds: f32) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(seconds));
        app.update();
    }

    fn spawn_player(app: &mut App, distance: f32) -> Entity {
        app.world_mut()
            .spawn((Player, Tag::Player, Transform::from_xyz(0.0, 0.0, -distance)))
            .id()
    }

    fn move_player(app: &mut App, player: Entity, distance: f32) {
        app.world_mut().get_mut::<Transform>(player).unwrap().translation = Vec3::new(0.0, 0.0, -distance);
    }

    fn spawn_actor(app: &mut App, archetype: Archetype) -> Entity {
        app.world_mut()
            .spawn(actor_bundle("test", &definition(archetype), Vec3::ZERO, 0.0))
            .id()
    }

    #[test]
    fn state_selection_table() {
        let p = |s, a, l| Perception {
            in_sight_range: s,
            in_attack_range: a,
            has_line_of_sight: l,
        };
        assert_eq!(select_state(&p(true, true, true)), AiState::Attacking);
        assert_eq!(select_state(&p(true, false, true)), AiState::Chasing);
        assert_eq!(select_state(&p(true, true, false)), AiState::Idle);
        assert_eq!(select_state(&p(true, false, false)), AiState::Idle);
        assert_eq!(select_state(&p(false, false, false)), AiState::Idle);
    }

    #[test]
    fn basic_combat_loop() {
        let mut app = setup_app();
        let actor = spawn_actor(&mut app, Archetype::Melee);
        let player = spawn_player(&mut app, 15.0);

        tick(&mut app, 0.016);
        assert_eq!(*app.world().get::<AiState>(actor).unwrap(), AiState::Idle);

        move_player(&mut app, player, 8.0);
        tick(&mut app, 0.016);
        assert_eq!(*app.world().get::<AiState>(actor).unwrap(), AiState::Chasing);
        assert!(!app.world().get::<NavAgent>(actor).unwrap().stopped);

        move_player(&mut app, player, 1.5);
        tick(&mut app, 0.016);
        assert_eq!(*app.world().get::<AiState>(actor).unwrap(), AiState::Attacking);
        assert!(app.world().get::<CombatStatus>(actor).unwrap().attack_cooldown_active);
        assert!(app.world().get::<NavAgent>(actor).unwrap().stopped);

        // Walk away so no follow-up attack starts
        move_player(&mut app, player, 15.0);
        for _ in 0..20 {
            tick(&mut app, 0.1);
        }
        let status = app.world().get::<CombatStatus>(actor).unwrap();
        assert!(!status.attack_cooldown_active);
        assert!(!app.world().get::<AttackSequencer>(actor).unwrap().is_running());
        assert!(!app.world().get::<DamageWindow>(actor).unwrap().is_open());
    }

    #[test]
    fn attack_waits_until_facing_target() {
        let mut app = setup_app();
        let actor = spawn_actor(&mut app, Archetype::Melee);
        // Behind the actor, which turns at 240 degrees per second
        app.world_mut()
            .spawn((Player, Tag::Player, Transform::from_xyz(0.0, 0.0, 1.5)));

        tick(&mut app, 0.1);
        assert_eq!(*app.world().get::<AiState>(actor).unwrap(), AiState::Attacking);
        assert!(!app.world().get::<CombatStatus>(actor).unwrap().attack_cooldown_active);

        for _ in 0..10 {
            tick(&mut app, 0.1);
        }
        assert!(app.world().get::<AttackSequencer>(actor).unwrap().is_running());
        assert!(app.world().get::<CombatStatus>(actor).unwrap().attack_cooldown_active);
        let transform = app.world().get::<Transform>(actor).unwrap();
        assert!(facing_angle(transform, Vec3::new(0.0, 0.0, 1.5)) <= 15f32.to_radians());
    }

    #[test]
    fn one_sequence_at_a_time() {
        let mut app = setup_app();
        let actor = spawn_actor(&mut app, Archetype::Melee);
        spawn_player(&mut app, 1.5);

        let mut triggers = 0;
        for _ in 0..14 {
            tick(&mut app, 0.1);
            let mut animator = app.world_mut().get_mut::<Animator>(actor).unwrap();
            triggers += animator
                .drain()
                .filter(|c| *c == crate::enemies::animation::AnimationCommand::Trigger(clips::ATTACK))
                .count();
        }
        // 1.4s of a 1.5s attack period
        assert_eq!(triggers, 1);
    }

    #[test]
    fn death_mid_attack_closes_window_and_skips_idle() {
        let mut app = setup_app();
        let actor = spawn_actor(&mut app, Archetype::Melee);
        spawn_player(&mut app, 1.5);

        tick(&mut app, 0.0);
        tick(&mut app, 0.45);
        assert!(app.world().get::<DamageWindow>(actor).unwrap().is_open());

        app.world_mut().get_mut::<CombatStatus>(actor).unwrap().begin_death();
        app.world_mut().get_mut::<Animator>(actor).unwrap().drain().for_each(drop);
        for _ in 0..20 {
            tick(&mut app, 0.1);
        }

        assert!(!app.world().get::<DamageWindow>(actor).unwrap().is_open());
        assert!(!app.world().get::<AttackSequencer>(actor).unwrap().is_running());
        assert_eq!(*app.world().get::<AiState>(actor).unwrap(), AiState::Dead);
        let animator = app.world().get::<Animator>(actor).unwrap();
        assert!(!animator
            .pending()
            .contains(&crate::enemies::animation::AnimationCommand::Trigger(clips::IDLE)));
    }

    #[test]
    fn ranged_actor_fires_at_target() {
        #[derive(Resource, Default)]
        struct Shots(Vec<FireProjectileEvent>);

        fn collect(mut events: EventReader<FireProjectileEvent>, mut shots: ResMut<Shots>) {
            shots.0.extend(events.read().copied());
        }

        let mut app = setup_app();
        app.init_resource::<Shots>();
        app.add_systems(Update, collect.after(run_attack_sequences));

        let mut definition = definition(Archetype::Ranged);
        definition.attack_range = 8.0;
        let actor = app
            .world_mut()
            .spawn(actor_bundle("spitter", &definition, Vec3::ZERO, 0.0))
            .id();
        spawn_player(&mut app, 6.0);

        for _ in 0..6 {
            tick(&mut app, 0.1);
        }

        let shots = &app.world().resource::<Shots>().0;
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].owner, Some(actor));
        assert_eq!(shots[0].owner_tag, Tag::Enemy);
        let expected = (Vec3::new(0.0, 0.0, -6.0) - shots[0].origin).normalize();
        assert!(shots[0].direction.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn busy_actor_does_not_decide() {
        let mut app = setup_app();
        let actor = spawn_actor(&mut app, Archetype::Melee);
        spawn_player(&mut app, 8.0);
        app.world_mut().get_mut::<CombatStatus>(actor).unwrap().hit_cooldown_active = true;

        tick(&mut app, 0.1);
        assert_eq!(*app.world().get::<AiState>(actor).unwrap(), AiState::Idle);
    }
    #[test]
    fn vanished_target_reads_as_nothing_seen() {
        let mut app = setup_app();
        let actor = spawn_actor(&mut app, Archetype::Melee);
        let player = spawn_player(&mut app, 8.0);

        tick(&mut app, 0.1);
        assert_eq!(*app.world().get::<AiState>(actor).unwrap(), AiState::Chasing);

        app.world_mut().despawn(player);
        tick(&mut app, 0.1);
        assert_eq!(*app.world().get::<AiState>(actor).unwrap(), AiState::Idle);
        assert_eq!(*app.world().get::<Perception>(actor).unwrap(), Perception::default());
        assert!(app.world().get::<NavAgent>(actor).unwrap().stopped);
    }

    #[test]
    fn ranged_sequence_without_target_fires_nothing() {
        #[derive(Resource, Default)]
        struct Shots(usize);

        fn count(mut events: EventReader<FireProjectileEvent>, mut shots: ResMut<Shots>) {
            shots.0 += events.read().count();
        }

        let mut app = setup_app();
        app.init_resource::<Shots>();
        app.add_systems(Update, count.after(run_attack_sequences));

        let mut definition = definition(Archetype::Ranged);
        definition.attack_range = 8.0;
        let actor = app
            .world_mut()
            .spawn(actor_bundle("spitter", &definition, Vec3::ZERO, 0.0))
            .id();
        let player = spawn_player(&mut app, 6.0);

        tick(&mut app, 0.1);
        assert!(app.world().get::<AttackSequencer>(actor).unwrap().is_running());

        // Gone before the launch phase comes due
        app.world_mut().despawn(player);
        for _ in 0..25 {
            tick(&mut app, 0.1);
        }

        assert_eq!(app.world().resource::<Shots>().0, 0);
        assert!(!app.world().get::<AttackSequencer>(actor).unwrap().is_running());
        assert_eq!(*app.world().get::<AiState>(actor).unwrap(), AiState::Idle);
    }

    #[test]
    fn patrol_waits_walks_and_stops() {
        use crate::enemies::navigation::follow_nav_destinations;

        let mut app = setup_app();
        app.add_systems(Update, follow_nav_destinations.after(run_attack_sequences));
        let actor = spawn_actor(&mut app, Archetype::Melee);
        app.world_mut()
            .entity_mut(actor)
            .insert(Patrol::new(Vec3::ZERO, 3.0, 2.0));

        for _ in 0..3 {
            tick(&mut app, 0.5);
            let nav = app.world().get::<NavAgent>(actor).unwrap();
            assert!(nav.stopped);
            assert!(nav.destination.is_none());
        }

        tick(&mut app, 0.5);
        let point = app.world().get::<Patrol>(actor).unwrap().point.unwrap();
        assert!(point.length() <= 3.0 + 1e-4);
        let nav = app.world().get::<NavAgent>(actor).unwrap();
        assert_eq!(nav.destination, Some(point));
        assert!(!nav.stopped);

        for _ in 0..30 {
            tick(&mut app, 0.1);
            if app.world().get::<Patrol>(actor).unwrap().point.is_none() {
                break;
            }
        }
        assert!(app.world().get::<Patrol>(actor).unwrap().point.is_none());
        assert!(app.world().get::<NavAgent>(actor).unwrap().stopped);

        // Waiting again before the next point
        tick(&mut app, 0.5);
        assert!(app.world().get::<NavAgent>(actor).unwrap().stopped);
        assert!(app.world().get::<Patrol>(actor).unwrap().point.is_none());
    }
}
