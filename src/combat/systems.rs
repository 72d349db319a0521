//! Combat systems - melee damage windows and the player's damage sink.

use bevy::prelude::*;
use std::collections::HashSet;

use super::components::*;
use crate::core::GameState;
use crate::player::Player;

/// Deliver melee hits from open damage windows.
///
/// Each opening strikes the player at most once.
pub fn strike_with_damage_windows(
    mut windows: Query<(Entity, &Transform, &mut DamageWindow), Without<Player>>,
    player_query: Query<(Entity, &Transform), (With<Player>, Without<Dead>)>,
    mut damage_events: EventWriter<DamageEvent>,
) {
    let Ok((player_entity, player_transform)) = player_query.get_single() else {
        return;
    };

    for (attacker, transform, mut window) in windows.iter_mut() {
        if !window.is_open() {
            continue;
        }

        let distance_squared = transform
            .translation
            .distance_squared(player_transform.translation);
        if distance_squared > window.reach * window.reach {
            continue;
        }

        if window.try_strike() {
            damage_events.send(DamageEvent {
                target: player_entity,
                source: Some(attacker),
                amount: window.damage,
            });
        }
    }
}

/// Apply damage aimed at the player.
pub fn apply_player_damage(
    mut commands: Commands,
    mut damage_events: EventReader<DamageEvent>,
    mut player_query: Query<(Entity, &mut Health), (With<Player>, Without<Dead>)>,
    mut death_events: EventWriter<DeathEvent>,
) {
    // Track deaths this frame; the Dead marker only lands after commands apply
    let mut died_this_frame = HashSet::new();

    for event in damage_events.read() {
        if died_this_frame.contains(&event.target) {
            continue;
        }

        let Ok((entity, mut health)) = player_query.get_mut(event.target) else {
            continue;
        };

        health.take_damage(event.amount);

        if health.is_dead() {
            died_this_frame.insert(entity);
            commands.entity(entity).insert(Dead);
            death_events.send(DeathEvent { entity });
        }
    }
}

/// Move to game over when the player's death is reported.
pub fn check_player_death(
    mut death_events: EventReader<DeathEvent>,
    player_query: Query<Entity, With<Player>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    for event in death_events.read() {
        if player_query.get(event.entity).is_ok() {
            info!("Player died! Transitioning to Game Over...");
            next_state.set(GameState::GameOver);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Resource, Default)]
    struct Deaths(usize);

    fn count_deaths(mut events: EventReader<DeathEvent>, mut deaths: ResMut<Deaths>) {
        deaths.0 += events.read().count();
    }

    fn setup_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_event::<DamageEvent>();
        app.add_event::<DeathEvent>();
        app.init_resource::<Deaths>();
        app.add_systems(
            Update,
            (strike_with_damage_windows, apply_player_damage, count_deaths).chain(),
        );
        app
    }

    #[test]
    fn open_window_strikes_player_once() {
        let mut app = setup_app();
        let player = app
            .world_mut()
            .spawn((Player, Transform::from_xyz(0.0, 0.0, -1.0), Health::new(100.0)))
            .id();
        let mut window = DamageWindow::new(2.0, 15.0);
        window.open();
        app.world_mut().spawn((Transform::default(), window));

        app.update();
        app.update();

        assert_eq!(app.world().get::<Health>(player).unwrap().current, 85.0);
    }

    #[test]
    fn window_out_of_reach_does_nothing() {
        let mut app = setup_app();
        let player = app
            .world_mut()
            .spawn((Player, Transform::from_xyz(0.0, 0.0, -5.0), Health::new(100.0)))
            .id();
        let mut window = DamageWindow::new(2.0, 15.0);
        window.open();
        app.world_mut().spawn((Transform::default(), window));

        app.update();

        assert_eq!(app.world().get::<Health>(player).unwrap().current, 100.0);
    }

    #[test]
    fn player_death_is_reported_once() {
        let mut app = setup_app();
        let player = app
            .world_mut()
            .spawn((Player, Transform::default(), Health::new(20.0)))
            .id();

        for _ in 0..3 {
            app.world_mut().send_event(DamageEvent {
                target: player,
                source: None,
                amount: 15.0,
            });
        }
        app.update();
        app.world_mut().send_event(DamageEvent {
            target: player,
            source: None,
            amount: 15.0,
        });
        app.update();

        assert_eq!(app.world().resource::<Deaths>().0, 1);
        assert!(app.world().get::<Dead>(player).is_some());
    }
}
