//! Navigation adapter - destination seeking, stopping, and patrol points.
//!
//! Agents walk straight toward their destination on the horizontal plane.

use bevy::prelude::*;
use std::f32::consts::TAU;

use super::components::Inactive;

/// Path-following facade for one actor.
#[derive(Component, Debug, Clone)]
pub struct NavAgent {
    pub destination: Option<Vec3>,
    pub stopped: bool,
    pub enabled: bool,
    pub speed: f32,
    /// Arrival tolerance around the destination
    pub stopping_distance: f32,
}

impl NavAgent {
    pub fn new(speed: f32, stopping_distance: f32) -> Self {
        Self {
            destination: None,
            stopped: true,
            enabled: true,
            speed,
            stopping_distance,
        }
    }

    pub fn set_destination(&mut self, point: Vec3) {
        self.destination = Some(point);
    }

    pub fn set_stopped(&mut self, stopped: bool) {
        self.stopped = stopped;
    }

    pub fn is_on_navigable_surface(&self) -> bool {
        self.enabled
    }

    pub fn disable(&mut self) {
        self.enabled = false;
        self.stopped = true;
        self.destination = None;
    }

    /// Whether the agent stands within its stopping distance of `point`.
    pub fn has_arrived(&self, position: Vec3, point: Vec3) -> bool {
        horizontal(point - position).length_squared() <= self.stopping_distance * self.stopping_distance
    }
}

/// Idle wandering around the spawn point.
#[derive(Component, Debug, Clone)]
pub struct Patrol {
    pub home: Vec3,
    pub radius: f32,
    pub point: Option<Vec3>,
    pub wait: Timer,
}

impl Patrol {
    pub fn new(home: Vec3, radius: f32, wait: f32) -> Self {
        Self {
            home,
            radius,
            point: None,
            wait: Timer::from_seconds(wait, TimerMode::Once),
        }
    }
}

/// Pick a random patrol point within `radius` of `home`.
///
/// Returns `None` when the agent is off the navigable surface.
pub fn search_patrol_point(agent: &NavAgent, home: Vec3, radius: f32) -> Option<Vec3> {
    if !agent.is_on_navigable_surface() {
        return None;
    }
    let angle = rand::random::<f32>() * TAU;
    let distance = rand::random::<f32>().sqrt() * radius;
    Some(home + Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance))
}

pub(crate) fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Horizontal angle between the actor's forward vector and `target`.
pub fn facing_angle(transform: &Transform, target: Vec3) -> f32 {
    let to_target = horizontal(target - transform.translation);
    let forward = horizontal(transform.forward().as_vec3());
    if to_target.length_squared() <= f32::EPSILON || forward.length_squared() <= f32::EPSILON {
        return 0.0;
    }
    forward.angle_between(to_target)
}

/// Yaw toward `target` by at most `max_radians`.
pub fn turn_toward(transform: &mut Transform, target: Vec3, max_radians: f32) {
    let direction = horizontal(target - transform.translation);
    if direction.length_squared() <= f32::EPSILON {
        return;
    }

    let goal = Transform::IDENTITY.looking_to(direction, Vec3::Y).rotation;
    let remaining = transform.rotation.angle_between(goal);
    if remaining <= max_radians || remaining <= f32::EPSILON {
        transform.rotation = goal;
    } else {
        transform.rotation = transform.rotation.slerp(goal, max_radians / remaining);
    }
}

/// Move agents toward their destinations.
pub fn follow_nav_destinations(
    time: Res<Time>,
    mut agents: Query<(&mut Transform, &NavAgent), Without<Inactive>>,
) {
    let delta = time.delta_secs();

    for (mut transform, agent) in agents.iter_mut() {
        if !agent.enabled || agent.stopped {
            continue;
        }
        let Some(destination) = agent.destination else {
            continue;
        };
        if agent.has_arrived(transform.translation, destination) {
            continue;
        }

        let offset = horizontal(destination - transform.translation);
        let distance = offset.length();
        let step = (agent.speed * delta).min(distance - agent.stopping_distance).max(0.0);
        transform.translation += offset / distance * step;
        turn_toward(&mut transform, destination, TAU);
    }
}
