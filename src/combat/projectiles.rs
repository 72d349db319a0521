//! Projectile systems - launching, flight, collisions, and pooled visuals.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::components::Health;
use super::pool::{Poolable, ProjectilePool};
use crate::core::{CombatConfig, DamageEvent, FireProjectileEvent, Tag};
use crate::world::EncounterEntity;

/// Which pool a visual entity mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    Projectile,
    Impact,
}

/// Pre-spawned entity that renders one pool slot.
#[derive(Component, Debug, Clone, Copy)]
pub struct PoolVisual {
    pub kind: PoolKind,
    pub slot: usize,
}

/// Create the shared pool and one hidden visual entity per slot.
///
/// Meshes are attached only when the render assets exist.
pub fn init_projectile_pool(
    mut commands: Commands,
    config: Res<CombatConfig>,
    meshes: Option<ResMut<Assets<Mesh>>>,
    materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    let pool = ProjectilePool::from_config(&config);

    let render = match (meshes, materials) {
        (Some(mut meshes), Some(mut materials)) => Some((
            meshes.add(Sphere::new(config.projectile_radius)),
            materials.add(StandardMaterial {
                base_color: Color::srgb(0.55, 0.9, 0.3),
                emissive: LinearRgba::new(0.3, 0.8, 0.1, 1.0),
                ..default()
            }),
            meshes.add(Sphere::new(config.projectile_radius * 2.0)),
            materials.add(StandardMaterial {
                base_color: Color::srgba(0.9, 0.9, 0.6, 0.6),
                alpha_mode: AlphaMode::Blend,
                ..default()
            }),
        )),
        _ => None,
    };

    let slots = (0..pool.projectiles.capacity())
        .map(|slot| (PoolKind::Projectile, slot))
        .chain((0..pool.impacts.capacity()).map(|slot| (PoolKind::Impact, slot)));

    for (kind, slot) in slots {
        let mut entity = commands.spawn((
            PoolVisual { kind, slot },
            Transform::default(),
            Visibility::Hidden,
            EncounterEntity,
        ));

        if let Some((projectile_mesh, projectile_material, impact_mesh, impact_material)) = &render {
            match kind {
                PoolKind::Projectile => entity.insert((
                    Mesh3d(projectile_mesh.clone()),
                    MeshMaterial3d(projectile_material.clone()),
                )),
                PoolKind::Impact => entity.insert((
                    Mesh3d(impact_mesh.clone()),
                    MeshMaterial3d(impact_material.clone()),
                )),
            };
        }
    }

    info!(
        "Projectile pool ready: {} projectiles, {} impact effects",
        pool.projectiles.capacity(),
        pool.impacts.capacity()
    );
    commands.insert_resource(pool);
}

/// Turn launch requests into active projectiles.
pub fn launch_projectiles(
    mut requests: EventReader<FireProjectileEvent>,
    mut pool: ResMut<ProjectilePool>,
) {
    for request in requests.read() {
        if pool
            .launch(
                request.origin,
                request.direction,
                request.damage,
                request.owner_tag,
                request.owner,
            )
            .is_none()
        {
            debug!("Projectile pool exhausted, dropping launch from {:?}", request.owner_tag);
        }
    }
}

/// Closest distance from `point` to the segment `start..end`.
fn distance_to_segment(point: Vec3, start: Vec3, end: Vec3) -> f32 {
    let segment = end - start;
    let length_squared = segment.length_squared();
    if length_squared <= f32::EPSILON {
        return point.distance(start);
    }
    let t = ((point - start).dot(segment) / length_squared).clamp(0.0, 1.0);
    point.distance(start + segment * t)
}

/// Advance projectiles, expire them, and resolve contacts.
///
/// A contact with a tagged entity of another faction deals damage; a contact
/// with untagged geometry (only detectable with a physics world) just stops
/// the projectile. Both leave an impact effect and recycle the slot.
pub fn move_projectiles(
    time: Res<Time>,
    config: Res<CombatConfig>,
    mut pool: ResMut<ProjectilePool>,
    targets: Query<(Entity, &Transform, &Tag), (With<Health>, Without<ColliderDisabled>)>,
    rapier_context: Query<&RapierContext>,
    mut damage_events: EventWriter<DamageEvent>,
) {
    let delta = time.delta_secs();
    let context = rapier_context.get_single().ok();
    let mut impacts = Vec::new();

    for projectile in pool.projectiles.iter_mut().filter(|p| p.active) {
        let previous = projectile.position;

        if !projectile.advance(delta) {
            projectile.recycle();
            continue;
        }

        let reach = config.projectile_radius + config.target_radius;
        let struck = targets
            .iter()
            .filter(|(entity, _, tag)| **tag != projectile.owner_tag && Some(*entity) != projectile.owner)
            .map(|(entity, transform, _)| {
                (entity, distance_to_segment(transform.translation, previous, projectile.position))
            })
            .filter(|(_, distance)| *distance <= reach)
            .min_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((target, _)) = struck {
            damage_events.send(DamageEvent {
                target,
                source: projectile.owner,
                amount: projectile.damage,
            });
            impacts.push(projectile.position);
            projectile.recycle();
            continue;
        }

        let Some(context) = context else {
            continue;
        };

        let step = projectile.position - previous;
        let step_length = step.length();
        if step_length <= f32::EPSILON {
            continue;
        }

        let mut filter = QueryFilter::default().exclude_sensors();
        if let Some(owner) = projectile.owner {
            filter = filter.exclude_collider(owner);
        }

        if let Some((hit, toi)) = context.cast_ray(previous, step / step_length, step_length, true, filter) {
            // Tagged bodies are resolved by the proximity test above
            if targets.get(hit).is_err() {
                impacts.push(previous + step / step_length * toi);
                projectile.recycle();
            }
        }
    }

    for position in impacts {
        pool.spawn_impact(position);
    }
}

/// Age impact effects and recycle finished ones.
pub fn tick_impact_effects(time: Res<Time>, mut pool: ResMut<ProjectilePool>) {
    let delta = time.delta_secs();
    for effect in pool.impacts.iter_mut().filter(|e| e.active) {
        effect.elapsed += delta;
        if effect.elapsed >= effect.lifetime {
            effect.recycle();
        }
    }
}

/// Mirror pool slots onto their visual entities.
pub fn sync_pool_visuals(
    pool: Res<ProjectilePool>,
    mut visuals: Query<(&PoolVisual, &mut Transform, &mut Visibility)>,
) {
    for (visual, mut transform, mut visibility) in visuals.iter_mut() {
        let state = match visual.kind {
            PoolKind::Projectile => pool
                .projectiles
                .get(visual.slot)
                .map(|p| (p.active, p.position)),
            PoolKind::Impact => pool.impacts.get(visual.slot).map(|e| (e.active, e.position)),
        };

        let Some((active, position)) = state else {
            continue;
        };

        if active {
            transform.translation = position;
            *visibility = Visibility::Visible;
        } else {
            *visibility = Visibility::Hidden;
        }
    }
}
