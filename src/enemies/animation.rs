//! Enemy animation - a fire-and-forget command facade over Bevy's animation player.
//!
//! Gameplay code only queues [`AnimationCommand`]s on an [`Animator`]. The
//! playback system drains every queue each tick and plays matching clips on
//! enemies whose model exposes an `AnimationPlayer`; all other queues are
//! discarded.

use bevy::animation::{graph::AnimationNodeIndex, AnimationClip, AnimationPlayer, RepeatAnimation};
use bevy::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

use super::components::{Enemy, EnemyType};
use super::data::{AnimationConfig, EnemyRegistry};

/// Clip and parameter names shared by gameplay and data files.
pub mod clips {
    pub const IDLE: &str = "Idle";
    pub const WALK: &str = "Walk";
    pub const ATTACK: &str = "Attack";
    pub const SHOOT: &str = "Shoot";
    pub const HIT: &str = "Hit";
    pub const DIZZY: &str = "Dizzy";
    pub const DEATH: &str = "Death";
}

/// A queued animation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationCommand {
    Trigger(&'static str),
    SetBool(&'static str, bool),
    CrossFade { state: &'static str, blend: f32 },
}

/// Animation controller facade for one actor.
///
/// Bool parameters only queue a command when their value changes. A trigger
/// or cross-fade takes over the clip, so it forgets every bool value.
#[derive(Component, Debug, Default)]
pub struct Animator {
    pending: Vec<AnimationCommand>,
    bools: HashMap<&'static str, bool>,
}

impl Animator {
    pub fn set_trigger(&mut self, name: &'static str) {
        self.bools.clear();
        self.pending.push(AnimationCommand::Trigger(name));
    }

    pub fn set_bool(&mut self, name: &'static str, value: bool) {
        if self.bools.insert(name, value) != Some(value) {
            self.pending.push(AnimationCommand::SetBool(name, value));
        }
    }

    #[cfg(test)]
    pub fn get_bool(&self, name: &str) -> bool {
        self.bools.get(name).copied().unwrap_or(false)
    }

    pub fn cross_fade(&mut self, state: &'static str, blend: f32) {
        self.bools.clear();
        self.pending.push(AnimationCommand::CrossFade { state, blend });
    }

    /// Drop every trigger that has not been consumed yet.
    pub fn reset_all_triggers(&mut self) {
        self.pending
            .retain(|command| !matches!(command, AnimationCommand::Trigger(_)));
    }

    pub fn pending(&self) -> &[AnimationCommand] {
        &self.pending
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, AnimationCommand> {
        self.pending.drain(..)
    }
}

/// Graph nodes of an enemy's clips, keyed by clip name.
#[derive(Component)]
pub struct EnemyAnimations {
    pub nodes: HashMap<String, (AnimationNodeIndex, bool)>,
}

/// Links an enemy entity to its child AnimationPlayer entity.
#[derive(Component)]
pub struct AnimationLink(pub Entity);

/// Marker for enemies awaiting AnimationPlayer discovery.
#[derive(Component)]
pub struct NeedsAnimationSetup;

/// Finds AnimationPlayer in scene hierarchy and builds AnimationGraph.
pub fn setup_enemy_animations(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    registry: Res<EnemyRegistry>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
    mut enemy_query: Query<
        (Entity, &EnemyType, &Children, Option<&mut Animator>),
        (With<NeedsAnimationSetup>, With<Enemy>),
    >,
    children_query: Query<&Children>,
    animation_player_query: Query<Entity, With<AnimationPlayer>>,
) {
    for (enemy_entity, enemy_type, children, animator) in enemy_query.iter_mut() {
        // The scene may not have spawned yet
        let Some(player_entity) =
            find_animation_player_entity(children, &children_query, &animation_player_query)
        else {
            continue;
        };

        let definition = registry.get(&enemy_type.0);
        let config = definition.and_then(|d| d.animations.as_ref());
        let model_path = definition.and_then(|d| d.model_path.as_deref());

        let (Some(config), Some(model_path)) = (config, model_path) else {
            warn!("No animations configured for enemy type: {}", enemy_type.0);
            commands.entity(enemy_entity).remove::<NeedsAnimationSetup>();
            continue;
        };

        let model_base = model_path.replace("#Scene0", "");
        let (graph, nodes) = build_animation_graph(&asset_server, &model_base, config);
        let graph_handle = graphs.add(graph);

        commands.entity(player_entity).insert((
            AnimationGraphHandle(graph_handle),
            AnimationTransitions::new(),
        ));

        commands
            .entity(enemy_entity)
            .remove::<NeedsAnimationSetup>()
            .insert((
                AnimationLink(player_entity),
                EnemyAnimations { nodes },
            ));

        if let Some(mut animator) = animator {
            animator.cross_fade(clips::IDLE, 0.0);
        }

        info!("Animation setup complete for enemy: {}", enemy_type.0);
    }
}

/// Recursively search for AnimationPlayer entity in hierarchy.
fn find_animation_player_entity(
    children: &Children,
    children_query: &Query<&Children>,
    animation_player_query: &Query<Entity, With<AnimationPlayer>>,
) -> Option<Entity> {
    for &child in children.iter() {
        if animation_player_query.get(child).is_ok() {
            return Some(child);
        }

        if let Ok(grandchildren) = children_query.get(child) {
            if let Some(found) =
                find_animation_player_entity(grandchildren, children_query, animation_player_query)
            {
                return Some(found);
            }
        }
    }
    None
}

/// Build animation graph from config.
fn build_animation_graph(
    asset_server: &AssetServer,
    model_base: &str,
    config: &AnimationConfig,
) -> (AnimationGraph, HashMap<String, (AnimationNodeIndex, bool)>) {
    let mut graph = AnimationGraph::new();
    let mut nodes = HashMap::new();

    for (name, clip) in &config.clips {
        let handle: Handle<AnimationClip> =
            asset_server.load(format!("{}#Animation{}", model_base, clip.index));
        let node = graph.add_clip(handle, 1.0, graph.root);
        nodes.insert(name.clone(), (node, clip.looping));
    }

    (graph, nodes)
}

/// Which clip a command asks for, and the blend time to use.
fn requested_clip(command: AnimationCommand) -> (&'static str, f32) {
    match command {
        AnimationCommand::Trigger(name) => (name, 0.1),
        AnimationCommand::SetBool(name, true) => (name, 0.2),
        AnimationCommand::SetBool(_, false) => (clips::IDLE, 0.2),
        AnimationCommand::CrossFade { state, blend } => (state, blend),
    }
}

/// Applies queued animator commands to the linked AnimationPlayer.
pub fn play_animator_commands(
    mut animators: Query<(&mut Animator, Option<&AnimationLink>, Option<&EnemyAnimations>)>,
    mut players: Query<(&mut AnimationPlayer, &mut AnimationTransitions)>,
) {
    for (mut animator, link, animations) in animators.iter_mut() {
        let target = link.zip(animations);
        for command in animator.drain() {
            let Some((link, animations)) = target else {
                continue;
            };
            let Ok((mut player, mut transitions)) = players.get_mut(link.0) else {
                continue;
            };

            let (clip, blend) = requested_clip(command);
            let Some(&(node, looping)) = animations.nodes.get(clip) else {
                continue;
            };

            let active = transitions.play(&mut *player, node, Duration::from_secs_f32(blend.max(0.0)));
            if looping {
                active.set_repeat(RepeatAnimation::Forever);
            } else {
                active.set_repeat(RepeatAnimation::Never);
            }
        }
    }
}
