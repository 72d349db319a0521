//! Nest Siege - Entry Point
//!
//! Builds the encounter named in `CurrentEncounter` and runs the combat
//! simulation until the player dies or the nest falls.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

fn main() {
    App::new()
        // Bevy default plugins
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Nest Siege".to_string(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))

        // Physics
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())

        // Our game plugin
        .add_plugins(nest_siege::NestSiegePlugin)

        .run();
}
