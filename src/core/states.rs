//! Game state definitions that control the overall flow of the game.
//!
//! States determine which systems run at any given time. The combat
//! simulation only ticks in `InGame`.

use bevy::prelude::*;

/// Main game states - controls overall game flow.
///
/// - Start in `Loading` while data files are read
/// - Enter `InGame` once the encounter is ready
/// - `GameOver` when the player dies
/// - `Victory` when the victory watch finds no hostiles left
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum GameState {
    /// Initial state - loading data files
    #[default]
    Loading,
    /// Active gameplay
    InGame,
    /// Player has died
    GameOver,
    /// Encounter won
    Victory,
}
