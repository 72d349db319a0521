//! Encounter data structures and RON loading.

use bevy::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::error::DataLoadError;
use crate::enemies::{EnemyDefinition, EnemyRegistry};

/// One actor placement.
#[derive(Debug, Clone, Deserialize)]
pub struct ActorSpawn {
    /// Enemy type identifier (matches EnemyRegistry key).
    pub enemy_type: String,
    pub position: (f32, f32, f32),
    /// Initial heading in degrees; zero faces -Z
    #[serde(default)]
    pub yaw: f32,
}

/// Static box blocking movement and line of sight.
#[derive(Debug, Clone, Deserialize)]
pub struct ObstacleDef {
    pub center: (f32, f32, f32),
    pub half_extents: (f32, f32, f32),
}

/// A complete encounter: where the player starts, who waits for them, and
/// the boss's eggs.
#[derive(Debug, Clone, Deserialize)]
pub struct EncounterDefinition {
    pub name: String,
    pub player_start: (f32, f32, f32),
    #[serde(default)]
    pub actors: Vec<ActorSpawn>,
    #[serde(default)]
    pub eggs: Vec<(f32, f32, f32)>,
    #[serde(default)]
    pub obstacles: Vec<ObstacleDef>,
}

impl EncounterDefinition {
    pub fn from_ron(contents: &str, path: &str) -> Result<Self, DataLoadError> {
        ron::from_str(contents).map_err(|e| DataLoadError::ParseError {
            path: path.to_string(),
            details: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, DataLoadError> {
        let display = path.display().to_string();
        if !path.exists() {
            return Err(DataLoadError::FileNotFound(display));
        }
        let contents = fs::read_to_string(path).map_err(|e| DataLoadError::ReadError {
            path: display.clone(),
            details: e.to_string(),
        })?;
        Self::from_ron(&contents, &display)
    }

    /// Pair every placement with its enemy definition.
    pub fn resolve_actors<'a>(
        &'a self,
        registry: &'a EnemyRegistry,
    ) -> impl Iterator<Item = (&'a ActorSpawn, Result<&'a EnemyDefinition, DataLoadError>)> + 'a {
        self.actors.iter().map(move |spawn| {
            let definition = registry
                .get(&spawn.enemy_type)
                .ok_or_else(|| DataLoadError::UnknownEnemyType(spawn.enemy_type.clone()));
            (spawn, definition)
        })
    }
}

/// Resource holding all loaded encounters.
#[derive(Resource, Default)]
pub struct EncounterRegistry {
    pub encounters: HashMap<String, EncounterDefinition>,
}

impl EncounterRegistry {
    pub fn get(&self, name: &str) -> Option<&EncounterDefinition> {
        self.encounters.get(name)
    }
}

/// Resource tracking which encounter gets built on entering the game.
#[derive(Resource, Debug)]
pub struct CurrentEncounter {
    pub name: String,
}

impl Default for CurrentEncounter {
    fn default() -> Self {
        Self {
            name: "nest".to_string(),
        }
    }
}

/// Load all encounters from assets/data/encounters/.
pub fn load_encounter_definitions(mut registry: ResMut<EncounterRegistry>) {
    let encounters_path = Path::new("assets/data/encounters");

    if !encounters_path.exists() {
        warn!("Encounters directory not found: {:?}", encounters_path);
        return;
    }

    let Ok(entries) = fs::read_dir(encounters_path) else {
        warn!("Failed to read encounters directory");
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.extension().is_some_and(|ext| ext == "ron") {
            continue;
        }
        let Some(name) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
            continue;
        };

        match EncounterDefinition::load(&path) {
            Ok(encounter) => {
                info!("Loaded encounter: {} ({})", encounter.name, name);
                registry.encounters.insert(name, encounter);
            }
            Err(e) => error!("{}", e),
        }
    }

    info!("Loaded {} encounter(s)", registry.encounters.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENCOUNTER: &str = r#"(
        name: "Test Nest",
        player_start: (0.0, 0.0, 10.0),
        actors: [
            (enemy_type: "ghoul", position: (2.0, 0.0, 0.0)),
            (enemy_type: "wraith", position: (-2.0, 0.0, 0.0), yaw: 90.0),
        ],
        eggs: [(0.0, 0.0, -4.0)],
    )"#;

    const GHOUL: &str = r#"(
        name: "Ghoul",
        max_health: 60.0,
        damage: 10.0,
        move_speed: 3.0,
        sight_range: 10.0,
        attack_range: 2.0,
        time_between_attacks: 1.5,
    )"#;

    #[test]
    fn parses_with_defaults() {
        let encounter = EncounterDefinition::from_ron(ENCOUNTER, "test.ron").unwrap();
        assert_eq!(encounter.actors.len(), 2);
        assert_eq!(encounter.actors[0].yaw, 0.0);
        assert_eq!(encounter.eggs.len(), 1);
        assert!(encounter.obstacles.is_empty());
    }

    #[test]
    fn unknown_enemy_types_are_reported() {
        let encounter = EncounterDefinition::from_ron(ENCOUNTER, "test.ron").unwrap();
        let mut registry = EnemyRegistry::default();
        registry.definitions.insert(
            "ghoul".to_string(),
            EnemyDefinition::from_ron(GHOUL, "ghoul.ron").unwrap(),
        );

        let resolved: Vec<_> = encounter.resolve_actors(&registry).collect();
        assert!(resolved[0].1.is_ok());
        assert!(matches!(
            &resolved[1].1,
            Err(DataLoadError::UnknownEnemyType(name)) if name == "wraith"
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let result = EncounterDefinition::load(Path::new("assets/data/encounters/missing.ron"));
        assert!(matches!(result, Err(DataLoadError::FileNotFound(_))));
    }
}
