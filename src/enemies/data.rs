//! Enemy data loading from RON files.

use bevy::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::components::{Archetype, AttackTiming, EnemyStats};
use crate::world::DataLoadError;

/// One animation clip of an enemy model.
#[derive(Deserialize, Clone, Debug)]
pub struct ClipConfig {
    /// Index into the model's `#AnimationN` clips
    pub index: u32,
    #[serde(default)]
    pub looping: bool,
}

/// Animation configuration for an enemy type, keyed by clip name
/// (`"Idle"`, `"Walk"`, `"Attack"`, ...).
#[derive(Deserialize, Clone, Debug, Default)]
pub struct AnimationConfig {
    pub clips: HashMap<String, ClipConfig>,
}

/// Collider configuration for an enemy type.
#[derive(Deserialize, Clone, Debug)]
pub struct ColliderConfig {
    pub half_height: f32,
    pub radius: f32,
}

impl Default for ColliderConfig {
    fn default() -> Self {
        Self {
            half_height: 0.5,
            radius: 0.3,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_turn_speed() -> f32 {
    240.0
}

fn default_scale() -> f32 {
    1.0
}

/// Enemy definition loaded from RON file.
#[derive(Deserialize, Clone, Debug)]
pub struct EnemyDefinition {
    pub name: String,
    #[serde(default)]
    pub archetype: Archetype,
    pub max_health: f32,
    pub damage: f32,
    pub move_speed: f32,
    pub sight_range: f32,
    pub attack_range: f32,
    pub time_between_attacks: f32,
    #[serde(default = "default_turn_speed")]
    pub turn_speed: f32,
    #[serde(default)]
    pub attack: AttackTiming,
    /// Some archetypes shrug off hit stagger entirely
    #[serde(default = "default_true")]
    pub stunnable: bool,
    /// Wander radius around the spawn point while idle
    #[serde(default)]
    pub patrol_radius: Option<f32>,
    #[serde(default)]
    pub model_path: Option<String>,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub collider: Option<ColliderConfig>,
    #[serde(default)]
    pub animations: Option<AnimationConfig>,
}

impl EnemyDefinition {
    /// Parse a definition from RON text.
    pub fn from_ron(contents: &str, path: &str) -> Result<Self, DataLoadError> {
        ron::from_str(contents).map_err(|e| DataLoadError::ParseError {
            path: path.to_string(),
            details: e.to_string(),
        })
    }

    /// Read and parse a definition file.
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

    /// Convert to EnemyStats component.
    pub fn to_stats(&self) -> EnemyStats {
        EnemyStats {
            max_health: self.max_health,
            damage: self.damage,
            move_speed: self.move_speed,
            sight_range: self.sight_range,
            attack_range: self.attack_range,
            time_between_attacks: self.time_between_attacks,
            turn_speed: self.turn_speed,
            attack: self.attack,
        }
    }

    /// Whether hits halt this enemy's navigation. Bosses never stagger.
    pub fn is_stunnable(&self) -> bool {
        self.stunnable && self.archetype != Archetype::Boss
    }
}

/// Resource holding all loaded enemy definitions.
#[derive(Resource, Default)]
pub struct EnemyRegistry {
    pub definitions: HashMap<String, EnemyDefinition>,
}

impl EnemyRegistry {
    /// Get an enemy definition by type name.
    pub fn get(&self, enemy_type: &str) -> Option<&EnemyDefinition> {
        self.definitions.get(enemy_type)
    }
}

/// Load all enemy definitions from the assets/data/enemies/ directory.
pub fn load_enemy_definitions(mut registry: ResMut<EnemyRegistry>) {
    let enemies_dir = Path::new("assets/data/enemies");

    if !enemies_dir.exists() {
        warn!("Enemy definitions directory not found: {:?}", enemies_dir);
        return;
    }

    let Ok(entries) = fs::read_dir(enemies_dir) else {
        warn!("Failed to read enemy definitions directory");
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();

        if path.extension().is_some_and(|ext| ext == "ron") {
            let enemy_type = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("unknown")
                .to_string();

            match EnemyDefinition::load(&path) {
                Ok(definition) => {
                    info!("Loaded enemy definition: {} ({})", definition.name, enemy_type);
                    registry.definitions.insert(enemy_type, definition);
                }
                Err(e) => error!("{}", e),
            }
        }
    }

    info!("Loaded {} enemy definitions", registry.definitions.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPITTER: &str = r#"(
        name: "Spitter",
        archetype: Ranged,
        max_health: 40.0,
        damage: 8.0,
        move_speed: 2.5,
        sight_range: 14.0,
        attack_range: 9.0,
        time_between_attacks: 2.0,
        attack: (windup: 0.5, recovery: 0.6),
        patrol_radius: Some(4.0),
    )"#;

    #[test]
    fn optional_sections_take_defaults() {
        let definition = EnemyDefinition::from_ron(SPITTER, "spitter.ron").unwrap();
        assert_eq!(definition.archetype, Archetype::Ranged);
        assert!(definition.stunnable);
        assert_eq!(definition.turn_speed, 240.0);
        assert_eq!(definition.scale, 1.0);
        assert!(definition.model_path.is_none());

        let stats = definition.to_stats();
        assert_eq!(stats.attack.windup, 0.5);
        assert_eq!(stats.attack.active, AttackTiming::default().active);
        assert_eq!(stats.sight_range, 14.0);
    }

    #[test]
    fn bosses_are_never_stunnable() {
        let boss = SPITTER.replace("Ranged", "Boss");
        let definition = EnemyDefinition::from_ron(&boss, "boss.ron").unwrap();
        assert!(!definition.is_stunnable());
    }

    #[test]
    fn malformed_definition_reports_path() {
        let err = EnemyDefinition::from_ron("(name: 3)", "broken.ron").unwrap_err();
        assert!(err.to_string().contains("broken.ron"));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = EnemyDefinition::load(Path::new("assets/data/enemies/nope.ron")).unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound(_)));
    }
}
