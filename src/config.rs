use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::map::{DEFAULT_MAP_HEIGHT, DEFAULT_MAP_WIDTH, TilePatch};

/// Tunable numbers the simulation consults while running.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Hit points lost per monster contact.
    pub contact_damage: i32,
    pub gold_value: u32,
    pub max_hp: i32,
    /// Tiles per second.
    pub monster_speed: f32,
    /// Tiles per second.
    pub bullet_speed: f32,
    /// Outer sampling rounds before a placement gives up. `None` retries forever.
    pub placement_rounds: Option<usize>,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            contact_damage: 10,
            gold_value: 10,
            max_hp: 100,
            monster_speed: 1.5,
            bullet_speed: 20.0,
            placement_rounds: Some(10_000),
        }
    }
}

/// One terrain pass: every tile independently takes the glyph with `frequency`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainLayer {
    pub glyph: String,
    pub frequency: f64,
    #[serde(default)]
    pub patch: TilePatch,
}

impl TerrainLayer {
    pub fn new(glyph: &str, frequency: f64, patch: TilePatch) -> Self {
        Self {
            glyph: glyph.to_string(),
            frequency,
            patch,
        }
    }
}

/// Entity population: `frequency >= 1` is a count, below 1 a per-tile density.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Population {
    pub factory: String,
    pub frequency: f64,
}

impl Population {
    pub fn new(factory: &str, frequency: f64) -> Self {
        Self {
            factory: factory.to_string(),
            frequency,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub world_name: String,
    pub width: i32,
    pub height: i32,
    /// Simulated ticks per second.
    pub tick_rate: f64,
    /// Fixed seed; a fresh one is drawn per session when absent.
    pub seed: Option<u64>,
    pub terrain: Vec<TerrainLayer>,
    pub populations: Vec<Population>,
    pub rules: Rules,
    pub log_path: PathBuf,
    pub log_level: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_name: "The Forest".to_string(),
            width: DEFAULT_MAP_WIDTH,
            height: DEFAULT_MAP_HEIGHT,
            tick_rate: 20.0,
            seed: None,
            terrain: vec![
                TerrainLayer::new("rock", 0.01, TilePatch::named("rock").solid()),
                TerrainLayer::new("shrub", 0.02, TilePatch::named("shrub").solid()),
                TerrainLayer::new("tree", 0.02, TilePatch::named("tree").solid()),
                TerrainLayer::new(
                    "tall grass",
                    0.03,
                    TilePatch::named("tall grass").concealing().plural(),
                ),
            ],
            populations: vec![
                Population::new("monster", 0.002),
                Population::new("gold coin", 25.0),
                Population::new("health kit", 4.0),
            ],
            rules: Rules::default(),
            log_path: PathBuf::from("thicket.log"),
            log_level: "info".to_string(),
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_terrain(mut self, terrain: Vec<TerrainLayer>) -> Self {
        self.terrain = terrain;
        self
    }

    pub fn with_populations(mut self, populations: Vec<Population>) -> Self {
        self.populations = populations;
        self
    }

    pub fn with_rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }
}
