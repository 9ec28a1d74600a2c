//! Simulation configuration, loadable from JSON.
//!
//! Every field has a default matching the tuning constants in
//! `hamlet_logic::constants`, so a scenario file only needs to name what
//! it changes.

use std::io::Read;

use hamlet_logic::constants::{behavior, forage, motivation, needs, resources, steering, terrain};
use hamlet_logic::steering::Bounds;
use hamlet_logic::terrain::TerrainParams;
use serde::{Deserialize, Serialize};

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seeds both the terrain noise and the simulation RNG.
    pub seed: u32,
    pub world: Bounds,
    pub terrain: TerrainConfig,
    pub population: PopulationConfig,
    pub resources: ResourceConfig,
    pub citizen: CitizenConfig,
    pub organism: OrganismConfig,
    pub schedule: ScheduleConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            world: Bounds::default(),
            terrain: TerrainConfig::default(),
            population: PopulationConfig::default(),
            resources: ResourceConfig::default(),
            citizen: CitizenConfig::default(),
            organism: OrganismConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub cell_size: f32,
    pub ocean_threshold: f32,
    pub noise_scale: f64,
    pub resource_noise_scale: f64,
    pub smoothing_iterations: usize,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            cell_size: terrain::DEFAULT_CELL_SIZE,
            ocean_threshold: terrain::DEFAULT_OCEAN_THRESHOLD,
            noise_scale: terrain::NOISE_SCALE,
            resource_noise_scale: terrain::RESOURCE_NOISE_SCALE,
            smoothing_iterations: terrain::SMOOTHING_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub citizens: usize,
    pub organisms: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            citizens: 10,
            organisms: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Food items kept in the world at all times.
    pub food_target: usize,
    /// Wood piles kept in the world at all times.
    pub wood_target: usize,
    pub initial_berry_bushes: usize,
    pub max_berry_bushes: usize,
    /// Per-tick chance of a new bush appearing.
    pub berry_spawn_chance: f64,
    pub berry_regrow_rate: f32,
    pub house_wood_required: f32,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            food_target: 20,
            wood_target: 15,
            initial_berry_bushes: 20,
            max_berry_bushes: resources::MAX_BERRY_BUSHES,
            berry_spawn_chance: resources::BERRY_SPAWN_CHANCE,
            berry_regrow_rate: resources::BERRY_REGROW_RATE,
            house_wood_required: resources::HOUSE_WOOD_REQUIRED,
        }
    }
}

/// Per-citizen tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CitizenConfig {
    pub max_speed: f32,
    pub max_force: f32,
    pub perception: f32,
    pub size: f32,
    pub rest_threshold: f32,
    pub energy_decay_rate: f32,
    pub boredom_increase_rate: f32,
    pub max_boredom: f32,
    pub wood_capacity: f32,
    pub history_length: usize,
    pub hysteresis_bonus: f32,
    pub change_threshold: f32,
}

impl Default for CitizenConfig {
    fn default() -> Self {
        Self {
            max_speed: steering::MAX_SPEED,
            max_force: steering::MAX_FORCE,
            perception: behavior::PERCEPTION,
            size: behavior::CITIZEN_SIZE,
            rest_threshold: needs::REST_THRESHOLD,
            energy_decay_rate: needs::ENERGY_DECAY_RATE,
            boredom_increase_rate: needs::BOREDOM_INCREASE_RATE,
            max_boredom: needs::MAX_BOREDOM,
            wood_capacity: behavior::WOOD_CAPACITY,
            history_length: behavior::HISTORY_LENGTH,
            hysteresis_bonus: motivation::HYSTERESIS_BONUS,
            change_threshold: motivation::CHANGE_THRESHOLD,
        }
    }
}

/// Per-organism tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganismConfig {
    /// Moves a visited cell stays in memory.
    pub memory_duration: u32,
    pub start_energy: f32,
    pub max_energy: f32,
    pub energy_loss_rate: f32,
    pub history_length: usize,
}

impl Default for OrganismConfig {
    fn default() -> Self {
        Self {
            memory_duration: forage::MEMORY_DURATION,
            start_energy: forage::START_ENERGY,
            max_energy: forage::MAX_ENERGY,
            energy_loss_rate: forage::ENERGY_LOSS_RATE,
            history_length: forage::HISTORY_LENGTH,
        }
    }
}

/// Per-agent cadences, in ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub decision_interval: u32,
    pub organism_move_interval: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            decision_interval: motivation::DECISION_INTERVAL,
            organism_move_interval: forage::MOVEMENT_INTERVAL,
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Terrain generation parameters for the current seed.
    pub fn terrain_params(&self) -> TerrainParams {
        TerrainParams {
            seed: self.seed,
            cell_size: self.terrain.cell_size,
            ocean_threshold: self.terrain.ocean_threshold,
            noise_scale: self.terrain.noise_scale,
            resource_noise_scale: self.terrain.resource_noise_scale,
            smoothing_iterations: self.terrain.smoothing_iterations,
        }
    }

    /// Reject values that would make the simulation degenerate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("world.width", self.world.width)?;
        positive("world.height", self.world.height)?;
        within(
            "terrain.cell_size",
            self.terrain.cell_size,
            terrain::MIN_CELL_SIZE,
            terrain::MAX_CELL_SIZE,
        )?;
        within("terrain.ocean_threshold", self.terrain.ocean_threshold, 0.0, 1.0)?;
        if !(self.terrain.noise_scale > 0.0 && self.terrain.resource_noise_scale > 0.0) {
            return Err(ConfigError::invalid("terrain.noise_scale", "noise scales must be positive"));
        }
        if !(0.0..=1.0).contains(&self.resources.berry_spawn_chance) {
            return Err(ConfigError::invalid(
                "resources.berry_spawn_chance",
                format!("{} is not a probability", self.resources.berry_spawn_chance),
            ));
        }
        within("resources.berry_regrow_rate", self.resources.berry_regrow_rate, 0.0, 1.0)?;
        positive("resources.house_wood_required", self.resources.house_wood_required)?;
        positive("citizen.max_speed", self.citizen.max_speed)?;
        positive("citizen.max_force", self.citizen.max_force)?;
        positive("citizen.max_boredom", self.citizen.max_boredom)?;
        positive("citizen.wood_capacity", self.citizen.wood_capacity)?;
        within("citizen.rest_threshold", self.citizen.rest_threshold, 0.0, needs::MAX_ENERGY)?;
        positive("organism.max_energy", self.organism.max_energy)?;
        within(
            "organism.start_energy",
            self.organism.start_energy,
            0.0,
            self.organism.max_energy,
        )?;
        if self.schedule.decision_interval == 0 {
            return Err(ConfigError::invalid("schedule.decision_interval", "must be at least 1"));
        }
        if self.schedule.organism_move_interval == 0 {
            return Err(ConfigError::invalid(
                "schedule.organism_move_interval",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{} must be positive", value)))
    }
}

fn within(field: &'static str, value: f32, lo: f32, hi: f32) -> Result<(), ConfigError> {
    if (lo..=hi).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("{} outside [{}, {}]", value, lo, hi),
        ))
    }
}

/// Error loading or validating a [`SimConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            ConfigError::Io(e.into())
        } else {
            ConfigError::Json(e)
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Json(e) => write!(f, "Config parse error: {}", e),
            ConfigError::Invalid { field, reason } => {
                write!(f, "Invalid config value for {}: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimConfig::from_json(r#"{ "seed": 7, "population": { "citizens": 3 } }"#)
            .expect("valid config");
        assert_eq!(config.seed, 7);
        assert_eq!(config.population.citizens, 3);
        assert_eq!(config.population.organisms, 1);
        assert_eq!(config.citizen, CitizenConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = SimConfig::from_json(r#"{ "terrain": { "cell_size": 100.0 } }"#).unwrap_err();
        match err {
            ConfigError::Invalid { field, .. } => assert_eq!(field, "terrain.cell_size"),
            other => panic!("unexpected error: {other}"),
        }

        let err = SimConfig::from_json(r#"{ "schedule": { "decision_interval": 0 } }"#).unwrap_err();
        assert!(err.to_string().contains("schedule.decision_interval"));
    }

    #[test]
    fn test_malformed_json() {
        let err = SimConfig::from_json("{ seed: ").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_from_reader() {
        let json = br#"{ "world": { "width": 300.0, "height": 200.0 } }"#;
        let config = SimConfig::from_reader(&json[..]).expect("valid config");
        assert_eq!(config.world, Bounds::new(300.0, 200.0));
        let params = config.terrain_params();
        assert_eq!(params.grid_size(300.0, 200.0), (60, 40));
    }
}
