use serde::Deserialize;

use crate::error::{read_file, SimError};

#[derive(Debug, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub world: WorldSection,
    #[serde(default)]
    pub logging: LoggingSection,
    pub circuit: CircuitSection,
}

#[derive(Debug, Deserialize)]
pub struct WorldSection {
    /// Wall-clock length of one game tick in milliseconds. Default: 50.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Stop after this many ticks. Runs until Ctrl+C when absent.
    #[serde(default)]
    pub max_ticks: Option<u64>,
}

fn default_tick_interval_ms() -> u64 {
    50
}

impl Default for WorldSection {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CircuitSection {
    /// Path of the JSON circuit layout.
    pub path: String,
}

impl SimConfig {
    pub fn load(path: &str) -> Result<Self, SimError> {
        Self::parse(&read_file(path)?)
    }

    pub fn parse(contents: &str) -> Result<Self, SimError> {
        let config: Self = toml::from_str(contents)?;
        if config.world.tick_interval_ms == 0 {
            return Err(SimError::InvalidConfig(
                "world.tick_interval_ms must be greater than 0".into(),
            ));
        }
        Ok(config)
    }
}
