use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_DATA_DIR: &str = "game_data";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

/// Tuning values the browser game reads before it starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    pub game_duration_secs: u64,
    pub initial_target_delay: f64, // seconds between spawns at the start
    pub min_target_delay: f64,
    pub difficulty_increase_rate: f64,
    pub max_targets: u32,
    pub target_size_reduction: f64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            game_duration_secs: 30,
            initial_target_delay: 0.8,
            min_target_delay: 0.03,
            difficulty_increase_rate: 0.65,
            max_targets: 4,
            target_size_reduction: 2.0,
        }
    }
}

/// Server configuration read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub bind_addr: String,
    pub game: GameSettings,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; unset or unparsable values use defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = GameSettings::default();

        Self {
            data_dir: lookup("SPEED_CHALLENGE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            bind_addr: lookup("SPEED_CHALLENGE_BIND_ADDR")
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            game: GameSettings {
                game_duration_secs: parsed(&lookup, "GAME_DURATION_SECS")
                    .unwrap_or(defaults.game_duration_secs),
                initial_target_delay: parsed(&lookup, "INITIAL_TARGET_DELAY")
                    .unwrap_or(defaults.initial_target_delay),
                min_target_delay: parsed(&lookup, "MIN_TARGET_DELAY")
                    .unwrap_or(defaults.min_target_delay),
                difficulty_increase_rate: parsed(&lookup, "DIFFICULTY_INCREASE_RATE")
                    .unwrap_or(defaults.difficulty_increase_rate),
                max_targets: parsed(&lookup, "MAX_TARGETS").unwrap_or(defaults.max_targets),
                target_size_reduction: parsed(&lookup, "TARGET_SIZE_REDUCTION")
                    .unwrap_or(defaults.target_size_reduction),
            },
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}
