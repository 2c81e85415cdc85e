//! Application-level configuration loading, including the scoring rules and
//! coordinator tunables.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::outcome::ScoringRules;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "DUELHUB_BACK_CONFIG_PATH";

/// Queue entries older than this are evicted before every join attempt.
const DEFAULT_QUEUE_TTL: Duration = Duration::from_secs(300);
/// Length of generated private room codes.
const DEFAULT_ROOM_CODE_LEN: usize = 6;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Ranked scoring rules applied by the outcome reconciler.
    pub scoring: ScoringRules,
    /// Staleness threshold for matchmaking queue entries.
    pub queue_ttl: Duration,
    /// Length of generated private room codes.
    pub room_code_len: usize,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(path = %path.display(), "loaded coordinator config");
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringRules::default(),
            queue_ttl: DEFAULT_QUEUE_TTL,
            room_code_len: DEFAULT_ROOM_CODE_LEN,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    scoring: Option<RawScoring>,
    #[serde(default)]
    queue_ttl_secs: Option<u64>,
    #[serde(default)]
    room_code_len: Option<usize>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            scoring: value.scoring.map(Into::into).unwrap_or(defaults.scoring),
            queue_ttl: value
                .queue_ttl_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.queue_ttl),
            room_code_len: value.room_code_len.unwrap_or(defaults.room_code_len),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the ranked scoring rules.
struct RawScoring {
    win_points: i64,
    loss_points: i64,
    bonus_floor_secs: u64,
    bonus_step_secs: u64,
    bonus_step_points: i64,
    bonus_cap: i64,
}

impl From<RawScoring> for ScoringRules {
    fn from(value: RawScoring) -> Self {
        Self {
            win_points: value.win_points,
            loss_points: value.loss_points,
            bonus_floor_secs: value.bonus_floor_secs,
            bonus_step_secs: value.bonus_step_secs,
            bonus_step_points: value.bonus_step_points,
            bonus_cap: value.bonus_cap,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
