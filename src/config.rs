use crate::errors::ConfigError;
use crate::pokeapi::DEFAULT_BASE_URL;
use crate::progression::{CatchRules, Milestones};
use crate::quiz::{Grader, SPEED_BONUS_SECS};
use crate::storage::SAVE_FILE_NAME;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SETTINGS_FILE_NAME: &str = "settings.ron";

/// Tunables, read from a RON file. Every field is optional in the file.
///
/// ```ron
/// (
///     api_base_url: "https://pokeapi.co/api/v2",
///     max_creature_id: 151,
///     speed_bonus_secs: 4.0,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub max_creature_id: u32,
    pub catch_retry_cap: u32,
    pub catch_every: u32,
    pub evolve_every: u32,
    pub speed_bonus_secs: f64,
    pub correct_delay_ms: u64,
    pub incorrect_delay_ms: u64,
    pub save_path: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            max_creature_id: 386,
            catch_retry_cap: 20,
            catch_every: 100,
            evolve_every: 300,
            speed_bonus_secs: SPEED_BONUS_SECS,
            correct_delay_ms: 2000,
            incorrect_delay_ms: 3000,
            save_path: None,
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing file yields the defaults; a file
    /// that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        let settings = Self::from_ron(&raw).map_err(|reason| ConfigError::Parse {
            path: path.display().to_string(),
            reason,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_ron(raw: &str) -> Result<Self, String> {
        ron::from_str(raw).map_err(|e| e.to_string())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_creature_id == 0 {
            return Err(ConfigError::Invalid("max_creature_id must be at least 1".to_string()));
        }
        if self.catch_every == 0 || self.evolve_every == 0 {
            return Err(ConfigError::Invalid("milestone intervals must be positive".to_string()));
        }
        if self.speed_bonus_secs.is_nan() || self.speed_bonus_secs < 0.0 {
            return Err(ConfigError::Invalid("speed_bonus_secs must be non-negative".to_string()));
        }
        Ok(())
    }

    pub fn milestones(&self) -> Milestones {
        Milestones {
            catch_every: self.catch_every,
            evolve_every: self.evolve_every,
        }
    }

    pub fn catch_rules(&self) -> CatchRules {
        CatchRules {
            id_range: 1..=self.max_creature_id,
            retry_cap: self.catch_retry_cap,
        }
    }

    pub fn grader(&self) -> Grader {
        Grader::new(self.speed_bonus_secs)
    }

    pub fn correct_delay(&self) -> Duration {
        Duration::from_millis(self.correct_delay_ms)
    }

    pub fn incorrect_delay(&self) -> Duration {
        Duration::from_millis(self.incorrect_delay_ms)
    }
}

/// Platform locations for settings and saved progress
#[derive(Debug, Clone)]
pub struct Paths {
    pub settings_path: PathBuf,
    pub save_path: PathBuf,
}

impl Paths {
    /// Resolve per-user directories, falling back to the working directory
    /// when the platform has no home directory.
    pub fn resolve() -> Self {
        match ProjectDirs::from("dev", "pokemon-quiz", "PokemonQuiz") {
            Some(dirs) => Self {
                settings_path: dirs.config_dir().join(SETTINGS_FILE_NAME),
                save_path: dirs.data_local_dir().join(SAVE_FILE_NAME),
            },
            None => Self {
                settings_path: PathBuf::from(SETTINGS_FILE_NAME),
                save_path: PathBuf::from(SAVE_FILE_NAME),
            },
        }
    }

    /// Save path after applying the settings override
    pub fn save_path_for(&self, settings: &Settings) -> PathBuf {
        settings
            .save_path
            .clone()
            .unwrap_or_else(|| self.save_path.clone())
    }
}
