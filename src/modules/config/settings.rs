use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::modules::store::ModelError;
use crate::DEFAULT_PASSWORD_ITERATIONS;

/// Process-wide settings for the password hasher and logging.
///
/// Nothing reads them implicitly; pass them to `configure_password_hasher`
/// and `initialize_logging` at startup.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub password_iterations: u32,  // PBKDF2 rounds for newly hashed passwords
    pub log_level: String,         // env_logger filter directives, e.g. "info,modelkit=debug"
    pub log_file: Option<String>,  // Append-mode log file; stderr when absent
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            password_iterations: DEFAULT_PASSWORD_ITERATIONS,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, then apply environment overrides
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let mut data = String::new();
        File::open(path)
            .and_then(|mut file| file.read_to_string(&mut data))
            .map_err(|e| {
                ModelError::Configuration(format!("Failed to read {}: {}", path.display(), e))
            })?;

        let mut settings: Settings = serde_json::from_str(&data).map_err(|e| {
            ModelError::Configuration(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        settings.apply_env_overrides()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Like `load`, but a missing file yields the defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ModelError> {
        match std::fs::metadata(path) {
            Ok(_) => Self::load(path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let mut settings = Self::default();
                settings.apply_env_overrides()?;
                settings.validate()?;
                Ok(settings)
            }
            Err(e) => Err(ModelError::Configuration(format!(
                "Failed to stat {}: {}",
                path.display(),
                e
            ))),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let data = serde_json::to_string_pretty(self)?;
        File::create(path)
            .and_then(|mut file| file.write_all(data.as_bytes()))
            .map_err(|e| {
                ModelError::Configuration(format!("Failed to write {}: {}", path.display(), e))
            })
    }

    /// MODELKIT_PASSWORD_ITERATIONS and MODELKIT_LOG take precedence over the file
    pub fn apply_env_overrides(&mut self) -> Result<(), ModelError> {
        if let Ok(raw) = std::env::var("MODELKIT_PASSWORD_ITERATIONS") {
            self.password_iterations = raw.trim().parse().map_err(|_| {
                ModelError::Configuration(format!(
                    "MODELKIT_PASSWORD_ITERATIONS is not a number: {}",
                    raw
                ))
            })?;
        }
        if let Ok(level) = std::env::var("MODELKIT_LOG") {
            self.log_level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.password_iterations == 0 {
            return Err(ModelError::Configuration(
                "password_iterations must be at least 1".to_string(),
            ));
        }
        if self.log_level.trim().is_empty() {
            return Err(ModelError::Configuration(
                "log_level must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
