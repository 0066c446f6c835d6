//! Engine configuration.
//!
//! Provides the fighter picks, simulation rate and file locations for a bout.
//! Configuration can be loaded from and saved to a TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use openhouse_common::{ArchetypeId, OpenHouseError, OpenHouseResult};

/// Configuration file name.
const CONFIG_FILE: &str = "openhouse.toml";

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenHouseConfig {
    // === Fighters ===
    /// Archetype id for player one
    pub left_archetype: u8,
    /// Archetype id for player two
    pub right_archetype: u8,

    // === Simulation ===
    /// Ticks per second
    pub tick_rate: f64,
    /// Hard limit on frames per bout
    pub max_ticks: u64,

    // === Files ===
    /// RON archetype tuning table (None = built-in table)
    pub tuning_path: Option<PathBuf>,
    /// RON bout script (None = idle bout)
    pub script_path: Option<PathBuf>,

    // === Diagnostics ===
    /// Tracing filter directive, e.g. `openhouse=debug`
    pub log_filter: String,
    /// Print the JSON bout summary on exit
    pub emit_summary: bool,
}

impl Default for OpenHouseConfig {
    fn default() -> Self {
        Self {
            left_archetype: ArchetypeId::HAND_FIGHTER.raw(),
            right_archetype: ArchetypeId::OG_RIGHT.raw(),

            tick_rate: 60.0,
            max_ticks: 60 * 60 * 3, // three minutes

            tuning_path: None,
            script_path: None,

            log_filter: "openhouse=info".to_string(),
            emit_summary: true,
        }
    }
}

impl OpenHouseConfig {
    /// Load configuration from the default file location.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read config file: {e}");
                return Self::default();
            },
        };

        match toml::from_str::<Self>(&contents) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config.sanitized()
            },
            Err(e) => {
                warn!("Failed to parse config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to the default file location.
    pub fn save(&self) -> io::Result<()> {
        self.save_to(Self::config_path())
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Archetype picks as ids.
    pub const fn archetypes(&self) -> (ArchetypeId, ArchetypeId) {
        (
            ArchetypeId::new(self.left_archetype),
            ArchetypeId::new(self.right_archetype),
        )
    }

    /// Checks the simulation settings.
    pub fn validate(&self) -> OpenHouseResult<()> {
        if !(self.tick_rate.is_finite() && self.tick_rate > 0.0) {
            return Err(OpenHouseError::Config(format!(
                "tick_rate must be a positive number, got {}",
                self.tick_rate
            )));
        }
        if self.max_ticks == 0 {
            return Err(OpenHouseError::Config("max_ticks must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Replaces out-of-range simulation values with defaults.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.tick_rate.is_finite() && self.tick_rate > 0.0) {
            warn!("Invalid tick_rate {}, using {}", self.tick_rate, defaults.tick_rate);
            self.tick_rate = defaults.tick_rate;
        }
        if self.max_ticks == 0 {
            warn!("max_ticks of 0, using {}", defaults.max_ticks);
            self.max_ticks = defaults.max_ticks;
        }
        self
    }

    /// Get the default configuration file path.
    fn config_path() -> PathBuf {
        PathBuf::from(CONFIG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OpenHouseConfig::default();
        assert_eq!(config.tick_rate, 60.0);
        assert_eq!(config.archetypes().0, ArchetypeId::HAND_FIGHTER);
        assert!(config.tuning_path.is_none());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = OpenHouseConfig::load_from("/nonexistent/openhouse.toml");
        assert_eq!(config, OpenHouseConfig::default());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: OpenHouseConfig = toml::from_str("left_archetype = 3\n").unwrap();
        assert_eq!(config.left_archetype, 3);
        assert_eq!(config.max_ticks, OpenHouseConfig::default().max_ticks);
    }

    #[test]
    fn test_sanitize_bad_rate() {
        let config = OpenHouseConfig {
            tick_rate: -5.0,
            max_ticks: 0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config.tick_rate, 60.0);
        assert!(config.max_ticks > 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_config_error() {
        let config = OpenHouseConfig {
            tick_rate: f64::NAN,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, OpenHouseError::Config(_)));
        assert!(err.to_string().contains("tick_rate"));

        let config = OpenHouseConfig {
            max_ticks: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(OpenHouseError::Config(_))));
    }
}
