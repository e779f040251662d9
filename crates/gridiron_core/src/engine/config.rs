//! Rules Configuration
//!
//! Geometry and down/distance constants used by the classifier and the
//! tracker. Defaults follow the NFL rulebook. The Canadian preset only
//! changes downs and end-zone depth; field positions stay on a 100-yard model.
//!
//! ## Usage
//!
//! ```rust
//! use gridiron_core::engine::config::RulesConfig;
//!
//! let config = RulesConfig::default();
//! let canadian = RulesConfig::canadian();
//! assert_eq!(canadian.field_goal_offset(), 27);
//! # assert!(config.validate().is_ok() && canadian.validate().is_ok());
//! ```
//!
//! ## Environment Variables
//!
//! - `GRIDIRON_RULES_PATH`: JSON or YAML file with a full config
//! - `GRIDIRON_RULES_PROFILE`: Select preset (nfl, canadian, default)

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

pub const RULES_PATH_ENV: &str = "GRIDIRON_RULES_PATH";
pub const RULES_PROFILE_ENV: &str = "GRIDIRON_RULES_PROFILE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Yards needed for a new set of downs
    pub first_down_distance: u8,
    /// Downs in a series before the ball turns over
    pub max_downs: u8,
    /// Depth of the end zone, added to every field-goal distance
    pub end_zone_depth: u8,
    /// Distance of the hold behind the line of scrimmage
    pub snap_depth: u8,
    /// A punt downed at or inside this opponent yard line counts as inside the 20
    pub punt_inside_yard: u8,
    /// Own yard line where the receiving team takes over after a touchback
    pub touchback_yard: u8,
    /// Quarters in regulation
    pub regulation_quarters: u8,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            first_down_distance: 10,
            max_downs: 4,
            end_zone_depth: 10,
            snap_depth: 7,
            punt_inside_yard: 20,
            touchback_yard: 20,
            regulation_quarters: 4,
        }
    }
}

impl RulesConfig {
    pub fn nfl() -> Self {
        Self::default()
    }

    /// Canadian rules: three downs and 20-yard end zones.
    pub fn canadian() -> Self {
        Self { max_downs: 3, end_zone_depth: 20, ..Self::default() }
    }

    /// Constant added to the spot of the kick.
    pub fn field_goal_offset(&self) -> u16 {
        self.end_zone_depth as u16 + self.snap_depth as u16
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.first_down_distance == 0 || self.first_down_distance > 50 {
            return Err(ConfigError::Invalid(format!(
                "first_down_distance must be 1..=50, got {}",
                self.first_down_distance
            )));
        }
        if self.max_downs == 0 {
            return Err(ConfigError::Invalid("max_downs must be at least 1".to_string()));
        }
        if self.punt_inside_yard > 50 {
            return Err(ConfigError::Invalid(format!(
                "punt_inside_yard must be 0..=50, got {}",
                self.punt_inside_yard
            )));
        }
        if self.touchback_yard == 0 || self.touchback_yard > 50 {
            return Err(ConfigError::Invalid(format!(
                "touchback_yard must be 1..=50, got {}",
                self.touchback_yard
            )));
        }
        if self.regulation_quarters == 0 {
            return Err(ConfigError::Invalid(
                "regulation_quarters must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a file, picking the format from its extension (YAML unless `.json`).
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    pub fn from_profile(profile: &str) -> Self {
        match profile.to_lowercase().as_str() {
            "nfl" => Self::nfl(),
            "canadian" | "cfl" => Self::canadian(),
            _ => Self::default(),
        }
    }

    /// Config file from `GRIDIRON_RULES_PATH`, else the `GRIDIRON_RULES_PROFILE`
    /// preset, else defaults. A broken file falls back to defaults with a warning.
    pub fn from_env_or_default() -> Self {
        if let Ok(path) = env::var(RULES_PATH_ENV) {
            let path = path.trim();
            if !path.is_empty() {
                match Self::from_path(Path::new(path)) {
                    Ok(config) => return config,
                    Err(e) => warn!("ignoring {RULES_PATH_ENV}='{path}': {e}"),
                }
            }
        }
        Self::from_profile(&env::var(RULES_PROFILE_ENV).unwrap_or_default())
    }
}
