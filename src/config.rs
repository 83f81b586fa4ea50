//! Configuration management

use std::collections::HashMap;
use std::path::Path;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Per-migrator operational settings, an escape hatch that lets an
/// operator disable a single migrator without touching the binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MigratorSettings {
    /// Whether this migrator runs at all
    pub enabled: bool,
}

impl Default for MigratorSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Top-level settings for the migration engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Source schema version, e.g. `"v4"`
    pub source_version: String,
    /// Target schema version, e.g. `"v5"`
    pub target_version: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log format (text, json)
    pub log_format: String,
    /// Per-resource-type migrator toggles, keyed by old resource type
    pub migrators: HashMap<String, MigratorSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_version: "v4".to_string(),
            target_version: "v5".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            migrators: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load settings from an optional YAML file merged with
    /// `SCHEMA_MIGRATE_`-prefixed environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a given config path does not exist or the merged
    /// configuration cannot be deserialized.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();

        if let Some(p) = path {
            if !p.exists() {
                return Err(Error::Config(format!("Config file not found: {}", p.display())));
            }
            figment = figment.merge(Yaml::file(p));
        }

        figment = figment.merge(Env::prefixed("SCHEMA_MIGRATE_").split("__"));

        figment.extract().map_err(|e| Error::Config(e.to_string()))
    }

    /// Whether the named migrator (keyed by old resource type) is enabled.
    /// Defaults to enabled when not mentioned in configuration.
    #[must_use]
    pub fn migrator_enabled(&self, resource_type: &str) -> bool {
        self.migrators.get(resource_type).is_none_or(|m| m.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_v4_to_v5() {
        let settings = Settings::default();
        assert_eq!(settings.source_version, "v4");
        assert_eq!(settings.target_version, "v5");
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = Settings::load(Some(Path::new("/nonexistent/schema-migrate.yaml")));
        assert!(err.is_err());
    }

    #[test]
    fn migrator_enabled_defaults_true_when_unmentioned() {
        let settings = Settings::default();
        assert!(settings.migrator_enabled("cloudflare_record"));
    }

    #[test]
    fn migrator_enabled_respects_explicit_toggle() {
        let mut settings = Settings::default();
        settings
            .migrators
            .insert("cloudflare_record".to_string(), MigratorSettings { enabled: false });
        assert!(!settings.migrator_enabled("cloudflare_record"));
    }
}
