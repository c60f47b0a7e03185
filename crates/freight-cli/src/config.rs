//! # CLI Configuration
//!
//! Optional YAML file, resolved in order:
//!
//! 1. `--config <path>` (must exist),
//! 2. `freight.yaml` in the current directory, if present,
//! 3. built-in defaults.
//!
//! ```yaml
//! state_dir: .freight/shipments
//! fallback: strict        # or `legacy`
//! format: text
//! ```
//!
//! Command-line flags override values read from the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use freight_workflow::{FallbackPolicy, WorkflowEngine};

/// File name probed in the current directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "freight.yaml";

/// Output format for query and status commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Resolved CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Directory holding one `<shipment-id>.json` file per shipment.
    pub state_dir: PathBuf,
    /// How `workflow phase-of` treats unknown statuses.
    pub fallback: FallbackPolicy,
    /// Default output format.
    pub format: OutputFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from(".freight").join("shipments"),
            fallback: FallbackPolicy::Strict,
            format: OutputFormat::Text,
        }
    }
}

impl CliConfig {
    /// Load the configuration, see the module docs for resolution order.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let probe = Path::new(DEFAULT_CONFIG_FILE);
                if probe.is_file() {
                    Self::from_file(probe)
                } else {
                    tracing::debug!("no {DEFAULT_CONFIG_FILE} found; using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse a YAML configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: CliConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config file: {}", path.display()))?;
        tracing::debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    /// Workflow engine with the configured fallback policy.
    pub fn engine(&self) -> WorkflowEngine {
        WorkflowEngine::new(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();
        assert_eq!(config.state_dir, PathBuf::from(".freight/shipments"));
        assert_eq!(config.fallback, FallbackPolicy::Strict);
        assert_eq!(config.format, OutputFormat::Text);
        assert_eq!(config.engine().policy(), FallbackPolicy::Strict);
    }

    #[test]
    fn test_from_file_partial_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("freight.yaml");
        std::fs::write(&path, "fallback: legacy\n").unwrap();

        let config = CliConfig::from_file(&path).unwrap();
        assert_eq!(config.fallback, FallbackPolicy::Legacy);
        assert_eq!(config.state_dir, CliConfig::default().state_dir);
        assert_eq!(config.engine().policy(), FallbackPolicy::Legacy);
    }

    #[test]
    fn test_from_file_full() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.yaml");
        std::fs::write(
            &path,
            "state_dir: /var/lib/freight\nfallback: strict\nformat: json\n",
        )
        .unwrap();

        let config = CliConfig::from_file(&path).unwrap();
        assert_eq!(config.state_dir, PathBuf::from("/var/lib/freight"));
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.yaml");
        std::fs::write(&path, "statedir: oops\n").unwrap();
        assert!(CliConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_unknown_fallback_policy_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.yaml");
        std::fs::write(&path, "fallback: lenient\n").unwrap();
        assert!(CliConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_round_trips_through_yaml() {
        let config = CliConfig {
            fallback: FallbackPolicy::Legacy,
            format: OutputFormat::Json,
            ..CliConfig::default()
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("fallback: legacy"));
        let parsed: CliConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        let err = CliConfig::load(Some(&missing)).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read config file"));
    }
}
