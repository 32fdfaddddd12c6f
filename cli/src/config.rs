//! Tool configuration for the `sage-yaml` binary.
//!
//! Loaded from a YAML file, `.sage-yaml.yml` in the working directory by
//! default. Every key is optional; command-line flags win over file values.
//!
//! ```yaml
//! strict: true
//! format: yaml
//! policy:
//!   required_meta: [name, version]
//!   allowed_catalog_types: [CSV]
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use sage_config_core::ValidationPolicy;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::output::OutputFormat;

/// Config file picked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = ".sage-yaml.yml";

/// Errors raised while loading a [`ToolConfig`] or policy file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be opened or read.
    #[error("failed to read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML for the expected type.
    #[error("invalid config '{}': {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Report unrecognized lines and fail on them.
    pub strict: bool,
    /// Output format for `parse`.
    pub format: OutputFormat,
    /// Acceptance rules for `validate`.
    pub policy: ValidationPolicy,
}

impl ToolConfig {
    /// Loads configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        read_yaml(path.as_ref())
    }

    /// Resolves the configuration for a run.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
    /// loaded when present and defaults are used otherwise.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Loads a standalone [`ValidationPolicy`] file, as passed to
/// `validate --policy`.
pub fn load_policy(path: impl AsRef<Path>) -> Result<ValidationPolicy, ConfigError> {
    read_yaml(path.as_ref())
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let file = File::open(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use sage_config_core::FileType;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = ToolConfig::default();
        assert!(!config.strict);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.policy, ValidationPolicy::default());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: ToolConfig = serde_yaml::from_str("strict: true\n").unwrap();
        assert!(config.strict);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.policy.required_meta.len(), 4);
    }

    #[test]
    fn test_load_full_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "format: yaml\npolicy:\n  required_meta: [name]\n  allowed_catalog_types: [CSV]\n"
        )
        .unwrap();

        let config = ToolConfig::load(file.path()).unwrap();
        assert_eq!(config.format, OutputFormat::Yaml);
        assert_eq!(config.policy.required_meta, ["name"]);
        assert_eq!(config.policy.allowed_catalog_types, [FileType::Csv]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ToolConfig::load("/nonexistent/.sage-yaml.yml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/.sage-yaml.yml"));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "strict: [not, a, bool]").unwrap();

        let err = ToolConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn test_load_policy_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "require_package_catalogs: false").unwrap();

        let policy = load_policy(file.path()).unwrap();
        assert!(!policy.require_package_catalogs);
        assert_eq!(policy.allowed_catalog_types, [FileType::Csv, FileType::Excel]);
    }

    #[test]
    fn test_resolve_explicit_path_must_exist() {
        assert!(ToolConfig::resolve(Some(Path::new("/nonexistent/config.yml"))).is_err());
    }
}
