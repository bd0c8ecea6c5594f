//! Generic configuration loading. Each component crate defines its own
//! `*Config` struct (deserialized by [`load_toml`]); `app` composes them into
//! one top-level file.

use crate::error::{Classify, ErrorKind};
use serde::de::DeserializeOwned;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("missing required credential: {0}")]
    MissingCredential(String),
}

impl Classify for ConfigError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::StorageError
    }
}

/// Loads and deserializes a TOML config file.
///
/// On any failure the process should exit non-zero; this function only
/// reports the error, the exit code is `app`'s responsibility.
pub fn load_toml<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let path_ref = path.as_ref();
    let path_str = path_ref.display().to_string();

    let raw = std::fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
        path: path_str.clone(),
        source,
    })?;

    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path_str,
        source,
    })
}

/// Reads a required environment variable, surfacing a [`ConfigError`] rather
/// than panicking when it is absent — credentials must not silently become
/// empty strings.
pub fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingCredential(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn load_toml_parses_a_well_formed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "name = \"prism\"\ncount = 3\n").unwrap();
        let sample: Sample = load_toml(file.path()).unwrap();
        assert_eq!(sample, Sample { name: "prism".to_string(), count: 3 });
    }

    #[test]
    fn load_toml_reports_a_missing_file() {
        let err = load_toml::<Sample>("/nonexistent/path/config.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_toml_reports_malformed_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not valid toml {{{{").unwrap();
        let err = load_toml::<Sample>(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn required_env_surfaces_a_missing_credential() {
        let err = required_env("PRISM_CORE_CONFIG_TEST_DOES_NOT_EXIST").unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential(_)));
    }
}
