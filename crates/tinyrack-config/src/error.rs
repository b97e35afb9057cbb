//! Configuration errors and the TOML file helpers that produce them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::validation::ValidationError;

/// Anything that can go wrong between a config file and a running engine.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A boot or performance file could not be read.
    #[error("cannot read '{}': {source}", path.display())]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// OS error.
        #[source]
        source: io::Error,
    },

    /// A file, or the directory it goes in, could not be written.
    #[error("cannot write '{}': {source}", path.display())]
    Write {
        /// File or directory that was being written.
        path: PathBuf,
        /// OS error.
        #[source]
        source: io::Error,
    },

    /// The file is not valid TOML or does not match the schema.
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The value could not be encoded as TOML.
    #[error("cannot encode TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A chain names an effect type that does not exist.
    #[error("unknown effect type: {0}")]
    UnknownEffect(String),

    /// The configuration parsed but breaks an engine limit.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl ConfigError {
    /// Read failure on `path`.
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Write failure on `path`.
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

pub(crate) fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
    Ok(toml::from_str(&text)?)
}

/// Writes `value` as pretty TOML. Missing parent directories are created.
pub(crate) fn save_toml<T: Serialize>(value: &T, path: &Path) -> Result<(), ConfigError> {
    let text = toml::to_string_pretty(value)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| ConfigError::write(dir, e))?;
    }
    fs::write(path, text).map_err(|e| ConfigError::write(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn denied() -> io::Error {
        io::Error::new(io::ErrorKind::PermissionDenied, "denied")
    }

    #[test]
    fn io_errors_name_the_path() {
        let msg = ConfigError::read("/etc/tinyrack/boot.toml", denied()).to_string();
        assert_eq!(msg, "cannot read '/etc/tinyrack/boot.toml': denied");

        let err = ConfigError::write("perf/a.toml", denied());
        assert!(matches!(err, ConfigError::Write { ref path, .. } if path == Path::new("perf/a.toml")));
        assert!(err.source().is_some());
    }

    #[test]
    fn parse_errors_convert() {
        let err: ConfigError = toml::from_str::<toml::Table>("= nope").unwrap_err().into();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("invalid TOML"));
    }

    #[test]
    fn unknown_effect_has_no_source() {
        let err = ConfigError::UnknownEffect("wah".into());
        assert_eq!(err.to_string(), "unknown effect type: wah");
        assert!(err.source().is_none());
    }

    #[test]
    fn save_then_load_through_new_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/c.toml");
        let mut table = toml::Table::new();
        table.insert("cores".into(), toml::Value::Integer(2));

        save_toml(&table, &path).unwrap();
        let back: toml::Table = load_toml(&path).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_toml::<toml::Table>(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
