// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** check durations
/// or counts. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
///
/// A missing file at the default location is not an error: the defaults are
/// used instead, so the demo runs without any config at all.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let raw_config = if path == default_config_path().as_path() && !path.exists() {
        RawConfigFile::default()
    } else {
        load_from_path(path)?
    };
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// `CommandRunner.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("CommandRunner.toml")
}
