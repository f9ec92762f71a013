// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// The format is picked from the file extension: `.toml` is parsed as TOML,
/// anything else as JSON. This only performs deserialization; it does **not**
/// check the leaf/group structure. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    debug!(path = ?path, toml = is_toml, "parsing config file");

    let config: RawConfigFile = if is_toml {
        toml::from_str(&contents)?
    } else {
        serde_json::from_str(&contents)?
    };

    Ok(config)
}

/// Load a configuration file from path and validate it.
///
/// - Reads JSON or TOML.
/// - Applies defaults (handled by `serde`).
/// - Checks that at least one process exists and that every spec is exactly
///   one of leaf or group with a valid group type.
///
/// Readiness patterns are *not* compiled here; a bad pattern is not fatal and
/// is reported on the node itself when the tree is built.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Default config location: `.sheepdog.json` in the current working
/// directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(".sheepdog.json")
}
