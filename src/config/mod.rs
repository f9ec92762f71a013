// src/config/mod.rs

//! Configuration loading and validation for sheepdog.
//!
//! Responsibilities:
//! - Define the serde-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate the leaf/group structure of the spec tree (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ConfigFile, ProcessSpec, RawConfigFile};
pub use validate::{SpecShape, validate_spec, validate_specs};
