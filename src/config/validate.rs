// src/config/validate.rs

use tracing::warn;

use crate::config::model::{ConfigFile, ProcessSpec, RawConfigFile};
use crate::errors::{Result, SheepdogError};
use crate::types::GroupKind;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = SheepdogError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_processes(&raw)?;
        validate_specs(&raw.processes)?;
        Ok(ConfigFile::new_unchecked(raw.processes))
    }
}

/// What a single spec turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecShape {
    Leaf,
    Group(GroupKind),
}

/// Validate a whole spec forest, recursing into groups.
pub fn validate_specs(specs: &[ProcessSpec]) -> Result<()> {
    for spec in specs {
        if let SpecShape::Group(_) = validate_spec(spec)? {
            validate_specs(&spec.children)?;
        }
    }
    Ok(())
}

/// Classify one spec (children are not visited).
///
/// Fails when the spec is both a command and a group, neither, or a group
/// without a valid `group_type`.
pub fn validate_spec(spec: &ProcessSpec) -> Result<SpecShape> {
    let has_command = !spec.command.is_empty();
    let has_children = !spec.children.is_empty();

    match (has_command, has_children) {
        (true, true) => Err(SheepdogError::ConfigError(format!(
            "process '{}' is configured as both a command and a group",
            spec.name
        ))),
        (false, false) => Err(SheepdogError::ConfigError(format!(
            "process '{}' is configured as neither a command nor a group",
            spec.name
        ))),
        (true, false) => {
            if spec.group_type.is_some() {
                warn!(
                    process = %spec.name,
                    "group_type set on a process without children; ignoring"
                );
            }
            Ok(SpecShape::Leaf)
        }
        (false, true) => {
            let raw = spec.group_type.as_deref().ok_or_else(|| {
                SheepdogError::ConfigError(format!(
                    "group '{}' has children but no group_type",
                    spec.name
                ))
            })?;
            let kind = raw.parse::<GroupKind>().map_err(|e| {
                SheepdogError::ConfigError(format!("group '{}': {}", spec.name, e))
            })?;
            Ok(SpecShape::Group(kind))
        }
    }
}

fn ensure_has_processes(cfg: &RawConfigFile) -> Result<()> {
    if cfg.processes.is_empty() {
        return Err(SheepdogError::ConfigError(
            "config must define at least one process".to_string(),
        ));
    }
    Ok(())
}
