// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from a JSON or TOML file.
///
/// ```json
/// {
///   "processes": [
///     { "name": "db", "command": ["postgres", "-D", "data"], "readyRegexp": "ready to accept" },
///     {
///       "name": "web",
///       "groupType": "sequential",
///       "children": [
///         { "name": "api", "command": ["cargo", "run"], "autorun": true },
///         { "name": "ui", "command": ["npm", "run", "dev"], "cwd": "ui" }
///       ]
///     }
///   ]
/// }
/// ```
///
/// This is the unvalidated shape; see [`ConfigFile`] for the checked one.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub processes: Vec<ProcessSpec>,
}

/// A validated configuration: every spec in the tree is either a leaf or a
/// group, and at least one process is defined.
///
/// Only constructible through `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    processes: Vec<ProcessSpec>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(processes: Vec<ProcessSpec>) -> Self {
        Self { processes }
    }

    pub fn processes(&self) -> &[ProcessSpec] {
        &self.processes
    }
}

/// Declarative description of one process or process group.
///
/// A spec is exactly one of:
/// - a leaf: non-empty `command`, no `children`;
/// - a group: `group_type` of `"sequential"` or `"parallel"` and at least one
///   child.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct ProcessSpec {
    pub name: String,

    /// Program followed by its arguments. Not run through a shell.
    #[serde(default)]
    pub command: Vec<String>,

    /// Start this node as soon as the supervisor initialises.
    #[serde(default)]
    pub autorun: bool,

    /// Working directory; relative paths are resolved against the
    /// supervisor's own working directory. Children of a group inherit the
    /// group's `cwd` when they don't set one.
    #[serde(default)]
    pub cwd: Option<String>,

    /// Regex tested against each output line (escape sequences removed).
    /// The first match promotes the process from `Running` to `Ready`.
    #[serde(default, alias = "readyRegexp", alias = "readyPattern")]
    pub ready_pattern: Option<String>,

    /// `"sequential"` or `"parallel"`; required for groups.
    #[serde(default, alias = "groupType")]
    pub group_type: Option<String>,

    #[serde(default)]
    pub children: Vec<ProcessSpec>,
}
