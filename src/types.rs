use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

/// Stable identity of a node in the process tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        NodeId(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle status of a process node.
///
/// The declaration order is the aggregation order used for groups:
/// `Idle < Exited < Ready < Running < Errored`. A group reports the maximum
/// status of its children, so a group with one child still waiting for its
/// readiness pattern shows as `Running` even if its siblings are `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    Idle,
    Exited,
    Ready,
    Running,
    Errored,
}

impl Status {
    /// `Running` or `Ready`: an OS process is (or should be) alive.
    pub fn is_active(self) -> bool {
        matches!(self, Status::Running | Status::Ready)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Idle => "idle",
            Status::Exited => "exited",
            Status::Ready => "ready",
            Status::Running => "running",
            Status::Errored => "errored",
        };
        f.write_str(s)
    }
}

/// Severity of a log entry. Stdout lines are `Info`, stderr lines `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

/// One line of a process's durable log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub message: String,
    pub level: LogLevel,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: LogLevel::Info,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: LogLevel::Error,
        }
    }
}

/// How a group starts its children.
///
/// - `Parallel`: every child is started in the same call.
/// - `Sequential`: children are started one at a time; the next child only
///   starts once the previous one reports `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Sequential,
    Parallel,
}

impl FromStr for GroupKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sequential" => Ok(GroupKind::Sequential),
            "parallel" => Ok(GroupKind::Parallel),
            other => Err(format!(
                "invalid group type: {other} (expected \"sequential\" or \"parallel\")"
            )),
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKind::Sequential => f.write_str("sequential"),
            GroupKind::Parallel => f.write_str("parallel"),
        }
    }
}
