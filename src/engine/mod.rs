// src/engine/mod.rs

//! Supervision engine for sheepdog.
//!
//! This module ties together:
//! - the process forest and its selection/focus state ([`supervisor`])
//! - flattening the forest for navigation ([`traversal`])
//! - the async IO shell that turns tick requests into timers and feeds
//!   events back in ([`runtime`])
//!
//! The supervisor itself never awaits: it consumes one [`SupervisorEvent`]
//! at a time and answers with a [`SupervisorStep`] describing what the shell
//! should do next.

use std::time::Duration;

use crate::types::NodeId;

/// Delay between a tick request and the tick itself.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Operator commands coming from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    SelectNext,
    SelectPrevious,
    /// Expand/collapse the selected group, or open/close a leaf's detail view.
    ToggleFocus,
    RunSelected,
    KillSelected,
    /// Kill every process and request exit.
    Quit,
}

/// Events flowing into the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorEvent {
    /// Periodic wake-up of one node.
    Tick(NodeId),
    Command(UserCommand),
}

/// Command produced by the supervisor, to be executed by the outer IO shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorCommand {
    /// Deliver `SupervisorEvent::Tick(id)` after [`TICK_INTERVAL`].
    ScheduleTick(NodeId),
    /// The operator asked to quit.
    RequestExit,
}

/// Decision returned after handling a single event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupervisorStep {
    pub commands: Vec<SupervisorCommand>,
    /// Whether the outer loop should keep running normally.
    pub keep_running: bool,
}

impl SupervisorStep {
    pub(crate) fn ticks(ids: Vec<NodeId>) -> Self {
        Self {
            commands: ids.into_iter().map(SupervisorCommand::ScheduleTick).collect(),
            keep_running: true,
        }
    }

    /// Ids of the nodes this step asks to tick.
    pub fn scheduled_ticks(&self) -> Vec<NodeId> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                SupervisorCommand::ScheduleTick(id) => Some(*id),
                SupervisorCommand::RequestExit => None,
            })
            .collect()
    }
}

/// Runtime options for the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// Exit as soon as no process is running and no queue holds events
    /// (used for `--once`).
    pub exit_when_idle: bool,
}

pub mod runtime;
pub mod supervisor;
pub mod traversal;

pub use runtime::Runtime;
pub use supervisor::Supervisor;
pub use traversal::{VisibleNode, nth_visible, visible_nodes};
