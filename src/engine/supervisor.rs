// src/engine/supervisor.rs

//! The supervisor: owner of the process forest.
//!
//! Single consumer of every leaf's queues. It holds no channels and spawns
//! no timers itself; tick scheduling is delegated to the caller through
//! [`SupervisorCommand::ScheduleTick`].

use tracing::{debug, info};

use crate::config::{ConfigFile, ProcessSpec};
use crate::engine::traversal::{self, VisibleNode};
use crate::engine::{SupervisorCommand, SupervisorEvent, SupervisorStep, UserCommand};
use crate::errors::Result;
use crate::process::ProcessNode;
use crate::types::{LogEntry, NodeId, Status};

#[derive(Debug)]
pub struct Supervisor {
    nodes: Vec<ProcessNode>,
    /// Position of the selection in the visible list.
    selected_index: usize,
    selected: Option<NodeId>,
}

impl Supervisor {
    /// Build the forest from specs. Structural spec errors are fatal.
    pub fn new(specs: &[ProcessSpec]) -> Result<Self> {
        let nodes = specs
            .iter()
            .map(ProcessNode::from_spec)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_nodes(nodes))
    }

    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        Self::new(cfg.processes())
    }

    pub fn from_nodes(nodes: Vec<ProcessNode>) -> Self {
        let selected = nodes.first().map(ProcessNode::id);
        Self {
            nodes,
            selected_index: 0,
            selected,
        }
    }

    pub fn nodes(&self) -> &[ProcessNode] {
        &self.nodes
    }

    /// Select the first node and start every autorun node.
    pub fn init(&mut self) -> SupervisorStep {
        self.selected_index = 0;
        self.selected = self.nodes.first().map(ProcessNode::id);

        let ticks: Vec<NodeId> = self.nodes.iter_mut().flat_map(ProcessNode::init).collect();
        info!(nodes = self.nodes.len(), started = ticks.len(), "supervisor initialised");
        SupervisorStep::ticks(ticks)
    }

    /// Handle a single event.
    pub fn update(&mut self, event: SupervisorEvent) -> SupervisorStep {
        match event {
            SupervisorEvent::Tick(id) => self.tick(id),
            SupervisorEvent::Command(command) => self.handle_command(command),
        }
    }

    fn tick(&mut self, id: NodeId) -> SupervisorStep {
        match self.find_mut(id) {
            Some(node) => SupervisorStep::ticks(node.tick()),
            None => {
                debug!(%id, "tick for unknown node ignored");
                SupervisorStep::ticks(Vec::new())
            }
        }
    }

    fn handle_command(&mut self, command: UserCommand) -> SupervisorStep {
        debug!(?command, "handling command");
        match command {
            UserCommand::SelectNext => {
                self.move_selection(1);
                SupervisorStep::ticks(Vec::new())
            }
            UserCommand::SelectPrevious => {
                self.move_selection(-1);
                SupervisorStep::ticks(Vec::new())
            }
            UserCommand::ToggleFocus => {
                if let Some(node) = self.selected_mut() {
                    let focused = !node.is_focused();
                    node.set_focused(focused);
                }
                SupervisorStep::ticks(Vec::new())
            }
            UserCommand::RunSelected => {
                let ticks = self.selected_mut().map(ProcessNode::run).unwrap_or_default();
                SupervisorStep::ticks(ticks)
            }
            UserCommand::KillSelected => {
                if let Some(node) = self.selected_mut() {
                    node.kill();
                }
                SupervisorStep::ticks(Vec::new())
            }
            UserCommand::Quit => {
                self.kill_all();
                SupervisorStep {
                    commands: vec![SupervisorCommand::RequestExit],
                    keep_running: false,
                }
            }
        }
    }

    /// Move the selection by `delta` over the visible list. Blocked while a
    /// leaf's detail view is open; clamped at both ends.
    fn move_selection(&mut self, delta: isize) {
        if let Some(node) = self.selected() {
            if !node.is_group() && node.is_focused() {
                return;
            }
        }

        let Some(target) = self.selected_index.checked_add_signed(delta) else {
            return;
        };
        if let Some(node) = self.nth_visible(target, false) {
            self.selected = Some(node.id());
            self.selected_index = target;
        }
    }

    /// Cancel every leaf in the forest.
    pub fn kill_all(&mut self) {
        info!("killing all processes");
        for node in &mut self.nodes {
            node.kill();
        }
    }

    pub fn selected(&self) -> Option<&ProcessNode> {
        self.selected.and_then(|id| self.node(id))
    }

    fn selected_mut(&mut self) -> Option<&mut ProcessNode> {
        let id = self.selected?;
        self.find_mut(id)
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn node(&self, id: NodeId) -> Option<&ProcessNode> {
        self.nodes.iter().find_map(|n| n.find(id))
    }

    fn find_mut(&mut self, id: NodeId) -> Option<&mut ProcessNode> {
        self.nodes.iter_mut().find_map(|n| n.find_mut(id))
    }

    /// First node (depth first) with the given name.
    pub fn node_by_name(&self, name: &str) -> Option<&ProcessNode> {
        fn search<'a>(nodes: &'a [ProcessNode], name: &str) -> Option<&'a ProcessNode> {
            nodes.iter().find_map(|n| {
                if n.name() == name {
                    Some(n)
                } else {
                    search(n.children(), name)
                }
            })
        }
        search(&self.nodes, name)
    }

    pub fn status(&self, id: NodeId) -> Option<Status> {
        self.node(id).map(ProcessNode::status)
    }

    pub fn log(&self, id: NodeId) -> Option<&[LogEntry]> {
        self.node(id).map(ProcessNode::log)
    }

    pub fn visible_nodes(&self, expanded: impl Fn(&ProcessNode) -> bool) -> Vec<VisibleNode<'_>> {
        traversal::visible_nodes(&self.nodes, &expanded)
    }

    pub fn nth_visible(&self, n: usize, include_hidden: bool) -> Option<&ProcessNode> {
        traversal::nth_visible(&self.nodes, n, include_hidden)
    }

    /// Nothing is running and no queue holds undrained events.
    pub fn is_quiescent(&self) -> bool {
        self.nodes
            .iter()
            .all(|n| !n.status().is_active() && !n.has_pending())
    }

    /// Release OS-level resources held by every node.
    pub fn clean_up(&mut self) {
        debug!("cleaning up process handles");
        for node in &mut self.nodes {
            node.clean_up();
        }
    }
}
