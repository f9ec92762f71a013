// src/process/node.rs

//! A node of the process tree: either a leaf command or a group.

use tracing::debug;

use crate::config::{ProcessSpec, SpecShape, validate_spec};
use crate::errors::Result;
use crate::process::group::ProcessGroup;
use crate::process::leaf::LeafProcess;
use crate::types::{GroupKind, LogEntry, NodeId, Status};

#[derive(Debug)]
pub enum NodeKind {
    Leaf(LeafProcess),
    Group(ProcessGroup),
}

#[derive(Debug)]
pub struct ProcessNode {
    id: NodeId,
    name: String,
    autorun: bool,
    /// Expanded (groups) or detail view open (leaves).
    focused: bool,
    /// A tick for this node has been handed out and not delivered yet.
    tick_armed: bool,
    kind: NodeKind,
}

impl ProcessNode {
    /// Build a node (recursively) from a spec.
    ///
    /// Structural errors (leaf and group at once, neither, bad group type)
    /// are fatal; a bad readiness pattern is only logged on the leaf.
    pub fn from_spec(spec: &ProcessSpec) -> Result<Self> {
        Self::from_spec_with_parent_cwd(spec, None)
    }

    fn from_spec_with_parent_cwd(spec: &ProcessSpec, parent_cwd: Option<&str>) -> Result<Self> {
        // A child without its own cwd runs where its group runs.
        let cwd = match spec.cwd.as_deref() {
            Some(dir) if !dir.is_empty() => Some(dir.to_string()),
            _ => parent_cwd.map(str::to_string),
        };

        let node = match validate_spec(spec)? {
            SpecShape::Leaf => Self::leaf(
                &spec.name,
                spec.command.clone(),
                cwd,
                spec.ready_pattern.as_deref(),
            ),
            SpecShape::Group(kind) => {
                let children = spec
                    .children
                    .iter()
                    .map(|child| Self::from_spec_with_parent_cwd(child, cwd.as_deref()))
                    .collect::<Result<Vec<_>>>()?;
                Self::group(&spec.name, kind, children)
            }
        };

        debug!(process = %spec.name, id = %node.id, group = node.is_group(), "built process node");
        Ok(node.with_autorun(spec.autorun))
    }

    pub fn leaf(
        name: &str,
        command: Vec<String>,
        cwd: Option<String>,
        ready_pattern: Option<&str>,
    ) -> Self {
        Self {
            id: NodeId::new(),
            name: name.to_string(),
            autorun: false,
            focused: false,
            tick_armed: false,
            kind: NodeKind::Leaf(LeafProcess::new(name, command, cwd, ready_pattern)),
        }
    }

    pub fn group(name: &str, kind: GroupKind, children: Vec<ProcessNode>) -> Self {
        Self {
            id: NodeId::new(),
            name: name.to_string(),
            autorun: false,
            focused: false,
            tick_armed: false,
            kind: NodeKind::Group(ProcessGroup::new(kind, children)),
        }
    }

    pub fn with_autorun(mut self, autorun: bool) -> Self {
        self.autorun = autorun;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn autorun(&self) -> bool {
        self.autorun
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group(_))
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn as_leaf(&self) -> Option<&LeafProcess> {
        match &self.kind {
            NodeKind::Leaf(leaf) => Some(leaf),
            NodeKind::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&ProcessGroup> {
        match &self.kind {
            NodeKind::Group(group) => Some(group),
            NodeKind::Leaf(_) => None,
        }
    }

    pub fn children(&self) -> &[ProcessNode] {
        match &self.kind {
            NodeKind::Group(group) => group.children(),
            NodeKind::Leaf(_) => &[],
        }
    }

    pub fn status(&self) -> Status {
        match &self.kind {
            NodeKind::Leaf(leaf) => leaf.status(),
            NodeKind::Group(group) => group.status(),
        }
    }

    /// Durable log of a leaf; groups have none.
    pub fn log(&self) -> &[LogEntry] {
        match &self.kind {
            NodeKind::Leaf(leaf) => leaf.log(),
            NodeKind::Group(_) => &[],
        }
    }

    /// Start autorun nodes; non-autorun groups pass the call to their
    /// children. Returns the nodes that want ticks.
    pub fn init(&mut self) -> Vec<NodeId> {
        if self.autorun {
            return self.run();
        }
        match &mut self.kind {
            NodeKind::Leaf(_) => Vec::new(),
            NodeKind::Group(group) => group
                .children_mut()
                .iter_mut()
                .flat_map(ProcessNode::init)
                .collect(),
        }
    }

    /// Start this node; returns the nodes that want ticks.
    ///
    /// A node whose tick is still pending is not handed out again, so each
    /// node has at most one tick in flight no matter how often it is run.
    pub fn run(&mut self) -> Vec<NodeId> {
        let (mut ticks, wants_tick) = match &mut self.kind {
            NodeKind::Leaf(leaf) => (Vec::new(), leaf.run(&self.name)),
            NodeKind::Group(group) => {
                let ticks = group.run(&self.name);
                let wants_tick = !ticks.is_empty() || group.status().is_active();
                (ticks, wants_tick)
            }
        };

        if wants_tick {
            self.arm_tick(&mut ticks);
        }
        ticks
    }

    fn arm_tick(&mut self, ticks: &mut Vec<NodeId>) {
        if !self.tick_armed {
            self.tick_armed = true;
            ticks.push(self.id);
        }
    }

    /// Kill every running leaf at or below this node.
    pub fn kill(&mut self) {
        match &mut self.kind {
            NodeKind::Leaf(leaf) => leaf.kill(&self.name),
            NodeKind::Group(group) => group.kill(),
        }
    }

    /// Drain queued events of this node and all of its descendants.
    pub fn drain(&mut self) {
        match &mut self.kind {
            NodeKind::Leaf(leaf) => leaf.drain(&self.name),
            NodeKind::Group(group) => group.drain(),
        }
    }

    pub fn has_pending(&self) -> bool {
        match &self.kind {
            NodeKind::Leaf(leaf) => leaf.has_pending(),
            NodeKind::Group(group) => group.has_pending(),
        }
    }

    /// Handle this node's periodic tick.
    ///
    /// Drains queues (groups drain their whole subtree), lets sequential
    /// groups start their next child, and re-arms the tick only while
    /// something is still pending or the node is `Running`/`Ready`.
    /// Returns the nodes that want ticks.
    pub fn tick(&mut self) -> Vec<NodeId> {
        self.tick_armed = false;
        self.drain();

        let mut ticks = match &mut self.kind {
            NodeKind::Leaf(_) => Vec::new(),
            NodeKind::Group(group) => group.advance(&self.name),
        };

        if self.has_pending() || self.status().is_active() {
            self.arm_tick(&mut ticks);
        }
        ticks
    }

    pub fn clean_up(&mut self) {
        match &mut self.kind {
            NodeKind::Leaf(leaf) => leaf.clean_up(&self.name),
            NodeKind::Group(group) => group.clean_up(),
        }
    }

    /// Depth-first search for a node by id (including `self`).
    pub fn find(&self, id: NodeId) -> Option<&ProcessNode> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut ProcessNode> {
        if self.id == id {
            return Some(self);
        }
        match &mut self.kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Group(group) => group
                .children_mut()
                .iter_mut()
                .find_map(|child| child.find_mut(id)),
        }
    }

    /// Visit every leaf at or below this node, depth first.
    pub fn for_each_leaf<'a>(&'a self, f: &mut impl FnMut(&'a ProcessNode, &'a LeafProcess)) {
        match &self.kind {
            NodeKind::Leaf(leaf) => f(self, leaf),
            NodeKind::Group(group) => {
                for child in group.children() {
                    child.for_each_leaf(f);
                }
            }
        }
    }
}
