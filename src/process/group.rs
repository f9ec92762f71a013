// src/process/group.rs

//! Composite node: ordered children started in parallel or one at a time.

use tracing::{debug, info};

use crate::process::node::ProcessNode;
use crate::types::{GroupKind, NodeId, Status};

#[derive(Debug)]
pub struct ProcessGroup {
    kind: GroupKind,
    children: Vec<ProcessNode>,
    /// Child currently being started (sequential groups only). `None` until
    /// the group runs, and again once it is killed.
    starting: Option<usize>,
}

impl ProcessGroup {
    pub fn new(kind: GroupKind, children: Vec<ProcessNode>) -> Self {
        Self {
            kind,
            children,
            starting: None,
        }
    }

    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    pub fn children(&self) -> &[ProcessNode] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut [ProcessNode] {
        &mut self.children
    }

    /// Index of the child a sequential group is currently starting, if a
    /// sequence is in progress.
    pub fn starting_index(&self) -> Option<usize> {
        self.starting
    }

    /// Maximum child status under `Idle < Exited < Ready < Running < Errored`;
    /// `Idle` without children. Recomputed on every call.
    pub fn status(&self) -> Status {
        self.children
            .iter()
            .map(ProcessNode::status)
            .max()
            .unwrap_or(Status::Idle)
    }

    /// Start the group; returns the nodes that want ticks.
    ///
    /// - `Parallel`: every child is started now.
    /// - `Sequential`: only the first child is started; later children are
    ///   started by [`ProcessGroup::advance`] as their predecessor becomes
    ///   `Ready`.
    pub fn run(&mut self, name: &str) -> Vec<NodeId> {
        match self.kind {
            GroupKind::Parallel => {
                info!(group = %name, children = self.children.len(), "starting all children");
                self.children.iter_mut().flat_map(ProcessNode::run).collect()
            }
            GroupKind::Sequential => {
                self.starting = Some(0);
                match self.children.first_mut() {
                    Some(first) => {
                        info!(group = %name, child = %first.name(), "starting first child");
                        first.run()
                    }
                    None => Vec::new(),
                }
            }
        }
    }

    /// Sequential startup step, called on each group tick.
    ///
    /// Starts the next child once the current one is `Ready`. A child that
    /// stays `Running`, or ends up `Exited`/`Errored` without being `Ready`
    /// when the group looks, holds back the rest of the sequence. A killed
    /// group starts nothing until it is run again.
    pub fn advance(&mut self, name: &str) -> Vec<NodeId> {
        if self.kind != GroupKind::Sequential {
            return Vec::new();
        }
        let Some(starting) = self.starting else {
            return Vec::new();
        };

        let Some(current) = self.children.get(starting) else {
            return Vec::new();
        };
        if current.status() != Status::Ready {
            return Vec::new();
        }

        let next = starting + 1;
        let Some(child) = self.children.get_mut(next) else {
            return Vec::new();
        };

        self.starting = Some(next);
        info!(group = %name, child = %child.name(), index = next, "previous child ready; starting next");
        child.run()
    }

    /// Stop the startup sequence and kill every child.
    pub fn kill(&mut self) {
        debug!(kind = %self.kind, "killing group children");
        self.starting = None;
        for child in &mut self.children {
            child.kill();
        }
    }

    pub fn drain(&mut self) {
        for child in &mut self.children {
            child.drain();
        }
    }

    pub fn has_pending(&self) -> bool {
        self.children.iter().any(ProcessNode::has_pending)
    }

    pub fn clean_up(&mut self) {
        for child in &mut self.children {
            child.clean_up();
        }
    }
}
