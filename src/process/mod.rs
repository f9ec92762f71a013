// src/process/mod.rs

//! The process tree and everything that runs inside it.
//!
//! - [`node`] is the tagged union of leaf and group nodes.
//! - [`leaf`] owns the per-command state machine, queues and waiter.
//! - [`group`] implements parallel / sequential startup and status
//!   aggregation.
//! - [`stream`] holds the output stream workers.
//! - [`sanitize`] strips terminal escape sequences from captured lines.

pub mod group;
pub mod leaf;
pub mod node;
pub mod sanitize;
pub mod stream;

pub use group::ProcessGroup;
pub use leaf::{LOG_QUEUE_CAPACITY, LeafProcess, STATUS_QUEUE_CAPACITY};
pub use node::{NodeKind, ProcessNode};
pub use stream::{StreamSinks, StreamStats, spawn_stream_worker, stream_lines};
