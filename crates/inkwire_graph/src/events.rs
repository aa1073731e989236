// SPDX-License-Identifier: MIT OR Apache-2.0
//! Change notifications for diagram hosts.
//!
//! The manager reports every successful mutation through a
//! [`ChangeListener`]; hosts typically schedule a redraw. Notification is
//! synchronous and happens after the graph has been updated.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::connection::ConnectionId;
use crate::node::NodeId;

/// A change applied to the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphChange {
    /// A connection was created
    Connected {
        /// The new connection
        connection: ConnectionId,
    },
    /// A connection was removed
    Disconnected {
        /// The removed connection
        connection: ConnectionId,
    },
    /// A connection was rebound to new endpoints
    Moved {
        /// The rebound connection
        connection: ConnectionId,
    },
    /// A node's derived output schema was recomputed
    SchemaInferred {
        /// The node whose schema changed
        node: NodeId,
    },
    /// A history entry was undone
    Undone,
    /// A history entry was redone
    Redone,
}

/// Receiver for graph change notifications
pub trait ChangeListener: Send + Sync {
    /// Called after each successful mutation
    fn graph_changed(&self, change: &GraphChange);
}

/// Listener that ignores all changes
#[derive(Debug, Default)]
pub struct NullListener;

impl ChangeListener for NullListener {
    fn graph_changed(&self, _change: &GraphChange) {}
}

/// Listener that records changes, for tests and diagnostics
#[derive(Debug, Default)]
pub struct RecordingListener {
    changes: Mutex<Vec<GraphChange>>,
}

impl RecordingListener {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the changes recorded so far
    pub fn changes(&self) -> Vec<GraphChange> {
        self.changes.lock().clone()
    }

    /// Drain the recorded changes
    pub fn take(&self) -> Vec<GraphChange> {
        std::mem::take(&mut *self.changes.lock())
    }
}

impl ChangeListener for RecordingListener {
    fn graph_changed(&self, change: &GraphChange) {
        self.changes.lock().push(change.clone());
    }
}
