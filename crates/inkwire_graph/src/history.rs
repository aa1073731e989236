// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undo/redo history for connection edits.
//!
//! Every mutation the manager performs is recorded as a typed
//! [`HistoryAction`] holding the full connection records involved, so undo
//! and redo restore edges, their annotations, and port availability exactly.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::connection::Connection;
use crate::graph::DiagramGraph;

/// Maximum undo history depth
const MAX_HISTORY: usize = 100;

/// A reversible connection edit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HistoryAction {
    /// A connection was created
    Connected {
        /// The connection as it existed right after creation
        connection: Connection,
    },
    /// A connection was removed
    Disconnected {
        /// The removed connection, with all its annotations
        connection: Connection,
    },
    /// A connection was rebound to new endpoints
    Moved {
        /// The connection before the move
        before: Connection,
        /// The connection after the move
        after: Connection,
    },
}

impl HistoryAction {
    /// Human-readable description of the edit
    pub fn description(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "Connect",
            Self::Disconnected { .. } => "Disconnect",
            Self::Moved { .. } => "Move Connection",
        }
    }

    /// Reverse the edit on the graph
    pub(crate) fn undo(&self, graph: &mut DiagramGraph) {
        match self {
            Self::Connected { connection } => remove(graph, connection),
            Self::Disconnected { connection } => restore(graph, connection),
            Self::Moved { before, after } => {
                remove(graph, after);
                restore(graph, before);
            }
        }
    }

    /// Apply the edit to the graph again
    pub(crate) fn redo(&self, graph: &mut DiagramGraph) {
        match self {
            Self::Connected { connection } => restore(graph, connection),
            Self::Disconnected { connection } => remove(graph, connection),
            Self::Moved { before, after } => {
                remove(graph, before);
                restore(graph, after);
            }
        }
    }
}

fn restore(graph: &mut DiagramGraph, connection: &Connection) {
    graph.insert_connection(connection.clone());
    graph.reserve_ports(connection);
}

fn remove(graph: &mut DiagramGraph, connection: &Connection) {
    if let Some(taken) = graph.take_connection(connection.id) {
        graph.release_ports(&taken);
    }
}

/// Undo/redo log of connection edits
#[derive(Debug)]
pub struct HistoryLog {
    /// Undo stack
    undo_stack: VecDeque<HistoryAction>,
    /// Redo stack
    redo_stack: VecDeque<HistoryAction>,
    /// Maximum history depth
    max_depth: usize,
}

impl HistoryLog {
    /// Create a new log with the default depth
    pub fn new() -> Self {
        Self::with_max_depth(MAX_HISTORY)
    }

    /// Create a log with a custom maximum depth
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth,
        }
    }

    /// Record a fresh edit.
    ///
    /// Recording clears the redo stack and drops the oldest entries beyond
    /// the depth limit.
    pub(crate) fn record(&mut self, action: HistoryAction) {
        self.redo_stack.clear();
        self.undo_stack.push_back(action);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
    }

    /// Undo the most recent edit. Returns whether anything was undone.
    pub(crate) fn undo(&mut self, graph: &mut DiagramGraph) -> bool {
        let Some(action) = self.undo_stack.pop_back() else {
            return false;
        };
        action.undo(graph);
        self.redo_stack.push_back(action);
        true
    }

    /// Redo the most recently undone edit. Returns whether anything was
    /// redone.
    pub(crate) fn redo(&mut self, graph: &mut DiagramGraph) -> bool {
        let Some(action) = self.redo_stack.pop_back() else {
            return false;
        };
        action.redo(graph);
        self.undo_stack.push_back(action);
        true
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get undo stack depth
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get redo stack depth
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Get description of the next undo
    pub fn undo_description(&self) -> Option<&'static str> {
        self.undo_stack.back().map(HistoryAction::description)
    }

    /// Get description of the next redo
    pub fn redo_description(&self) -> Option<&'static str> {
        self.redo_stack.back().map(HistoryAction::description)
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::AttachmentPolicy;
    use crate::node::{Node, NodeFamily, NodeId};
    use crate::port::{DataType, Port};

    fn linked_graph() -> (DiagramGraph, NodeId, NodeId, Connection) {
        let mut graph = DiagramGraph::new("test");
        let mut source = Node::new("data_source", "Source", NodeFamily::Automation);
        source.outputs.push(Port::output("Rows", DataType::Array));
        let mut sink = Node::new("transform", "Sink", NodeFamily::Automation);
        sink.inputs.push(Port::input("Input", DataType::Object));

        let from_port = source.outputs[0].id;
        let to_port = sink.inputs[0].id;
        let a = graph.add_node(source);
        let b = graph.add_node(sink);

        let connection = Connection::new(a, from_port, b, to_port, AttachmentPolicy::Exclusive);
        graph.insert_connection(connection.clone());
        graph.reserve_ports(&connection);
        (graph, a, b, connection)
    }

    #[test]
    fn test_undo_connect_restores_ports() {
        let (mut graph, a, b, connection) = linked_graph();
        let mut log = HistoryLog::new();
        log.record(HistoryAction::Connected {
            connection: connection.clone(),
        });

        assert!(log.undo(&mut graph));
        assert_eq!(graph.connection_count(), 0);
        assert!(graph.node(a).unwrap().outputs[0].available);
        assert!(graph.node(b).unwrap().inputs[0].available);

        assert!(log.redo(&mut graph));
        assert_eq!(graph.connection_count(), 1);
        assert!(!graph.node(a).unwrap().outputs[0].available);
    }

    #[test]
    fn test_undo_disconnect_restores_the_edge() {
        let (mut graph, _, _, connection) = linked_graph();
        let taken = graph.take_connection(connection.id).unwrap();
        graph.release_ports(&taken);

        let mut log = HistoryLog::new();
        log.record(HistoryAction::Disconnected { connection: taken });

        assert!(log.undo(&mut graph));
        assert_eq!(graph.connection_count(), 1);
        assert!(graph.connection(connection.id).is_some());
    }

    #[test]
    fn test_empty_log_refuses_politely() {
        let (mut graph, _, _, _) = linked_graph();
        let mut log = HistoryLog::new();
        assert!(!log.can_undo());
        assert!(!log.undo(&mut graph));
        assert!(!log.redo(&mut graph));
        assert!(log.undo_description().is_none());
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let (mut graph, _, _, connection) = linked_graph();
        let mut log = HistoryLog::new();
        log.record(HistoryAction::Connected {
            connection: connection.clone(),
        });
        log.undo(&mut graph);
        assert!(log.can_redo());

        log.record(HistoryAction::Connected { connection });
        assert!(!log.can_redo());
        assert_eq!(log.undo_depth(), 1);
    }

    #[test]
    fn test_depth_limit_drops_oldest() {
        let (_, _, _, connection) = linked_graph();
        let mut log = HistoryLog::with_max_depth(2);
        for _ in 0..5 {
            log.record(HistoryAction::Connected {
                connection: connection.clone(),
            });
        }
        assert_eq!(log.undo_depth(), 2);
    }

    #[test]
    fn test_descriptions_name_the_edit() {
        let (mut graph, _, _, connection) = linked_graph();
        let mut log = HistoryLog::new();
        log.record(HistoryAction::Connected {
            connection: connection.clone(),
        });
        assert_eq!(log.undo_description(), Some("Connect"));
        log.undo(&mut graph);
        assert_eq!(log.redo_description(), Some("Connect"));

        log.clear();
        assert!(!log.can_undo());
        assert!(!log.can_redo());
    }
}
