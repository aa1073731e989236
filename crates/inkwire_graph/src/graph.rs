// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and connections.
//!
//! [`DiagramGraph`] is the passive document: it stores nodes and connections
//! and answers queries. All edge mutation goes through the connection
//! manager (or undo/redo), which is why the edge-writing methods are crate
//! private. Nodes are owned by the host and may be added or removed freely.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::connection::{AttachmentPolicy, Connection, ConnectionId};
use crate::node::{Node, NodeId};
use crate::port::{Port, PortId};

/// A diagram graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramGraph {
    /// Graph name
    pub name: String,
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// Connections between nodes
    connections: IndexMap<ConnectionId, Connection>,
}

impl DiagramGraph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
        }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node and every connection involving it.
    ///
    /// Ports on surviving peer nodes that were consumed by a dropped
    /// exclusive connection become available again. The removals bypass the
    /// history log; hosts that want undoable node deletion disconnect the
    /// node's edges through the manager first.
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        let dropped: Vec<ConnectionId> = self
            .connections_for_node(node_id)
            .map(|connection| connection.id)
            .collect();
        for connection_id in dropped {
            if let Some(connection) = self.connections.swap_remove(&connection_id) {
                self.release_ports(&connection);
            }
        }
        self.nodes.swap_remove(&node_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&connection_id)
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Get connections from a specific port
    pub fn connections_from(&self, port_id: PortId) -> impl Iterator<Item = &Connection> {
        self.connections
            .values()
            .filter(move |c| c.from_port == port_id)
    }

    /// Get connections to a specific port
    pub fn connections_to(&self, port_id: PortId) -> impl Iterator<Item = &Connection> {
        self.connections
            .values()
            .filter(move |c| c.to_port == port_id)
    }

    /// Get connections involving a node
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections
            .values()
            .filter(move |c| c.involves_node(node_id))
    }

    /// Get connections arriving at a node
    pub fn incoming(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections
            .values()
            .filter(move |c| c.to_node == node_id)
    }

    /// Get connections leaving a node
    pub fn outgoing(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections
            .values()
            .filter(move |c| c.from_node == node_id)
    }

    /// Get connections linking two nodes, in either direction
    pub fn connections_between(
        &self,
        a: NodeId,
        b: NodeId,
    ) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.links(a, b))
    }

    /// Get the first connection linking two nodes, in either direction
    pub fn first_connection_between(&self, a: NodeId, b: NodeId) -> Option<ConnectionId> {
        self.connections_between(a, b).next().map(|c| c.id)
    }

    /// Resolve which node owns a port
    pub fn port_owner(&self, port_id: PortId) -> Option<NodeId> {
        self.find_port(port_id).map(|(node_id, _)| node_id)
    }

    /// Resolve a port to its owning node and definition
    pub fn find_port(&self, port_id: PortId) -> Option<(NodeId, &Port)> {
        self.nodes.values().find_map(|node| {
            node.port(port_id).map(|port| (node.id, port))
        })
    }

    /// The connection feeding a node's input port at the given index, if any
    pub fn connection_feeding_input(
        &self,
        node_id: NodeId,
        input_index: usize,
    ) -> Option<&Connection> {
        let port_id = self.node(node_id)?.input(input_index)?.id;
        self.connections
            .values()
            .find(|c| c.to_node == node_id && c.to_port == port_id)
    }

    /// Insert a fully built connection
    pub(crate) fn insert_connection(&mut self, connection: Connection) -> ConnectionId {
        let id = connection.id;
        self.connections.insert(id, connection);
        id
    }

    /// Remove a connection, returning it
    pub(crate) fn take_connection(&mut self, connection_id: ConnectionId) -> Option<Connection> {
        self.connections.swap_remove(&connection_id)
    }

    /// Get a mutable connection by ID
    pub(crate) fn connection_mut(&mut self, connection_id: ConnectionId) -> Option<&mut Connection> {
        self.connections.get_mut(&connection_id)
    }

    /// Set a port's availability flag
    pub(crate) fn set_port_available(
        &mut self,
        node_id: NodeId,
        port_id: PortId,
        available: bool,
    ) -> bool {
        let Some(port) = self
            .node_mut(node_id)
            .and_then(|node| node.port_mut(port_id))
        else {
            return false;
        };
        port.available = available;
        true
    }

    /// Mark an exclusive connection's endpoint ports as consumed
    pub(crate) fn reserve_ports(&mut self, connection: &Connection) {
        if connection.policy != AttachmentPolicy::Exclusive {
            return;
        }
        self.set_port_available(connection.from_node, connection.from_port, false);
        self.set_port_available(connection.to_node, connection.to_port, false);
    }

    /// Mark an exclusive connection's endpoint ports as available again
    pub(crate) fn release_ports(&mut self, connection: &Connection) {
        if connection.policy != AttachmentPolicy::Exclusive {
            return;
        }
        self.set_port_available(connection.from_node, connection.from_port, true);
        self.set_port_available(connection.to_node, connection.to_port, true);
    }
}

impl Default for DiagramGraph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
