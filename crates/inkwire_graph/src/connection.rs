// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for the diagram graph.

use std::fmt;

use inkwire_schema::{ColumnSchema, RowId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::node::NodeId;
use crate::port::PortId;

/// Unique identifier for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// How a connection binds its endpoint ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentPolicy {
    /// The connection consumes both ports; each port carries at most one
    /// such connection at a time
    Exclusive,
    /// Ports stay available; any number of connections may share them
    Shared,
}

/// Validation status shown on a connection.
///
/// Ordered by severity, so `max` picks the worse of two findings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// No findings
    #[default]
    Normal,
    /// A non-blocking finding (schema mismatch, unverified reference)
    Warning,
    /// A blocking finding surfaced after the fact
    Error,
}

impl ConnectionStatus {
    /// Get the indicator color for this status (for UI)
    pub fn indicator_color(&self) -> [u8; 3] {
        match self {
            Self::Normal => [150, 150, 150],
            Self::Warning => [255, 191, 0],
            Self::Error => [200, 80, 80],
        }
    }

    /// Escalate to the worse of the two statuses
    pub fn escalate(&mut self, other: ConnectionStatus) {
        *self = (*self).max(other);
    }
}

/// Relationship multiplicity marker at one end of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Multiplicity {
    /// Exactly one
    One,
    /// One or more
    Many,
    /// Zero or one
    ZeroOrOne,
    /// Zero or more
    ZeroOrMany,
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One => f.write_str("1"),
            Self::Many => f.write_str("*"),
            Self::ZeroOrOne => f.write_str("0..1"),
            Self::ZeroOrMany => f.write_str("0..*"),
        }
    }
}

/// Direction data flows along an edge, for animated rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowDirection {
    /// From source to target
    Forward,
    /// From target back to source
    Reverse,
}

/// One endpoint of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Node the endpoint sits on
    pub node: NodeId,
    /// Port the endpoint binds
    pub port: PortId,
    /// Column row the port anchors, for row-level edges
    pub row: Option<RowId>,
}

/// A connection between two ports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Source node ID
    pub from_node: NodeId,
    /// Source port ID
    pub from_port: PortId,
    /// Target node ID
    pub to_node: NodeId,
    /// Target port ID
    pub to_port: PortId,
    /// How the endpoint ports are bound
    pub policy: AttachmentPolicy,
    /// Validation status
    pub status: ConnectionStatus,
    /// Column schema carried along the edge, if one was attached
    pub schema: Option<ColumnSchema>,
    /// Schema the target expects, recorded when it declares one
    pub expected_schema: Option<ColumnSchema>,
    /// Source column row, for row-level edges
    pub from_row: Option<RowId>,
    /// Target column row, for row-level edges
    pub to_row: Option<RowId>,
    /// Multiplicity marker at the source end
    pub start_marker: Option<Multiplicity>,
    /// Multiplicity marker at the target end
    pub end_marker: Option<Multiplicity>,
    /// Data-flow direction for animated rendering
    pub flow: Option<FlowDirection>,
    /// Whether the edge renders animated
    pub animated: bool,
    /// Label near the source end
    pub start_label: Option<String>,
    /// Label at the edge midpoint
    pub center_label: Option<String>,
    /// Label near the target end
    pub end_label: Option<String>,
}

impl Connection {
    /// Create a new connection
    pub fn new(
        from_node: NodeId,
        from_port: PortId,
        to_node: NodeId,
        to_port: PortId,
        policy: AttachmentPolicy,
    ) -> Self {
        Self {
            id: ConnectionId::new(),
            from_node,
            from_port,
            to_node,
            to_port,
            policy,
            status: ConnectionStatus::default(),
            schema: None,
            expected_schema: None,
            from_row: None,
            to_row: None,
            start_marker: None,
            end_marker: None,
            flow: None,
            animated: false,
            start_label: None,
            center_label: None,
            end_label: None,
        }
    }

    /// Set the multiplicity markers
    pub fn with_markers(
        mut self,
        start: Option<Multiplicity>,
        end: Option<Multiplicity>,
    ) -> Self {
        self.start_marker = start;
        self.end_marker = end;
        self
    }

    /// Set the center label
    pub fn with_center_label(mut self, label: impl Into<String>) -> Self {
        self.center_label = Some(label.into());
        self
    }

    /// Mark the edge animated in the given flow direction
    pub fn with_flow(mut self, flow: FlowDirection) -> Self {
        self.flow = Some(flow);
        self.animated = true;
        self
    }

    /// The source endpoint
    pub fn from_endpoint(&self) -> Endpoint {
        Endpoint {
            node: self.from_node,
            port: self.from_port,
            row: self.from_row,
        }
    }

    /// The target endpoint
    pub fn to_endpoint(&self) -> Endpoint {
        Endpoint {
            node: self.to_node,
            port: self.to_port,
            row: self.to_row,
        }
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.from_node == node_id || self.to_node == node_id
    }

    /// Check if this connection involves a specific port
    pub fn involves_port(&self, port_id: PortId) -> bool {
        self.from_port == port_id || self.to_port == port_id
    }

    /// Check if this connection links two specific nodes, in either direction
    pub fn links(&self, a: NodeId, b: NodeId) -> bool {
        (self.from_node == a && self.to_node == b) || (self.from_node == b && self.to_node == a)
    }

    /// Whether both endpoints anchor column rows
    pub fn is_row_level(&self) -> bool {
        self.from_row.is_some() && self.to_row.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_escalates_but_never_downgrades() {
        let mut status = ConnectionStatus::Normal;
        status.escalate(ConnectionStatus::Warning);
        assert_eq!(status, ConnectionStatus::Warning);
        status.escalate(ConnectionStatus::Normal);
        assert_eq!(status, ConnectionStatus::Warning);
        status.escalate(ConnectionStatus::Error);
        assert_eq!(status, ConnectionStatus::Error);
    }

    #[test]
    fn test_warning_indicator_is_amber() {
        assert_eq!(ConnectionStatus::Warning.indicator_color(), [255, 191, 0]);
        assert_ne!(
            ConnectionStatus::Normal.indicator_color(),
            ConnectionStatus::Warning.indicator_color()
        );
    }

    #[test]
    fn test_multiplicity_markers_render_crow_feet_labels() {
        assert_eq!(Multiplicity::One.to_string(), "1");
        assert_eq!(Multiplicity::Many.to_string(), "*");
        assert_eq!(Multiplicity::ZeroOrOne.to_string(), "0..1");
        assert_eq!(Multiplicity::ZeroOrMany.to_string(), "0..*");
    }

    #[test]
    fn test_links_matches_either_direction() {
        let a = NodeId::new();
        let b = NodeId::new();
        let c = NodeId::new();
        let connection = Connection::new(
            a,
            PortId::new(),
            b,
            PortId::new(),
            AttachmentPolicy::Shared,
        );

        assert!(connection.links(a, b));
        assert!(connection.links(b, a));
        assert!(!connection.links(a, c));
        assert!(connection.involves_node(a));
        assert!(!connection.involves_node(c));
    }
}
