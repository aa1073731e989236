// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection manager: the mutation surface of the diagram engine.
//!
//! Hosts create and destroy nodes themselves; every edge mutation goes
//! through [`ConnectionManager`]. Failures are reported on three levels:
//! malformed requests (stale ids, self-loops) raise [`GraphError`];
//! structurally refused requests return [`ConnectOutcome::Rejected`] with a
//! [`RejectReason`] and leave the graph untouched; advisory findings only
//! annotate the affected connection's status.

use std::fmt;
use std::sync::Arc;

use inkwire_schema::RowId;

use crate::connection::{
    AttachmentPolicy, Connection, ConnectionId, ConnectionStatus, Multiplicity,
};
use crate::cycle;
use crate::events::{ChangeListener, GraphChange, NullListener};
use crate::graph::DiagramGraph;
use crate::history::{HistoryAction, HistoryLog};
use crate::node::{NodeFamily, NodeId};
use crate::port::{DataType, PortDirection, PortId};
use crate::propagation::{self, InferenceRegistry};
use crate::validation;

/// Error for requests the engine cannot act on
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Connection not found
    #[error("Connection not found: {0:?}")]
    ConnectionNotFound(ConnectionId),

    /// Port not found
    #[error("Port not found: {0:?}")]
    PortNotFound(PortId),

    /// Port has the wrong direction for its requested role
    #[error("Port {port:?} is not an {expected:?} port")]
    WrongDirection {
        /// The offending port
        port: PortId,
        /// The direction the role requires
        expected: PortDirection,
    },

    /// Port is already consumed by another connection
    #[error("Port already connected: {0:?}")]
    PortUnavailable(PortId),

    /// Self-loop not allowed
    #[error("Self-loop not allowed: {0:?}")]
    SelfConnection(NodeId),
}

/// Why a connect request was refused without error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The source node has no available output port
    NoAvailableOutput,
    /// The target node has no available input port
    NoAvailableInput,
    /// The source node has no output ports at all
    NoOutputPort,
    /// The target node has no input ports at all
    NoInputPort,
    /// The chosen ports do not face each other output-to-input
    DirectionMismatch,
    /// The output's data type cannot feed the input's
    IncompatibleTypes {
        /// Type offered by the output port
        from: DataType,
        /// Type required by the input port
        to: DataType,
    },
    /// The two node kinds may not be linked
    DisallowedKindPair {
        /// Source node kind
        from: String,
        /// Target node kind
        to: String,
    },
    /// The edge would close a directed cycle
    WouldCreateCycle,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAvailableOutput => f.write_str("source has no available output port"),
            Self::NoAvailableInput => f.write_str("target has no available input port"),
            Self::NoOutputPort => f.write_str("source has no output port"),
            Self::NoInputPort => f.write_str("target has no input port"),
            Self::DirectionMismatch => f.write_str("ports do not face output-to-input"),
            Self::IncompatibleTypes { from, to } => {
                write!(f, "type {from} cannot feed {to}")
            }
            Self::DisallowedKindPair { from, to } => {
                write!(f, "{from} nodes may not link to {to} nodes")
            }
            Self::WouldCreateCycle => f.write_str("edge would create a cycle"),
        }
    }
}

/// Result of a connect request that was acted on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// The edge was created
    Connected(ConnectionId),
    /// The request was refused; the graph is unchanged
    Rejected(RejectReason),
}

impl ConnectOutcome {
    /// Whether an edge was created
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }

    /// The created connection's id, if any
    pub fn connection(&self) -> Option<ConnectionId> {
        match self {
            Self::Connected(id) => Some(*id),
            Self::Rejected(_) => None,
        }
    }
}

/// Per-request connect settings
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectOptions {
    /// Connect from this output port instead of the first suitable one
    pub from_port: Option<PortId>,
    /// Connect to this input port instead of the first suitable one
    pub to_port: Option<PortId>,
    /// Multiplicity marker to place at the source end
    pub start_marker: Option<Multiplicity>,
    /// Multiplicity marker to place at the target end
    pub end_marker: Option<Multiplicity>,
}

impl ConnectOptions {
    /// Target a specific port pair
    pub fn between_ports(from_port: PortId, to_port: PortId) -> Self {
        Self {
            from_port: Some(from_port),
            to_port: Some(to_port),
            ..Self::default()
        }
    }

    /// Place multiplicity markers on both ends
    pub fn with_markers(mut self, start: Multiplicity, end: Multiplicity) -> Self {
        self.start_marker = Some(start);
        self.end_marker = Some(end);
        self
    }
}

/// Orchestrator for all edge mutation on a [`DiagramGraph`]
pub struct ConnectionManager {
    /// Undo/redo log
    history: HistoryLog,
    /// Schema-inference capabilities by node kind
    inference: InferenceRegistry,
    /// Change notification sink
    listener: Arc<dyn ChangeListener>,
}

impl ConnectionManager {
    /// Create a manager with built-in inference capabilities and no listener
    pub fn new() -> Self {
        Self {
            history: HistoryLog::new(),
            inference: InferenceRegistry::with_builtins(),
            listener: Arc::new(NullListener),
        }
    }

    /// Set the change listener
    pub fn with_listener(mut self, listener: Arc<dyn ChangeListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Replace the inference registry
    pub fn with_inference(mut self, inference: InferenceRegistry) -> Self {
        self.inference = inference;
        self
    }

    /// Limit the undo history depth
    pub fn with_history_depth(mut self, depth: usize) -> Self {
        self.history = HistoryLog::with_max_depth(depth);
        self
    }

    /// The undo/redo log
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// The inference registry
    pub fn inference(&self) -> &InferenceRegistry {
        &self.inference
    }

    /// The inference registry, for registering host capabilities
    pub fn inference_mut(&mut self) -> &mut InferenceRegistry {
        &mut self.inference
    }

    /// Connect two nodes using default port selection.
    ///
    /// See [`Self::connect_with`].
    pub fn connect(
        &mut self,
        graph: &mut DiagramGraph,
        from: NodeId,
        to: NodeId,
    ) -> Result<ConnectOutcome, GraphError> {
        self.connect_with(graph, from, to, ConnectOptions::default())
    }

    /// Connect two nodes.
    ///
    /// When both nodes are automation-family, the edge consumes one output
    /// and one input port and the full validator chain runs (directions,
    /// types, kind pairing, acyclicity). Otherwise a shared edge is created
    /// between the chosen (or first) ports. Either way the new edge picks up
    /// schema and referential annotations, the target node's derived schema
    /// is recomputed, and the edit lands in the undo log.
    pub fn connect_with(
        &mut self,
        graph: &mut DiagramGraph,
        from: NodeId,
        to: NodeId,
        options: ConnectOptions,
    ) -> Result<ConnectOutcome, GraphError> {
        if from == to {
            return Err(GraphError::SelfConnection(from));
        }
        let from_family = graph
            .node(from)
            .map(|node| node.family)
            .ok_or(GraphError::NodeNotFound(from))?;
        let to_family = graph
            .node(to)
            .map(|node| node.family)
            .ok_or(GraphError::NodeNotFound(to))?;

        let outcome = if from_family == NodeFamily::Automation && to_family == NodeFamily::Automation
        {
            self.connect_automation(graph, from, to, &options)?
        } else {
            self.connect_generic(graph, from, to, &options)?
        };

        if let ConnectOutcome::Rejected(reason) = &outcome {
            tracing::debug!("Connect {:?} -> {:?} refused: {reason}", from, to);
        }
        Ok(outcome)
    }

    fn connect_automation(
        &mut self,
        graph: &mut DiagramGraph,
        from: NodeId,
        to: NodeId,
        options: &ConnectOptions,
    ) -> Result<ConnectOutcome, GraphError> {
        let Some(from_node) = graph.node(from) else {
            return Err(GraphError::NodeNotFound(from));
        };
        let Some(to_node) = graph.node(to) else {
            return Err(GraphError::NodeNotFound(to));
        };

        // Pick ports: the explicit choice, or the first free one
        let from_port = match options.from_port {
            Some(port_id) => match from_node.port(port_id) {
                Some(port) => port,
                None => return Err(GraphError::PortNotFound(port_id)),
            },
            None => match from_node.first_available_output() {
                Some(port) => port,
                None => return Ok(ConnectOutcome::Rejected(RejectReason::NoAvailableOutput)),
            },
        };
        let to_port = match options.to_port {
            Some(port_id) => match to_node.port(port_id) {
                Some(port) => port,
                None => return Err(GraphError::PortNotFound(port_id)),
            },
            None => match to_node.first_available_input() {
                Some(port) => port,
                None => return Ok(ConnectOutcome::Rejected(RejectReason::NoAvailableInput)),
            },
        };

        // Ports must face each other output -> input
        if from_port.direction != PortDirection::Output
            || to_port.direction != PortDirection::Input
        {
            return Ok(ConnectOutcome::Rejected(RejectReason::DirectionMismatch));
        }

        // An explicitly chosen port must still be free
        if !from_port.available {
            return Ok(ConnectOutcome::Rejected(RejectReason::NoAvailableOutput));
        }
        if !to_port.available {
            return Ok(ConnectOutcome::Rejected(RejectReason::NoAvailableInput));
        }

        // The output's type must be able to feed the input's
        if !from_port.data_type.can_feed(&to_port.data_type) {
            return Ok(ConnectOutcome::Rejected(RejectReason::IncompatibleTypes {
                from: from_port.data_type.clone(),
                to: to_port.data_type.clone(),
            }));
        }

        // Some kind pairings are forbidden outright
        if !validation::kind_pair_allowed(&from_node.kind, &to_node.kind) {
            return Ok(ConnectOutcome::Rejected(RejectReason::DisallowedKindPair {
                from: from_node.kind.clone(),
                to: to_node.kind.clone(),
            }));
        }

        // The automation graph must stay acyclic
        if cycle::would_create_cycle(graph, from, to) {
            return Ok(ConnectOutcome::Rejected(RejectReason::WouldCreateCycle));
        }

        let mut connection = Connection::new(
            from,
            from_port.id,
            to,
            to_port.id,
            AttachmentPolicy::Exclusive,
        );
        connection.from_row = from_port.row;
        connection.to_row = to_port.row;
        connection.start_marker = options.start_marker;
        connection.end_marker = options.end_marker;

        let id = self.finish_connect(graph, connection);
        Ok(ConnectOutcome::Connected(id))
    }

    fn connect_generic(
        &mut self,
        graph: &mut DiagramGraph,
        from: NodeId,
        to: NodeId,
        options: &ConnectOptions,
    ) -> Result<ConnectOutcome, GraphError> {
        let Some(from_node) = graph.node(from) else {
            return Err(GraphError::NodeNotFound(from));
        };
        let Some(to_node) = graph.node(to) else {
            return Err(GraphError::NodeNotFound(to));
        };

        // Shared edges never consume ports, so any port of the right
        // direction will do
        let from_port = match options.from_port {
            Some(port_id) => match from_node.port(port_id) {
                Some(port) => port,
                None => return Err(GraphError::PortNotFound(port_id)),
            },
            None => match from_node.first_output() {
                Some(port) => port,
                None => return Ok(ConnectOutcome::Rejected(RejectReason::NoOutputPort)),
            },
        };
        let to_port = match options.to_port {
            Some(port_id) => match to_node.port(port_id) {
                Some(port) => port,
                None => return Err(GraphError::PortNotFound(port_id)),
            },
            None => match to_node.first_input() {
                Some(port) => port,
                None => return Ok(ConnectOutcome::Rejected(RejectReason::NoInputPort)),
            },
        };

        if from_port.direction != PortDirection::Output
            || to_port.direction != PortDirection::Input
        {
            return Ok(ConnectOutcome::Rejected(RejectReason::DirectionMismatch));
        }

        let mut connection = Connection::new(
            from,
            from_port.id,
            to,
            to_port.id,
            AttachmentPolicy::Shared,
        );
        connection.from_row = from_port.row;
        connection.to_row = to_port.row;
        connection.start_marker = options.start_marker;
        connection.end_marker = options.end_marker;

        let id = self.finish_connect(graph, connection);
        Ok(ConnectOutcome::Connected(id))
    }

    /// Annotate, insert, and record a fully validated connection.
    fn finish_connect(&mut self, graph: &mut DiagramGraph, mut connection: Connection) -> ConnectionId {
        let contribution = propagation::attach_edge_schema(graph, &mut connection);
        connection.status.escalate(contribution);
        connection
            .status
            .escalate(validation::reference_status(graph, &connection));

        let from_node = connection.from_node;
        let to_node = connection.to_node;
        let id = graph.insert_connection(connection);
        if let Some(created) = graph.connection(id).cloned() {
            graph.reserve_ports(&created);
        }

        // The target gained an upstream edge; the source gained an outgoing
        // one whose annotations its join-key state may decide
        self.refresh_node(graph, to_node);
        self.refresh_node(graph, from_node);

        if let Some(created) = graph.connection(id).cloned() {
            if created.status != ConnectionStatus::Normal {
                tracing::warn!(
                    "Connection {:?} created with {:?} annotation",
                    id,
                    created.status
                );
            }
            self.history.record(HistoryAction::Connected { connection: created });
        }
        self.notify(GraphChange::Connected { connection: id });
        id
    }

    /// Remove the first connection linking two nodes, in either direction.
    ///
    /// Returns whether an edge was removed; asking again for the same pair
    /// is a quiet no-op.
    pub fn disconnect(&mut self, graph: &mut DiagramGraph, a: NodeId, b: NodeId) -> bool {
        let Some(connection_id) = graph.first_connection_between(a, b) else {
            return false;
        };
        let Some(connection) = graph.take_connection(connection_id) else {
            return false;
        };
        graph.release_ports(&connection);

        // Both former endpoints may derive schema from the edge that left
        self.refresh_node(graph, connection.from_node);
        self.refresh_node(graph, connection.to_node);

        self.history
            .record(HistoryAction::Disconnected { connection });
        self.notify(GraphChange::Disconnected {
            connection: connection_id,
        });
        true
    }

    /// Rebind one or both endpoints of an existing connection.
    ///
    /// `None` keeps that side where it is. The rebound edge is re-annotated
    /// from scratch and re-inference runs on the affected target nodes.
    pub fn move_connection(
        &mut self,
        graph: &mut DiagramGraph,
        connection_id: ConnectionId,
        new_from: Option<PortId>,
        new_to: Option<PortId>,
    ) -> Result<(), GraphError> {
        let Some(before) = graph.connection(connection_id).cloned() else {
            return Err(GraphError::ConnectionNotFound(connection_id));
        };

        let (from_node, from_port, from_row) = match new_from {
            Some(port_id) => resolve_endpoint(graph, port_id, PortDirection::Output)?,
            None => (before.from_node, before.from_port, before.from_row),
        };
        let (to_node, to_port, to_row) = match new_to {
            Some(port_id) => resolve_endpoint(graph, port_id, PortDirection::Input)?,
            None => (before.to_node, before.to_port, before.to_row),
        };

        if from_node == to_node {
            return Err(GraphError::SelfConnection(from_node));
        }

        // An exclusive edge may only land on free ports (or ones it already
        // occupies)
        if before.policy == AttachmentPolicy::Exclusive {
            if from_port != before.from_port && !port_is_available(graph, from_node, from_port) {
                return Err(GraphError::PortUnavailable(from_port));
            }
            if to_port != before.to_port && !port_is_available(graph, to_node, to_port) {
                return Err(GraphError::PortUnavailable(to_port));
            }
        }

        let mut after = before.clone();
        after.from_node = from_node;
        after.from_port = from_port;
        after.from_row = from_row;
        after.to_node = to_node;
        after.to_port = to_port;
        after.to_row = to_row;

        // Annotations are derived fresh for the new endpoints
        after.status = ConnectionStatus::default();
        let contribution = propagation::attach_edge_schema(graph, &mut after);
        after.status.escalate(contribution);
        after.status.escalate(validation::reference_status(graph, &after));

        graph.release_ports(&before);
        if let Some(connection) = graph.connection_mut(connection_id) {
            *connection = after.clone();
        }
        graph.reserve_ports(&after);

        self.refresh_node(graph, before.to_node);
        if to_node != before.to_node {
            self.refresh_node(graph, to_node);
        }

        self.history.record(HistoryAction::Moved { before, after });
        self.notify(GraphChange::Moved {
            connection: connection_id,
        });
        Ok(())
    }

    /// Recompute a node's derived output schema on demand.
    ///
    /// Inference failures are logged and swallowed; only a stale node id is
    /// an error.
    pub fn infer_schema(
        &mut self,
        graph: &mut DiagramGraph,
        node_id: NodeId,
    ) -> Result<(), GraphError> {
        if graph.node(node_id).is_none() {
            return Err(GraphError::NodeNotFound(node_id));
        }
        if self.refresh_node(graph, node_id) {
            self.notify(GraphChange::SchemaInferred { node: node_id });
        }
        Ok(())
    }

    /// Undo the most recent edit. Returns whether anything was undone.
    pub fn undo(&mut self, graph: &mut DiagramGraph) -> bool {
        if self.history.undo(graph) {
            self.notify(GraphChange::Undone);
            return true;
        }
        false
    }

    /// Redo the most recently undone edit. Returns whether anything was
    /// redone.
    pub fn redo(&mut self, graph: &mut DiagramGraph) -> bool {
        if self.history.redo(graph) {
            self.notify(GraphChange::Redone);
            return true;
        }
        false
    }

    /// Run inference and join-key validation around a node.
    fn refresh_node(&self, graph: &mut DiagramGraph, node_id: NodeId) -> bool {
        let changed = match propagation::infer_node_schema(graph, node_id, &self.inference) {
            Ok(changed) => changed,
            Err(error) => {
                tracing::warn!("Schema inference failed for node {:?}: {error}", node_id);
                false
            }
        };
        propagation::validate_join_keys(graph, node_id);
        changed
    }

    fn notify(&self, change: GraphChange) {
        self.listener.graph_changed(&change);
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_endpoint(
    graph: &DiagramGraph,
    port_id: PortId,
    expected: PortDirection,
) -> Result<(NodeId, PortId, Option<RowId>), GraphError> {
    let Some((node_id, port)) = graph.find_port(port_id) else {
        return Err(GraphError::PortNotFound(port_id));
    };
    if port.direction != expected {
        return Err(GraphError::WrongDirection {
            port: port_id,
            expected,
        });
    }
    Ok((node_id, port_id, port.row))
}

fn port_is_available(graph: &DiagramGraph, node_id: NodeId, port_id: PortId) -> bool {
    graph
        .node(node_id)
        .and_then(|node| node.port(port_id))
        .is_some_and(|port| port.available)
}
