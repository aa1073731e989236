// SPDX-License-Identifier: MIT OR Apache-2.0
//! Schema propagation along edges and derived-schema inference.
//!
//! Edges pick up the schema their source node declares; nodes whose output
//! schema depends on what feeds them implement [`SchemaInference`] and are
//! dispatched through an [`InferenceRegistry`] keyed by node kind. Inference
//! failures never block an edit; callers log them and move on.

use indexmap::IndexMap;
use inkwire_schema::{compat, ColumnSchema};

use crate::connection::{Connection, ConnectionId, ConnectionStatus};
use crate::graph::DiagramGraph;
use crate::node::{Node, NodeId};
use crate::property::{property_keys, PropertyValue};
use crate::validation;

/// Kind id of transform nodes, which pass their input schema through
pub const TRANSFORM_KIND: &str = "transform";
/// Kind id of aggregate nodes, which keep columns but drop key flags
pub const AGGREGATE_KIND: &str = "aggregate";
/// Kind id of join nodes, which merge their two input schemas
pub const JOIN_KIND: &str = "join";

/// Error from a schema-inference capability
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// No schema arriving on a required input
    #[error("No schema arriving on input {0}")]
    MissingUpstream(usize),

    /// Capability-specific failure
    #[error("{0}")]
    Failed(String),
}

/// Capability for node kinds that derive their output schema from upstream
/// edges.
///
/// `upstream(i)` yields the schema carried by the edge feeding the node's
/// input port at index `i`, if that edge exists and carries one.
pub trait SchemaInference: Send + Sync {
    /// Recompute the node's output schema.
    ///
    /// `Ok(None)` means there is nothing to infer yet (e.g. no upstream
    /// edges); the node's stored schema is left untouched.
    fn infer(
        &self,
        node: &Node,
        upstream: &dyn Fn(usize) -> Option<ColumnSchema>,
    ) -> Result<Option<ColumnSchema>, InferenceError>;
}

/// Registry of schema-inference capabilities, keyed by node kind
pub struct InferenceRegistry {
    capabilities: IndexMap<String, Box<dyn SchemaInference>>,
}

impl InferenceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            capabilities: IndexMap::new(),
        }
    }

    /// Create a registry with the built-in capabilities registered
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(TRANSFORM_KIND, Box::new(TransformInference));
        registry.register(AGGREGATE_KIND, Box::new(AggregateInference));
        registry.register(JOIN_KIND, Box::new(JoinInference));
        registry
    }

    /// Register a capability for a node kind
    pub fn register(&mut self, kind: impl Into<String>, capability: Box<dyn SchemaInference>) {
        self.capabilities.insert(kind.into(), capability);
    }

    /// Get the capability for a node kind
    pub fn get(&self, kind: &str) -> Option<&dyn SchemaInference> {
        self.capabilities.get(kind).map(Box::as_ref)
    }

    /// Whether a node kind derives its schema
    pub fn supports(&self, kind: &str) -> bool {
        self.capabilities.contains_key(kind)
    }
}

impl Default for InferenceRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Pass-through inference: output schema is whatever arrives on input 0
pub struct TransformInference;

impl SchemaInference for TransformInference {
    fn infer(
        &self,
        _node: &Node,
        upstream: &dyn Fn(usize) -> Option<ColumnSchema>,
    ) -> Result<Option<ColumnSchema>, InferenceError> {
        Ok(upstream(0))
    }
}

/// Aggregation inference: columns survive but key flags do not
pub struct AggregateInference;

impl SchemaInference for AggregateInference {
    fn infer(
        &self,
        _node: &Node,
        upstream: &dyn Fn(usize) -> Option<ColumnSchema>,
    ) -> Result<Option<ColumnSchema>, InferenceError> {
        let Some(input) = upstream(0) else {
            return Ok(None);
        };
        let summarized = input
            .columns()
            .map(|column| {
                let mut column = column.clone();
                column.is_primary_key = false;
                column.is_foreign_key = false;
                column
            })
            .collect();
        Ok(Some(summarized))
    }
}

/// Join inference: both input schemas merged, left columns first.
///
/// Columns from the right side whose names collide (case-insensitively)
/// with a left column are dropped; both sides must carry a schema.
pub struct JoinInference;

impl SchemaInference for JoinInference {
    fn infer(
        &self,
        _node: &Node,
        upstream: &dyn Fn(usize) -> Option<ColumnSchema>,
    ) -> Result<Option<ColumnSchema>, InferenceError> {
        let left = upstream(0).ok_or(InferenceError::MissingUpstream(0))?;
        let right = upstream(1).ok_or(InferenceError::MissingUpstream(1))?;

        let mut merged = left.clone();
        for column in right.columns() {
            if !merged.contains(&column.name) {
                merged.push(column.clone());
            }
        }
        Ok(Some(merged))
    }
}

/// Attach carried and expected schemas to a connection.
///
/// The carried schema comes from the source node's declared output schema,
/// falling back to the target's. The expected schema comes from the target
/// node. Returns the status contribution: [`ConnectionStatus::Warning`] when
/// both schemas are present and the carried one does not satisfy the
/// expected one, otherwise [`ConnectionStatus::Normal`].
pub fn attach_edge_schema(graph: &DiagramGraph, connection: &mut Connection) -> ConnectionStatus {
    let from_declared = graph
        .node(connection.from_node)
        .and_then(Node::output_schema);
    let to_declared = graph.node(connection.to_node).and_then(Node::output_schema);
    connection.schema = from_declared.or(to_declared).cloned();

    connection.expected_schema = graph
        .node(connection.to_node)
        .and_then(Node::expected_schema)
        .cloned();

    match (&connection.schema, &connection.expected_schema) {
        (Some(actual), Some(expected)) if !compat::schemas_compatible(expected, actual) => {
            ConnectionStatus::Warning
        }
        _ => ConnectionStatus::Normal,
    }
}

/// Recompute a node's derived output schema through its registered
/// capability.
///
/// Returns `Ok(true)` when a fresh schema was stored; the node's outgoing
/// edges are then re-attached so they carry it, with their annotations
/// re-derived from the current findings. Nodes without a capability (or
/// without enough upstream data to infer from) are left untouched.
pub fn infer_node_schema(
    graph: &mut DiagramGraph,
    node_id: NodeId,
    registry: &InferenceRegistry,
) -> Result<bool, InferenceError> {
    let inferred = {
        let Some(node) = graph.node(node_id) else {
            return Ok(false);
        };
        let Some(capability) = registry.get(&node.kind) else {
            return Ok(false);
        };
        let upstream = |index: usize| {
            graph
                .connection_feeding_input(node_id, index)
                .and_then(|connection| connection.schema.clone())
        };
        capability.infer(node, &upstream)?
    };

    let Some(schema) = inferred else {
        return Ok(false);
    };
    if let Some(node) = graph.node_mut(node_id) {
        node.set_property(property_keys::OUTPUT_SCHEMA, PropertyValue::Schema(schema));
    }

    // Outgoing edges now carry the fresh schema. Their status is rebuilt
    // from scratch so findings that no longer hold stop showing; join-key
    // checks re-flag afterwards where they still apply.
    let outgoing: Vec<ConnectionId> = graph.outgoing(node_id).map(|c| c.id).collect();
    for connection_id in outgoing {
        let Some(mut scratch) = graph.connection(connection_id).cloned() else {
            continue;
        };
        scratch.status = ConnectionStatus::default();
        let contribution = attach_edge_schema(graph, &mut scratch);
        scratch.status.escalate(contribution);
        scratch
            .status
            .escalate(validation::reference_status(graph, &scratch));
        if let Some(connection) = graph.connection_mut(connection_id) {
            *connection = scratch;
        }
    }
    Ok(true)
}

/// Check a join node's declared key columns against its upstream schemas.
///
/// When either key cannot be resolved, or the two key columns' declared
/// types disagree, every outgoing edge of the node is flagged with a
/// warning. Nodes of other kinds are ignored.
pub fn validate_join_keys(graph: &mut DiagramGraph, node_id: NodeId) {
    let keys_resolve = {
        let Some(node) = graph.node(node_id) else {
            return;
        };
        if node.kind != JOIN_KIND {
            return;
        }
        join_keys_resolve(graph, node)
    };
    if keys_resolve {
        return;
    }

    let outgoing: Vec<ConnectionId> = graph.outgoing(node_id).map(|c| c.id).collect();
    for connection_id in outgoing {
        if let Some(connection) = graph.connection_mut(connection_id) {
            connection.status.escalate(ConnectionStatus::Warning);
        }
    }
}

fn join_keys_resolve(graph: &DiagramGraph, node: &Node) -> bool {
    let left = graph
        .connection_feeding_input(node.id, 0)
        .and_then(|c| c.schema.as_ref());
    let right = graph
        .connection_feeding_input(node.id, 1)
        .and_then(|c| c.schema.as_ref());
    let (Some(left), Some(right)) = (left, right) else {
        return false;
    };

    let left_key = node.text_property(property_keys::LEFT_KEY);
    let right_key = node.text_property(property_keys::RIGHT_KEY);
    let (Some(left_key), Some(right_key)) = (left_key, right_key) else {
        return false;
    };

    let (Some(left_column), Some(right_column)) = (left.find(left_key), right.find(right_key))
    else {
        return false;
    };
    compat::column_types_agree(left_column, right_column)
}
