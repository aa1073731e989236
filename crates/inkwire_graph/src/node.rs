// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the diagram graph.

use indexmap::IndexMap;
use inkwire_schema::{ColumnSchema, ForeignKeyDefinition, RowId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::port::{Port, PortDirection, PortId};
use crate::property::{property_keys, Property, PropertyValue};

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Family a node belongs to, which decides how its edges are created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeFamily {
    /// Workflow nodes: ports are single-use and the graph must stay acyclic
    Automation,
    /// Free-form diagram nodes: ports are shared and fan-out is permitted
    Generic,
}

/// Node kind definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeKind {
    /// Unique kind identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Family
    pub family: NodeFamily,
    /// Description
    pub description: String,
    /// Default input ports
    pub inputs: Vec<Port>,
    /// Default output ports
    pub outputs: Vec<Port>,
    /// Default properties
    pub properties: IndexMap<String, Property>,
}

impl NodeKind {
    /// Create a kind with no ports or properties
    pub fn new(id: impl Into<String>, name: impl Into<String>, family: NodeFamily) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            family,
            description: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            properties: IndexMap::new(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add an input port template
    pub fn with_input(mut self, port: Port) -> Self {
        self.inputs.push(port);
        self
    }

    /// Add an output port template
    pub fn with_output(mut self, port: Port) -> Self {
        self.outputs.push(port);
        self
    }

    /// Add a default property
    pub fn with_property(mut self, key: impl Into<String>, property: Property) -> Self {
        self.properties.insert(key.into(), property);
        self
    }
}

/// A node instance in the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Kind identifier; drives capability dispatch
    pub kind: String,
    /// Display name (can be customized)
    pub name: String,
    /// Family
    pub family: NodeFamily,
    /// Input ports
    pub inputs: Vec<Port>,
    /// Output ports
    pub outputs: Vec<Port>,
    /// Property bag
    pub properties: IndexMap<String, Property>,
}

impl Node {
    /// Create a bare node with no ports or properties
    pub fn new(kind: impl Into<String>, name: impl Into<String>, family: NodeFamily) -> Self {
        Self {
            id: NodeId::new(),
            kind: kind.into(),
            name: name.into(),
            family,
            inputs: Vec::new(),
            outputs: Vec::new(),
            properties: IndexMap::new(),
        }
    }

    /// Create a node instance from a kind definition.
    ///
    /// Template ports get fresh IDs so that several instances of the same
    /// kind never share a port identity.
    pub fn from_kind(kind: &NodeKind) -> Self {
        let instantiate = |template: &Port| {
            let mut port = template.clone();
            port.id = PortId::new();
            port
        };
        Self {
            id: NodeId::new(),
            kind: kind.id.clone(),
            name: kind.name.clone(),
            family: kind.family,
            inputs: kind.inputs.iter().map(instantiate).collect(),
            outputs: kind.outputs.iter().map(instantiate).collect(),
            properties: kind.properties.clone(),
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Get an input port by index
    pub fn input(&self, index: usize) -> Option<&Port> {
        self.inputs.get(index)
    }

    /// Get an output port by index
    pub fn output(&self, index: usize) -> Option<&Port> {
        self.outputs.get(index)
    }

    /// Get a port by ID
    pub fn port(&self, port_id: PortId) -> Option<&Port> {
        self.ports().find(|port| port.id == port_id)
    }

    /// Get a mutable port by ID
    pub fn port_mut(&mut self, port_id: PortId) -> Option<&mut Port> {
        self.inputs
            .iter_mut()
            .chain(self.outputs.iter_mut())
            .find(|port| port.id == port_id)
    }

    /// Get all ports
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    /// First output port, regardless of availability
    pub fn first_output(&self) -> Option<&Port> {
        self.outputs.first()
    }

    /// First input port, regardless of availability
    pub fn first_input(&self) -> Option<&Port> {
        self.inputs.first()
    }

    /// First output port still available for a single-use connection
    pub fn first_available_output(&self) -> Option<&Port> {
        self.outputs.iter().find(|port| port.available)
    }

    /// First input port still available for a single-use connection
    pub fn first_available_input(&self) -> Option<&Port> {
        self.inputs.iter().find(|port| port.available)
    }

    /// Output port anchored to the given column row
    pub fn row_output(&self, row: RowId) -> Option<&Port> {
        self.outputs.iter().find(|port| port.row == Some(row))
    }

    /// Input port anchored to the given column row
    pub fn row_input(&self, row: RowId) -> Option<&Port> {
        self.inputs.iter().find(|port| port.row == Some(row))
    }

    /// Index of a port within its direction's list
    pub fn port_index(&self, port_id: PortId) -> Option<(PortDirection, usize)> {
        if let Some(index) = self.inputs.iter().position(|port| port.id == port_id) {
            return Some((PortDirection::Input, index));
        }
        self.outputs
            .iter()
            .position(|port| port.id == port_id)
            .map(|index| (PortDirection::Output, index))
    }

    /// Get a property's current value
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key).map(|property| &property.value)
    }

    /// Set a property's current value.
    ///
    /// An existing property keeps its declared kind; a write of a different
    /// kind is refused. Absent keys are created with the value as default.
    /// Returns whether the value was stored.
    pub fn set_property(&mut self, key: impl Into<String>, value: PropertyValue) -> bool {
        match self.properties.entry(key.into()) {
            indexmap::map::Entry::Occupied(mut entry) => entry.get_mut().set(value),
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(Property::new(value));
                true
            }
        }
    }

    /// Text payload of a property, if present
    pub fn text_property(&self, key: &str) -> Option<&str> {
        self.property(key).and_then(PropertyValue::as_text)
    }

    /// Schema payload of a property, if present
    pub fn schema_property(&self, key: &str) -> Option<&ColumnSchema> {
        self.property(key).and_then(PropertyValue::as_schema)
    }

    /// The node's declared or inferred output schema, if any
    pub fn output_schema(&self) -> Option<&ColumnSchema> {
        self.schema_property(property_keys::OUTPUT_SCHEMA)
    }

    /// The schema this node expects on its inputs, if declared
    pub fn expected_schema(&self) -> Option<&ColumnSchema> {
        self.schema_property(property_keys::EXPECTED_SCHEMA)
    }

    /// Declared foreign-key constraints, if any
    pub fn foreign_keys(&self) -> Option<&[ForeignKeyDefinition]> {
        self.property(property_keys::FOREIGN_KEYS)
            .and_then(PropertyValue::as_foreign_keys)
    }
}

/// Registry of available node kinds
pub struct NodeRegistry {
    /// Registered kinds by ID
    kinds: IndexMap<String, NodeKind>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            kinds: IndexMap::new(),
        }
    }

    /// Register a node kind
    pub fn register(&mut self, kind: NodeKind) {
        self.kinds.insert(kind.id.clone(), kind);
    }

    /// Get a kind by ID
    pub fn get(&self, id: &str) -> Option<&NodeKind> {
        self.kinds.get(id)
    }

    /// Get all registered kinds
    pub fn kinds(&self) -> impl Iterator<Item = &NodeKind> {
        self.kinds.values()
    }

    /// Get kinds belonging to a family
    pub fn kinds_in_family(&self, family: NodeFamily) -> impl Iterator<Item = &NodeKind> {
        self.kinds.values().filter(move |kind| kind.family == family)
    }

    /// Create a node from a kind ID
    pub fn create_node(&self, kind_id: &str) -> Option<Node> {
        self.get(kind_id).map(Node::from_kind)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::DataType;

    fn transform_kind() -> NodeKind {
        NodeKind::new("transform", "Transform", NodeFamily::Automation)
            .with_input(Port::input("Input", DataType::Object))
            .with_output(Port::output("Output", DataType::Object))
            .with_property("label", Property::new(PropertyValue::Text(String::new())))
    }

    #[test]
    fn test_instances_get_fresh_port_ids() {
        let kind = transform_kind();
        let a = Node::from_kind(&kind);
        let b = Node::from_kind(&kind);

        assert_ne!(a.id, b.id);
        assert_ne!(a.inputs[0].id, b.inputs[0].id);
        assert_ne!(a.inputs[0].id, kind.inputs[0].id);
        assert_eq!(a.kind, "transform");
    }

    #[test]
    fn test_port_lookup_by_id_and_row() {
        let mut node = Node::new("entity", "Customer", NodeFamily::Generic);
        node.outputs
            .push(Port::output("Id", DataType::Link).for_row(RowId(0)));
        node.inputs
            .push(Port::input("Id", DataType::Link).for_row(RowId(0)));

        let out_id = node.outputs[0].id;
        assert_eq!(node.port(out_id).map(|p| p.name.as_str()), Some("Id"));
        assert_eq!(
            node.port_index(out_id),
            Some((PortDirection::Output, 0))
        );
        assert!(node.row_output(RowId(0)).is_some());
        assert!(node.row_output(RowId(1)).is_none());
    }

    #[test]
    fn test_set_property_keeps_declared_kind() {
        let mut node = Node::from_kind(&transform_kind());
        assert!(node.set_property("label", PropertyValue::Text("Clean".into())));
        assert!(!node.set_property("label", PropertyValue::Flag(true)));
        assert_eq!(node.text_property("label"), Some("Clean"));

        // Unknown keys are created on first write
        assert!(node.set_property("threshold", PropertyValue::Number(0.5)));
        assert_eq!(
            node.property("threshold").and_then(PropertyValue::as_number),
            Some(0.5)
        );
    }

    #[test]
    fn test_first_available_skips_consumed_ports() {
        let mut node = Node::new("join", "Join", NodeFamily::Automation);
        node.inputs.push(Port::input("Left", DataType::Object));
        node.inputs.push(Port::input("Right", DataType::Object));
        node.inputs[0].available = false;

        let available = node.first_available_input().map(|p| p.name.clone());
        assert_eq!(available.as_deref(), Some("Right"));
    }

    #[test]
    fn test_registry_creates_instances() {
        let mut registry = NodeRegistry::new();
        registry.register(transform_kind());

        assert!(registry.get("transform").is_some());
        assert!(registry.create_node("missing").is_none());

        let node = registry.create_node("transform").unwrap();
        assert_eq!(node.family, NodeFamily::Automation);
        assert_eq!(registry.kinds_in_family(NodeFamily::Automation).count(), 1);
    }
}
