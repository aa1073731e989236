// SPDX-License-Identifier: MIT OR Apache-2.0
//! Entity-relationship diagram nodes.
//!
//! An entity is a generic-family node with one input and one output port per
//! schema column, each anchored to the column's row. Edges between entities
//! can therefore point at individual columns from either side, which is what
//! lets referential validation name the exact column pair involved.

use inkwire_schema::{ColumnSchema, ForeignKeyDefinition, RowId};

use crate::node::{Node, NodeFamily};
use crate::port::{DataType, Port};
use crate::property::{property_keys, PropertyValue};

/// Kind identifier for entity nodes
pub const ENTITY_KIND: &str = "entity";

/// Create an entity node for a table schema.
///
/// The schema is stored on the node as its declared output schema, and every
/// column gets a matched pair of row-anchored link ports.
pub fn entity_node(name: impl Into<String>, schema: ColumnSchema) -> Node {
    let mut node = Node::new(ENTITY_KIND, name, NodeFamily::Generic);
    for (index, column) in schema.columns().enumerate() {
        let row = RowId(index);
        node.inputs
            .push(Port::input(column.name.as_str(), DataType::Link).for_row(row));
        node.outputs
            .push(Port::output(column.name.as_str(), DataType::Link).for_row(row));
    }
    node.set_property(property_keys::OUTPUT_SCHEMA, PropertyValue::Schema(schema));
    node
}

/// Create an entity node that also declares foreign-key constraints.
pub fn entity_with_foreign_keys(
    name: impl Into<String>,
    schema: ColumnSchema,
    foreign_keys: Vec<ForeignKeyDefinition>,
) -> Node {
    let mut node = entity_node(name, schema);
    node.set_property(
        property_keys::FOREIGN_KEYS,
        PropertyValue::ForeignKeys(foreign_keys),
    );
    node
}
