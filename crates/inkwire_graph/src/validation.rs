// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection validation rules: kind pairing and referential checks.
//!
//! The predicates here are pure; the connection manager decides whether a
//! failure blocks the edge (kind pairing) or only annotates it (referential
//! checks).

use inkwire_schema::compat;

use crate::connection::{Connection, ConnectionStatus};
use crate::graph::DiagramGraph;

/// Node-kind pairs that may never be linked directly, as `(from, to)`.
const DISALLOWED_KIND_PAIRS: &[(&str, &str)] = &[
    ("trigger", "trigger"),
    ("data_source", "data_source"),
    ("output", "output"),
];

/// Check whether an edge from one node kind to another is permitted
pub fn kind_pair_allowed(from_kind: &str, to_kind: &str) -> bool {
    !DISALLOWED_KIND_PAIRS
        .iter()
        .any(|(from, to)| *from == from_kind && *to == to_kind)
}

/// Judge the referential validity of a row-level connection.
///
/// The reference is considered valid when either rule holds:
/// 1. key flags: one column is flagged as a foreign key and the other as a
///    primary key, in either orientation;
/// 2. declared constraints: either endpoint's entity declares a foreign key
///    pairing the two columns positionally, referencing the peer entity by
///    node name.
///
/// An unverifiable reference (missing schema, row out of range, or neither
/// rule satisfied) yields [`ConnectionStatus::Warning`]. Connections that
/// are not row-level are always [`ConnectionStatus::Normal`].
pub fn reference_status(graph: &DiagramGraph, connection: &Connection) -> ConnectionStatus {
    let (Some(from_row), Some(to_row)) = (connection.from_row, connection.to_row) else {
        return ConnectionStatus::Normal;
    };
    let (Some(from_node), Some(to_node)) = (
        graph.node(connection.from_node),
        graph.node(connection.to_node),
    ) else {
        return ConnectionStatus::Warning;
    };

    let source_column = from_node.output_schema().and_then(|s| s.get(from_row));
    let target_column = to_node.output_schema().and_then(|s| s.get(to_row));
    let (Some(source_column), Some(target_column)) = (source_column, target_column) else {
        return ConnectionStatus::Warning;
    };

    if compat::key_flags_satisfy(source_column, target_column) {
        return ConnectionStatus::Normal;
    }

    let declared_on_source = from_node.foreign_keys().is_some_and(|keys| {
        compat::declared_reference_matches(keys, &source_column.name, &to_node.name, &target_column.name)
    });
    let declared_on_target = to_node.foreign_keys().is_some_and(|keys| {
        compat::declared_reference_matches(keys, &target_column.name, &from_node.name, &source_column.name)
    });

    if declared_on_source || declared_on_target {
        ConnectionStatus::Normal
    } else {
        ConnectionStatus::Warning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwire_schema::{ColumnDefinition, ColumnSchema, ForeignKeyDefinition, RowId};

    use crate::connection::AttachmentPolicy;
    use crate::node::{Node, NodeFamily, NodeId};
    use crate::port::{DataType, Port, PortId};
    use crate::property::{property_keys, PropertyValue};

    #[test]
    fn test_same_kind_pairs_are_disallowed() {
        assert!(!kind_pair_allowed("trigger", "trigger"));
        assert!(!kind_pair_allowed("data_source", "data_source"));
        assert!(kind_pair_allowed("trigger", "data_source"));
        assert!(kind_pair_allowed("data_source", "transform"));
    }

    fn entity(graph: &mut DiagramGraph, name: &str, schema: ColumnSchema) -> NodeId {
        let mut node = Node::new("entity", name, NodeFamily::Generic);
        for (index, column) in schema.columns().enumerate() {
            let row = RowId(index);
            node.outputs
                .push(Port::output(column.name.clone(), DataType::Link).for_row(row));
            node.inputs
                .push(Port::input(column.name.clone(), DataType::Link).for_row(row));
        }
        node.set_property(property_keys::OUTPUT_SCHEMA, PropertyValue::Schema(schema));
        graph.add_node(node)
    }

    fn row_connection(
        graph: &DiagramGraph,
        from: NodeId,
        from_row: RowId,
        to: NodeId,
        to_row: RowId,
    ) -> Connection {
        let from_port = graph.node(from).unwrap().row_output(from_row).unwrap().id;
        let to_port = graph.node(to).unwrap().row_input(to_row).unwrap().id;
        let mut connection =
            Connection::new(from, from_port, to, to_port, AttachmentPolicy::Shared);
        connection.from_row = Some(from_row);
        connection.to_row = Some(to_row);
        connection
    }

    #[test]
    fn test_key_flags_make_a_reference_valid() {
        let mut graph = DiagramGraph::new("erd");
        let orders = entity(
            &mut graph,
            "Order",
            [ColumnDefinition::new("CustomerId", "int").foreign_key()]
                .into_iter()
                .collect(),
        );
        let customers = entity(
            &mut graph,
            "Customer",
            [ColumnDefinition::new("Id", "int").primary_key()]
                .into_iter()
                .collect(),
        );

        let connection = row_connection(&graph, orders, RowId(0), customers, RowId(0));
        assert_eq!(reference_status(&graph, &connection), ConnectionStatus::Normal);
    }

    #[test]
    fn test_declared_constraint_makes_a_reference_valid() {
        let mut graph = DiagramGraph::new("erd");
        let orders = entity(
            &mut graph,
            "Order",
            [ColumnDefinition::new("CustomerId", "int")]
                .into_iter()
                .collect(),
        );
        let customers = entity(
            &mut graph,
            "Customer",
            [ColumnDefinition::new("Id", "int")].into_iter().collect(),
        );
        graph.node_mut(orders).unwrap().set_property(
            property_keys::FOREIGN_KEYS,
            PropertyValue::ForeignKeys(vec![ForeignKeyDefinition::new(
                "fk_order_customer",
                "Customer",
            )
            .with_pair("CustomerId", "Id")]),
        );

        let connection = row_connection(&graph, orders, RowId(0), customers, RowId(0));
        assert_eq!(reference_status(&graph, &connection), ConnectionStatus::Normal);
    }

    #[test]
    fn test_unverified_reference_warns() {
        let mut graph = DiagramGraph::new("erd");
        let orders = entity(
            &mut graph,
            "Order",
            [ColumnDefinition::new("CustomerId", "int")]
                .into_iter()
                .collect(),
        );
        let customers = entity(
            &mut graph,
            "Customer",
            [ColumnDefinition::new("Id", "int")].into_iter().collect(),
        );

        let connection = row_connection(&graph, orders, RowId(0), customers, RowId(0));
        assert_eq!(
            reference_status(&graph, &connection),
            ConnectionStatus::Warning
        );
    }

    #[test]
    fn test_constraint_on_wrong_entity_still_warns() {
        let mut graph = DiagramGraph::new("erd");
        let orders = entity(
            &mut graph,
            "Order",
            [ColumnDefinition::new("CustomerId", "int")]
                .into_iter()
                .collect(),
        );
        let customers = entity(
            &mut graph,
            "Customer",
            [ColumnDefinition::new("Id", "int")].into_iter().collect(),
        );
        graph.node_mut(orders).unwrap().set_property(
            property_keys::FOREIGN_KEYS,
            PropertyValue::ForeignKeys(vec![ForeignKeyDefinition::new("fk_region", "Region")
                .with_pair("CustomerId", "Id")]),
        );

        let connection = row_connection(&graph, orders, RowId(0), customers, RowId(0));
        assert_eq!(
            reference_status(&graph, &connection),
            ConnectionStatus::Warning
        );
    }

    #[test]
    fn test_non_row_connections_are_never_checked() {
        let graph = DiagramGraph::new("flow");
        let connection = Connection::new(
            NodeId::new(),
            PortId::new(),
            NodeId::new(),
            PortId::new(),
            AttachmentPolicy::Exclusive,
        );
        assert_eq!(reference_status(&graph, &connection), ConnectionStatus::Normal);
    }
}
