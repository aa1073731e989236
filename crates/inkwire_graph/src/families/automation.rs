// SPDX-License-Identifier: MIT OR Apache-2.0
//! Automation workflow nodes.
//!
//! A pipeline runs from a trigger through data-shaping steps to an output.
//! Ports are single-use and the graph must stay acyclic, so these kinds all
//! belong to [`NodeFamily::Automation`].

use indexmap::IndexMap;

use crate::node::{NodeFamily, NodeKind, NodeRegistry};
use crate::port::{DataType, Port};
use crate::property::{property_keys, Property, PropertyValue};
use crate::propagation::{AGGREGATE_KIND, JOIN_KIND, TRANSFORM_KIND};

/// Create the automation workflow node registry
pub fn create_automation_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();

    // Entry points
    registry.register(NodeKind {
        id: "trigger".to_string(),
        name: "Trigger".to_string(),
        family: NodeFamily::Automation,
        description: "Starts the pipeline when its event fires".to_string(),
        inputs: vec![],
        outputs: vec![Port::output("Fired", DataType::Transition)],
        properties: IndexMap::new(),
    });

    registry.register(NodeKind {
        id: "data_source".to_string(),
        name: "Data Source".to_string(),
        family: NodeFamily::Automation,
        description: "Loads rows from an external table".to_string(),
        inputs: vec![Port::input("Run", DataType::Transition)],
        outputs: vec![Port::output("Rows", DataType::Array)],
        properties: IndexMap::new(),
    });

    // Row-shaping steps
    registry.register(NodeKind {
        id: TRANSFORM_KIND.to_string(),
        name: "Transform".to_string(),
        family: NodeFamily::Automation,
        description: "Reshapes each row, passing the schema through".to_string(),
        inputs: vec![Port::input("Rows", DataType::Object)],
        outputs: vec![Port::output("Rows", DataType::Object)],
        properties: IndexMap::new(),
    });

    registry.register(NodeKind {
        id: "filter".to_string(),
        name: "Filter".to_string(),
        family: NodeFamily::Automation,
        description: "Drops rows that fail a predicate".to_string(),
        inputs: vec![Port::input("Rows", DataType::Object)],
        outputs: vec![Port::output("Kept", DataType::Object)],
        properties: IndexMap::new(),
    });

    registry.register(NodeKind {
        id: JOIN_KIND.to_string(),
        name: "Join".to_string(),
        family: NodeFamily::Automation,
        description: "Merges two row streams on a key column pair".to_string(),
        inputs: vec![
            Port::input("Left", DataType::Object),
            Port::input("Right", DataType::Object),
        ],
        outputs: vec![Port::output("Joined", DataType::Object)],
        properties: IndexMap::from([
            (
                property_keys::LEFT_KEY.to_string(),
                Property::new(PropertyValue::Text(String::new())),
            ),
            (
                property_keys::RIGHT_KEY.to_string(),
                Property::new(PropertyValue::Text(String::new())),
            ),
        ]),
    });

    registry.register(NodeKind {
        id: AGGREGATE_KIND.to_string(),
        name: "Aggregate".to_string(),
        family: NodeFamily::Automation,
        description: "Summarizes rows; key columns lose their roles".to_string(),
        inputs: vec![Port::input("Rows", DataType::Object)],
        outputs: vec![Port::output("Summary", DataType::Object)],
        properties: IndexMap::new(),
    });

    // Terminals
    registry.register(NodeKind {
        id: "output".to_string(),
        name: "Output".to_string(),
        family: NodeFamily::Automation,
        description: "Writes the incoming rows to their destination".to_string(),
        inputs: vec![Port::input("Rows", DataType::Any)],
        outputs: vec![],
        properties: IndexMap::new(),
    });

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_the_pipeline_kinds() {
        let registry = create_automation_registry();
        for kind in [
            "trigger",
            "data_source",
            "transform",
            "filter",
            "join",
            "aggregate",
            "output",
        ] {
            let found = registry.get(kind).unwrap();
            assert_eq!(found.family, NodeFamily::Automation);
        }
        assert_eq!(
            registry.kinds_in_family(NodeFamily::Automation).count(),
            7
        );
    }

    #[test]
    fn test_join_kind_carries_key_properties() {
        let registry = create_automation_registry();
        let join = registry.create_node("join").unwrap();

        assert_eq!(join.inputs.len(), 2);
        assert_eq!(join.text_property(property_keys::LEFT_KEY), Some(""));
        assert_eq!(join.text_property(property_keys::RIGHT_KEY), Some(""));
    }

    #[test]
    fn test_pipeline_port_types_line_up() {
        let registry = create_automation_registry();
        let trigger = registry.create_node("trigger").unwrap();
        let source = registry.create_node("data_source").unwrap();
        let transform = registry.create_node("transform").unwrap();

        // trigger -> data_source -> transform is connectable end to end
        assert!(trigger.outputs[0]
            .data_type
            .can_feed(&source.inputs[0].data_type));
        assert!(source.outputs[0]
            .data_type
            .can_feed(&transform.inputs[0].data_type));
    }
}
