// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cycle prevention for automation graphs.

use std::collections::HashSet;

use crate::graph::DiagramGraph;
use crate::node::NodeId;

/// Error when the graph contains a cycle
#[derive(Debug, thiserror::Error)]
#[error("Graph contains a cycle")]
pub struct CycleError;

/// Check whether adding an edge `from -> to` would close a directed cycle.
///
/// Walks existing edges forward from `to`; if `from` is reachable, the new
/// edge would complete a loop. A self-loop always counts as a cycle.
pub fn would_create_cycle(graph: &DiagramGraph, from: NodeId, to: NodeId) -> bool {
    if from == to {
        return true;
    }

    let mut visited = HashSet::new();
    let mut stack = vec![to];

    while let Some(node_id) = stack.pop() {
        if node_id == from {
            return true;
        }
        if !visited.insert(node_id) {
            continue;
        }
        for connection in graph.outgoing(node_id) {
            if !visited.contains(&connection.to_node) {
                stack.push(connection.to_node);
            }
        }
    }

    false
}

/// Whether the graph's directed edges form no cycle
pub fn is_acyclic(graph: &DiagramGraph) -> bool {
    topological_order(graph).is_ok()
}

/// Get nodes in topological order (sources before sinks)
pub fn topological_order(graph: &DiagramGraph) -> Result<Vec<NodeId>, CycleError> {
    let mut visited = HashSet::new();
    let mut temp_mark = HashSet::new();
    let mut order = Vec::new();

    for node_id in graph.node_ids() {
        if !visited.contains(&node_id) {
            visit(graph, node_id, &mut visited, &mut temp_mark, &mut order)?;
        }
    }

    // Dependencies are visited before the nodes that need them, so the
    // post-order is already sources-first.
    Ok(order)
}

fn visit(
    graph: &DiagramGraph,
    node_id: NodeId,
    visited: &mut HashSet<NodeId>,
    temp_mark: &mut HashSet<NodeId>,
    order: &mut Vec<NodeId>,
) -> Result<(), CycleError> {
    if temp_mark.contains(&node_id) {
        return Err(CycleError);
    }
    if visited.contains(&node_id) {
        return Ok(());
    }

    temp_mark.insert(node_id);

    // Visit everything this node depends on first
    for connection in graph.incoming(node_id) {
        visit(graph, connection.from_node, visited, temp_mark, order)?;
    }

    temp_mark.remove(&node_id);
    visited.insert(node_id);
    order.push(node_id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{AttachmentPolicy, Connection};
    use crate::node::{Node, NodeFamily};
    use crate::port::{DataType, Port};

    fn node_with_ports(graph: &mut DiagramGraph, name: &str) -> NodeId {
        let mut node = Node::new("transform", name, NodeFamily::Automation);
        node.inputs.push(Port::input("In", DataType::Any));
        node.outputs.push(Port::output("Out", DataType::Any));
        graph.add_node(node)
    }

    fn link(graph: &mut DiagramGraph, from: NodeId, to: NodeId) {
        let from_port = graph.node(from).unwrap().outputs[0].id;
        let to_port = graph.node(to).unwrap().inputs[0].id;
        graph.insert_connection(Connection::new(
            from,
            from_port,
            to,
            to_port,
            AttachmentPolicy::Exclusive,
        ));
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let mut graph = DiagramGraph::new("test");
        let a = node_with_ports(&mut graph, "A");
        assert!(would_create_cycle(&graph, a, a));
    }

    #[test]
    fn test_closing_edge_on_a_chain_is_detected() {
        let mut graph = DiagramGraph::new("test");
        let a = node_with_ports(&mut graph, "A");
        let b = node_with_ports(&mut graph, "B");
        let c = node_with_ports(&mut graph, "C");
        link(&mut graph, a, b);
        link(&mut graph, b, c);

        assert!(would_create_cycle(&graph, c, a));
        assert!(would_create_cycle(&graph, b, a));
        assert!(!would_create_cycle(&graph, a, c));
        assert!(is_acyclic(&graph));
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let mut graph = DiagramGraph::new("test");
        let a = node_with_ports(&mut graph, "A");
        let b = node_with_ports(&mut graph, "B");
        let c = node_with_ports(&mut graph, "C");
        let d = node_with_ports(&mut graph, "D");
        link(&mut graph, a, b);
        link(&mut graph, a, c);
        link(&mut graph, b, d);
        link(&mut graph, c, d);

        assert!(!would_create_cycle(&graph, b, c));
        assert!(is_acyclic(&graph));
    }

    #[test]
    fn test_topological_order_puts_sources_first() {
        let mut graph = DiagramGraph::new("test");
        let a = node_with_ports(&mut graph, "A");
        let b = node_with_ports(&mut graph, "B");
        let c = node_with_ports(&mut graph, "C");
        link(&mut graph, b, c);
        link(&mut graph, a, b);

        let order = topological_order(&graph).unwrap();
        let pos = |id: NodeId| order.iter().position(|n| *n == id).unwrap();
        assert!(pos(a) < pos(b));
        assert!(pos(b) < pos(c));
    }

    #[test]
    fn test_topological_order_fails_on_cycle() {
        let mut graph = DiagramGraph::new("test");
        let a = node_with_ports(&mut graph, "A");
        let b = node_with_ports(&mut graph, "B");
        link(&mut graph, a, b);
        link(&mut graph, b, a);

        assert!(topological_order(&graph).is_err());
        assert!(!is_acyclic(&graph));
    }
}
