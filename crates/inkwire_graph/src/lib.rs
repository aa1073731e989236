// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection-graph engine for Inkwire diagrams.
//!
//! This crate manages the edges of a node diagram so that hosts never
//! rewire them by hand. It powers:
//! - Automation workflows (single-use ports, acyclic)
//! - Entity-relationship diagrams (shared column-level ports)
//!
//! ## Architecture
//!
//! The engine is built on a generic graph model with:
//! - Typed ports with a directed compatibility relation
//! - A connection manager that validates, annotates, and records every edit
//! - Schema propagation along edges with per-kind inference capabilities
//! - Referential validation for column-to-column links
//! - Reversible history and change notification

pub mod node;
pub mod port;
pub mod property;
pub mod connection;
pub mod graph;
pub mod cycle;
pub mod validation;
pub mod propagation;
pub mod history;
pub mod events;
pub mod manager;
pub mod families;

pub use connection::{
    AttachmentPolicy, Connection, ConnectionId, ConnectionStatus, Multiplicity,
};
pub use events::{ChangeListener, GraphChange};
pub use graph::DiagramGraph;
pub use history::HistoryLog;
pub use manager::{ConnectOptions, ConnectOutcome, ConnectionManager, GraphError, RejectReason};
pub use node::{Node, NodeFamily, NodeId, NodeKind, NodeRegistry};
pub use port::{DataType, Port, PortDirection, PortId};
pub use propagation::{InferenceError, InferenceRegistry, SchemaInference};
pub use property::{Property, PropertyKind, PropertyValue};
