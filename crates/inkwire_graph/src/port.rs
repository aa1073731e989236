// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for node inputs/outputs.

use std::fmt;

use inkwire_schema::RowId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortId(pub Uuid);

impl PortId {
    /// Create a new random port ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PortId {
    fn default() -> Self {
        Self::new()
    }
}

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

/// Data type that can flow through ports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Any type (for generic ports)
    Any,
    /// Text value
    String,
    /// Numeric value
    Number,
    /// Boolean value
    Boolean,
    /// Structured record
    Object,
    /// Ordered collection
    Array,
    /// Diagram link anchor (entity columns)
    Link,
    /// Control-flow step (automation triggers)
    Transition,
    /// Custom type
    Custom(String),
}

impl DataType {
    /// Check whether a value of this type can feed a port of `target` type.
    ///
    /// The relation is directed: `number` can feed `string` but not the
    /// reverse. Callers must not symmetrize it.
    pub fn can_feed(&self, target: &DataType) -> bool {
        // Any type connects in either direction
        if matches!(self, Self::Any) || matches!(target, Self::Any) {
            return true;
        }

        // Identical types always connect
        if self == target {
            return true;
        }

        // Directed widenings
        match (self, target) {
            (Self::Number, Self::String) => true,
            (Self::String, Self::Object) => true,
            (Self::Array, Self::Object) | (Self::Object, Self::Array) => true,
            (Self::Boolean, Self::Number | Self::String) => true,
            // No other implicit conversions
            _ => false,
        }
    }

    /// Get the color for this data type (for UI)
    pub fn color(&self) -> [u8; 3] {
        match self {
            Self::Any => [150, 150, 150],
            Self::String => [200, 180, 150],
            Self::Number => [80, 200, 80],
            Self::Boolean => [200, 80, 80],
            Self::Object => [150, 100, 200],
            Self::Array => [80, 200, 200],
            Self::Link => [100, 150, 200],
            Self::Transition => [200, 200, 200],
            Self::Custom(_) => [128, 128, 128],
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::String => f.write_str("string"),
            Self::Number => f.write_str("number"),
            Self::Boolean => f.write_str("boolean"),
            Self::Object => f.write_str("object"),
            Self::Array => f.write_str("array"),
            Self::Link => f.write_str("link"),
            Self::Transition => f.write_str("transition"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

/// A port on a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    /// Unique port ID
    pub id: PortId,
    /// Port name
    pub name: String,
    /// Port direction
    pub direction: PortDirection,
    /// Data type
    pub data_type: DataType,
    /// Whether the port can accept a new single-use connection
    pub available: bool,
    /// Row position, for ports that anchor a column of a tabular entity
    pub row: Option<RowId>,
}

impl Port {
    /// Create a new input port
    pub fn input(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id: PortId::new(),
            name: name.into(),
            direction: PortDirection::Input,
            data_type,
            available: true,
            row: None,
        }
    }

    /// Create a new output port
    pub fn output(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id: PortId::new(),
            name: name.into(),
            direction: PortDirection::Output,
            data_type,
            available: true,
            row: None,
        }
    }

    /// Anchor the port to a column row
    pub fn for_row(mut self, row: RowId) -> Self {
        self.row = Some(row);
        self
    }

    /// Check if a connection from this port to another is valid.
    ///
    /// One side must be an output and the other an input, and the output's
    /// type must be able to feed the input's type.
    pub fn can_connect(&self, other: &Port) -> bool {
        // Must be opposite directions
        if self.direction == other.direction {
            return false;
        }

        match self.direction {
            PortDirection::Output => self.data_type.can_feed(&other.data_type),
            PortDirection::Input => other.data_type.can_feed(&self.data_type),
        }
    }
}
