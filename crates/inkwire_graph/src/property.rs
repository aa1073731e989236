// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed node properties.
//!
//! Nodes carry a string-keyed bag of [`Property`] values. Each property has a
//! declared kind fixed by its default; writes that change the kind or leave
//! the declared choice list are refused.

use inkwire_schema::{ColumnSchema, ForeignKeyDefinition};
use serde::{Deserialize, Serialize};

/// Well-known property keys used by the engine.
pub mod property_keys {
    /// Declared or inferred output schema of a node ([`ColumnSchema`]).
    ///
    /// [`ColumnSchema`]: inkwire_schema::ColumnSchema
    pub const OUTPUT_SCHEMA: &str = "output_schema";
    /// Schema a node expects on its inputs.
    pub const EXPECTED_SCHEMA: &str = "expected_schema";
    /// Declared foreign-key constraints of an entity node.
    pub const FOREIGN_KEYS: &str = "foreign_keys";
    /// Left join-key column name on a join node.
    pub const LEFT_KEY: &str = "left_key";
    /// Right join-key column name on a join node.
    pub const RIGHT_KEY: &str = "right_key";
}

/// Declared kind of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    /// Free text
    Text,
    /// Numeric value
    Number,
    /// Boolean flag
    Flag,
    /// Column schema
    Schema,
    /// Foreign-key constraint list
    ForeignKeys,
}

/// A property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Free text
    Text(String),
    /// Numeric value
    Number(f64),
    /// Boolean flag
    Flag(bool),
    /// Column schema
    Schema(ColumnSchema),
    /// Foreign-key constraint list
    ForeignKeys(Vec<ForeignKeyDefinition>),
}

impl PropertyValue {
    /// The kind of this value
    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::Text(_) => PropertyKind::Text,
            Self::Number(_) => PropertyKind::Number,
            Self::Flag(_) => PropertyKind::Flag,
            Self::Schema(_) => PropertyKind::Schema,
            Self::ForeignKeys(_) => PropertyKind::ForeignKeys,
        }
    }

    /// Text payload, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Numeric payload, if this is a number value
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Boolean payload, if this is a flag value
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(value) => Some(*value),
            _ => None,
        }
    }

    /// Schema payload, if this is a schema value
    pub fn as_schema(&self) -> Option<&ColumnSchema> {
        match self {
            Self::Schema(schema) => Some(schema),
            _ => None,
        }
    }

    /// Constraint payload, if this is a foreign-key list
    pub fn as_foreign_keys(&self) -> Option<&[ForeignKeyDefinition]> {
        match self {
            Self::ForeignKeys(keys) => Some(keys),
            _ => None,
        }
    }
}

/// A node property: current value, default, and optional choice list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Current value
    pub value: PropertyValue,
    /// Default value; also fixes the property's declared kind
    pub default: PropertyValue,
    /// Permitted values, for text properties with a fixed vocabulary
    pub choices: Option<Vec<String>>,
}

impl Property {
    /// Create a property whose current value starts at its default
    pub fn new(default: PropertyValue) -> Self {
        Self {
            value: default.clone(),
            default,
            choices: None,
        }
    }

    /// Restrict a text property to a fixed set of values
    pub fn with_choices(mut self, choices: Vec<String>) -> Self {
        self.choices = Some(choices);
        self
    }

    /// The declared kind of this property
    pub fn kind(&self) -> PropertyKind {
        self.default.kind()
    }

    /// Set the current value.
    ///
    /// Returns `false` without modifying anything if the new value's kind
    /// differs from the declared kind, or if a choice list is declared and
    /// the text is not in it.
    pub fn set(&mut self, value: PropertyValue) -> bool {
        if value.kind() != self.kind() {
            return false;
        }
        if let (Some(choices), Some(text)) = (&self.choices, value.as_text()) {
            if !choices.iter().any(|choice| choice == text) {
                return false;
            }
        }
        self.value = value;
        true
    }

    /// Reset the current value to the default
    pub fn reset(&mut self) {
        self.value = self.default.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwire_schema::ColumnDefinition;

    #[test]
    fn test_kind_is_fixed_by_default() {
        let mut property = Property::new(PropertyValue::Text(String::new()));
        assert_eq!(property.kind(), PropertyKind::Text);

        assert!(property.set(PropertyValue::Text("CustomerId".into())));
        assert!(!property.set(PropertyValue::Number(1.0)));
        assert_eq!(property.value.as_text(), Some("CustomerId"));
    }

    #[test]
    fn test_choices_restrict_text_values() {
        let mut property = Property::new(PropertyValue::Text("inner".into()))
            .with_choices(vec!["inner".into(), "left".into(), "right".into()]);

        assert!(property.set(PropertyValue::Text("left".into())));
        assert!(!property.set(PropertyValue::Text("cross".into())));
        assert_eq!(property.value.as_text(), Some("left"));
    }

    #[test]
    fn test_reset_restores_default() {
        let mut property = Property::new(PropertyValue::Flag(false));
        assert!(property.set(PropertyValue::Flag(true)));
        property.reset();
        assert_eq!(property.value.as_flag(), Some(false));
    }

    #[test]
    fn test_schema_values_round_trip() {
        let schema: ColumnSchema = [ColumnDefinition::new("Id", "int").primary_key()]
            .into_iter()
            .collect();
        let property = Property::new(PropertyValue::Schema(schema.clone()));
        assert_eq!(property.value.as_schema(), Some(&schema));
        assert!(property.value.as_text().is_none());
    }
}
