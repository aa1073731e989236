// SPDX-License-Identifier: MIT OR Apache-2.0
//! Column descriptors for tabular entities.
//!
//! A [`ColumnSchema`] is the ordered list of columns an entity declares or an
//! edge carries. Columns are addressed by name (case-insensitive) or by their
//! row position within the list.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of a column within its owning entity's column list.
///
/// Interchange payloads identify columns purely by order, so the row id is the
/// zero-based index into the entity's [`ColumnSchema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(pub usize);

impl RowId {
    /// The zero-based index this row id refers to
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}", self.0)
    }
}

/// A single named, typed column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,
    /// Declared data type tag (e.g. `"int"`, `"varchar"`). Empty means
    /// unspecified; unspecified types never fail a comparison.
    #[serde(default)]
    pub data_type: String,
    /// Whether the column is part of the primary key
    #[serde(default)]
    pub is_primary_key: bool,
    /// Whether the column is flagged as a foreign key
    #[serde(default)]
    pub is_foreign_key: bool,
    /// Whether the column accepts NULL
    #[serde(default)]
    pub is_nullable: bool,
}

impl ColumnDefinition {
    /// Create a column with the given name and declared type
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_primary_key: false,
            is_foreign_key: false,
            is_nullable: false,
        }
    }

    /// Mark the column as part of the primary key
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    /// Mark the column as a foreign key
    pub fn foreign_key(mut self) -> Self {
        self.is_foreign_key = true;
        self
    }

    /// Mark the column as nullable
    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    /// Whether a declared type is present
    pub fn has_data_type(&self) -> bool {
        !self.data_type.is_empty()
    }

    /// Check the column name case-insensitively
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// An ordered list of column descriptors.
///
/// Serializes as a bare JSON array of column objects, which is the interchange
/// form hosts store in node property maps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnSchema {
    columns: Vec<ColumnDefinition>,
}

impl ColumnSchema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a schema from an existing column list
    pub fn from_columns(columns: Vec<ColumnDefinition>) -> Self {
        Self { columns }
    }

    /// Append a column, returning its row id
    pub fn push(&mut self, column: ColumnDefinition) -> RowId {
        self.columns.push(column);
        RowId(self.columns.len() - 1)
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate over the columns in declaration order
    pub fn columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter()
    }

    /// Get the column at the given row position
    pub fn get(&self, row: RowId) -> Option<&ColumnDefinition> {
        self.columns.get(row.0)
    }

    /// Find a column by name (case-insensitive)
    pub fn find(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|column| column.is_named(name))
    }

    /// Get the row position of the named column (case-insensitive)
    pub fn row_of(&self, name: &str) -> Option<RowId> {
        self.columns
            .iter()
            .position(|column| column.is_named(name))
            .map(RowId)
    }

    /// Whether a column with the given name exists (case-insensitive)
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Serialize the schema to its interchange JSON form
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a schema from its interchange JSON form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl FromIterator<ColumnDefinition> for ColumnSchema {
    fn from_iter<I: IntoIterator<Item = ColumnDefinition>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ColumnSchema {
    type Item = &'a ColumnDefinition;
    type IntoIter = std::slice::Iter<'a, ColumnDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
