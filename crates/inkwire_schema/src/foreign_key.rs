// SPDX-License-Identifier: MIT OR Apache-2.0
//! Declared foreign-key constraints.
//!
//! A [`ForeignKeyDefinition`] pairs local columns with referenced columns
//! positionally: `columns[i]` references `referenced_columns[i]` on the
//! referenced entity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Referential action taken when a referenced row is deleted or updated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferentialAction {
    /// `NO ACTION`
    #[default]
    #[serde(rename = "NO ACTION")]
    NoAction,
    /// `RESTRICT`
    #[serde(rename = "RESTRICT")]
    Restrict,
    /// `CASCADE`
    #[serde(rename = "CASCADE")]
    Cascade,
    /// `SET NULL`
    #[serde(rename = "SET NULL")]
    SetNull,
    /// `SET DEFAULT`
    #[serde(rename = "SET DEFAULT")]
    SetDefault,
}

impl ReferentialAction {
    /// The SQL keyword for this action
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A declared foreign-key constraint on an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyDefinition {
    /// Constraint name
    pub name: String,
    /// Local column names, in constraint order
    pub columns: Vec<String>,
    /// Name of the referenced entity
    pub referenced_entity: String,
    /// Referenced column names, paired positionally with `columns`
    pub referenced_columns: Vec<String>,
    /// Action on delete of the referenced row
    #[serde(default)]
    pub on_delete: ReferentialAction,
    /// Action on update of the referenced row
    #[serde(default)]
    pub on_update: ReferentialAction,
}

impl ForeignKeyDefinition {
    /// Create an empty constraint referencing the given entity
    pub fn new(name: impl Into<String>, referenced_entity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            referenced_entity: referenced_entity.into(),
            referenced_columns: Vec::new(),
            on_delete: ReferentialAction::default(),
            on_update: ReferentialAction::default(),
        }
    }

    /// Add a local/referenced column pair
    pub fn with_pair(
        mut self,
        local_column: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        self.columns.push(local_column.into());
        self.referenced_columns.push(referenced_column.into());
        self
    }

    /// Set the on-delete action
    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = action;
        self
    }

    /// Set the on-update action
    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = action;
        self
    }

    /// Whether the constraint spans more than one column
    pub fn is_composite(&self) -> bool {
        self.columns.len() > 1
    }

    /// Iterate over `(local, referenced)` column pairs
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .zip(self.referenced_columns.iter())
            .map(|(local, referenced)| (local.as_str(), referenced.as_str()))
    }

    /// Whether this constraint declares that `local_column` references
    /// `referenced_column` on `referenced_entity`.
    ///
    /// The column pair must match at the same position; names are compared
    /// exactly, as constraint declarations are.
    pub fn declares(
        &self,
        local_column: &str,
        referenced_entity: &str,
        referenced_column: &str,
    ) -> bool {
        self.referenced_entity == referenced_entity
            && self
                .pairs()
                .any(|(local, referenced)| local == local_column && referenced == referenced_column)
    }

    /// Serialize the constraint to its interchange JSON form
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a constraint from its interchange JSON form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
