// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tabular schema metadata for Inkwire.
//!
//! This crate holds the column-level model shared by diagram hosts and the
//! graph engine:
//! - Ordered column lists with key and nullability flags
//! - Declared foreign-key constraints with referential actions
//! - Comparison rules (schema satisfaction, key-flag and declared-reference
//!   checks)
//!
//! Everything here is plain data with JSON interchange forms; graph structure
//! lives in `inkwire_graph`.

pub mod column;
pub mod compat;
pub mod foreign_key;

pub use column::{ColumnDefinition, ColumnSchema, RowId};
pub use foreign_key::{ForeignKeyDefinition, ReferentialAction};
