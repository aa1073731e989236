// SPDX-License-Identifier: MIT OR Apache-2.0
//! Schema comparison and referential validity rules.
//!
//! These are pure predicates over column metadata; callers decide what a
//! failed check means (typically a warning annotation, never a hard error).

use crate::column::{ColumnDefinition, ColumnSchema};
use crate::foreign_key::ForeignKeyDefinition;

/// Whether `actual` satisfies `expected`.
///
/// Every expected column must be present in `actual` by case-insensitive
/// name. When both sides declare a data type, the types must also match
/// case-insensitively; an unspecified type on either side never fails the
/// comparison. Extra columns in `actual` are ignored.
pub fn schemas_compatible(expected: &ColumnSchema, actual: &ColumnSchema) -> bool {
    expected.columns().all(|wanted| {
        actual
            .find(&wanted.name)
            .is_some_and(|found| column_types_agree(wanted, found))
    })
}

/// Whether two columns' declared types agree.
///
/// Agreement requires case-insensitive equality, but only when both sides
/// actually declare a type.
pub fn column_types_agree(a: &ColumnDefinition, b: &ColumnDefinition) -> bool {
    if !a.has_data_type() || !b.has_data_type() {
        return true;
    }
    a.data_type.eq_ignore_ascii_case(&b.data_type)
}

/// Whether a source/target column pair satisfies the legacy key-flag rule:
/// one side flagged as a foreign key, the other as a primary key, in either
/// orientation.
pub fn key_flags_satisfy(source: &ColumnDefinition, target: &ColumnDefinition) -> bool {
    (source.is_foreign_key && target.is_primary_key)
        || (source.is_primary_key && target.is_foreign_key)
}

/// Whether any declared constraint states that `local_column` references
/// `referenced_column` on `referenced_entity`, with the pair at matching
/// positions.
pub fn declared_reference_matches(
    declarations: &[ForeignKeyDefinition],
    local_column: &str,
    referenced_entity: &str,
    referenced_column: &str,
) -> bool {
    declarations
        .iter()
        .any(|fk| fk.declares(local_column, referenced_entity, referenced_column))
}
