// src/services/mapper.rs

//! Document mapper.
//!
//! Folds a record's fields into a search document. A field seen once stays a
//! scalar column; the first repeat promotes it to a sequence in record order.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::models::{ColumnValue, FieldEntry, SearchDocument};

/// Colons are reserved in index ids.
const COLON_ESCAPE: &str = "_3A";

/// Build the index id for a raw record identifier.
///
/// An identifier that already contains the escape token cannot be told apart
/// from an escaped colon; such ids are logged, not altered.
pub fn escape_identifier(raw: &str) -> String {
    if raw.contains(COLON_ESCAPE) {
        log::warn!(
            "Identifier {:?} already contains {}; its index id may collide",
            raw,
            COLON_ESCAPE
        );
    }
    raw.replace(':', COLON_ESCAPE)
}

/// Map extracted fields into a search document.
///
/// `id` must already be escaped with [`escape_identifier`].
pub fn map_document(
    id: &str,
    collection_key: &str,
    institution_key: &str,
    fields: impl IntoIterator<Item = FieldEntry>,
) -> SearchDocument {
    let mut columns: BTreeMap<String, ColumnValue> = BTreeMap::new();

    for FieldEntry { field, value } in fields {
        match columns.entry(field.column().to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(ColumnValue::Scalar(value));
            }
            Entry::Occupied(mut slot) => slot.get_mut().push(value),
        }
    }

    SearchDocument {
        id: id.to_string(),
        collection_name: collection_key.to_string(),
        institution_name: institution_key.to_string(),
        columns,
    }
}
