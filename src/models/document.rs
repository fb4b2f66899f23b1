//! Search document sent to the index.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A column holding one value or, once a field repeats, all of them in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnValue {
    Scalar(String),
    Sequence(Vec<String>),
}

impl ColumnValue {
    /// Add another value, promoting a scalar to a sequence.
    pub fn push(&mut self, value: String) {
        match self {
            ColumnValue::Scalar(first) => {
                let first = std::mem::take(first);
                *self = ColumnValue::Sequence(vec![first, value]);
            }
            ColumnValue::Sequence(values) => values.push(value),
        }
    }
}

/// Denormalized record as stored in the search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDocument {
    /// Escaped record identifier
    pub id: String,

    #[serde(rename = "collectionName")]
    pub collection_name: String,

    #[serde(rename = "institutionName")]
    pub institution_name: String,

    /// `<field>_keyword` columns
    #[serde(flatten)]
    pub columns: BTreeMap<String, ColumnValue>,
}

impl SearchDocument {
    pub fn column(&self, name: &str) -> Option<&ColumnValue> {
        self.columns.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_promotes_scalar() {
        let mut value = ColumnValue::Scalar("A".into());
        value.push("B".into());
        assert_eq!(value, ColumnValue::Sequence(vec!["A".into(), "B".into()]));
        value.push("C".into());
        assert_eq!(
            value,
            ColumnValue::Sequence(vec!["A".into(), "B".into(), "C".into()])
        );
    }

    #[test]
    fn test_serializes_flat() {
        let mut columns = BTreeMap::new();
        columns.insert("title_keyword".to_string(), ColumnValue::Scalar("Foo".into()));
        columns.insert(
            "creator_keyword".to_string(),
            ColumnValue::Sequence(vec!["A".into(), "B".into()]),
        );
        let doc = SearchDocument {
            id: "oai_3Arepo_3A1".into(),
            collection_name: "col".into(),
            institution_name: "inst".into(),
            columns,
        };

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "oai_3Arepo_3A1",
                "collectionName": "col",
                "institutionName": "inst",
                "title_keyword": "Foo",
                "creator_keyword": ["A", "B"],
            })
        );
    }
}
