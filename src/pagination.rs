//! Pagination descriptors and their query-string encoding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RouterError;
use crate::schema::plain_value;
use crate::types::QueryItem;

/// How a query pages through results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Pagination {
    /// `page[number]` / `page[size]`.
    Page { number: u64, size: u64 },
    /// `page[offset]` / `page[limit]`.
    Offset { offset: u64, limit: u64 },
    /// Any other strategy. The default encoder rejects it; supply a
    /// [`PaginationEncoder`] that knows the `kind`.
    Custom {
        kind: String,
        #[serde(default)]
        parameters: BTreeMap<String, Value>,
    },
}

impl Pagination {
    pub fn page(number: u64, size: u64) -> Self {
        Pagination::Page { number, size }
    }

    pub fn offset(offset: u64, limit: u64) -> Self {
        Pagination::Offset { offset, limit }
    }
}

/// Turns a [`Pagination`] into query items.
///
/// Implementors handling their own `Custom` kinds can delegate the rest to
/// [`encode_pagination`].
pub trait PaginationEncoder {
    fn encode(&self, pagination: &Pagination) -> Result<Vec<QueryItem>, RouterError>;
}

/// Page- and offset-based pagination only.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPaginationEncoder;

impl PaginationEncoder for DefaultPaginationEncoder {
    fn encode(&self, pagination: &Pagination) -> Result<Vec<QueryItem>, RouterError> {
        encode_pagination(pagination)
    }
}

/// Encode the built-in pagination variants.
///
/// # Errors
///
/// Returns `RouterError::UnsupportedPagination` for `Pagination::Custom`.
pub fn encode_pagination(pagination: &Pagination) -> Result<Vec<QueryItem>, RouterError> {
    match pagination {
        Pagination::Page { number, size } => Ok(vec![
            QueryItem::new("page[number]", number.to_string()),
            QueryItem::new("page[size]", size.to_string()),
        ]),
        Pagination::Offset { offset, limit } => Ok(vec![
            QueryItem::new("page[offset]", offset.to_string()),
            QueryItem::new("page[limit]", limit.to_string()),
        ]),
        Pagination::Custom { kind, .. } => Err(RouterError::UnsupportedPagination {
            kind: kind.clone(),
        }),
    }
}

/// Encoder for `Custom` pagination that writes each parameter as
/// `page[<name>]`, in name order, for the kinds it was given.
#[derive(Debug, Clone, Default)]
pub struct PageParametersEncoder {
    kinds: Vec<String>,
}

impl PageParametersEncoder {
    pub fn new<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kinds: kinds.into_iter().map(Into::into).collect(),
        }
    }
}

impl PaginationEncoder for PageParametersEncoder {
    fn encode(&self, pagination: &Pagination) -> Result<Vec<QueryItem>, RouterError> {
        match pagination {
            Pagination::Custom { kind, parameters } if self.kinds.contains(kind) => Ok(parameters
                .iter()
                .map(|(name, value)| QueryItem::new(format!("page[{name}]"), plain_value(value)))
                .collect()),
            other => encode_pagination(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_based() {
        let items = encode_pagination(&Pagination::page(2, 20)).unwrap();
        assert_eq!(
            items,
            vec![
                QueryItem::new("page[number]", "2"),
                QueryItem::new("page[size]", "20"),
            ]
        );
    }

    #[test]
    fn offset_based() {
        let items = encode_pagination(&Pagination::offset(40, 10)).unwrap();
        assert_eq!(
            items,
            vec![
                QueryItem::new("page[offset]", "40"),
                QueryItem::new("page[limit]", "10"),
            ]
        );
    }

    #[test]
    fn custom_rejected_by_default() {
        let pagination = Pagination::Custom {
            kind: "cursor".into(),
            parameters: BTreeMap::new(),
        };
        assert!(matches!(
            DefaultPaginationEncoder.encode(&pagination),
            Err(RouterError::UnsupportedPagination { kind }) if kind == "cursor"
        ));
    }

    #[test]
    fn page_parameters_encoder_handles_known_kinds() {
        let encoder = PageParametersEncoder::new(["cursor"]);
        let pagination: Pagination = serde_json::from_value(json!({
            "type": "custom",
            "kind": "cursor",
            "parameters": { "size": 25, "after": "abc" }
        }))
        .unwrap();

        assert_eq!(
            encoder.encode(&pagination).unwrap(),
            vec![
                QueryItem::new("page[after]", "abc"),
                QueryItem::new("page[size]", "25"),
            ]
        );
        assert_eq!(encoder.encode(&Pagination::page(1, 5)).unwrap().len(), 2);

        let unknown = Pagination::Custom {
            kind: "keyset".into(),
            parameters: BTreeMap::new(),
        };
        assert!(encoder.encode(&unknown).is_err());
    }

    #[test]
    fn deserializes_tagged_variants() {
        let p: Pagination =
            serde_json::from_value(json!({ "type": "page", "number": 1, "size": 10 })).unwrap();
        assert_eq!(p, Pagination::page(1, 10));
        let p: Pagination =
            serde_json::from_value(json!({ "type": "offset", "offset": 0, "limit": 50 })).unwrap();
        assert_eq!(p, Pagination::offset(0, 50));
    }
}
