//! Query descriptor types.
//!
//! Everything here is built by the caller before composition and read-only
//! afterwards; the router never mutates a [`Query`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::pagination::Pagination;

/// One `name=value` pair of the produced query string.
///
/// Names repeat freely; order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryItem {
    pub name: String,
    pub value: String,
}

impl QueryItem {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Comparison operator of a filter predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Equal,
    NotEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThan,
    LessThanOrEqualTo,
    Between,
    In,
    BeginsWith,
    Contains,
    EndsWith,
    /// Pattern match with wildcards. No JSON:API encoding exists for it.
    Like,
    /// Regular-expression match. No JSON:API encoding exists for it.
    Matches,
}

impl FilterOperator {
    /// Returns the operator's name as used in query documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equal => "equal",
            FilterOperator::NotEqualTo => "notEqualTo",
            FilterOperator::GreaterThan => "greaterThan",
            FilterOperator::GreaterThanOrEqualTo => "greaterThanOrEqualTo",
            FilterOperator::LessThan => "lessThan",
            FilterOperator::LessThanOrEqualTo => "lessThanOrEqualTo",
            FilterOperator::Between => "between",
            FilterOperator::In => "in",
            FilterOperator::BeginsWith => "beginsWith",
            FilterOperator::Contains => "contains",
            FilterOperator::EndsWith => "endsWith",
            FilterOperator::Like => "like",
            FilterOperator::Matches => "matches",
        }
    }

    /// Returns the wire symbol used in `filter[..][condition][operator]`.
    ///
    /// `Equal` has no condition form and the pattern operators have no
    /// encoding at all, so those return `None`.
    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            FilterOperator::Between => Some("BETWEEN"),
            FilterOperator::BeginsWith => Some("STARTS_WITH"),
            FilterOperator::Contains => Some("CONTAINS"),
            FilterOperator::EndsWith => Some("ENDS_WITH"),
            FilterOperator::GreaterThan => Some(">"),
            FilterOperator::GreaterThanOrEqualTo => Some(">="),
            FilterOperator::In => Some("IN"),
            FilterOperator::LessThan => Some("<"),
            FilterOperator::LessThanOrEqualTo => Some("<="),
            FilterOperator::NotEqualTo => Some("<>"),
            FilterOperator::Equal | FilterOperator::Like | FilterOperator::Matches => None,
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single filter predicate: `<key_path> <operator> <value>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    /// Dotted path relative to the query's resource type, e.g. `author.name`.
    pub key_path: String,
    pub operator: FilterOperator,
    /// A scalar, an array of scalars, or `null` for no value.
    #[serde(default)]
    pub value: Value,
}

impl Filter {
    pub fn new(key_path: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
        Self {
            key_path: key_path.into(),
            operator,
            value,
        }
    }

    /// Right-hand values of the predicate: array items, no values for
    /// `null`, otherwise the single scalar.
    pub fn values(&self) -> Vec<&Value> {
        match &self.value {
            Value::Array(items) => items.iter().collect(),
            Value::Null => Vec::new(),
            other => vec![other],
        }
    }
}

/// Sort order on one field of the root resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDescriptor {
    pub field: String,
    #[serde(default = "ascending_default")]
    pub ascending: bool,
}

fn ascending_default() -> bool {
    true
}

impl SortDescriptor {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: true,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: false,
        }
    }
}

/// Typed description of a JSON:API fetch.
///
/// Either `resource_type` or `url` must be set. When `url` is set it is used
/// as the base of the produced URL; `resource_type` is still the root against
/// which includes, filters and sort fields are resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Query {
    pub resource_type: Option<String>,
    pub url: Option<String>,
    pub resource_ids: Vec<String>,
    pub includes: Vec<String>,
    pub filters: Vec<Filter>,
    /// Sparse fieldsets keyed by resource type.
    pub fields: BTreeMap<String, Vec<String>>,
    pub sort: Vec<SortDescriptor>,
    pub pagination: Option<Pagination>,
}

impl Query {
    /// Query for all resources of the given type.
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: Some(resource_type.into()),
            ..Self::default()
        }
    }

    /// Query against a pre-built URL, resolved relative to the router's base.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Restrict the query to the given resource ids.
    pub fn ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resource_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Root type used to resolve paths when the query is URL-based.
    pub fn resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    pub fn include(mut self, path: impl Into<String>) -> Self {
        self.includes.push(path.into());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Shorthand for `filter(Filter::new(..))`.
    pub fn where_attribute(
        self,
        key_path: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<Value>,
    ) -> Self {
        self.filter(Filter::new(key_path, operator, value.into()))
    }

    pub fn restrict_fields<I, S>(mut self, resource_type: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.insert(
            resource_type.into(),
            fields.into_iter().map(Into::into).collect(),
        );
        self
    }

    pub fn sort_ascending(mut self, field: impl Into<String>) -> Self {
        self.sort.push(SortDescriptor::ascending(field));
        self
    }

    pub fn sort_descending(mut self, field: impl Into<String>) -> Self {
        self.sort.push(SortDescriptor::descending(field));
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

/// What the router needs to know about a resource instance to address it
/// and its relationships.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceRef {
    pub resource_type: String,
    pub id: Option<String>,
    /// The resource's own URL when the server supplied one.
    pub url: Option<Url>,
    /// Server-supplied `self` links keyed by relationship name.
    pub relationship_urls: HashMap<String, Url>,
}

impl ResourceRef {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    pub fn with_relationship_url(mut self, relationship: impl Into<String>, url: Url) -> Self {
        self.relationship_urls.insert(relationship.into(), url);
        self
    }
}
