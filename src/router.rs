//! URL composition - turns a [`Query`] into a JSON:API URL.

use std::fmt;
use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::error::RouterError;
use crate::filter::encode_filter;
use crate::pagination::{DefaultPaginationEncoder, PaginationEncoder};
use crate::path::resolve_path;
use crate::schema::{
    plain_value, KeyFormat, KeyFormatter, Relationship, ResourceSchema, ValueFormatter,
    ValueFormatterRegistry,
};
use crate::types::{FilterOperator, Query, QueryItem, ResourceRef};

/// Characters escaped in query names and values.
///
/// JSON:API's structural characters (`[`, `]`, `,`, `.`) stay literal so
/// that `filter[author.name]=a,b` reads as written.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'[')
    .remove(b']')
    .remove(b',')
    .remove(b':')
    .remove(b'/')
    .remove(b'*');

/// Builds JSON:API URLs relative to a base URL.
///
/// The schema and formatters are shared read-only, so one router can be
/// used from many threads at once.
///
/// # Example
///
/// ```
/// use jsonapi_router::{Attribute, KeyFormat, Pagination, Query, Router, SchemaRegistry};
/// use url::Url;
///
/// let schema = SchemaRegistry::new().with_resource("articles", vec![Attribute::new("createdAt")]);
/// let router = Router::new(Url::parse("https://api.example.com/v1").unwrap(), schema)
///     .unwrap()
///     .key_formatter(KeyFormat::Dasherized);
///
/// let query = Query::new("articles")
///     .sort_descending("createdAt")
///     .paginate(Pagination::page(2, 20));
/// let url = router.url_for_query(&query).unwrap();
///
/// assert_eq!(
///     url.as_str(),
///     "https://api.example.com/v1/articles?sort=-created-at&page[number]=2&page[size]=20"
/// );
/// ```
#[derive(Clone)]
pub struct Router {
    base_url: Url,
    schema: Arc<dyn ResourceSchema + Send + Sync>,
    keys: Arc<dyn KeyFormatter + Send + Sync>,
    values: Arc<dyn ValueFormatter + Send + Sync>,
    pagination: Arc<dyn PaginationEncoder + Send + Sync>,
}

impl Router {
    /// Create a router with as-is keys, the built-in value formatters and
    /// page/offset pagination.
    ///
    /// # Errors
    ///
    /// Returns `RouterError::CannotBeABase` if `base_url` cannot take path
    /// segments (e.g. `mailto:`).
    pub fn new<S>(base_url: Url, schema: S) -> Result<Self, RouterError>
    where
        S: ResourceSchema + Send + Sync + 'static,
    {
        if base_url.cannot_be_a_base() {
            return Err(RouterError::CannotBeABase {
                url: base_url.to_string(),
            });
        }

        Ok(Self {
            base_url,
            schema: Arc::new(schema),
            keys: Arc::new(KeyFormat::AsIs),
            values: Arc::new(ValueFormatterRegistry::with_builtins()),
            pagination: Arc::new(DefaultPaginationEncoder),
        })
    }

    /// Replace how field names are written on the wire.
    pub fn key_formatter<K>(mut self, keys: K) -> Self
    where
        K: KeyFormatter + Send + Sync + 'static,
    {
        self.keys = Arc::new(keys);
        self
    }

    /// Replace how attribute values are written into filters.
    pub fn value_formatter<V>(mut self, values: V) -> Self
    where
        V: ValueFormatter + Send + Sync + 'static,
    {
        self.values = Arc::new(values);
        self
    }

    /// Replace the pagination dispatch, e.g. to support custom strategies.
    pub fn pagination_encoder<P>(mut self, pagination: P) -> Self
    where
        P: PaginationEncoder + Send + Sync + 'static,
    {
        self.pagination = Arc::new(pagination);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `<base>/<resource_type>`.
    pub fn url_for_resource_type(&self, resource_type: &str) -> Result<Url, RouterError> {
        let mut url = self.base_url.clone();
        push_segments(&mut url, &[resource_type])?;
        Ok(url)
    }

    /// Compose the URL for a query.
    ///
    /// # Errors
    ///
    /// Returns `RouterError` when the query is malformed: no URL or resource
    /// type, a sort field missing from the schema, a filter with the wrong
    /// number of values or an operator with no encoding, or pagination the
    /// configured encoder does not support.
    pub fn url_for_query(&self, query: &Query) -> Result<Url, RouterError> {
        let (mut url, prebuilt) = match (&query.url, &query.resource_type) {
            (Some(raw), _) => {
                let url = self
                    .base_url
                    .join(raw)
                    .map_err(|source| RouterError::InvalidUrl {
                        url: raw.clone(),
                        source,
                    })?;
                (url, true)
            }
            (None, Some(resource_type)) => (self.url_for_resource_type(resource_type)?, false),
            (None, None) => return Err(RouterError::MissingResourceType),
        };

        let mut items = Vec::new();

        if !prebuilt {
            match query.resource_ids.as_slice() {
                [] => {}
                [id] => push_segments(&mut url, &[id.as_str()])?,
                ids => items.push(QueryItem::new("filter[id]", ids.join(","))),
            }
        }

        items.extend(self.include_items(query)?);
        items.extend(self.filter_items(query)?);
        items.extend(self.field_items(query));
        items.extend(self.sort_items(query)?);

        if let Some(pagination) = &query.pagination {
            items.extend(self.pagination.encode(pagination)?);
        }

        append_query_items(&mut url, &items);
        tracing::trace!(url = %url, "composed query URL");
        Ok(url)
    }

    /// URL of a relationship of a resource instance.
    ///
    /// A server-supplied link is returned verbatim. Otherwise the URL is
    /// `<resource URL>/relationships/<key>`, where the resource URL is its own
    /// `url` or `<base>/<type>/<id>`.
    ///
    /// # Errors
    ///
    /// Returns `RouterError::MissingResourceId` if the URL has to be built
    /// from an id the resource does not have.
    pub fn url_for_relationship(
        &self,
        relationship: &Relationship,
        resource: &ResourceRef,
    ) -> Result<Url, RouterError> {
        if let Some(url) = resource.relationship_urls.get(&relationship.name) {
            return Ok(url.clone());
        }

        let mut url = match &resource.url {
            Some(url) => url.clone(),
            None => {
                let id = resource
                    .id
                    .as_deref()
                    .ok_or_else(|| RouterError::MissingResourceId {
                        resource_type: resource.resource_type.clone(),
                    })?;
                let mut url = self.url_for_resource_type(&resource.resource_type)?;
                push_segments(&mut url, &[id])?;
                url
            }
        };

        let key = self.keys.format_name(relationship.wire_name());
        push_segments(&mut url, &["relationships", key.as_str()])?;
        Ok(url)
    }

    // --- Internal implementation ---

    fn include_items(&self, query: &Query) -> Result<Option<QueryItem>, RouterError> {
        if query.includes.is_empty() {
            return Ok(None);
        }

        let root = root_type(query)?;
        let includes: Vec<String> = query
            .includes
            .iter()
            .map(|path| resolve_path(&*self.schema, &*self.keys, root, path).joined())
            .collect();

        Ok(Some(QueryItem::new("include", includes.join(","))))
    }

    fn filter_items(&self, query: &Query) -> Result<Vec<QueryItem>, RouterError> {
        let mut items = Vec::new();

        for filter in &query.filters {
            let root = root_type(query)?;
            let resolved = resolve_path(&*self.schema, &*self.keys, root, &filter.key_path);

            let mut values: Vec<String> = filter
                .values()
                .into_iter()
                .map(|value| match &resolved.attribute {
                    Some(attribute) => self.values.format_value(value, attribute),
                    None => plain_value(value),
                })
                .collect();
            if values.is_empty() && filter.operator != FilterOperator::In {
                values.push("null".to_string());
            }

            items.extend(encode_filter(
                &resolved.joined(),
                &resolved.resource_type,
                &values,
                filter.operator,
            )?);
        }

        Ok(items)
    }

    fn field_items(&self, query: &Query) -> Vec<QueryItem> {
        query
            .fields
            .iter()
            .map(|(resource_type, names)| {
                let keys: Vec<String> = names
                    .iter()
                    .map(|name| match self.schema.field_named(resource_type, name) {
                        Some(field) => self.keys.format(field),
                        None => self.keys.format_name(name),
                    })
                    .collect();
                QueryItem::new(format!("fields[{resource_type}]"), keys.join(","))
            })
            .collect()
    }

    fn sort_items(&self, query: &Query) -> Result<Option<QueryItem>, RouterError> {
        if query.sort.is_empty() {
            return Ok(None);
        }

        let root = root_type(query)?;
        let mut keys = Vec::with_capacity(query.sort.len());
        for descriptor in &query.sort {
            let field = self
                .schema
                .field_named(root, &descriptor.field)
                .ok_or_else(|| RouterError::UnknownSortField {
                    resource_type: root.to_string(),
                    field: descriptor.field.clone(),
                })?;
            let key = self.keys.format(field);
            keys.push(if descriptor.ascending {
                key
            } else {
                format!("-{key}")
            });
        }

        Ok(Some(QueryItem::new("sort", keys.join(","))))
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Append query items to a URL, after any query it already has.
///
/// Items are written in order and never merged, so repeated names survive.
pub fn append_query_items(url: &mut Url, items: &[QueryItem]) {
    if items.is_empty() {
        return;
    }

    let encoded = items
        .iter()
        .map(|item| {
            format!(
                "{}={}",
                utf8_percent_encode(&item.name, QUERY_COMPONENT),
                utf8_percent_encode(&item.value, QUERY_COMPONENT)
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    let query = match url.query() {
        Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
        _ => encoded,
    };
    url.set_query(Some(&query));
}

fn root_type(query: &Query) -> Result<&str, RouterError> {
    query
        .resource_type
        .as_deref()
        .ok_or(RouterError::MissingResourceType)
}

fn push_segments(url: &mut Url, segments: &[&str]) -> Result<(), RouterError> {
    if url.cannot_be_a_base() {
        return Err(RouterError::CannotBeABase {
            url: url.to_string(),
        });
    }
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistry;

    fn router(base: &str) -> Router {
        Router::new(Url::parse(base).unwrap(), SchemaRegistry::new()).unwrap()
    }

    #[test]
    fn rejects_non_hierarchical_base() {
        let result = Router::new(
            Url::parse("mailto:api@example.com").unwrap(),
            SchemaRegistry::new(),
        );
        assert!(matches!(result, Err(RouterError::CannotBeABase { .. })));
    }

    #[test]
    fn resource_type_url_handles_trailing_slash() {
        assert_eq!(
            router("https://api.example.com/v1/")
                .url_for_resource_type("articles")
                .unwrap()
                .as_str(),
            "https://api.example.com/v1/articles"
        );
        assert_eq!(
            router("https://api.example.com")
                .url_for_resource_type("articles")
                .unwrap()
                .as_str(),
            "https://api.example.com/articles"
        );
    }

    #[test]
    fn append_keeps_brackets_and_escapes_operators() {
        let mut url = Url::parse("https://api.example.com/items").unwrap();
        append_query_items(
            &mut url,
            &[
                QueryItem::new("filter[item][condition][operator]", ">="),
                QueryItem::new("filter[title]", "a&b c"),
            ],
        );
        assert_eq!(
            url.query(),
            Some("filter[item][condition][operator]=%3E%3D&filter[title]=a%26b%20c")
        );

        let decoded: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(decoded[0].1, ">=");
        assert_eq!(decoded[1].1, "a&b c");
    }

    #[test]
    fn append_after_existing_query() {
        let mut url = Url::parse("https://api.example.com/items?token=x%2By").unwrap();
        append_query_items(&mut url, &[QueryItem::new("sort", "-title")]);
        assert_eq!(url.query(), Some("token=x%2By&sort=-title"));
    }

    #[test]
    fn append_nothing_leaves_url_untouched() {
        let mut url = Url::parse("https://api.example.com/items").unwrap();
        append_query_items(&mut url, &[]);
        assert_eq!(url.as_str(), "https://api.example.com/items");
    }
}
