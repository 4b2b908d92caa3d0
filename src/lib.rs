//! JSON:API Router
//!
//! Compiles typed query descriptors into URLs that follow the JSON:API
//! query-string conventions.
//!
//! A [`Query`] names a resource type (or a pre-built URL) and carries
//! includes, filters, sparse fieldsets, sort order and pagination. A
//! [`Router`] resolves dotted paths in it against a [`ResourceSchema`],
//! formats keys and values through injected formatters, and produces the
//! final [`url::Url`].
//!
//! # Example
//!
//! ```
//! use jsonapi_router::{
//!     Attribute, FieldDefinition, FilterOperator, KeyFormat, Query, Relationship, Router,
//!     SchemaRegistry,
//! };
//! use url::Url;
//!
//! let schema = SchemaRegistry::new()
//!     .with_resource(
//!         "articles",
//!         vec![
//!             FieldDefinition::from(Attribute::new("title")),
//!             Relationship::new("author", "people").into(),
//!         ],
//!     )
//!     .with_resource("people", vec![Attribute::new("lastName")]);
//!
//! let router = Router::new(Url::parse("https://api.example.com").unwrap(), schema)
//!     .unwrap()
//!     .key_formatter(KeyFormat::Dasherized);
//!
//! let query = Query::new("articles")
//!     .include("author")
//!     .where_attribute("author.lastName", FilterOperator::Equal, "Doe")
//!     .sort_ascending("title");
//!
//! let url = router.url_for_query(&query).unwrap();
//! assert_eq!(
//!     url.as_str(),
//!     "https://api.example.com/articles?include=author&filter[author.last-name]=Doe&sort=title"
//! );
//! ```
//!
//! # Wire Format
//!
//! | Query part | Parameters |
//! |------------|------------|
//! | one id | path segment `/<id>` |
//! | several ids | `filter[id]=1,2` |
//! | includes | `include=a.b,c` |
//! | `equal` filter | `filter[<path>]=v1,v2` |
//! | other filters | `filter[<group>][condition][path\|operator\|value]` |
//! | sparse fieldsets | `fields[<type>]=f1,f2` |
//! | sort | `sort=k1,-k2` |
//! | pagination | `page[number]`/`page[size]` or `page[offset]`/`page[limit]` |

mod error;
mod filter;
mod loader;
mod pagination;
mod path;
mod router;
mod schema;
mod types;

pub use error::{LoadError, RouterError};
pub use filter::{encode_filter, filter_group, GROUP_SEPARATOR};
pub use loader::{
    is_url, load_document, load_document_auto, load_document_str, load_query,
    load_schema_registry,
};
pub use pagination::{
    encode_pagination, DefaultPaginationEncoder, PageParametersEncoder, Pagination,
    PaginationEncoder,
};
pub use path::{resolve_path, ResolvedPath};
pub use router::{append_query_items, Router};
pub use schema::{
    plain_value, Attribute, BooleanValueFormatter, DateValueFormatter, FieldDefinition,
    KeyFormat, KeyFormatter, PlainValueFormatter, Relationship, ResourceDefinition,
    ResourceSchema, SchemaRegistry, ValueFormatter, ValueFormatterRegistry,
};
pub use types::{Filter, FilterOperator, Query, QueryItem, ResourceRef, SortDescriptor};

#[cfg(feature = "remote")]
pub use loader::load_document_url;
