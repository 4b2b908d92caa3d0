//! Error types for JSON:API URL composition and document loading.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::FilterOperator;

/// Precondition violations raised while composing a URL.
///
/// Every variant is caller misuse: the router refuses to produce a
/// malformed URL instead of guessing. Degraded-but-valid outcomes (an
/// unresolved path segment, a dropped ungrouped filter) are not errors.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("query has neither a URL nor a resource type")]
    MissingResourceType,

    #[error("cannot sort on \"{field}\": no such field on resource type \"{resource_type}\"")]
    UnknownSortField {
        resource_type: String,
        field: String,
    },

    #[error("operator {operator} requires {expected} value(s), got {actual}")]
    InvalidValueCount {
        operator: FilterOperator,
        expected: &'static str,
        actual: usize,
    },

    #[error("operator {operator} is not supported by this router")]
    UnsupportedOperator { operator: FilterOperator },

    #[error("pagination \"{kind}\" is not supported by this router")]
    UnsupportedPagination { kind: String },

    #[error("resource of type \"{resource_type}\" has no id; cannot build its URL")]
    MissingResourceId { resource_type: String },

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("base URL '{url}' cannot have path segments")]
    CannotBeABase { url: String },
}

impl RouterError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors while loading schema and query documents.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid {what} document: {source}")]
    InvalidDocument {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}
