//! Resource schema and formatting capabilities consumed by the router.
//!
//! The router only talks to the three traits defined here. The concrete
//! types ([`SchemaRegistry`], [`KeyFormat`], [`ValueFormatterRegistry`]) are
//! reference implementations backing the CLI and the tests; applications
//! with their own model plug in their own implementations.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LoadError;

/// A plain attribute of a resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub name: String,
    /// Name used on the wire instead of `name`, before key formatting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serialized_name: Option<String>,
    /// Formatting identity used to pick a value formatter, e.g. `date`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            serialized_name: None,
            format: None,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn serialized_as(mut self, serialized_name: impl Into<String>) -> Self {
        self.serialized_name = Some(serialized_name.into());
        self
    }

    /// The name to format for the wire: the serialized name if set.
    pub fn wire_name(&self) -> &str {
        self.serialized_name.as_deref().unwrap_or(&self.name)
    }
}

/// A relationship from one resource type to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub name: String,
    pub linked_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serialized_name: Option<String>,
}

impl Relationship {
    pub fn new(name: impl Into<String>, linked_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            linked_type: linked_type.into(),
            serialized_name: None,
        }
    }

    pub fn serialized_as(mut self, serialized_name: impl Into<String>) -> Self {
        self.serialized_name = Some(serialized_name.into());
        self
    }

    pub fn wire_name(&self) -> &str {
        self.serialized_name.as_deref().unwrap_or(&self.name)
    }
}

/// A field of a resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldDefinition {
    Attribute(Attribute),
    Relationship(Relationship),
}

impl FieldDefinition {
    pub fn name(&self) -> &str {
        match self {
            FieldDefinition::Attribute(a) => &a.name,
            FieldDefinition::Relationship(r) => &r.name,
        }
    }

    pub fn wire_name(&self) -> &str {
        match self {
            FieldDefinition::Attribute(a) => a.wire_name(),
            FieldDefinition::Relationship(r) => r.wire_name(),
        }
    }
}

impl From<Attribute> for FieldDefinition {
    fn from(attribute: Attribute) -> Self {
        FieldDefinition::Attribute(attribute)
    }
}

impl From<Relationship> for FieldDefinition {
    fn from(relationship: Relationship) -> Self {
        FieldDefinition::Relationship(relationship)
    }
}

/// Field lookup by resource type.
pub trait ResourceSchema {
    /// Returns the field called `name` on `resource_type`, if the schema knows it.
    fn field_named(&self, resource_type: &str, name: &str) -> Option<&FieldDefinition>;

    /// Returns the resource type a relationship points to.
    fn linked_type<'a>(&self, relationship: &'a Relationship) -> &'a str {
        &relationship.linked_type
    }
}

/// Maps field names to wire keys.
pub trait KeyFormatter {
    fn format_name(&self, name: &str) -> String;

    fn format(&self, field: &FieldDefinition) -> String {
        self.format_name(field.wire_name())
    }
}

/// Renders a filter value for the wire.
pub trait ValueFormatter {
    fn format_value(&self, value: &Value, attribute: &Attribute) -> String;
}

// --- Schema registry ---

/// Fields of one resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

/// In-memory schema, typically deserialized from a JSON document:
///
/// ```json
/// { "resources": { "articles": { "fields": [
///     { "kind": "attribute", "name": "title" },
///     { "kind": "relationship", "name": "author", "linkedType": "people" }
/// ] } } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRegistry {
    #[serde(default)]
    resources: BTreeMap<String, ResourceDefinition>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a resource type.
    pub fn with_resource<I, F>(mut self, resource_type: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FieldDefinition>,
    {
        let fields = fields.into_iter().map(Into::into).collect();
        self.resources
            .insert(resource_type.into(), ResourceDefinition { fields });
        self
    }

    /// Build a registry from a parsed schema document.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::InvalidDocument` if the document has the wrong shape.
    pub fn from_value(value: &Value) -> Result<Self, LoadError> {
        Self::deserialize(value).map_err(|source| LoadError::InvalidDocument {
            what: "schema",
            source,
        })
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }
}

impl ResourceSchema for SchemaRegistry {
    fn field_named(&self, resource_type: &str, name: &str) -> Option<&FieldDefinition> {
        self.resources
            .get(resource_type)?
            .fields
            .iter()
            .find(|field| field.name() == name)
    }
}

// --- Key formatting ---

/// Built-in key casing policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyFormat {
    /// Keys are used exactly as named.
    #[default]
    AsIs,
    /// `createdAt` becomes `created-at`.
    Dasherized,
    /// `createdAt` becomes `created_at`.
    Underscored,
}

impl KeyFormatter for KeyFormat {
    fn format_name(&self, name: &str) -> String {
        match self {
            KeyFormat::AsIs => name.to_string(),
            KeyFormat::Dasherized => name.to_case(Case::Kebab),
            KeyFormat::Underscored => name.to_case(Case::Snake),
        }
    }
}

impl FromStr for KeyFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "as-is" => Ok(KeyFormat::AsIs),
            "dasherized" => Ok(KeyFormat::Dasherized),
            "underscored" => Ok(KeyFormat::Underscored),
            other => Err(format!(
                "unknown key format \"{other}\": expected as-is, dasherized, or underscored"
            )),
        }
    }
}

// --- Value formatting ---

/// Render a JSON value as a bare query-string token.
///
/// Strings lose their quotes; containers fall back to compact JSON.
pub fn plain_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Scalar rendering with no attribute-specific rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainValueFormatter;

impl ValueFormatter for PlainValueFormatter {
    fn format_value(&self, value: &Value, _attribute: &Attribute) -> String {
        plain_value(value)
    }
}

/// Renders booleans, and 0/1 numbers, as `true` / `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanValueFormatter;

impl ValueFormatter for BooleanValueFormatter {
    fn format_value(&self, value: &Value, _attribute: &Attribute) -> String {
        match value {
            Value::Bool(b) => b.to_string(),
            Value::Number(n) if n.as_i64() == Some(0) => "false".to_string(),
            Value::Number(n) if n.as_i64() == Some(1) => "true".to_string(),
            other => plain_value(other),
        }
    }
}

/// Renders dates as RFC 3339 in UTC.
///
/// Accepts RFC 3339 strings in any offset and integer Unix timestamps
/// (seconds). Anything else passes through as a plain value.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateValueFormatter;

impl ValueFormatter for DateValueFormatter {
    fn format_value(&self, value: &Value, _attribute: &Attribute) -> String {
        let parsed = match value {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Value::Number(n) => n
                .as_i64()
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
            _ => None,
        };

        match parsed {
            Some(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            None => {
                tracing::debug!(value = %value, "value is not a date; formatting as plain");
                plain_value(value)
            }
        }
    }
}

/// Value formatters keyed by an attribute's formatting identity.
///
/// Attributes without a `format`, or with one nobody registered, get
/// [`PlainValueFormatter`].
#[derive(Clone)]
pub struct ValueFormatterRegistry {
    formatters: HashMap<String, Arc<dyn ValueFormatter + Send + Sync>>,
}

impl ValueFormatterRegistry {
    /// A registry with no formatters; every value renders plain.
    pub fn empty() -> Self {
        Self {
            formatters: HashMap::new(),
        }
    }

    /// A registry with the `boolean` and `date` formatters.
    pub fn with_builtins() -> Self {
        Self::empty()
            .register("boolean", BooleanValueFormatter)
            .register("date", DateValueFormatter)
    }

    pub fn register<F>(mut self, format: impl Into<String>, formatter: F) -> Self
    where
        F: ValueFormatter + Send + Sync + 'static,
    {
        self.formatters.insert(format.into(), Arc::new(formatter));
        self
    }
}

impl Default for ValueFormatterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for ValueFormatterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formats: Vec<&str> = self.formatters.keys().map(String::as_str).collect();
        formats.sort_unstable();
        f.debug_struct("ValueFormatterRegistry")
            .field("formats", &formats)
            .finish()
    }
}

impl ValueFormatter for ValueFormatterRegistry {
    fn format_value(&self, value: &Value, attribute: &Attribute) -> String {
        match attribute
            .format
            .as_deref()
            .and_then(|format| self.formatters.get(format))
        {
            Some(formatter) => formatter.format_value(value, attribute),
            None => PlainValueFormatter.format_value(value, attribute),
        }
    }
}
