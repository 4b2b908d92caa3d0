//! Dotted key path resolution against a resource schema.

use crate::schema::{Attribute, FieldDefinition, KeyFormatter, ResourceSchema};

/// Outcome of walking a dotted key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// One wire key per path segment, in order.
    pub keys: Vec<String>,
    /// Resource type reached after following every relationship segment.
    pub resource_type: String,
    /// The attribute named by the last segment, if it is one.
    pub attribute: Option<Attribute>,
    /// Segments the schema did not know, passed through unformatted.
    pub unresolved: Vec<String>,
}

impl ResolvedPath {
    /// The keys joined with `.`, e.g. `author.company`.
    pub fn joined(&self) -> String {
        self.keys.join(".")
    }

    /// Returns true when every segment matched a schema field.
    pub fn is_fully_resolved(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Walk `path` segment by segment starting at `resource_type`.
///
/// Known relationships are formatted and followed; known attributes are
/// formatted and, on the last segment, recorded. Unknown segments are
/// appended verbatim and leave the current resource type unchanged, so a
/// partial schema never makes resolution fail.
pub fn resolve_path(
    schema: &dyn ResourceSchema,
    keys: &dyn KeyFormatter,
    resource_type: &str,
    path: &str,
) -> ResolvedPath {
    let segments: Vec<&str> = path.split('.').collect();
    let mut resolved = ResolvedPath {
        keys: Vec::with_capacity(segments.len()),
        resource_type: resource_type.to_string(),
        attribute: None,
        unresolved: Vec::new(),
    };

    for (i, segment) in segments.iter().enumerate() {
        let is_last = i + 1 == segments.len();

        match schema.field_named(&resolved.resource_type, segment) {
            Some(field) => {
                resolved.keys.push(keys.format(field));
                match field {
                    FieldDefinition::Relationship(relationship) => {
                        resolved.resource_type = schema.linked_type(relationship).to_string();
                    }
                    FieldDefinition::Attribute(attribute) if is_last => {
                        resolved.attribute = Some(attribute.clone());
                    }
                    FieldDefinition::Attribute(_) => {}
                }
            }
            None => {
                tracing::debug!(
                    resource_type = %resolved.resource_type,
                    segment = %segment,
                    "path segment not in schema; passing through"
                );
                resolved.keys.push((*segment).to_string());
                resolved.unresolved.push((*segment).to_string());
            }
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{KeyFormat, Relationship, SchemaRegistry};

    fn schema() -> SchemaRegistry {
        SchemaRegistry::new()
            .with_resource(
                "articles",
                vec![
                    FieldDefinition::from(Attribute::new("title")),
                    Relationship::new("author", "people").into(),
                ],
            )
            .with_resource(
                "people",
                vec![
                    FieldDefinition::from(Attribute::new("firstName")),
                    Relationship::new("employer", "companies").into(),
                ],
            )
            .with_resource("companies", vec![Attribute::new("legalName")])
    }

    #[test]
    fn follows_relationships() {
        let resolved = resolve_path(
            &schema(),
            &KeyFormat::Dasherized,
            "articles",
            "author.employer.legalName",
        );

        assert_eq!(resolved.keys, vec!["author", "employer", "legal-name"]);
        assert_eq!(resolved.resource_type, "companies");
        assert_eq!(resolved.attribute, Some(Attribute::new("legalName")));
        assert!(resolved.is_fully_resolved());
    }

    #[test]
    fn relationship_as_last_segment_has_no_attribute() {
        let resolved = resolve_path(&schema(), &KeyFormat::AsIs, "articles", "author");

        assert_eq!(resolved.joined(), "author");
        assert_eq!(resolved.resource_type, "people");
        assert!(resolved.attribute.is_none());
    }

    #[test]
    fn unknown_segments_pass_through() {
        let resolved = resolve_path(
            &schema(),
            &KeyFormat::Dasherized,
            "articles",
            "author.shoeSize",
        );

        assert_eq!(resolved.keys, vec!["author", "shoeSize"]);
        assert_eq!(resolved.resource_type, "people");
        assert!(resolved.attribute.is_none());
        assert_eq!(resolved.unresolved, vec!["shoeSize"]);
    }

    #[test]
    fn unknown_resource_type_passes_everything_through() {
        let resolved = resolve_path(&schema(), &KeyFormat::Dasherized, "tags", "labelText");

        assert_eq!(resolved.joined(), "labelText");
        assert_eq!(resolved.resource_type, "tags");
        assert!(!resolved.is_fully_resolved());
    }

    #[test]
    fn attribute_mid_path_is_not_recorded() {
        let resolved = resolve_path(&schema(), &KeyFormat::AsIs, "articles", "title.length");

        assert_eq!(resolved.keys, vec!["title", "length"]);
        assert_eq!(resolved.resource_type, "articles");
        assert!(resolved.attribute.is_none());
    }
}
