//! Filter predicate encoding.
//!
//! `equal` filters use the plain JSON:API form `filter[<path>]=v1,v2`. Every
//! other operator uses the condition form, which namespaces the parameters
//! under a group derived from the resource type:
//!
//! ```text
//! filter[<group>][condition][path]=<path>
//! filter[<group>][condition][operator]=<symbol>
//! filter[<group>][condition][value]=...
//! ```

use crate::error::RouterError;
use crate::types::{FilterOperator, QueryItem};

/// Separator between parent and child in grouped resource type names.
pub const GROUP_SEPARATOR: &str = "--";

/// Returns the condition group for a resource type: the part after the last
/// `--`, e.g. `lineitem` for `order--lineitem`.
pub fn filter_group(resource_type: &str) -> Option<&str> {
    resource_type
        .rsplit_once(GROUP_SEPARATOR)
        .map(|(_, group)| group)
}

/// Encode one resolved filter into query items.
///
/// `key_path` is the formatted, dot-joined path; `resource_type` is the type
/// reached by resolving it; `values` are already formatted and non-empty
/// (callers substitute `"null"` for an empty list).
///
/// A condition-form filter on a resource type without a group encodes to no
/// items at all.
///
/// # Errors
///
/// Returns `RouterError::InvalidValueCount` for `between` without exactly two
/// values or `in` without values, and `RouterError::UnsupportedOperator` for
/// operators with no wire form.
pub fn encode_filter(
    key_path: &str,
    resource_type: &str,
    values: &[String],
    operator: FilterOperator,
) -> Result<Vec<QueryItem>, RouterError> {
    if operator == FilterOperator::Equal {
        return Ok(vec![QueryItem::new(
            format!("filter[{key_path}]"),
            values.join(","),
        )]);
    }

    let Some(group) = filter_group(resource_type) else {
        // TODO: decide on a fallback encoding for servers without grouped type names.
        tracing::warn!(
            key_path = %key_path,
            resource_type = %resource_type,
            operator = %operator,
            "no filter group for resource type; dropping filter"
        );
        return Ok(Vec::new());
    };

    let symbol = operator
        .symbol()
        .ok_or(RouterError::UnsupportedOperator { operator })?;

    let prefix = format!("filter[{group}][condition]");
    let mut items = vec![
        QueryItem::new(format!("{prefix}[path]"), key_path),
        QueryItem::new(format!("{prefix}[operator]"), symbol),
    ];

    match operator {
        FilterOperator::Between => {
            let [low, high] = values else {
                return Err(RouterError::InvalidValueCount {
                    operator,
                    expected: "exactly 2",
                    actual: values.len(),
                });
            };
            items.push(QueryItem::new(format!("{prefix}[value][0]"), low.as_str()));
            items.push(QueryItem::new(format!("{prefix}[value][1]"), high.as_str()));
        }
        FilterOperator::In => {
            if values.is_empty() {
                return Err(RouterError::InvalidValueCount {
                    operator,
                    expected: "at least 1",
                    actual: 0,
                });
            }
            let name = format!("{prefix}[value][]");
            items.extend(values.iter().map(|v| QueryItem::new(name.as_str(), v.as_str())));
        }
        _ => {
            items.push(QueryItem::new(format!("{prefix}[value]"), values.join(",")));
        }
    }

    Ok(items)
}
