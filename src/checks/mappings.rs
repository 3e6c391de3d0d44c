//! Mapping type checks.
//!
//! Phase data is the `mappings` object of one index: type name -> type.

use crate::checks::check_types;
use crate::{Check, Severity};
use serde_json::Value;

/// Type-level meta-fields that can no longer be configured
pub const REMOVED_META_FIELDS: &[&str] = &["_analyzer", "_boost", "_index"];

const MAX_TYPE_NAME_LEN: usize = 255;

pub fn checks() -> Vec<Check> {
    vec![
        Check::index("Type names starting with a dot", Severity::Red, |mappings, _| {
            check_types("Type names may not start with `.`", mappings, |name, _| {
                name.starts_with('.')
            })
        }),
        Check::index(
            "Type names longer than 255 characters",
            Severity::Red,
            |mappings, _| {
                check_types(
                    "Type names may not be longer than 255 characters",
                    mappings,
                    |name, _| name.chars().count() > MAX_TYPE_NAME_LEN,
                )
            },
        ),
        Check::index("Removed meta-fields", Severity::Yellow, removed_meta_fields),
    ]
}

fn removed_meta_fields(mappings: &Value, _index: &str) -> Option<String> {
    let messages: Vec<String> = REMOVED_META_FIELDS
        .iter()
        .filter_map(|field| {
            check_types(
                &format!("The `{}` field is no longer supported", field),
                mappings,
                |_, def| def.get(field).is_some(),
            )
        })
        .collect();

    if messages.is_empty() {
        None
    } else {
        Some(messages.join("\n"))
    }
}
