//! Checks across the flattened types of one index.
//!
//! Phase data is one index of the `index.flat_mappings` namespace:
//! `{type: {properties: {path: {<attributes>, _name}}}}`.

use crate::{Check, Severity};
use serde_json::Value;
use std::collections::BTreeMap;

/// Attributes that must agree for a field path shared by several types
pub const CONFLICTING_ATTRIBUTES: &[&str] = &["type", "analyzer", "search_analyzer", "index"];

pub fn checks() -> Vec<Check> {
    vec![Check::index(
        "Conflicting field mappings across types",
        Severity::Red,
        conflicting_mappings,
    )]
}

/// `{type}` of a field; fields without one are objects
fn describe(field: &Value) -> String {
    let attrs: Vec<String> = CONFLICTING_ATTRIBUTES
        .iter()
        .filter_map(|attr| match (attr, field.get(*attr)) {
            (_, Some(Value::String(v))) => Some((*attr, v.clone())),
            (&"type", None) => Some(("type", "object".to_string())),
            (_, Some(v)) if !v.is_null() => Some((*attr, v.to_string())),
            _ => None,
        })
        .map(|(attr, v)| if attr == "type" { v } else { format!("{}={}", attr, v) })
        .collect();
    attrs.join(", ")
}

fn conflicting_mappings(types: &Value, _index: &str) -> Option<String> {
    // path -> [(qualified name, mapping summary)]
    let mut by_path: BTreeMap<&str, Vec<(&str, String)>> = BTreeMap::new();

    for flat_type in types.as_object()?.values() {
        let Some(fields) = flat_type.get("properties").and_then(Value::as_object) else {
            continue;
        };
        for (path, field) in fields {
            let name = field.get("_name").and_then(Value::as_str).unwrap_or(path);
            by_path
                .entry(path.as_str())
                .or_default()
                .push((name, describe(field)));
        }
    }

    let lines: Vec<String> = by_path
        .into_iter()
        .filter(|(_, defs)| defs.iter().any(|(_, d)| *d != defs[0].1))
        .map(|(path, mut defs)| {
            defs.sort();
            let listed: Vec<String> = defs
                .iter()
                .map(|(name, d)| format!("`{}` ({})", name, d))
                .collect();
            format!("Field `{}` is mapped differently: {}", path, listed.join(", "))
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
