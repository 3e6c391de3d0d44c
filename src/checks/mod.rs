//! Built-in checks.
//!
//! One module per phase. Each module exposes `checks()` returning its checks
//! in the order they are reported:
//! - Settings: index creation version, removed settings
//! - Segments: Lucene 3.x segments, shards that are not started
//! - Mappings: type names, removed meta-fields
//! - Flat mappings: fields mapped differently across types
//! - Fields: dotted names, `multi_field`, analyzers, index-time boosts
//!
//! Messages wrap names in backticks; renderers may highlight them.

pub mod fields;
pub mod flat_mappings;
pub mod mappings;
pub mod segments;
pub mod settings;

use crate::engine::path::resolve;
use crate::{CheckRegistry, IndexDocError, Phase};
use serde_json::Value;

/// Registry holding every built-in check.
pub fn default_registry() -> Result<CheckRegistry, IndexDocError> {
    let mut registry = CheckRegistry::new();
    registry
        .register_phase(Phase::Settings, settings::checks())?
        .register_phase(Phase::Segments, segments::checks())?
        .register_phase(Phase::Mappings, mappings::checks())?
        .register_phase(Phase::FlatMappings, flat_mappings::checks())?
        .register_phase(Phase::MappingFields, fields::checks())?;
    Ok(registry)
}

/// List the mapping types for which `f(type_name, type_def)` holds.
///
/// Returns ``"{msg}, in type: `a`"`` or ``"{msg}, in types: `a`, `b`"``,
/// or `None` when no type matches. Types are visited in name order.
pub fn check_types<F>(msg: &str, mappings: &Value, f: F) -> Option<String>
where
    F: Fn(&str, &Value) -> bool,
{
    let types = mappings.as_object()?;
    let mut names: Vec<&String> = types.keys().collect();
    names.sort();

    let matched: Vec<String> = names
        .into_iter()
        .filter(|name| f(name.as_str(), &types[name.as_str()]))
        .map(|name| format!("`{}`", name))
        .collect();

    if matched.is_empty() {
        return None;
    }
    let noun = if matched.len() > 1 { "types" } else { "type" };
    Some(format!("{}, in {}: {}", msg, noun, matched.join(", ")))
}

/// Setting lookup that accepts both nested (`{index: {merge: ...}}`) and
/// flat (`{"index.merge...": ...}`) settings.
pub fn setting<'a>(settings: &'a Value, key: &str) -> Option<&'a Value> {
    resolve(settings, key).or_else(|| settings.get(key))
}

/// A scalar as text; settings arrive as strings or numbers
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
