//! Per-field checks, evaluated against every flattened field.

use crate::checks::scalar_text;
use crate::{Check, FieldDescriptor, Severity};

pub fn checks() -> Vec<Check> {
    vec![
        Check::field("Field names containing dots", Severity::Red, dotted_name),
        Check::field("Deprecated `multi_field` type", Severity::Yellow, multi_field),
        Check::field(
            "`index_analyzer` or `search_analyzer` without `analyzer`",
            Severity::Yellow,
            analyzer_settings,
        ),
        Check::field("Index-time field boosts", Severity::Blue, index_time_boost),
    ]
}

fn dotted_name(field: &FieldDescriptor) -> Option<String> {
    field
        .name
        .contains('.')
        .then(|| format!("`{}`", field.qualified_name))
}

fn multi_field(field: &FieldDescriptor) -> Option<String> {
    (field.field_type() == Some("multi_field")).then(|| format!("`{}`", field.qualified_name))
}

fn analyzer_settings(field: &FieldDescriptor) -> Option<String> {
    if field.get("analyzer").is_some() {
        return None;
    }
    let present: Vec<&str> = ["index_analyzer", "search_analyzer"]
        .into_iter()
        .filter(|key| field.get(key).is_some())
        .collect();

    match present.as_slice() {
        [] => None,
        keys => Some(format!(
            "`{}` sets `{}` without `analyzer`",
            field.qualified_name,
            keys.join("` and `")
        )),
    }
}

fn index_time_boost(field: &FieldDescriptor) -> Option<String> {
    let boost = field.get("boost").and_then(scalar_text)?;
    Some(format!("`{}` (boost {})", field.qualified_name, boost))
}
