//! Dotted-path lookup over nested JSON data.
//!
//! `resolve(root, "index.settings.twitter")` walks objects by key and arrays
//! by literal decimal index. Any step that hits a scalar, `null`, a missing
//! key or an out-of-range index yields `None`. Present values are returned
//! as they are, including `false`, `0` and `""`.

use serde_json::Value;

/// Resolve a `.`-separated path below `root`.
pub fn resolve<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }
    path.split('.').try_fold(root, step)
}

/// Resolve pre-split path segments below `root`.
///
/// Use this when a segment may itself contain `.` (index names often do).
pub fn resolve_segments<'a, S>(root: &'a Value, segments: &[S]) -> Option<&'a Value>
where
    S: AsRef<str>,
{
    segments
        .iter()
        .try_fold(root, |value, segment| step(value, segment.as_ref()))
}

fn step<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}
