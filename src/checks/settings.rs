//! Index settings checks.
//!
//! Phase data is the `settings` object of one index from `GET /_settings`.

use crate::checks::{scalar_text, setting};
use crate::{Check, Severity};
use serde_json::Value;

/// Settings that are ignored or rejected by Elasticsearch 2.x
pub const REMOVED_SETTINGS: &[&str] = &[
    "index.buffer_size",
    "index.cache.field.type",
    "index.codec.bloom.load",
    "index.fielddata.cache",
    "index.merge.policy.type",
    "index.merge.scheduler.type",
    "index.translog.fs.type",
];

/// `index.version.created` of the first 0.90 release
const VERSION_0_90: u64 = 900_000;

pub fn checks() -> Vec<Check> {
    vec![
        Check::index(
            "Index created before Elasticsearch 0.90",
            Severity::Red,
            created_before_0_90,
        ),
        Check::index("Removed index settings", Severity::Yellow, removed_settings),
    ]
}

fn created_before_0_90(settings: &Value, index: &str) -> Option<String> {
    let id = setting(settings, "index.version.created")
        .and_then(scalar_text)
        .and_then(|s| s.parse::<u64>().ok())?;

    (id < VERSION_0_90).then(|| {
        format!(
            "Index `{}` was created with Elasticsearch {} and must be reindexed",
            index,
            format_version_id(id)
        )
    })
}

fn removed_settings(settings: &Value, _index: &str) -> Option<String> {
    let found: Vec<String> = REMOVED_SETTINGS
        .iter()
        .filter(|key| setting(settings, key).is_some())
        .map(|key| format!("`{}`", key))
        .collect();

    if found.is_empty() {
        None
    } else {
        Some(format!("Settings no longer supported: {}", found.join(", ")))
    }
}

/// `1040299` -> `1.4.2`
pub fn format_version_id(id: u64) -> String {
    format!(
        "{}.{}.{}",
        id / 1_000_000,
        (id / 10_000) % 100,
        (id / 100) % 100
    )
}
