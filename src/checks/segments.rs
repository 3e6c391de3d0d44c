//! Segment checks.
//!
//! Phase data is one index entry of the `indices` object from
//! `GET /_segments`: `{shards: {"0": [{routing, segments: {...}}, ...]}}`.

use crate::{Check, Severity};
use serde_json::Value;
use std::collections::BTreeSet;

pub fn checks() -> Vec<Check> {
    vec![
        Check::index("Lucene 3.x segments", Severity::Red, lucene_3_segments),
        Check::index("Shards not started", Severity::Yellow, shards_not_started),
    ]
}

/// Every shard copy as `(shard number, copy)`
fn shard_copies(data: &Value) -> impl Iterator<Item = (&str, &Value)> {
    data.get("shards")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|shards| shards.iter())
        .flat_map(|(shard, copies)| {
            copies
                .as_array()
                .into_iter()
                .flatten()
                .map(move |copy| (shard.as_str(), copy))
        })
}

fn lucene_3_segments(data: &Value, index: &str) -> Option<String> {
    let mut count = 0usize;
    for (_, copy) in shard_copies(data) {
        let Some(segments) = copy.get("segments").and_then(Value::as_object) else {
            continue;
        };
        count += segments
            .values()
            .filter_map(|segment| segment.get("version").and_then(Value::as_str))
            .filter(|version| version.starts_with("3."))
            .count();
    }

    (count > 0).then(|| {
        format!(
            "Index `{}` has {} segment(s) written by Lucene 3.x and must be upgraded or reindexed",
            index, count
        )
    })
}

fn shards_not_started(data: &Value, _index: &str) -> Option<String> {
    let pending: BTreeSet<u32> = shard_copies(data)
        .filter(|(_, copy)| {
            let state = copy.get("routing").and_then(|r| r.get("state")).and_then(Value::as_str);
            state.is_some_and(|s| s != "STARTED")
        })
        .filter_map(|(shard, _)| shard.parse().ok())
        .collect();

    if pending.is_empty() {
        return None;
    }
    let list: Vec<String> = pending.iter().map(u32::to_string).collect();
    Some(format!(
        "Shards [{}] are not started; their segments could not be inspected",
        list.join(", ")
    ))
}
