//! In-memory snapshot sources.
//!
//! `MockSnapshotSource` serves a fixed snapshot (or a fixed failure) and
//! counts how often it was asked, so tests can assert that a run fetched
//! exactly once.

use index_doc::engine::snapshot::Snapshot;
use index_doc::fetch::source::{ClusterVersion, SnapshotSource};
use index_doc::IndexDocError;
use serde_json::{json, Value};
use std::cell::Cell;

/// Configurable snapshot source
pub struct MockSnapshotSource {
    pub version: Option<ClusterVersion>,
    pub snapshot: Result<Snapshot, IndexDocError>,
    pub fetches: Cell<u32>,
}

impl MockSnapshotSource {
    pub fn new(snapshot: Snapshot) -> Self {
        MockSnapshotSource {
            version: None,
            snapshot: Ok(snapshot),
            fetches: Cell::new(0),
        }
    }

    pub fn failing(error: IndexDocError) -> Self {
        MockSnapshotSource {
            version: None,
            snapshot: Err(error),
            fetches: Cell::new(0),
        }
    }

    pub fn with_version(mut self, number: &str) -> Self {
        self.version = ClusterVersion::parse(number, false).ok();
        self
    }
}

impl SnapshotSource for MockSnapshotSource {
    fn describe(&self) -> String {
        "mock".to_string()
    }

    fn cluster_version(&self) -> Result<Option<ClusterVersion>, IndexDocError> {
        Ok(self.version.clone())
    }

    fn fetch_snapshot(&self) -> Result<Snapshot, IndexDocError> {
        self.fetches.set(self.fetches.get() + 1);
        self.snapshot.clone()
    }
}

/// Snapshot with the given indices and their mapping types
pub fn snapshot_with_mappings(indices: &[(&str, Value)]) -> Snapshot {
    let mut aliases = serde_json::Map::new();
    let mut mappings = serde_json::Map::new();
    for (name, types) in indices {
        aliases.insert(name.to_string(), json!({ "aliases": {} }));
        mappings.insert(name.to_string(), json!({ "mappings": types }));
    }
    Snapshot {
        aliases: Value::Object(aliases),
        mappings: Value::Object(mappings),
        ..Snapshot::default()
    }
}

/// A 1.x cluster with one clean index (`clean`) and one index with
/// problems in every phase (`legacy`).
pub fn legacy_cluster() -> Snapshot {
    Snapshot {
        segments: json!({
            "clean": { "shards": { "0": [
                { "routing": { "state": "STARTED" }, "segments": { "_0": { "version": "4.10.4" } } }
            ] } },
            "legacy": { "shards": { "0": [
                { "routing": { "state": "STARTED" }, "segments": { "_0": { "version": "3.6.2" } } }
            ] } }
        }),
        settings: json!({
            "clean": { "settings": { "index": { "version": { "created": "1070399" } } } },
            "legacy": { "settings": { "index": {
                "version": { "created": "200499" },
                "merge": { "policy": { "type": "tiered" } }
            } } }
        }),
        mappings: json!({
            "clean": { "mappings": { "doc": { "properties": {
                "title": { "type": "string", "analyzer": "english" }
            } } } },
            "legacy": { "mappings": {
                "tweet": {
                    "_boost": { "name": "rank" },
                    "properties": {
                        "id": { "type": "string" },
                        "city": {
                            "type": "multi_field",
                            "fields": {
                                "city": { "type": "string" },
                                "raw": { "type": "string", "index": "not_analyzed" }
                            }
                        },
                        "title": { "type": "string", "boost": 2 }
                    }
                },
                "user": { "properties": { "id": { "type": "long" } } }
            } }
        }),
        warmers: json!({}),
        aliases: json!({ "clean": { "aliases": {} }, "legacy": { "aliases": {} } }),
        cluster_settings: json!({ "persistent": {}, "transient": {} }),
    }
}
