//! Cluster metadata snapshot.

use crate::engine::flatten::FlatMappings;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Raw responses of the metadata APIs, one per data category.
///
/// Produced by a [`SnapshotSource`](crate::fetch::source::SnapshotSource)
/// and read-only for the rest of the run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// `indices` of `GET /_segments`
    pub segments: Value,
    /// `GET /_settings`
    pub settings: Value,
    /// `GET /_mappings`
    pub mappings: Value,
    /// `GET /_warmers`
    pub warmers: Value,
    /// `GET /_aliases`
    pub aliases: Value,
    /// `GET /_cluster/settings`
    pub cluster_settings: Value,
}

impl Snapshot {
    /// Namespaced tree: `{index: {segments, settings, ...}, cluster: {settings}}`
    pub fn to_value(&self) -> Value {
        json!({
            "index": {
                "segments": self.segments,
                "settings": self.settings,
                "mappings": self.mappings,
                "warmers": self.warmers,
                "aliases": self.aliases,
            },
            "cluster": {
                "settings": self.cluster_settings,
            }
        })
    }

    /// Namespaced tree with the derived `index.flat_mappings` namespace
    pub fn to_value_with(&self, flat: &FlatMappings) -> Value {
        let mut tree = self.to_value();
        if let Some(index) = tree.get_mut("index").and_then(Value::as_object_mut) {
            index.insert("flat_mappings".to_string(), flat.to_value());
        }
        tree
    }

    /// Index names known to the alias registry, sorted
    pub fn index_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .aliases
            .as_object()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}
