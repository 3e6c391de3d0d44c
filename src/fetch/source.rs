//! Snapshot sources.
//!
//! A [`SnapshotSource`] supplies the cluster version and the metadata
//! snapshot for one run. [`HttpSnapshotSource`] asks a live cluster,
//! [`FileSnapshotSource`] reads a JSON document captured earlier.

use crate::config::IndexDocConfig;
use crate::engine::path::resolve;
use crate::engine::snapshot::Snapshot;
use crate::fetch::client::{Endpoint, HttpClient, HttpConfig, HttpResponse};
use crate::IndexDocError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// Version reported by `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterVersion {
    /// Version string as reported (`"1.7.3"`)
    pub number: String,
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    /// Built from a snapshot build
    pub snapshot: bool,
}

impl ClusterVersion {
    /// Parse `major.minor.patch`, ignoring any qualifier on the patch
    /// component (`2.0.0-beta1`).
    pub fn parse(number: &str, snapshot: bool) -> Result<Self, IndexDocError> {
        let invalid = || IndexDocError::Parse {
            context: "cluster version".to_string(),
            message: format!("unrecognized version number '{}'", number),
        };

        let mut parts = number.splitn(3, '.');
        let mut next = || -> Result<u32, IndexDocError> {
            let part = parts.next().ok_or_else(invalid)?;
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().map_err(|_| invalid())
        };

        Ok(ClusterVersion {
            major: next()?,
            minor: next()?,
            patch: next()?,
            number: number.to_string(),
            snapshot,
        })
    }

    /// Read `version.number` and `version.build_snapshot` from a `GET /`
    /// response body.
    pub fn from_root(root: &Value) -> Result<Self, IndexDocError> {
        let number = resolve(root, "version.number")
            .and_then(Value::as_str)
            .ok_or_else(|| IndexDocError::Parse {
                context: "cluster version".to_string(),
                message: "response has no version.number".to_string(),
            })?;
        let snapshot = resolve(root, "version.build_snapshot")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        ClusterVersion::parse(number, snapshot)
    }
}

impl fmt::Display for ClusterVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number)?;
        if self.snapshot {
            write!(f, ".SNAPSHOT")?;
        }
        Ok(())
    }
}

/// Supplier of the data for one run.
pub trait SnapshotSource {
    /// Where the data comes from, for logs
    fn describe(&self) -> String;

    /// Cluster version, when the source knows it
    fn cluster_version(&self) -> Result<Option<ClusterVersion>, IndexDocError>;

    /// Every data category of the snapshot; any failure aborts the run
    fn fetch_snapshot(&self) -> Result<Snapshot, IndexDocError>;
}

/// Metadata APIs, in request order
pub const SNAPSHOT_PATHS: [&str; 6] = [
    "/_segments",
    "/_settings",
    "/_mappings",
    "/_warmers",
    "/_aliases",
    "/_cluster/settings",
];

/// Snapshot from a live cluster over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSnapshotSource {
    endpoint: Endpoint,
    client: HttpClient,
}

impl HttpSnapshotSource {
    pub fn new(endpoint: Endpoint, client: HttpClient) -> Self {
        HttpSnapshotSource { endpoint, client }
    }

    /// Source for `config.host` with the configured timeouts and retries
    pub fn from_config(config: &IndexDocConfig) -> Result<Self, IndexDocError> {
        let endpoint = Endpoint::parse(&config.host)?;
        let client = HttpClient::with_config(HttpConfig {
            connect_timeout_ms: config.timeout_ms,
            read_timeout_ms: config.timeout_ms,
            max_retries: config.max_retries,
            retry_delay_ms: config.retry_delay_ms,
        });
        Ok(HttpSnapshotSource::new(endpoint, client))
    }

    /// `GET path` and parse the JSON body
    pub fn get_json(&self, path: &str) -> Result<Value, IndexDocError> {
        let url = self.endpoint.url(path);
        tracing::debug!(url = %url, "fetching");

        let response = self
            .client
            .get(&self.endpoint, path)
            .map_err(|e| IndexDocError::FetchFailure {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        if !response.is_success() {
            return Err(IndexDocError::FetchFailure {
                reason: fetch_failure_reason(&response),
                url,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| IndexDocError::FetchFailure {
            url,
            reason: format!("invalid JSON: {}", e),
        })
    }
}

impl SnapshotSource for HttpSnapshotSource {
    fn describe(&self) -> String {
        format!("Checking cluster at: {}", self.endpoint.url(""))
    }

    fn cluster_version(&self) -> Result<Option<ClusterVersion>, IndexDocError> {
        let root = self.get_json("/")?;
        ClusterVersion::from_root(&root).map(Some)
    }

    /// The requests run concurrently and are all joined before the first
    /// failure, in request order, is returned.
    fn fetch_snapshot(&self) -> Result<Snapshot, IndexDocError> {
        let results: Vec<Result<Value, IndexDocError>> = std::thread::scope(|s| {
            let handles: Vec<_> = SNAPSHOT_PATHS
                .iter()
                .map(|path| s.spawn(move || self.get_json(path)))
                .collect();

            handles
                .into_iter()
                .zip(SNAPSHOT_PATHS)
                .map(|(handle, path)| {
                    handle.join().unwrap_or_else(|_| {
                        Err(IndexDocError::FetchFailure {
                            url: self.endpoint.url(path),
                            reason: "request thread panicked".to_string(),
                        })
                    })
                })
                .collect()
        });

        let mut values = Vec::with_capacity(results.len());
        for result in results {
            values.push(result?);
        }

        let mut values = values.into_iter();
        let mut next = || values.next().unwrap_or(Value::Null);
        let segments = next();
        Ok(Snapshot {
            segments: segments.get("indices").cloned().unwrap_or(Value::Null),
            settings: next(),
            mappings: next(),
            warmers: next(),
            aliases: next(),
            cluster_settings: next(),
        })
    }
}

/// Failure reason of an unsuccessful response: the structured `error` field
/// of a JSON body, else the raw body, else the status line.
pub fn fetch_failure_reason(response: &HttpResponse) -> String {
    if let Ok(body) = serde_json::from_str::<Value>(&response.body) {
        match body.get("error") {
            Some(Value::String(reason)) => return reason.clone(),
            Some(error @ Value::Object(_)) => {
                return match error.get("reason").and_then(Value::as_str) {
                    Some(reason) => reason.to_string(),
                    None => error.to_string(),
                };
            }
            Some(Value::Null) | None => {}
            Some(other) => return other.to_string(),
        }
    }

    let body = response.body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    format!("{} {}", response.status, response.status_text)
        .trim()
        .to_string()
}

/// Captured snapshot document, as written by `index-doc` users or tests.
#[derive(Debug, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    version: Option<VersionEntry>,
    #[serde(flatten)]
    snapshot: Snapshot,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VersionEntry {
    Number(String),
    Full {
        number: String,
        #[serde(default)]
        build_snapshot: bool,
    },
}

/// Snapshot from a JSON file:
/// `{version?, segments, settings, mappings, warmers, aliases, cluster_settings}`.
///
/// `version` is either a version string or `{number, build_snapshot}`.
/// Missing categories are empty.
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    path: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        FileSnapshotSource {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read(&self) -> Result<SnapshotFile, IndexDocError> {
        let context = self.path.display().to_string();
        let content = std::fs::read_to_string(&self.path).map_err(|e| IndexDocError::Io {
            context: context.clone(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| IndexDocError::Parse {
            context,
            message: e.to_string(),
        })
    }
}

impl SnapshotSource for FileSnapshotSource {
    fn describe(&self) -> String {
        format!("Reading snapshot: {}", self.path.display())
    }

    fn cluster_version(&self) -> Result<Option<ClusterVersion>, IndexDocError> {
        match self.read()?.version {
            Some(VersionEntry::Number(number)) => ClusterVersion::parse(&number, false).map(Some),
            Some(VersionEntry::Full {
                number,
                build_snapshot,
            }) => ClusterVersion::parse(&number, build_snapshot).map(Some),
            None => Ok(None),
        }
    }

    fn fetch_snapshot(&self) -> Result<Snapshot, IndexDocError> {
        Ok(self.read()?.snapshot)
    }
}
