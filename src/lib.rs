//! index-doc library
//!
//! Rule-based health checks for the indices of an Elasticsearch cluster.
//!
//! The library ingests a snapshot of cluster metadata (segments, settings,
//! mappings, warmers, aliases and cluster settings), evaluates a registry of
//! phase-scoped checks against every index and reports a severity-annotated
//! result tree:
//! - Check registry scoped by phase (settings, segments, mappings, flattened
//!   mappings, individual mapping fields)
//! - Dotted-path lookup over the snapshot
//! - Mapping flattening with field path collision detection
//! - Severity aggregation per check, per phase and per index
//! - Snapshot retrieval over HTTP (concurrent) or from a JSON file
//!
//! # Example
//!
//! ```no_run
//! use index_doc::{run_checks, IndexDocConfig};
//!
//! let config = IndexDocConfig::default();
//! let report = run_checks(&config).expect("setup failed");
//! println!("Overall: {}", report.severity());
//! ```

pub mod checks;
pub mod cli;
pub mod config;
pub mod engine;
pub mod fetch;
pub mod logging;
pub mod version;

use engine::orchestrator::Orchestrator;
use fetch::source::{FileSnapshotSource, HttpSnapshotSource, SnapshotSource};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

// Re-exports for public API
pub use config::IndexDocConfig;
pub use engine::flatten::{FieldDescriptor, FlattenPathCollision};
pub use engine::registry::{Check, CheckRegistry, Predicate};
pub use engine::result::{Report, ReportBuilder, ReportNode};

/// Outcome severity of a check, a phase or a whole index.
///
/// Variants are declared in ascending order so the derived `Ord` is the
/// severity order: green < blue < yellow < red.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// No issue
    #[default]
    Green,
    /// Informational
    Blue,
    /// Should be fixed
    Yellow,
    /// Must be fixed
    Red,
}

impl Severity {
    /// All severities, lowest first
    pub const ALL: [Severity; 4] = [
        Severity::Green,
        Severity::Blue,
        Severity::Yellow,
        Severity::Red,
    ];

    /// The worse of the two severities.
    ///
    /// Commutative, associative and idempotent, with `Green` as identity.
    pub fn combine(self, other: Severity) -> Severity {
        self.max(other)
    }

    /// Fold any number of severities, starting from green.
    pub fn fold<I>(severities: I) -> Severity
    where
        I: IntoIterator<Item = Severity>,
    {
        severities
            .into_iter()
            .fold(Severity::Green, Severity::combine)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Green => "green",
            Severity::Blue => "blue",
            Severity::Yellow => "yellow",
            Severity::Red => "red",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Checkpoint of index metadata that checks are scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Phase {
    /// `index.settings`
    Settings,
    /// `index.segments`
    Segments,
    /// `index.mappings`
    Mappings,
    /// `index.flat_mappings`
    FlatMappings,
    /// `index.mappings.fields`, evaluated once per flattened field
    MappingFields,
}

impl Phase {
    /// Every phase, in the order `index-doc list` prints them
    pub const ALL: [Phase; 5] = [
        Phase::Settings,
        Phase::Segments,
        Phase::Mappings,
        Phase::FlatMappings,
        Phase::MappingFields,
    ];

    /// Phases evaluated against per-index data, in evaluation order
    pub const DATA_PHASES: [Phase; 4] = [
        Phase::Segments,
        Phase::Settings,
        Phase::Mappings,
        Phase::FlatMappings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Settings => "index.settings",
            Phase::Segments => "index.segments",
            Phase::Mappings => "index.mappings",
            Phase::FlatMappings => "index.flat_mappings",
            Phase::MappingFields => "index.mappings.fields",
        }
    }

    /// Key of the phase's namespace below `index` in the snapshot tree
    pub fn namespace(&self) -> &'static str {
        match self {
            Phase::Settings => "settings",
            Phase::Segments => "segments",
            Phase::Mappings | Phase::MappingFields => "mappings",
            Phase::FlatMappings => "flat_mappings",
        }
    }

    /// Whether checks in this phase take a single field descriptor
    pub fn is_field_phase(&self) -> bool {
        matches!(self, Phase::MappingFields)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = IndexDocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .iter()
            .find(|phase| phase.as_str() == s)
            .copied()
            .ok_or_else(|| IndexDocError::UnknownPhase {
                phase: s.to_string(),
            })
    }
}

/// Error types for index-doc operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IndexDocError {
    /// Snapshot or version retrieval failed
    #[error("Failed to fetch [{url}].  REASON: {reason}")]
    FetchFailure { url: String, reason: String },

    /// Checks registered under a phase outside the fixed set
    #[error("Unknown check phase: '{phase}'")]
    UnknownPhase { phase: String },

    /// Predicate kind does not fit the phase it was registered under
    #[error("Check '{check}' cannot be registered under phase {phase}")]
    PhaseMismatch { phase: Phase, check: String },

    /// Invalid or unreadable configuration
    #[error("Configuration error in {path}: {message}")]
    Config { path: String, message: String },

    /// I/O error
    #[error("I/O error in {context}: {message}")]
    Io { context: String, message: String },

    /// Parse error
    #[error("Parse error in {context}: {message}")]
    Parse { context: String, message: String },
}

/// Run every built-in check against the cluster or snapshot file named by
/// `config`.
///
/// Setup problems (bad configuration) are returned as errors. A failed
/// snapshot retrieval is not: it is recorded in [`Report::error`] so it can
/// be rendered like any other report.
///
/// # Example
///
/// ```no_run
/// use index_doc::{run_checks, IndexDocConfig};
///
/// let config = IndexDocConfig {
///     host: "http://es.internal:9200".to_string(),
///     ..Default::default()
/// };
///
/// match run_checks(&config) {
///     Ok(report) => println!("{} indices checked", report.summary().total),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_checks(config: &IndexDocConfig) -> Result<Report, IndexDocError> {
    config.validate()?;

    let registry = checks::default_registry()?;
    let source: Box<dyn SnapshotSource> = match config.snapshot_file {
        Some(ref path) => Box::new(FileSnapshotSource::new(path)),
        None => Box::new(HttpSnapshotSource::from_config(config)?),
    };

    let mut builder = ReportBuilder::new();
    // A fetch failure has already been emitted into the builder as an error
    // event, so the outcome itself carries nothing the report lacks.
    if let Err(e) = Orchestrator::new(&registry).run(source.as_ref(), &mut builder) {
        tracing::warn!(error = %e, "run aborted");
    }

    Ok(builder.finish())
}
