//! Diagnostic logging.
//!
//! Logs go to stderr so they never mix with the report on stdout.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Variable holding a `tracing` filter directive, e.g.
/// `INDEX_DOC_LOG=index_doc::fetch=debug`
pub const LOG_ENV: &str = "INDEX_DOC_LOG";

/// Filter used when `INDEX_DOC_LOG` is unset or invalid
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "index_doc=debug"
    } else {
        "index_doc=warn"
    }
}

/// Install the global subscriber. Later calls do nothing.
pub fn init_tracing(verbose: bool) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(verbose),
            )
            .with(filter)
            .init();
    });
}
