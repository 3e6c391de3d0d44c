//! Version and build information.

use serde::Serialize;
use std::fmt;

/// Build information
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_date: Option<&'static str>,
    pub target: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rustc_version: Option<&'static str>,
    /// `https://` endpoints are supported
    pub tls: bool,
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "index-doc {}", self.version)?;

        if let Some(commit) = self.commit {
            writeln!(f, "Commit: {}", commit)?;
        }

        if let Some(date) = self.build_date {
            writeln!(f, "Built: {}", date)?;
        }

        writeln!(f, "Target: {}", self.target)?;
        writeln!(f, "TLS: {}", if self.tls { "yes" } else { "no" })?;

        if let Some(rustc) = self.rustc_version {
            write!(f, "Rustc: {}", rustc)?;
        }

        Ok(())
    }
}

/// Get build information
pub fn get_build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("INDEX_DOC_GIT_HASH"),
        build_date: option_env!("INDEX_DOC_BUILD_DATE"),
        target: option_env!("INDEX_DOC_TARGET").unwrap_or(std::env::consts::ARCH),
        rustc_version: option_env!("INDEX_DOC_RUSTC_VERSION"),
        tls: cfg!(feature = "tls"),
    }
}
