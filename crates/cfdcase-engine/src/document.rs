//! Persistence of an analysis inside the host document.
//!
//! The host stores an opaque JSON blob; this module defines its shape:
//!
//! ```text
//! { "format_version": 1, "config": {..}, "case": {..}, "staleness": {..} }
//! ```
//!
//! Restoring never trusts stored field maps: every boundary variant is
//! re-resolved during deserialization, and every entity's values are
//! reconciled against the registries before the analysis is handed back.
//! A run in progress is not part of the document.

use std::error::Error;
use std::fmt;

use cfdcase_core::ValidationError;
use cfdcase_model::{CaseModel, StalenessTracker};
use serde::{Deserialize, Serialize};

use crate::analysis::Analysis;
use crate::config::{AnalysisConfig, ConfigError};

/// Version written by [`Analysis::to_json`].
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct DocumentRef<'a> {
    format_version: u32,
    config: &'a AnalysisConfig,
    case: &'a CaseModel,
    staleness: &'a StalenessTracker,
}

#[derive(Deserialize)]
struct Document {
    format_version: u32,
    config: AnalysisConfig,
    case: CaseModel,
    #[serde(default)]
    staleness: StalenessTracker,
}

/// Errors from saving or restoring an analysis.
#[derive(Debug)]
pub enum DocumentError {
    /// The blob is not valid JSON or does not have the document shape.
    Json(serde_json::Error),
    /// The blob was written by an incompatible version.
    UnsupportedVersion {
        /// Version found in the blob.
        found: u32,
    },
    /// The stored configuration is invalid.
    Config(ConfigError),
    /// The stored case model is inconsistent.
    Invalid(ValidationError),
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "malformed analysis document: {e}"),
            Self::UnsupportedVersion { found } => write!(
                f,
                "analysis document version {found} is not supported (expected {FORMAT_VERSION})"
            ),
            Self::Config(e) => write!(f, "stored configuration: {e}"),
            Self::Invalid(e) => write!(f, "stored case model: {e}"),
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Invalid(e) => Some(e),
            Self::UnsupportedVersion { .. } => None,
        }
    }
}

impl From<serde_json::Error> for DocumentError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl Analysis {
    /// Serialize the configuration, case model, and staleness for the
    /// host document.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        let doc = DocumentRef {
            format_version: FORMAT_VERSION,
            config: &self.config,
            case: &self.case,
            staleness: &self.staleness,
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Restore an analysis saved by [`to_json`](Self::to_json).
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let doc: Document = serde_json::from_str(json)?;
        if doc.format_version != FORMAT_VERSION {
            return Err(DocumentError::UnsupportedVersion {
                found: doc.format_version,
            });
        }
        doc.config.validate().map_err(DocumentError::Config)?;

        let mut case = doc.case;
        case.set_escalation(doc.config.escalation.clone());
        case.normalize_restored().map_err(DocumentError::Invalid)?;
        log::debug!(
            "restored analysis with {} boundaries, {} zones, {} regions",
            case.boundaries().count(),
            case.zones().count(),
            case.regions().count()
        );
        Ok(Analysis::from_parts(case, doc.staleness, doc.config))
    }
}
