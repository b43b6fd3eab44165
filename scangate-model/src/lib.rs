//! Core data model definitions shared across Scangate crates.
//!
//! Every scanner backend speaks these shapes on the wire: a [`ScanRequest`]
//! goes in, a [`ScanResult`] full of [`Finding`]s comes back.
#![allow(missing_docs)]

pub mod error;
pub mod finding;
pub mod license;
pub mod profile;
pub mod scan;
pub mod severity;

// Intentionally curated re-exports for downstream consumers.
pub use error::{ModelError, Result as ModelResult};
pub use finding::{DedupKey, Finding};
pub use license::LicenseVerdict;
pub use profile::{Profile, SeverityThresholds};
pub use scan::{
    FileTarget, ProfileRules, ProjectContext, ScanMetadata, ScanRequest,
    ScanResult,
};
pub use severity::{Severity, SeverityCounts};
