//! # Scangate Core
//!
//! Business logic of the Scangate security-scan gateway.
//!
//! ## Overview
//!
//! - **Scanner clients**: one resilient RPC wrapper per backend; failures come
//!   back as [`ScanOutcome::Degraded`] values instead of errors
//! - **Router**: concurrent fan-out to every enabled backend, fan-in with
//!   deterministic deduplication
//! - **Profiles**: built-in compliance profiles plus project-local overrides
//!   merged onto a base profile
//! - **Licensing**: cached key validation and fire-and-forget usage metering
//! - **Scoring**: a 0-100 security score and gate status for a finding set
//!
//! Protocol front-ends live in `scangate-server`; this crate does no I/O
//! beyond outbound HTTP and reading profile override files.
#![allow(missing_docs)]

pub mod dedup;
pub mod error;
pub mod license;
pub mod profiles;
pub mod router;
pub mod scanner;
pub mod score;

#[cfg(test)]
pub(crate) mod test_support;

pub use dedup::dedup_findings;
pub use error::ProfileError;
pub use license::{LicenseCheck, LicenseClient, UsageReport};
pub use profiles::ProfileManager;
pub use router::ScanRouter;
pub use scanner::{HttpScannerClient, ScanOutcome, ScannerClient};
pub use score::{GateStatus, SecurityScore};

/// Scanner label the router stamps on merged results.
pub const GATEWAY_SCANNER: &str = "scangate";

/// Version stamped on merged results.
pub const GATEWAY_VERSION: &str = env!("CARGO_PKG_VERSION");
