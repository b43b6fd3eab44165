//! Shared configuration library for Scangate.
//!
//! This crate centralizes config loading (`.env`, YAML/TOML/JSON file,
//! environment overrides), validation guard rails, and the caller-to-gateway
//! path translation. `scangate-server` re-exports these so there is a single
//! source of truth for defaults and environment variable names.
#![allow(missing_docs)]

pub mod constants;
pub mod loader;
pub mod models;
pub mod paths;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoader, error::ConfigLoadError};
pub use models::scanners::{ScannerEndpoint, default_scanners};
pub use models::sources::{EnvConfig, FileConfig};
pub use models::{
    Config, ConfigMetadata, LicenseConfig, LimitsConfig, ProfileConfig,
    ServerConfig, SessionConfig,
};
pub use paths::PathMapping;
pub use validation::{ConfigWarning, ConfigWarnings};
