pub mod scanners;
pub mod sources;

use std::{path::PathBuf, time::Duration};

use scanners::ScannerEndpoint;

use crate::paths::PathMapping;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    /// Backends in registration order. Disabled entries are kept so they can
    /// be reported in diagnostics, but are never dispatched to.
    pub scanners: Vec<ScannerEndpoint>,
    pub license: LicenseConfig,
    pub limits: LimitsConfig,
    pub paths: PathMapping,
    pub profile: ProfileConfig,
    pub sessions: SessionConfig,
    pub metadata: ConfigMetadata,
}

impl Config {
    pub fn enabled_scanners(&self) -> impl Iterator<Item = &ScannerEndpoint> {
        self.scanners.iter().filter(|scanner| scanner.enabled)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct LicenseConfig {
    /// Absent key means community mode: no gating, no usage reports.
    pub key: Option<String>,
    pub server_url: String,
    pub cache_ttl: Duration,
    pub timeout: Duration,
}

impl LicenseConfig {
    pub fn is_licensed(&self) -> bool {
        self.key.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub max_body_bytes: usize,
    pub max_file_bytes: u64,
    pub max_files: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileConfig {
    /// Profile activated at startup; falls back to `standard`.
    pub default: Option<String>,
    /// Directory searched for a project-local profile override at startup.
    pub project_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub idle_timeout: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
