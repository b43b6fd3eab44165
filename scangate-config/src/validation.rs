use std::collections::HashSet;

use thiserror::Error;

use crate::models::{Config, scanners::is_known_scanner};

/// Non-fatal observation surfaced to the operator at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push(&mut self, message: impl Into<String>) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint(
        &mut self,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Configuration that must not be allowed to start a server.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigGuardRailError {
    #[error("server port must be non-zero")]
    ZeroPort,
    #[error("unknown scanner '{0}' in configuration")]
    UnknownScanner(String),
    #[error("scanner '{0}' is configured more than once")]
    DuplicateScanner(String),
    #[error("scanner '{name}' has port 0")]
    ZeroScannerPort { name: String },
    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,
}

pub fn validate(config: &Config) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    if config.server.port == 0 {
        return Err(ConfigGuardRailError::ZeroPort);
    }
    if config.limits.max_body_bytes == 0 {
        return Err(ConfigGuardRailError::ZeroBodyLimit);
    }

    let mut seen = HashSet::new();
    for scanner in &config.scanners {
        if !is_known_scanner(&scanner.name) {
            return Err(ConfigGuardRailError::UnknownScanner(
                scanner.name.clone(),
            ));
        }
        if !seen.insert(scanner.name.as_str()) {
            return Err(ConfigGuardRailError::DuplicateScanner(
                scanner.name.clone(),
            ));
        }
        if scanner.port == 0 {
            return Err(ConfigGuardRailError::ZeroScannerPort {
                name: scanner.name.clone(),
            });
        }
    }

    if config.enabled_scanners().next().is_none() {
        warnings.push_with_hint(
            "All scanner backends are disabled; scans will return no findings",
            "Set SCANGATE_<NAME>_ENABLED=true or enable a scanner in scangate.yaml",
        );
    }

    if !config.license.is_licensed() {
        warnings.push_with_hint(
            "No license key configured; running in community mode without usage metering",
            "Set SCANGATE_LICENSE_KEY to enable license gating",
        );
    }

    if config.paths.host_root.is_some() != config.paths.mount_root.is_some() {
        warnings.push(
            "Only one of paths.host_root / paths.mount_root is set; path translation is disabled",
        );
    }

    Ok(warnings)
}
