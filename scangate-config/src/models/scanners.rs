use std::time::Duration;

use crate::constants::{DEFAULT_SCANNER_HOST, DEFAULT_SCANNER_TIMEOUT_SECS};

/// Built-in backend names with their default ports, in registration order.
pub const KNOWN_SCANNERS: [(&str, u16); 8] = [
    ("sast", 9101),
    ("sca", 9102),
    ("secrets", 9103),
    ("iac", 9104),
    ("container", 9105),
    ("dast", 9106),
    ("license", 9107),
    ("posture", 9108),
];

/// Where one scanner backend lives and whether the gateway dispatches to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerEndpoint {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub enabled: bool,
    pub timeout: Duration,
}

impl ScannerEndpoint {
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
            enabled: true,
            timeout: Duration::from_secs(DEFAULT_SCANNER_TIMEOUT_SECS),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Prefix for this backend's environment overrides, e.g. `SCANGATE_SAST`.
    pub fn env_prefix(&self) -> String {
        env_prefix(&self.name)
    }
}

pub fn env_prefix(name: &str) -> String {
    format!("SCANGATE_{}", name.to_ascii_uppercase().replace('-', "_"))
}

pub fn is_known_scanner(name: &str) -> bool {
    KNOWN_SCANNERS.iter().any(|(known, _)| *known == name)
}

pub fn default_scanners() -> Vec<ScannerEndpoint> {
    KNOWN_SCANNERS
        .iter()
        .map(|(name, port)| ScannerEndpoint::new(*name, DEFAULT_SCANNER_HOST, *port))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_backend_in_order() {
        let scanners = default_scanners();
        let names: Vec<_> = scanners.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            ["sast", "sca", "secrets", "iac", "container", "dast", "license", "posture"]
        );
        assert_eq!(scanners[0].base_url(), "http://localhost:9101");
        assert!(scanners.iter().all(|s| s.enabled));
    }

    #[test]
    fn env_prefix_normalizes_names() {
        assert_eq!(env_prefix("sast"), "SCANGATE_SAST");
        assert_eq!(env_prefix("api-posture"), "SCANGATE_API_POSTURE");
    }
}
