use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::PathBuf};

use super::scanners::{KNOWN_SCANNERS, env_prefix};

/// Raw configuration as defined in a YAML, TOML, or JSON file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    /// Per-backend overrides keyed by scanner name.
    #[serde(default)]
    pub scanners: BTreeMap<String, FileScannerConfig>,
    #[serde(default)]
    pub license: FileLicenseConfig,
    #[serde(default)]
    pub limits: FileLimitsConfig,
    #[serde(default)]
    pub paths: FilePathsConfig,
    #[serde(default)]
    pub profile: FileProfileConfig,
    #[serde(default)]
    pub sessions: FileSessionConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileScannerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileLicenseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileLimitsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_body_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_file_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_files: Option<usize>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FilePathsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mount_root: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileProfileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileSessionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnvScannerOverride {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub enabled: Option<bool>,
}

impl EnvScannerOverride {
    fn is_empty(&self) -> bool {
        self.host.is_none() && self.port.is_none() && self.enabled.is_none()
    }
}

/// Settings sourced from the process environment.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub scanners: BTreeMap<String, EnvScannerOverride>,
    pub license_key: Option<String>,
    pub license_url: Option<String>,
    pub profile: Option<String>,
    pub project_dir: Option<PathBuf>,
    pub host_root: Option<String>,
    pub mount_root: Option<String>,
    pub max_body_bytes: Option<usize>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut scanners = BTreeMap::new();
        for (name, _) in KNOWN_SCANNERS {
            let prefix = env_prefix(name);
            let entry = EnvScannerOverride {
                host: get(&format!("{prefix}_HOST")),
                port: get(&format!("{prefix}_PORT"))
                    .and_then(|s| s.parse().ok()),
                enabled: get(&format!("{prefix}_ENABLED"))
                    .and_then(|s| parse_bool(&s)),
            };
            if !entry.is_empty() {
                scanners.insert(name.to_string(), entry);
            }
        }

        Self {
            config_path: get("SCANGATE_CONFIG").map(PathBuf::from),
            server_host: get("SCANGATE_HOST"),
            server_port: get("SCANGATE_PORT").and_then(|s| s.parse().ok()),
            scanners,
            license_key: get("SCANGATE_LICENSE_KEY"),
            license_url: get("SCANGATE_LICENSE_URL"),
            profile: get("SCANGATE_PROFILE"),
            project_dir: get("SCANGATE_PROJECT_DIR").map(PathBuf::from),
            host_root: get("SCANGATE_HOST_ROOT"),
            mount_root: get("SCANGATE_MOUNT_ROOT"),
            max_body_bytes: get("SCANGATE_MAX_BODY_BYTES")
                .and_then(|s| s.parse().ok()),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn gathers_scanner_overrides_and_ignores_blank_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SCANGATE_PORT", "9000"),
            ("SCANGATE_SAST_HOST", "sast.internal"),
            ("SCANGATE_DAST_ENABLED", "false"),
            ("SCANGATE_LICENSE_KEY", "  "),
        ]);
        let env = EnvConfig::from_lookup(|key| {
            vars.get(key).map(|v| v.to_string())
        });

        assert_eq!(env.server_port, Some(9000));
        assert_eq!(
            env.scanners.get("sast").and_then(|s| s.host.as_deref()),
            Some("sast.internal")
        );
        assert_eq!(
            env.scanners.get("dast").and_then(|s| s.enabled),
            Some(false)
        );
        assert!(!env.scanners.contains_key("sca"));
        assert!(env.license_key.is_none());
    }
}
