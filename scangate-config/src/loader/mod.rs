pub mod error;

use once_cell::sync::Lazy;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use error::ConfigLoadError;

use crate::{
    constants::{
        DEFAULT_HOST, DEFAULT_LICENSE_TIMEOUT_SECS, DEFAULT_LICENSE_TTL_SECS,
        DEFAULT_LICENSE_URL, DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_FILE_BYTES,
        DEFAULT_MAX_FILES, DEFAULT_PORT, DEFAULT_SESSION_IDLE_SECS,
    },
    models::{
        Config, ConfigMetadata, LicenseConfig, LimitsConfig, ProfileConfig,
        ServerConfig, SessionConfig,
        scanners::{ScannerEndpoint, default_scanners},
        sources::{EnvConfig, FileConfig, FileScannerConfig},
    },
    paths::PathMapping,
    validation::{self, ConfigWarnings},
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("scangate.yaml"),
        PathBuf::from("scangate.yml"),
        PathBuf::from("config/scangate.yaml"),
        PathBuf::from("scangate.toml"),
    ]
});

/// Result of a successful load: the composed config plus anything the
/// operator should hear about.
#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    /// Skip `.env` handling entirely (tests).
    pub skip_env_file: bool,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn without_env_file(mut self) -> Self {
        self.options.skip_env_file = true;
        self
    }

    /// Load `.env`, read the process environment, then compose.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = self.load_env_file()?;
        let mut load = self.load_with_env(EnvConfig::gather())?;
        load.config.metadata.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Compose from an already-gathered environment.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let config_present = file_config.is_some();
        let config = compose_config(file_config.unwrap_or_default(), env, config_path);

        let mut warnings = validation::validate(&config)?;
        if !config_present {
            warnings.push_with_hint(
                "No scangate.yaml detected; using defaults and environment variables",
                "Create scangate.yaml or set SCANGATE_CONFIG to customise scanner endpoints",
            );
        }

        Ok(ConfigLoad { config, warnings })
    }

    fn load_env_file(&self) -> Result<bool, ConfigLoadError> {
        if self.options.skip_env_file {
            return Ok(false);
        }
        let loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true),
            None => dotenvy::dotenv().map(|_| true),
        };
        loaded.or_else(|err| match err {
            dotenvy::Error::Io(_) => Ok(false),
            _ => Err(ConfigLoadError::EnvFile(err)),
        })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigLoadError::MissingConfig { path });
                }
                path
            }
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
            {
                Some(found) => found.clone(),
                None => return Ok((None, None)),
            },
        };

        let contents =
            fs::read_to_string(&path).map_err(|source| ConfigLoadError::Io {
                path: path.clone(),
                source,
            })?;
        let file_config = parse_file_config(&path, &contents)?;
        Ok((Some(file_config), Some(path)))
    }
}

/// Parse by extension; unknown extensions are tried as YAML (a JSON
/// document is valid YAML too).
pub fn parse_file_config(
    path: &Path,
    contents: &str,
) -> Result<FileConfig, ConfigLoadError> {
    let parse_err = |message: String| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        message,
    };

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => {
            toml::from_str(contents).map_err(|err| parse_err(err.to_string()))
        }
        Some("json") => serde_json::from_str(contents)
            .map_err(|err| parse_err(err.to_string())),
        _ => serde_yaml::from_str(contents)
            .map_err(|err| parse_err(err.to_string())),
    }
}

fn compose_config(
    file: FileConfig,
    env: EnvConfig,
    config_path: Option<PathBuf>,
) -> Config {
    let FileConfig {
        server: file_server,
        scanners: file_scanners,
        license: file_license,
        limits: file_limits,
        paths: file_paths,
        profile: file_profile,
        sessions: file_sessions,
    } = file;

    let server = ServerConfig {
        host: env
            .server_host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: env.server_port.or(file_server.port).unwrap_or(DEFAULT_PORT),
    };

    let mut scanners = default_scanners();
    for scanner in &mut scanners {
        apply_scanner_overrides(scanner, &file_scanners, &env);
    }
    // Names outside the built-in set are kept so validation can reject them.
    for (name, extra) in &file_scanners {
        if scanners.iter().any(|s| &s.name == name) {
            continue;
        }
        let mut endpoint = ScannerEndpoint::new(
            name.clone(),
            extra.host.clone().unwrap_or_default(),
            extra.port.unwrap_or_default(),
        );
        endpoint.enabled = extra.enabled.unwrap_or(true);
        scanners.push(endpoint);
    }

    let license = LicenseConfig {
        key: env.license_key.clone(),
        server_url: env
            .license_url
            .clone()
            .or(file_license.server_url)
            .unwrap_or_else(|| DEFAULT_LICENSE_URL.to_string())
            .trim_end_matches('/')
            .to_string(),
        cache_ttl: Duration::from_secs(
            file_license.cache_ttl_secs.unwrap_or(DEFAULT_LICENSE_TTL_SECS),
        ),
        timeout: Duration::from_secs(
            file_license
                .timeout_secs
                .unwrap_or(DEFAULT_LICENSE_TIMEOUT_SECS),
        ),
    };

    let limits = LimitsConfig {
        max_body_bytes: env
            .max_body_bytes
            .or(file_limits.max_body_bytes)
            .unwrap_or(DEFAULT_MAX_BODY_BYTES),
        max_file_bytes: file_limits
            .max_file_bytes
            .unwrap_or(DEFAULT_MAX_FILE_BYTES),
        max_files: file_limits.max_files.unwrap_or(DEFAULT_MAX_FILES),
    };

    let paths = PathMapping {
        host_root: env.host_root.clone().or(file_paths.host_root),
        mount_root: env.mount_root.clone().or(file_paths.mount_root),
    };

    let profile = ProfileConfig {
        default: env.profile.clone().or(file_profile.default),
        project_dir: env.project_dir.clone().or(file_profile.project_dir),
    };

    let sessions = SessionConfig {
        idle_timeout: Duration::from_secs(
            file_sessions
                .idle_timeout_secs
                .unwrap_or(DEFAULT_SESSION_IDLE_SECS),
        ),
    };

    Config {
        server,
        scanners,
        license,
        limits,
        paths,
        profile,
        sessions,
        metadata: ConfigMetadata {
            config_path,
            env_file_loaded: false,
        },
    }
}

fn apply_scanner_overrides(
    scanner: &mut ScannerEndpoint,
    file_scanners: &BTreeMap<String, FileScannerConfig>,
    env: &EnvConfig,
) {
    if let Some(file) = file_scanners.get(&scanner.name) {
        if let Some(host) = &file.host {
            scanner.host = host.clone();
        }
        if let Some(port) = file.port {
            scanner.port = port;
        }
        if let Some(enabled) = file.enabled {
            scanner.enabled = enabled;
        }
        if let Some(timeout) = file.timeout_secs {
            scanner.timeout = Duration::from_secs(timeout);
        }
    }

    if let Some(env) = env.scanners.get(&scanner.name) {
        if let Some(host) = &env.host {
            scanner.host = host.clone();
        }
        if let Some(port) = env.port {
            scanner.port = port;
        }
        if let Some(enabled) = env.enabled {
            scanner.enabled = enabled;
        }
    }
}
