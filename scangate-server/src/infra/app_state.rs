use std::{fmt, sync::Arc};

use anyhow::Context;
use tracing::info;

use scangate_config::{Config, PathMapping};
use scangate_core::{HttpScannerClient, LicenseClient, ProfileManager, ScanRouter};

use crate::mcp::SessionManager;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub scanners: Arc<ScanRouter>,
    /// Startup profile registry. REST scans read it as-is; each MCP session
    /// starts from its own clone, so nothing writes through it.
    pub profiles: Arc<ProfileManager>,
    pub license: Arc<LicenseClient>,
    pub sessions: Arc<SessionManager>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("scanners", &self.scanners)
            .field("sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire clients for every enabled backend and the license authority.
    pub fn from_config(config: Arc<Config>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("scangate/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        let mut router = ScanRouter::new();
        for endpoint in config.enabled_scanners() {
            let client = HttpScannerClient::new(
                endpoint.name.clone(),
                endpoint.base_url(),
                http.clone(),
            )
            .with_timeout(endpoint.timeout);
            router.register(endpoint.name.clone(), Arc::new(client));
        }
        info!(scanners = ?router.scanner_names(), "scanner backends registered");

        let license = LicenseClient::new(config.license.server_url.clone(), http)
            .with_cache_ttl(config.license.cache_ttl)
            .with_timeout(config.license.timeout);

        Self::with_router(config, router, license)
    }

    /// Assemble state around an already-built router.
    pub fn with_router(
        config: Arc<Config>,
        router: ScanRouter,
        license: LicenseClient,
    ) -> anyhow::Result<Self> {
        let profiles = initial_profiles(&config)?;
        info!(profile = profiles.active_name(), "active compliance profile");

        Ok(Self {
            config,
            scanners: Arc::new(router),
            profiles: Arc::new(profiles),
            license: Arc::new(license),
            sessions: Arc::new(SessionManager::new()),
        })
    }

    pub fn paths(&self) -> &PathMapping {
        &self.config.paths
    }

    pub fn license_key(&self) -> Option<&str> {
        self.config.license.key.as_deref()
    }
}

fn initial_profiles(config: &Config) -> anyhow::Result<ProfileManager> {
    let mut profiles = ProfileManager::new();

    if let Some(dir) = config.profile.project_dir.as_deref() {
        profiles.load_custom_profile(dir).with_context(|| {
            format!("failed to load profile override from {}", dir.display())
        })?;
    }

    if let Some(name) = config.profile.default.as_deref() {
        profiles
            .set_active(name)
            .context("invalid default profile")?;
    }

    Ok(profiles)
}
