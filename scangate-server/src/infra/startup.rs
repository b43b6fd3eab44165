use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::infra::app_state::AppState;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[async_trait]
pub trait StartupHooks: Send + Sync {
    async fn run(&self, state: &AppState) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct ProdStartupHooks;

#[async_trait]
impl StartupHooks for ProdStartupHooks {
    async fn run(&self, state: &AppState) -> Result<()> {
        let sessions = state.sessions.clone();
        let max_idle = state.config.sessions.idle_timeout;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                let evicted = sessions.evict_idle(max_idle);
                if evicted > 0 {
                    debug!(evicted, remaining = sessions.len(), "idle sessions evicted");
                }
            }
        });

        Ok(())
    }
}
