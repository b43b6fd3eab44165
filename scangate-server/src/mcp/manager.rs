use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use scangate_core::ProfileManager;
use tracing::{debug, info};
use uuid::Uuid;

use super::session::McpSession;

/// Registry of open MCP sessions keyed by session id.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: DashMap<Uuid, Arc<McpSession>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, profiles: ProfileManager) -> Arc<McpSession> {
        let session = Arc::new(McpSession::new(profiles));
        self.sessions.insert(session.id(), Arc::clone(&session));
        info!(session_id = %session.id(), open = self.sessions.len(), "session opened");
        session
    }

    /// Look up a session and mark it active.
    pub fn get(&self, id: &Uuid) -> Option<Arc<McpSession>> {
        let session = self.sessions.get(id).map(|entry| Arc::clone(entry.value()))?;
        session.touch();
        Some(session)
    }

    pub fn close(&self, id: &Uuid) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            info!(session_id = %id, open = self.sessions.len(), "session closed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Close every session idle for longer than `max_idle`. Sessions with an
    /// open SSE stream are kept; the stream's guard closes them on hang-up.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|id, session| {
            let keep = session.has_stream() || session.idle_for() <= max_idle;
            if !keep {
                debug!(session_id = %id, "evicting idle session");
            }
            keep
        });
        before.saturating_sub(self.sessions.len())
    }
}

/// Closes its session when dropped; carried by the session's SSE stream.
#[derive(Debug)]
pub struct SessionCloseGuard {
    sessions: Arc<SessionManager>,
    id: Uuid,
}

impl SessionCloseGuard {
    pub fn new(sessions: Arc<SessionManager>, id: Uuid) -> Self {
        Self { sessions, id }
    }
}

impl Drop for SessionCloseGuard {
    fn drop(&mut self) {
        self.sessions.close(&self.id);
    }
}
