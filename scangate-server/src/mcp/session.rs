use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex as SyncMutex;
use scangate_core::ProfileManager;
use scangate_model::Finding;
use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard, broadcast};
use uuid::Uuid;

const NOTIFICATION_BUFFER: usize = 32;

/// Per-session state handed to tool handlers.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub profiles: ProfileManager,
    pub last_findings: Vec<Finding>,
}

impl SessionContext {
    pub fn new(profiles: ProfileManager) -> Self {
        Self {
            profiles,
            last_findings: Vec::new(),
        }
    }
}

/// One streamable-HTTP MCP session.
#[derive(Debug)]
pub struct McpSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    last_seen: SyncMutex<Instant>,
    context: Mutex<SessionContext>,
    notifications: broadcast::Sender<Value>,
}

impl McpSession {
    pub fn new(profiles: ProfileManager) -> Self {
        let (notifications, _) = broadcast::channel(NOTIFICATION_BUFFER);
        Self {
            id: Uuid::now_v7(),
            created_at: Utc::now(),
            last_seen: SyncMutex::new(Instant::now()),
            context: Mutex::new(SessionContext::new(profiles)),
            notifications,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn touch(&self) {
        *self.last_seen.lock() = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_seen.lock().elapsed()
    }

    /// Lock the context. Held for the whole of a tool call, so calls within
    /// one session run one at a time.
    pub async fn context(&self) -> MutexGuard<'_, SessionContext> {
        self.context.lock().await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Value> {
        self.notifications.subscribe()
    }

    /// Whether an SSE stream is currently attached.
    pub fn has_stream(&self) -> bool {
        self.notifications.receiver_count() > 0
    }

    /// Push a frame to the session's SSE stream. Dropped when no stream is
    /// open.
    pub fn notify(&self, message: Value) {
        let _ = self.notifications.send(message);
    }
}
