//! Application state shared across all route handlers.
//!
//! AppState holds the advisor, the session store and the configuration.
//! It is passed to handlers via axum's State extractor.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use agro_chat::{CropAdvisor, SessionState};
use agro_core::config::AgroConfig;

use crate::rate_limit::RateLimiter;

/// A session plus when it was opened.
#[derive(Debug, Clone)]
pub struct StoredSession {
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
}

/// One session behind its own async lock.
///
/// Handlers hold the lock for the whole interaction, advisor call included,
/// so requests against one session are applied one at a time.
pub type SessionSlot = Arc<tokio::sync::Mutex<StoredSession>>;

/// In-memory sessions keyed by id.
///
/// The map lock is only held to look up, insert or remove a slot, never
/// across an await.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, SessionSlot>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a fresh session and return its id.
    pub fn create(&self) -> (Uuid, StoredSession) {
        let id = Uuid::new_v4();
        let session = StoredSession {
            state: SessionState::new(),
            created_at: Utc::now(),
        };
        self.lock()
            .insert(id, Arc::new(tokio::sync::Mutex::new(session.clone())));
        (id, session)
    }

    /// The session's slot, if it exists.
    pub fn slot(&self, id: &Uuid) -> Option<SessionSlot> {
        self.lock().get(id).cloned()
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.lock().contains_key(id)
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        self.lock().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, SessionSlot>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AgroConfig>,
    /// Indexes plus answer policy.
    pub advisor: Arc<CropAdvisor>,
    /// Open sessions.
    pub sessions: Arc<SessionStore>,
    /// Limits question requests.
    pub ask_limiter: RateLimiter,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState with the given components.
    pub fn new(config: AgroConfig, advisor: CropAdvisor) -> Self {
        let ask_limiter = RateLimiter::new(config.general.max_asks_per_sec);
        Self {
            config: Arc::new(config),
            advisor: Arc::new(advisor),
            sessions: Arc::new(SessionStore::new()),
            ask_limiter,
            start_time: Instant::now(),
        }
    }
}
