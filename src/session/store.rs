//! Session table and idle sweeper.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::time;
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::SessionConfig;
use crate::observability::metrics;
use crate::security::{ThrottleStore, TokenIssuer};

/// Mutable per-session state. Always accessed through [`Session::lock`].
#[derive(Debug)]
pub struct SessionState {
    pub throttle: ThrottleStore,
    pub tokens: TokenIssuer,
}

/// One browser session.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    state: Mutex<SessionState>,
    last_seen: AtomicU64,
}

impl Session {
    fn new(id: Uuid, throttle_limit: u32, accept_previous_token: bool, now: u64) -> Self {
        Self {
            id,
            state: Mutex::new(SessionState {
                throttle: ThrottleStore::new(throttle_limit),
                tokens: TokenIssuer::new(accept_previous_token),
            }),
            last_seen: AtomicU64::new(now),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Lock the session's throttle and token state.
    pub fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().expect("session mutex poisoned")
    }

    pub fn last_seen(&self) -> u64 {
        self.last_seen.load(Ordering::Relaxed)
    }

    fn touch(&self, now: u64) {
        self.last_seen.fetch_max(now, Ordering::Relaxed);
    }

    fn is_expired(&self, now: u64, idle_ttl_secs: u64) -> bool {
        self.last_seen().saturating_add(idle_ttl_secs) < now
    }
}

/// All live sessions, keyed by cookie id.
pub struct SessionStore {
    sessions: DashMap<Uuid, Arc<Session>>,
    config: SessionConfig,
    throttle_limit: u32,
    accept_previous_token: bool,
}

impl SessionStore {
    pub fn new(config: SessionConfig, throttle_limit: u32, accept_previous_token: bool) -> Self {
        Self {
            sessions: DashMap::new(),
            config,
            throttle_limit,
            accept_previous_token,
        }
    }

    /// Session for `id`, or a new one when `id` is absent, unknown or expired.
    ///
    /// The flag is `true` when a session was created and the caller must set
    /// the cookie.
    pub fn resolve(&self, id: Option<Uuid>, now: u64) -> (Arc<Session>, bool) {
        if let Some(session) = id.and_then(|id| self.get(id, now)) {
            return (session, false);
        }

        self.make_room(now);
        let session = Arc::new(Session::new(
            Uuid::new_v4(),
            self.throttle_limit,
            self.accept_previous_token,
            now,
        ));
        self.sessions.insert(session.id(), Arc::clone(&session));
        metrics::record_active_sessions(self.sessions.len());
        (session, true)
    }

    /// Live session for `id`, without ever creating one.
    ///
    /// Expired sessions found here are removed.
    pub fn get(&self, id: Uuid, now: u64) -> Option<Arc<Session>> {
        let session = self.sessions.get(&id).map(|r| Arc::clone(r.value()))?;
        if session.is_expired(now, self.config.idle_ttl_secs) {
            self.sessions.remove(&id);
            tracing::debug!(session = %id, "Session expired");
            return None;
        }
        session.touch(now);
        Some(session)
    }

    /// Drop idle sessions. Returns how many were removed.
    pub fn sweep(&self, now: u64) -> usize {
        let before = self.sessions.len();
        let ttl = self.config.idle_ttl_secs;
        self.sessions.retain(|_, session| !session.is_expired(now, ttl));
        let removed = before.saturating_sub(self.sessions.len());
        metrics::record_active_sessions(self.sessions.len());
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn make_room(&self, now: u64) {
        if self.sessions.len() < self.config.max_sessions {
            return;
        }
        let swept = self.sweep(now);
        if self.sessions.len() < self.config.max_sessions {
            tracing::debug!(swept, "Session table full, swept idle sessions");
            return;
        }
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|r| r.value().last_seen())
            .map(|r| *r.key());
        if let Some(id) = oldest {
            self.sessions.remove(&id);
            tracing::warn!(
                max_sessions = self.config.max_sessions,
                "Session table full, evicted least recently seen session"
            );
        }
    }

    /// Periodically sweep idle sessions until shutdown.
    pub async fn run_sweeper(
        self: Arc<Self>,
        clock: Arc<dyn Clock>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        let mut ticker = time::interval(Duration::from_secs(self.config.sweep_interval_secs));
        tracing::info!(
            interval_secs = self.config.sweep_interval_secs,
            idle_ttl_secs = self.config.idle_ttl_secs,
            "Session sweeper starting"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.sweep(clock.now_unix());
                    if removed > 0 {
                        tracing::debug!(removed, remaining = self.len(), "Swept idle sessions");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Session sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
