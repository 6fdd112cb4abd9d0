//! Registry of live sessions keyed by user

use super::{Reply, Session, SessionEvent};
use crate::catalog::Catalog;
use crate::types::UserId;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Routes events to per-user sessions
///
/// Each session sits behind its own mutex, so one user's events are handled
/// strictly one at a time while different users proceed concurrently. The
/// registry lock is only held to look a session up, never while an event runs.
pub struct SessionManager {
    catalog: Catalog,
    sessions: Mutex<HashMap<UserId, Arc<Mutex<Session>>>>,
}

impl SessionManager {
    /// Create an empty registry over `catalog`
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// The catalog shared by every session
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Start (or restart) the session of `user` and return the welcome view
    pub async fn start(&self, user: UserId) -> Reply {
        let quality = self.catalog.get_config().download.default_quality;
        let session = Session::new(user, quality);
        let reply = session.welcome();
        let previous = self
            .sessions
            .lock()
            .await
            .insert(user, Arc::new(Mutex::new(session)));
        if previous.is_some() {
            debug!(user_id = user.get(), "Replaced existing session");
        }
        reply
    }

    /// Handle one event for `user`
    ///
    /// Events for users without a session are ignored. A session that reaches
    /// the exited route is dropped from the registry.
    pub async fn dispatch(&self, user: UserId, event: SessionEvent) -> Reply {
        let Some(session) = self.sessions.lock().await.get(&user).cloned() else {
            debug!(user_id = user.get(), ?event, "Ignoring event without a session");
            return Reply::default();
        };

        let mut guard = session.lock().await;
        let reply = guard.handle(&self.catalog, event).await;
        let exited = guard.is_exited();
        drop(guard);

        if exited {
            let mut sessions = self.sessions.lock().await;
            // A restart may have replaced the session while this event ran
            if sessions
                .get(&user)
                .is_some_and(|current| Arc::ptr_eq(current, &session))
            {
                sessions.remove(&user);
            }
        }
        reply
    }

    /// Whether handling `event` for `user` will hit the network
    pub async fn needs_fetch(&self, user: UserId, event: &SessionEvent) -> bool {
        let Some(session) = self.sessions.lock().await.get(&user).cloned() else {
            return false;
        };
        let guard = session.lock().await;
        guard.needs_fetch(&self.catalog, event)
    }

    /// Number of live sessions
    pub async fn active_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Whether `user` has a live session
    pub async fn has_session(&self, user: UserId) -> bool {
        self.sessions.lock().await.contains_key(&user)
    }

    /// Drop sessions idle for longer than `max_idle`; returns how many were dropped
    ///
    /// Sessions busy handling an event are never idle and are kept.
    pub async fn prune_idle(&self, max_idle: chrono::Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| match session.try_lock() {
            Ok(guard) => guard.last_active() >= cutoff,
            Err(_) => true,
        });
        let pruned = before - sessions.len();
        if pruned > 0 {
            info!(pruned, remaining = sessions.len(), "Pruned idle sessions");
        }
        pruned
    }

    /// Start a background task pruning idle sessions every `every`
    ///
    /// The task runs until the returned handle is aborted or the runtime stops.
    pub fn start_idle_pruner(
        self: &Arc<Self>,
        every: std::time::Duration,
        max_idle: chrono::Duration,
    ) -> tokio::task::JoinHandle<()> {
        let manager = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                manager.prune_idle(max_idle).await;
            }
        });
        info!(interval_secs = every.as_secs(), "Idle session pruner started");
        handle
    }
}
