//! Registry of active tracking sessions, keyed by user ID.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::TrackerError;

use super::session::Session;

/// Shared registry of all tracking sessions.
///
/// Uses `DashMap` so start/stop for one user is atomic with respect to that
/// key while other users proceed independently.
pub struct SessionRegistry {
    sessions: DashMap<String, Arc<Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Register a new session for `user_id`.
    ///
    /// Fails with `AlreadyActive` if one exists; the existing session is left
    /// untouched.
    pub fn start(&self, user_id: &str, filters: Vec<String>) -> Result<Arc<Session>, TrackerError> {
        match self.sessions.entry(user_id.to_string()) {
            Entry::Occupied(_) => Err(TrackerError::AlreadyActive),
            Entry::Vacant(slot) => {
                let session = Arc::new(Session::new(user_id.to_string(), filters));
                slot.insert(session.clone());
                Ok(session)
            }
        }
    }

    /// Remove the session for `user_id` and cancel its pending wake-up.
    ///
    /// Returns once any send already in progress for the session has
    /// finished; nothing is sent for it afterwards.
    pub async fn stop(&self, user_id: &str) -> Result<(), TrackerError> {
        let Some((_, session)) = self.sessions.remove(user_id) else {
            return Err(TrackerError::NotActive);
        };
        session.release().await;
        Ok(())
    }

    pub fn get(&self, user_id: &str) -> Option<Arc<Session>> {
        self.sessions.get(user_id).map(|entry| entry.value().clone())
    }

    pub fn is_active(&self, user_id: &str) -> bool {
        self.sessions.contains_key(user_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop `session` from the map, but only if it is still the registered
    /// session for its user.
    pub(crate) fn evict(&self, session: &Arc<Session>) -> bool {
        self.sessions
            .remove_if(session.user_id(), |_, current| Arc::ptr_eq(current, session))
            .is_some()
    }

    /// Stop every session. Returns how many were stopped.
    pub async fn stop_all(&self) -> usize {
        let user_ids: Vec<String> = self.sessions.iter().map(|e| e.key().clone()).collect();
        let mut stopped = 0;
        for user_id in user_ids {
            if self.stop(&user_id).await.is_ok() {
                stopped += 1;
            }
        }
        stopped
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
