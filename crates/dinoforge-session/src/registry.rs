//! Keyed store of live, lock-guarded sessions.
//!
//! Each session lives behind its own `Arc<Mutex<T>>`, so two matches
//! never contend with each other. The map itself is a `DashMap`: inserts,
//! lookups and removals on unrelated codes proceed in parallel instead of
//! queueing behind one process-wide lock.
//!
//! Callers clone the `Arc` out of the registry and only then lock it.
//! Never hold a map reference across an `.await`.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::Mutex;

use crate::SessionError;

/// A shared handle to one session and its exclusive lock.
pub type SharedSession<T> = Arc<Mutex<T>>;

/// Concurrency-safe map from a session code to a lock-guarded session.
pub struct SessionRegistry<T> {
    sessions: DashMap<String, SharedSession<T>>,
}

impl<T> SessionRegistry<T> {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Registers a new session under `code`.
    ///
    /// The check and the insert are one atomic step, so two racing
    /// creators with the same code can't both succeed.
    ///
    /// # Errors
    /// [`SessionError::AlreadyExists`] if the code is taken.
    pub fn create(&self, code: &str, session: T) -> Result<SharedSession<T>, SessionError> {
        match self.sessions.entry(code.to_string()) {
            Entry::Occupied(_) => Err(SessionError::AlreadyExists(code.to_string())),
            Entry::Vacant(slot) => {
                let shared = Arc::new(Mutex::new(session));
                slot.insert(Arc::clone(&shared));
                tracing::debug!(%code, "session registered");
                Ok(shared)
            }
        }
    }

    /// Looks up a session by code.
    pub fn get(&self, code: &str) -> Option<SharedSession<T>> {
        self.sessions.get(code).map(|entry| Arc::clone(entry.value()))
    }

    /// Removes a session. Removing an unknown code is a no-op that
    /// returns `None`, which makes teardown paths safe to repeat.
    pub fn remove(&self, code: &str) -> Option<SharedSession<T>> {
        let removed = self.sessions.remove(code).map(|(_, session)| session);
        if removed.is_some() {
            tracing::debug!(%code, "session removed");
        }
        removed
    }

    /// Removes `code` only if it still maps to exactly `session`.
    ///
    /// Guards against tearing down a newer session that reused the code.
    pub fn remove_if_same(&self, code: &str, session: &SharedSession<T>) -> bool {
        self.sessions
            .remove_if(code, |_, current| Arc::ptr_eq(current, session))
            .is_some()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.sessions.contains_key(code)
    }

    /// Returns the number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Lists all live session codes.
    pub fn codes(&self) -> Vec<String> {
        self.sessions.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl<T> Default for SessionRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
