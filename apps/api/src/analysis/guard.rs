use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use uuid::Uuid;

/// Sessions with a submission awaiting the scoring service or a draft write underway.
#[derive(Clone, Default)]
pub struct InFlightRegistry {
    sessions: Arc<Mutex<HashSet<Uuid>>>,
}

/// Held for the duration of one submission or draft write; releases the session on drop.
pub struct InFlightToken {
    session: Uuid,
    sessions: Arc<Mutex<HashSet<Uuid>>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when the session already has a submission in flight.
    pub fn try_acquire(&self, session: Uuid) -> Option<InFlightToken> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        if !sessions.insert(session) {
            return None;
        }
        Some(InFlightToken {
            session,
            sessions: Arc::clone(&self.sessions),
        })
    }

    pub fn is_in_flight(&self, session: Uuid) -> bool {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&session)
    }
}

impl Drop for InFlightToken {
    fn drop(&mut self) {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.session);
    }
}
