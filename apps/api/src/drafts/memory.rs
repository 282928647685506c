use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use super::{DraftKey, DraftStore};

struct SessionDraft {
    values: HashMap<&'static str, String>,
    blobs: HashMap<i64, Bytes>,
    touched: Instant,
}

impl SessionDraft {
    fn new() -> Self {
        Self {
            values: HashMap::new(),
            blobs: HashMap::new(),
            touched: Instant::now(),
        }
    }
}

/// In-process draft store. A session expires `ttl` after its last write,
/// matching the Redis backend; expired sessions are dropped on the next write.
pub struct MemoryDraftStore {
    sessions: RwLock<HashMap<Uuid, SessionDraft>>,
    ttl: Duration,
}

impl MemoryDraftStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    fn live<'a>(
        &self,
        sessions: &'a HashMap<Uuid, SessionDraft>,
        session: Uuid,
    ) -> Option<&'a SessionDraft> {
        sessions
            .get(&session)
            .filter(|draft| draft.touched.elapsed() < self.ttl)
    }

    /// Evicts expired sessions, then returns the (refreshed) draft for `session`.
    fn touch<'a>(
        &self,
        sessions: &'a mut HashMap<Uuid, SessionDraft>,
        session: Uuid,
    ) -> &'a mut SessionDraft {
        let before = sessions.len();
        sessions.retain(|_, draft| draft.touched.elapsed() < self.ttl);
        if sessions.len() < before {
            debug!("Evicted {} expired session draft(s)", before - sessions.len());
        }
        let draft = sessions.entry(session).or_insert_with(SessionDraft::new);
        draft.touched = Instant::now();
        draft
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn get(&self, session: Uuid, key: DraftKey) -> Result<Option<String>> {
        let sessions = self.sessions.read().await;
        Ok(self
            .live(&sessions, session)
            .and_then(|s| s.values.get(key.as_str()).cloned()))
    }

    async fn put(&self, session: Uuid, key: DraftKey, value: String) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        self.touch(&mut sessions, session)
            .values
            .insert(key.as_str(), value);
        Ok(())
    }

    async fn put_blob(&self, session: Uuid, resume_id: i64, content: Bytes) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        self.touch(&mut sessions, session)
            .blobs
            .insert(resume_id, content);
        Ok(())
    }

    async fn get_blob(&self, session: Uuid, resume_id: i64) -> Result<Option<Bytes>> {
        let sessions = self.sessions.read().await;
        Ok(self
            .live(&sessions, session)
            .and_then(|s| s.blobs.get(&resume_id).cloned()))
    }

    async fn remove_blob(&self, session: Uuid, resume_id: i64) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        self.touch(&mut sessions, session).blobs.remove(&resume_id);
        Ok(())
    }

    async fn clear(&self, session: Uuid) -> Result<()> {
        self.sessions.write().await.remove(&session);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_put_overwrites_previous_value() {
        let store = MemoryDraftStore::new(TTL);
        let session = Uuid::new_v4();
        store
            .put(session, DraftKey::JobTitle, "First".to_string())
            .await
            .unwrap();
        store
            .put(session, DraftKey::JobTitle, "Second".to_string())
            .await
            .unwrap();
        assert_eq!(
            store.get(session, DraftKey::JobTitle).await.unwrap().as_deref(),
            Some("Second")
        );
    }

    #[tokio::test]
    async fn test_remove_blob_leaves_others() {
        let store = MemoryDraftStore::new(TTL);
        let session = Uuid::new_v4();
        store
            .put_blob(session, 1, Bytes::from_static(b"one"))
            .await
            .unwrap();
        store
            .put_blob(session, 2, Bytes::from_static(b"two"))
            .await
            .unwrap();
        store.remove_blob(session, 1).await.unwrap();

        assert!(store.get_blob(session, 1).await.unwrap().is_none());
        assert_eq!(
            store.get_blob(session, 2).await.unwrap(),
            Some(Bytes::from_static(b"two"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_refreshes_whole_session() {
        let store = MemoryDraftStore::new(TTL);
        let session = Uuid::new_v4();
        store
            .put(session, DraftKey::JobTitle, "Dev".to_string())
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(45)).await;
        store
            .put_blob(session, 1, Bytes::from_static(b"one"))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(45)).await;

        assert_eq!(
            store.get(session, DraftKey::JobTitle).await.unwrap().as_deref(),
            Some("Dev")
        );
        assert!(store.get_blob(session, 1).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_session_expires_and_is_evicted() {
        let store = MemoryDraftStore::new(TTL);
        let idle = Uuid::new_v4();
        store
            .put(idle, DraftKey::JobTitle, "Dev".to_string())
            .await
            .unwrap();
        store
            .put_blob(idle, 1, Bytes::from_static(b"one"))
            .await
            .unwrap();

        tokio::time::advance(TTL).await;
        assert!(store.get(idle, DraftKey::JobTitle).await.unwrap().is_none());
        assert!(store.get_blob(idle, 1).await.unwrap().is_none());

        let active = Uuid::new_v4();
        store
            .put(active, DraftKey::JobTitle, "Ops".to_string())
            .await
            .unwrap();
        let sessions = store.sessions.read().await;
        assert_eq!(sessions.len(), 1);
        assert!(sessions.contains_key(&active));
    }
}
