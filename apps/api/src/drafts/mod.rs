//! Session draft store — the key/value state carried between the job,
//! resume and results steps.
//!
//! A session's keys are created on first write, overwritten on each step and
//! removed together by `clear`. Backends only move strings and blobs; the
//! typed accessors below own the (de)serialization of each key.

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use crate::models::analysis::AnalysisResultSet;
use crate::models::session::{JobContext, ResumeMeta};

pub mod memory;
pub mod redis_store;

pub use self::memory::MemoryDraftStore;
pub use self::redis_store::RedisDraftStore;

/// Keys a session may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftKey {
    JobTitle,
    JobDescription,
    Resumes,
    AnalysisResults,
}

impl DraftKey {
    pub const ALL: [DraftKey; 4] = [
        DraftKey::JobTitle,
        DraftKey::JobDescription,
        DraftKey::Resumes,
        DraftKey::AnalysisResults,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DraftKey::JobTitle => "jobTitle",
            DraftKey::JobDescription => "jobDescription",
            DraftKey::Resumes => "resumes",
            DraftKey::AnalysisResults => "analysisResults",
        }
    }
}

/// Storage backend for session drafts.
/// Carried in `AppState` as `Arc<dyn DraftStore>`.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn get(&self, session: Uuid, key: DraftKey) -> Result<Option<String>>;

    async fn put(&self, session: Uuid, key: DraftKey, value: String) -> Result<()>;

    async fn put_blob(&self, session: Uuid, resume_id: i64, content: Bytes) -> Result<()>;

    async fn get_blob(&self, session: Uuid, resume_id: i64) -> Result<Option<Bytes>>;

    async fn remove_blob(&self, session: Uuid, resume_id: i64) -> Result<()>;

    /// Drops every key and blob of the session.
    async fn clear(&self, session: Uuid) -> Result<()>;
}

/// Reads the job context. Absent unless both title and description were saved.
pub async fn load_job(store: &dyn DraftStore, session: Uuid) -> Result<Option<JobContext>> {
    let title = store.get(session, DraftKey::JobTitle).await?;
    let description = store.get(session, DraftKey::JobDescription).await?;
    Ok(match (title, description) {
        (Some(title), Some(description)) => Some(JobContext { title, description }),
        _ => None,
    })
}

pub async fn save_job(store: &dyn DraftStore, session: Uuid, job: &JobContext) -> Result<()> {
    store
        .put(session, DraftKey::JobTitle, job.title.clone())
        .await?;
    store
        .put(session, DraftKey::JobDescription, job.description.clone())
        .await
}

pub async fn load_resumes(store: &dyn DraftStore, session: Uuid) -> Result<Vec<ResumeMeta>> {
    match store.get(session, DraftKey::Resumes).await? {
        Some(raw) => serde_json::from_str(&raw).context("Stored resume list is not valid JSON"),
        None => Ok(Vec::new()),
    }
}

pub async fn save_resumes(
    store: &dyn DraftStore,
    session: Uuid,
    resumes: &[ResumeMeta],
) -> Result<()> {
    let raw = serde_json::to_string(resumes)?;
    store.put(session, DraftKey::Resumes, raw).await
}

pub async fn load_results(
    store: &dyn DraftStore,
    session: Uuid,
) -> Result<Option<AnalysisResultSet>> {
    match store.get(session, DraftKey::AnalysisResults).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .context("Stored analysis results are not valid JSON"),
        None => Ok(None),
    }
}

pub async fn save_results(
    store: &dyn DraftStore,
    session: Uuid,
    results: &AnalysisResultSet,
) -> Result<()> {
    let raw = serde_json::to_string(results)?;
    store.put(session, DraftKey::AnalysisResults, raw).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_job_absent_until_both_fields_saved() {
        let store = MemoryDraftStore::new(Duration::from_secs(60));
        let session = Uuid::new_v4();
        assert!(load_job(&store, session).await.unwrap().is_none());

        store
            .put(session, DraftKey::JobTitle, "Dev".to_string())
            .await
            .unwrap();
        assert!(load_job(&store, session).await.unwrap().is_none());

        let job = JobContext {
            title: "Dev".to_string(),
            description: "Build things".to_string(),
        };
        save_job(&store, session, &job).await.unwrap();
        assert_eq!(load_job(&store, session).await.unwrap(), Some(job));
    }

    #[tokio::test]
    async fn test_resume_list_round_trips_metadata() {
        let store = MemoryDraftStore::new(Duration::from_secs(60));
        let session = Uuid::new_v4();
        assert!(load_resumes(&store, session).await.unwrap().is_empty());

        let resumes = vec![ResumeMeta {
            id: 1,
            name: "a.pdf".to_string(),
            size: "0.01 MB".to_string(),
        }];
        save_resumes(&store, session, &resumes).await.unwrap();
        assert_eq!(load_resumes(&store, session).await.unwrap(), resumes);
    }

    #[tokio::test]
    async fn test_clear_removes_results_and_blobs() {
        let store = MemoryDraftStore::new(Duration::from_secs(60));
        let session = Uuid::new_v4();
        let other = Uuid::new_v4();
        let results = AnalysisResultSet {
            job_title: "Dev".to_string(),
            total_candidates: 0,
            candidates: vec![],
            completed_at: Utc::now(),
        };
        save_results(&store, session, &results).await.unwrap();
        save_results(&store, other, &results).await.unwrap();
        store
            .put_blob(session, 1, Bytes::from_static(b"pdf"))
            .await
            .unwrap();

        store.clear(session).await.unwrap();

        assert!(load_results(&store, session).await.unwrap().is_none());
        assert!(store.get_blob(session, 1).await.unwrap().is_none());
        assert!(load_results(&store, other).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_corrupt_results_surface_as_error() {
        let store = MemoryDraftStore::new(Duration::from_secs(60));
        let session = Uuid::new_v4();
        store
            .put(session, DraftKey::AnalysisResults, "{not json".to_string())
            .await
            .unwrap();
        assert!(load_results(&store, session).await.is_err());
    }
}
