use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use redis::aio::MultiplexedConnection;
use tracing::info;
use uuid::Uuid;

use super::{DraftKey, DraftStore};

const KEY_PREFIX: &str = "resumematch:session";

/// Redis-backed draft store. Every write refreshes the TTL of all the
/// session's keys together, so an abandoned session expires as one unit.
#[derive(Clone)]
pub struct RedisDraftStore {
    conn: MultiplexedConnection,
    ttl_secs: u64,
}

impl RedisDraftStore {
    pub async fn connect(redis_url: &str, ttl_secs: u64) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Invalid REDIS_URL")?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .context("Failed to connect to Redis")?;
        info!("Redis draft store connected (session ttl {ttl_secs}s)");
        Ok(Self { conn, ttl_secs })
    }
}

fn value_key(session: Uuid, key: DraftKey) -> String {
    format!("{KEY_PREFIX}:{session}:{}", key.as_str())
}

fn blob_key(session: Uuid) -> String {
    format!("{KEY_PREFIX}:{session}:blobs")
}

/// Every key a session can own.
fn session_keys(session: Uuid) -> Vec<String> {
    DraftKey::ALL
        .into_iter()
        .map(|key| value_key(session, key))
        .chain(std::iter::once(blob_key(session)))
        .collect()
}

impl RedisDraftStore {
    /// Appends an `EXPIRE` for each session key. Missing keys are a no-op.
    fn refresh_ttl(&self, pipe: &mut redis::Pipeline, session: Uuid) {
        for key in session_keys(session) {
            pipe.cmd("EXPIRE").arg(key).arg(self.ttl_secs).ignore();
        }
    }
}

#[async_trait]
impl DraftStore for RedisDraftStore {
    async fn get(&self, session: Uuid, key: DraftKey) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = redis::cmd("GET")
            .arg(value_key(session, key))
            .query_async(&mut conn)
            .await?;
        Ok(value)
    }

    async fn put(&self, session: Uuid, key: DraftKey, value: String) -> Result<()> {
        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("SET")
            .arg(value_key(session, key))
            .arg(value)
            .ignore();
        self.refresh_ttl(&mut pipe, session);
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn put_blob(&self, session: Uuid, resume_id: i64, content: Bytes) -> Result<()> {
        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("HSET")
            .arg(blob_key(session))
            .arg(resume_id)
            .arg(content.as_ref())
            .ignore();
        self.refresh_ttl(&mut pipe, session);
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn get_blob(&self, session: Uuid, resume_id: i64) -> Result<Option<Bytes>> {
        let mut conn = self.conn.clone();
        let content: Option<Vec<u8>> = redis::cmd("HGET")
            .arg(blob_key(session))
            .arg(resume_id)
            .query_async(&mut conn)
            .await?;
        Ok(content.map(Bytes::from))
    }

    async fn remove_blob(&self, session: Uuid, resume_id: i64) -> Result<()> {
        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("HDEL")
            .arg(blob_key(session))
            .arg(resume_id)
            .ignore();
        self.refresh_ttl(&mut pipe, session);
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn clear(&self, session: Uuid) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("DEL")
            .arg(session_keys(session))
            .query_async(&mut conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_namespaced_per_session() {
        let session = Uuid::nil();
        assert_eq!(
            value_key(session, DraftKey::AnalysisResults),
            "resumematch:session:00000000-0000-0000-0000-000000000000:analysisResults"
        );
        assert_eq!(
            blob_key(session),
            "resumematch:session:00000000-0000-0000-0000-000000000000:blobs"
        );
    }

    #[test]
    fn test_session_keys_cover_values_and_blobs() {
        let session = Uuid::new_v4();
        let keys = session_keys(session);
        assert_eq!(keys.len(), DraftKey::ALL.len() + 1);
        for key in DraftKey::ALL {
            assert!(keys.contains(&value_key(session, key)));
        }
        assert!(keys.contains(&blob_key(session)));
        assert!(keys.iter().all(|k| k.contains(&session.to_string())));
    }
}
