use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// The job a session is matching candidates against.
/// Written on the job step, read-only once an analysis starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobContext {
    pub title: String,
    pub description: String,
}

/// Persisted metadata for a staged resume. Binary content is stored separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeMeta {
    pub id: i64,
    pub name: String,
    pub size: String,
}

/// A resume selected for analysis, with its content loaded.
#[derive(Debug, Clone)]
pub struct StagedResume {
    pub id: i64,
    pub original_filename: String,
    pub file_blob: Bytes,
    pub size_label: String,
}

impl StagedResume {
    pub fn from_meta(meta: &ResumeMeta, file_blob: Bytes) -> Self {
        Self {
            id: meta.id,
            original_filename: meta.name.clone(),
            file_blob,
            size_label: meta.size.clone(),
        }
    }
}

/// Formats a byte count the way the upload list shows it: `"1.50 MB"`.
pub fn size_label(bytes: usize) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}

/// Next staged-resume id: wall-clock millis plus batch index, never below `last + 1`.
pub fn next_resume_id(now_millis: i64, batch_index: usize, last: Option<i64>) -> i64 {
    let candidate = now_millis + batch_index as i64;
    match last {
        Some(last) if candidate <= last => last + 1,
        _ => candidate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_label_two_decimals() {
        assert_eq!(size_label(1024 * 1024 * 3 / 2), "1.50 MB");
        assert_eq!(size_label(0), "0.00 MB");
    }

    #[test]
    fn test_next_resume_id_uses_clock() {
        assert_eq!(next_resume_id(1_000, 2, None), 1_002);
        assert_eq!(next_resume_id(1_000, 0, Some(500)), 1_000);
    }

    #[test]
    fn test_next_resume_id_stays_increasing() {
        assert_eq!(next_resume_id(1_000, 0, Some(1_000)), 1_001);
        assert_eq!(next_resume_id(1_000, 1, Some(2_000)), 2_001);
    }

    #[test]
    fn test_resume_meta_wire_shape() {
        let meta = ResumeMeta {
            id: 7,
            name: "jane.pdf".to_string(),
            size: "0.10 MB".to_string(),
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 7, "name": "jane.pdf", "size": "0.10 MB"})
        );
    }
}
