use std::path::Path;

use bytes::Bytes;
use tracing::debug;

use crate::errors::AppError;
use crate::models::session::{JobContext, StagedResume};

/// Extensions the scoring service accepts.
pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["pdf", "txt"];

/// One resume file part of the multipart body.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub filename: String,
    pub content: Bytes,
}

impl ResumeUpload {
    pub fn mime_type(&self) -> &'static str {
        match extension(&self.filename).as_deref() {
            Some("pdf") => "application/pdf",
            Some("txt") => "text/plain",
            _ => "application/octet-stream",
        }
    }
}

/// Everything the scoring service needs for one analysis.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub job: JobContext,
    pub resumes: Vec<ResumeUpload>,
}

/// Assembles the payload for a submission. Requires at least one resume.
pub fn build_request(
    job: &JobContext,
    staged: &[StagedResume],
) -> Result<AnalysisRequest, AppError> {
    if staged.is_empty() {
        return Err(AppError::Validation(
            "Please upload at least one resume".to_string(),
        ));
    }

    let resumes = staged
        .iter()
        .map(|r| {
            debug!("Adding resume {} '{}' ({})", r.id, r.original_filename, r.size_label);
            ResumeUpload {
                filename: r.original_filename.clone(),
                content: r.file_blob.clone(),
            }
        })
        .collect();

    Ok(AnalysisRequest {
        job: job.clone(),
        resumes,
    })
}

/// Lower-cased file extension, if any.
pub fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

pub fn is_accepted_file(filename: &str) -> bool {
    extension(filename).is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> JobContext {
        JobContext {
            title: "Dev".to_string(),
            description: "Rust services".to_string(),
        }
    }

    fn staged(id: i64, name: &str) -> StagedResume {
        StagedResume {
            id,
            original_filename: name.to_string(),
            file_blob: Bytes::from_static(b"%PDF-1.4"),
            size_label: "0.00 MB".to_string(),
        }
    }

    #[test]
    fn test_empty_resume_list_is_validation_error() {
        let err = build_request(&job(), &[]).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_request_keeps_staging_order() {
        let request =
            build_request(&job(), &[staged(1, "b.pdf"), staged(2, "a.txt")]).unwrap();
        assert_eq!(request.job, job());
        let names: Vec<_> = request.resumes.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, ["b.pdf", "a.txt"]);
        assert_eq!(request.resumes[0].mime_type(), "application/pdf");
        assert_eq!(request.resumes[1].mime_type(), "text/plain");
    }

    #[test]
    fn test_accepted_extensions() {
        assert!(is_accepted_file("cv.PDF"));
        assert!(is_accepted_file("notes.txt"));
        assert!(!is_accepted_file("cv.docx"));
        assert!(!is_accepted_file("README"));
    }
}
