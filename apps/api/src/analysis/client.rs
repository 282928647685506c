//! Analysis Client — the only code that talks to the external scoring service.
//!
//! One POST per submission, no retries. Failures surface immediately so the
//! caller can let the user resubmit.

use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analysis::normalizer::{decode, normalize};
use crate::analysis::submission::AnalysisRequest;
use crate::models::analysis::AnalysisResultSet;

const ANALYZE_PATH: &str = "/analyze-resumes";

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Analysis service timed out")]
    Timeout,

    /// Non-2xx response. The body is kept for diagnostics and never parsed.
    #[error("Analysis service error (status {status_code})")]
    Service { status_code: u16, raw_body: String },

    #[error("Malformed analysis response: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct AnalysisClient {
    client: Client,
    endpoint: String,
}

impl AnalysisClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{ANALYZE_PATH}", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submits one analysis and returns the normalized, ranked result set.
    pub async fn submit(&self, request: &AnalysisRequest) -> Result<AnalysisResultSet, AnalysisError> {
        let form = build_form(request)?;

        info!(
            "Submitting {} resume(s) for '{}' to {}",
            request.resumes.len(),
            request.job.title,
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if !status.is_success() {
            let raw_body = response.text().await.unwrap_or_default();
            warn!("Analysis service returned {}", status);
            return Err(AnalysisError::Service {
                status_code: status.as_u16(),
                raw_body,
            });
        }

        let body = response.bytes().await.map_err(map_transport)?;
        let received_at = Utc::now();
        let raw = decode(&body)?;
        let results = normalize(raw, &request.job.title, received_at);

        debug!(
            "Analysis succeeded: {} candidate(s) for '{}'",
            results.total_candidates, results.job_title
        );

        Ok(results)
    }
}

fn build_form(request: &AnalysisRequest) -> Result<Form, AnalysisError> {
    let mut form = Form::new()
        .text("jobTitle", request.job.title.clone())
        .text("jobDescription", request.job.description.clone());

    for resume in &request.resumes {
        let part = Part::bytes(resume.content.to_vec())
            .file_name(resume.filename.clone())
            .mime_str(resume.mime_type())?;
        form = form.part("resumes", part);
    }

    Ok(form)
}

fn map_transport(e: reqwest::Error) -> AnalysisError {
    if e.is_timeout() {
        AnalysisError::Timeout
    } else {
        AnalysisError::Http(e)
    }
}
