//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::analysis::export::{export_filename, to_delimited_text};
use crate::analysis::normalizer::{to_view, ResultSetView};
use crate::analysis::submission::build_request;
use crate::drafts::{load_job, load_resumes, load_results, save_results};
use crate::errors::AppError;
use crate::models::session::StagedResume;
use crate::state::AppState;

/// What the results step shows for a session.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisView {
    Ready(ResultSetView),
    Pending { message: String },
    Empty { message: String },
}

/// POST /api/v1/sessions/:session_id/analysis
///
/// Submits the staged job and resumes to the scoring service. On success the
/// new result set replaces the previous one; on failure nothing is stored.
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<AnalysisView>, AppError> {
    let _token = state.in_flight.try_acquire(session_id).ok_or_else(|| {
        AppError::Conflict("An analysis is already running for this session".to_string())
    })?;

    let store = state.drafts.as_ref();
    let job = load_job(store, session_id).await?.ok_or_else(|| {
        AppError::Validation("Add a job title and description before analyzing".to_string())
    })?;

    let mut staged = Vec::new();
    for meta in load_resumes(store, session_id).await? {
        let blob = store
            .get_blob(session_id, meta.id)
            .await?
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Resume '{}' is no longer available, please upload it again",
                    meta.name
                ))
            })?;
        staged.push(StagedResume::from_meta(&meta, blob));
    }

    let request = build_request(&job, &staged)?;
    let results = state.analysis.submit(&request).await?;

    save_results(store, session_id, &results).await?;
    info!(
        "Session {session_id}: stored analysis of {} candidate(s)",
        results.total_candidates
    );

    Ok(Json(AnalysisView::Ready(to_view(&results))))
}

/// GET /api/v1/sessions/:session_id/analysis
pub async fn handle_get_results(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<AnalysisView>, AppError> {
    if state.in_flight.is_in_flight(session_id) {
        return Ok(Json(AnalysisView::Pending {
            message: "Analyzing resumes...".to_string(),
        }));
    }

    let view = match load_results(state.drafts.as_ref(), session_id).await? {
        Some(results) => AnalysisView::Ready(to_view(&results)),
        None => AnalysisView::Empty {
            message: "No analysis found for this session. Start a new analysis.".to_string(),
        },
    };
    Ok(Json(view))
}

/// GET /api/v1/sessions/:session_id/analysis/export
///
/// Downloads the ranked results as CSV.
pub async fn handle_export(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let results = load_results(state.drafts.as_ref(), session_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No analysis results to export".to_string()))?;

    let body = to_delimited_text(&results)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_filename(&results.job_title)
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
