use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::guard::InFlightToken;
use crate::analysis::submission::is_accepted_file;
use crate::drafts::{load_job, load_resumes, save_job, save_resumes};
use crate::errors::AppError;
use crate::models::session::{next_resume_id, size_label, JobContext, ResumeMeta};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct JobRequest {
    pub title: String,
    pub description: String,
}

/// POST /api/v1/sessions
///
/// Hands out a session id. Nothing is stored until the first step writes.
pub async fn handle_create_session() -> (StatusCode, Json<SessionCreated>) {
    let session_id = Uuid::new_v4();
    info!("Session {session_id} started");
    (StatusCode::CREATED, Json(SessionCreated { session_id }))
}

/// DELETE /api/v1/sessions/:session_id
///
/// Starts over: drops the job, staged resumes and any stored results.
pub async fn handle_clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let _token = claim_session(&state, session_id)?;
    state.drafts.clear(session_id).await?;
    info!("Session {session_id} cleared");
    Ok(StatusCode::NO_CONTENT)
}

/// Holds the session against a concurrent submission while its drafts change.
fn claim_session(state: &AppState, session_id: Uuid) -> Result<InFlightToken, AppError> {
    state.in_flight.try_acquire(session_id).ok_or_else(|| {
        AppError::Conflict(
            "Wait for the running analysis to finish before changing this session".to_string(),
        )
    })
}

/// PUT /api/v1/sessions/:session_id/job
pub async fn handle_put_job(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<JobRequest>,
) -> Result<Json<JobContext>, AppError> {
    let job = JobContext {
        title: req.title.trim().to_string(),
        description: req.description.trim().to_string(),
    };
    if job.title.is_empty() {
        return Err(AppError::Validation("Job title cannot be empty".to_string()));
    }
    if job.description.is_empty() {
        return Err(AppError::Validation(
            "Job description cannot be empty".to_string(),
        ));
    }

    let _token = claim_session(&state, session_id)?;
    save_job(state.drafts.as_ref(), session_id, &job).await?;
    Ok(Json(job))
}

/// GET /api/v1/sessions/:session_id/job
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<JobContext>, AppError> {
    let job = load_job(state.drafts.as_ref(), session_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No job saved for this session".to_string()))?;
    Ok(Json(job))
}

/// GET /api/v1/sessions/:session_id/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<ResumeMeta>>, AppError> {
    Ok(Json(load_resumes(state.drafts.as_ref(), session_id).await?))
}

/// POST /api/v1/sessions/:session_id/resumes
///
/// Stages every `resumes` file part. The whole batch is rejected if any file
/// has an unsupported type or exceeds the size ceiling.
pub async fn handle_stage_resumes(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<Vec<ResumeMeta>>, AppError> {
    let max_bytes = state.config.max_resume_bytes;
    let mut files: Vec<(String, Bytes)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("resumes") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read '{file_name}': {e}")))?;

        if file_name.is_empty() {
            return Err(AppError::Validation(
                "Each resume part needs a filename".to_string(),
            ));
        }
        if !is_accepted_file(&file_name) {
            return Err(AppError::Validation(format!(
                "'{file_name}' is not supported. Upload PDF or text files"
            )));
        }
        if data.len() > max_bytes {
            return Err(AppError::Validation(format!(
                "'{file_name}' exceeds the {} size limit",
                size_label(max_bytes)
            )));
        }
        files.push((file_name, data));
    }

    if files.is_empty() {
        return Err(AppError::Validation(
            "Please upload at least one resume".to_string(),
        ));
    }

    let _token = claim_session(&state, session_id)?;
    let store = state.drafts.as_ref();
    let mut resumes = load_resumes(store, session_id).await?;
    let now_millis = Utc::now().timestamp_millis();

    for (index, (name, data)) in files.into_iter().enumerate() {
        let last = resumes.iter().map(|r| r.id).max();
        let id = next_resume_id(now_millis, index, last);
        let size = size_label(data.len());
        store.put_blob(session_id, id, data).await?;
        resumes.push(ResumeMeta { id, name, size });
    }

    save_resumes(store, session_id, &resumes).await?;
    info!("Session {session_id}: {} resume(s) staged", resumes.len());
    Ok(Json(resumes))
}

/// DELETE /api/v1/sessions/:session_id/resumes/:resume_id
pub async fn handle_remove_resume(
    State(state): State<AppState>,
    Path((session_id, resume_id)): Path<(Uuid, i64)>,
) -> Result<Json<Vec<ResumeMeta>>, AppError> {
    let _token = claim_session(&state, session_id)?;
    let store = state.drafts.as_ref();
    let mut resumes = load_resumes(store, session_id).await?;
    let before = resumes.len();
    resumes.retain(|r| r.id != resume_id);
    if resumes.len() == before {
        return Err(AppError::NotFound(format!("Resume {resume_id} not found")));
    }

    store.remove_blob(session_id, resume_id).await?;
    save_resumes(store, session_id, &resumes).await?;
    Ok(Json(resumes))
}
