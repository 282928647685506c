pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::session::handlers as session;
use crate::state::AppState;

/// Largest number of files accepted in one staging request.
const MAX_FILES_PER_UPLOAD: usize = 20;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_resume_bytes * MAX_FILES_PER_UPLOAD;

    Router::new()
        .route("/health", get(health::health_handler))
        // Draft steps
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route(
            "/api/v1/sessions/:session_id",
            delete(session::handle_clear_session),
        )
        .route(
            "/api/v1/sessions/:session_id/job",
            put(session::handle_put_job).get(session::handle_get_job),
        )
        .route(
            "/api/v1/sessions/:session_id/resumes",
            get(session::handle_list_resumes).post(session::handle_stage_resumes),
        )
        .route(
            "/api/v1/sessions/:session_id/resumes/:resume_id",
            delete(session::handle_remove_resume),
        )
        // Results pipeline
        .route(
            "/api/v1/sessions/:session_id/analysis",
            post(analysis::handle_submit).get(analysis::handle_get_results),
        )
        .route(
            "/api/v1/sessions/:session_id/analysis/export",
            get(analysis::handle_export),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
