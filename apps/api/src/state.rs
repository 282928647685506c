use std::sync::Arc;

use crate::analysis::client::AnalysisClient;
use crate::analysis::guard::InFlightRegistry;
use crate::config::Config;
use crate::drafts::DraftStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Session drafts. Redis when `REDIS_URL` is set, in-process otherwise.
    pub drafts: Arc<dyn DraftStore>,
    pub analysis: AnalysisClient,
    /// One outstanding submission per session.
    pub in_flight: InFlightRegistry,
    pub config: Config,
}
