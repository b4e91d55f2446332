//! Shared state and health.

use axum::{http::StatusCode, Json};
use serde_json::json;

use crate::auth::SessionIssuer;
use crate::services::{AccountService, ApplicationService, JobService};

/// Shared application state; every handle is injected from `main` (or a test).
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub jobs: JobService,
    pub applications: ApplicationService,
    pub sessions: SessionIssuer,
}

impl AppState {
    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }
    pub fn jobs(&self) -> &JobService {
        &self.jobs
    }
    pub fn applications(&self) -> &ApplicationService {
        &self.applications
    }
    pub fn sessions(&self) -> &SessionIssuer {
        &self.sessions
    }
}

/// GET /health — liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "jobportal" })),
    )
}
