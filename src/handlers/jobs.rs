//! Job posting endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::middleware::CurrentUser;
use crate::models::{JobFilter, Role};
use crate::services::PostJobInput;

/// POST /api/v1/job/post (Employer)
pub async fn post_job(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<PostJobInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let employer = user.require(Role::Employer)?;
    let Json(body) = payload?;
    let job = state.jobs().post(&employer, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "job": job, "message": "Job posted successfully." })),
    ))
}

/// GET /api/v1/job/getall?city=&niche=&searchKeyword=
pub async fn get_all_jobs(
    State(state): State<AppState>,
    query: Result<Query<JobFilter>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(filter) = query?;
    let jobs = state.jobs().list(filter).await?;
    Ok(Json(json!({ "success": true, "count": jobs.len(), "jobs": jobs })))
}

/// GET /api/v1/job/getmyjobs (Employer)
pub async fn get_my_jobs(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Value>, AppError> {
    let employer = user.require(Role::Employer)?;
    let jobs = state.jobs().list_mine(&employer).await?;
    Ok(Json(json!({ "success": true, "myJobs": jobs })))
}

/// DELETE /api/v1/job/delete/:id (Employer, poster only)
pub async fn delete_job(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>, AppError> {
    let employer = user.require(Role::Employer)?;
    let Path(id) = id?;
    state.jobs().delete(&employer, id).await?;
    Ok(Json(json!({ "success": true, "message": "Job deleted." })))
}

/// GET /api/v1/job/get/:id
pub async fn get_job(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>, AppError> {
    let Path(id) = id?;
    let job = state.jobs().get(id).await?;
    Ok(Json(json!({ "success": true, "job": job })))
}
