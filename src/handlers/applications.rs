//! Job application endpoints.

use axum::{
    extract::{multipart::MultipartRejection, rejection::PathRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AppError;
use crate::handlers::form::FormData;
use crate::handlers::http::AppState;
use crate::middleware::CurrentUser;
use crate::models::Role;

/// POST /api/v1/application/post/:id (Job Seeker; multipart, optional `resume` file)
pub async fn post_application(
    State(state): State<AppState>,
    user: CurrentUser,
    job_id: Result<Path<Uuid>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let seeker = user.require(Role::JobSeeker)?;
    let Path(job_id) = job_id?;
    let (input, resume) = FormData::read(multipart?).await?.into_application_input();
    let application = state
        .applications()
        .apply(&seeker, job_id, input, resume)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Application submitted.",
            "application": application,
        })),
    ))
}

/// GET /api/v1/application/employer/getall (Employer)
pub async fn employer_get_all(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Value>, AppError> {
    let employer = user.require(Role::Employer)?;
    let applications = state.applications().list_for_employer(&employer).await?;
    Ok(Json(json!({ "success": true, "applications": applications })))
}

/// GET /api/v1/application/jobseeker/getall (Job Seeker)
pub async fn job_seeker_get_all(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Value>, AppError> {
    let seeker = user.require(Role::JobSeeker)?;
    let applications = state.applications().list_for_job_seeker(&seeker).await?;
    Ok(Json(json!({ "success": true, "applications": applications })))
}

/// DELETE /api/v1/application/delete/:id (either party)
pub async fn delete_application(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>, AppError> {
    let Path(id) = id?;
    state.applications().delete(&user, id).await?;
    Ok(Json(json!({ "success": true, "message": "Application deleted." })))
}
