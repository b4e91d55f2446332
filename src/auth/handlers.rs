//! Account HTTP handlers: register, login, logout, current user, profile and password.

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::handlers::form::FormData;
use crate::handlers::http::AppState;
use crate::middleware::{AuthUser, CurrentUser};
use crate::models::User;
use crate::services::{LoginInput, PasswordChange};

/// Body returned whenever a session is issued.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub user: User,
    pub message: String,
    pub token: String,
}

type SessionReply = (StatusCode, CookieJar, Json<SessionResponse>);

/// Issue a session for `user`: cookie on the jar, token in the body.
fn send_token(
    state: &AppState,
    jar: CookieJar,
    user: User,
    status: StatusCode,
    message: &str,
) -> Result<SessionReply, AppError> {
    let token = state.sessions().issue(user.id)?;
    let jar = jar.add(state.sessions().cookie(token.clone()));
    Ok((
        status,
        jar,
        Json(SessionResponse {
            success: true,
            user,
            message: message.to_string(),
            token,
        }),
    ))
}

/// POST /api/v1/user/register (multipart, optional `resume` file)
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<SessionReply, AppError> {
    let (input, resume) = FormData::read(multipart?).await?.into_register_input();
    let user = state.accounts().register(input, resume).await?;
    send_token(&state, jar, user, StatusCode::CREATED, "User registered.")
}

/// POST /api/v1/user/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> Result<SessionReply, AppError> {
    let Json(body) = payload?;
    let user = state.accounts().authenticate(body).await?;
    send_token(&state, jar, user, StatusCode::CREATED, "User logged in successfully.")
}

/// GET /api/v1/user/logout
pub async fn logout(
    State(state): State<AppState>,
    _user: AuthUser,
    jar: CookieJar,
) -> (StatusCode, CookieJar, Json<Value>) {
    let jar = jar.add(state.sessions().expired_cookie());
    (
        StatusCode::OK,
        jar,
        Json(json!({ "success": true, "message": "Logged out successfully." })),
    )
}

/// GET /api/v1/user/getuser
pub async fn get_user(CurrentUser(user): CurrentUser) -> Json<Value> {
    Json(json!({ "success": true, "user": user }))
}

/// PUT /api/v1/user/update/profile (multipart, optional `resume` file)
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, AppError> {
    let (changes, resume) = FormData::read(multipart?).await?.into_profile_changes();
    let update = state
        .accounts()
        .update_profile(&current, changes, resume)
        .await?;

    let mut body = json!({
        "success": true,
        "user": update.user,
        "message": "Profile updated.",
    });
    if let Some(warning) = update.cleanup.warning() {
        body["warnings"] = json!([warning]);
    }
    Ok(Json(body))
}

/// PUT /api/v1/user/update/password
pub async fn update_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    jar: CookieJar,
    payload: Result<Json<PasswordChange>, JsonRejection>,
) -> Result<SessionReply, AppError> {
    let Json(body) = payload?;
    let user = state.accounts().update_password(user_id, body).await?;
    send_token(&state, jar, user, StatusCode::OK, "Password updated successfully.")
}
