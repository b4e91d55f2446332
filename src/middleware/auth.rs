//! Session extractors: `token` cookie (or Bearer header) → authenticated user.

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;
use uuid::Uuid;

use crate::auth::SESSION_COOKIE;
use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::models::{Role, User};

const BEARER_PREFIX: &str = "Bearer ";

fn session_token(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE).filter(|c| !c.value().is_empty()) {
        return Some(cookie.value().to_string());
    }
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::to_string)
}

/// Extractor: user id from a valid session token.
#[derive(Clone, Copy, Debug)]
pub struct AuthUser(pub Uuid);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(parts).ok_or_else(|| {
            debug!("rejected request: no session token");
            AppError::Auth("User is not authenticated.".to_string())
        })?;
        let user_id = state.sessions().validate(&token)?;
        Ok(AuthUser(user_id))
    }
}

/// Extractor: the full user record behind the session. 401 if it no longer exists.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// Role guard for routes limited to one role.
    pub fn require(self, role: Role) -> Result<User, AppError> {
        if self.0.role() != role {
            return Err(AppError::Forbidden(format!(
                "{} not allowed to access this resource.",
                self.0.role()
            )));
        }
        Ok(self.0)
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(user_id) = AuthUser::from_request_parts(parts, state).await?;
        let user = state.accounts().find(user_id).await?.ok_or_else(|| {
            debug!(user_id = %user_id, "rejected request: session user no longer exists");
            AppError::Auth("User is not authenticated.".to_string())
        })?;
        Ok(CurrentUser(user))
    }
}
