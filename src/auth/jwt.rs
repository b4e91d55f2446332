//! Session tokens: JWT issue/validation and the `token` cookie that carries them.

use crate::error::{AppError, AppResult};
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "token";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub exp: i64,
    pub iat: i64,
}

/// Issues and validates stateless session tokens.
#[derive(Clone)]
pub struct SessionIssuer {
    secret: String,
    token_ttl: Duration,
    cookie_ttl: Duration,
    secure_cookie: bool,
}

impl SessionIssuer {
    pub fn new(secret: String, token_ttl_days: i64, cookie_ttl_days: i64, secure_cookie: bool) -> Self {
        Self {
            secret,
            token_ttl: Duration::days(token_ttl_days),
            cookie_ttl: Duration::days(cookie_ttl_days),
            secure_cookie,
        }
    }

    pub fn issue(&self, user_id: Uuid) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + self.token_ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Jwt(e.to_string()))
    }

    /// Returns the user id asserted by a valid, unexpired token.
    pub fn validate(&self, token: &str) -> AppResult<Uuid> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AppError::Auth(format!("Invalid session: {}", e)))?;
        Uuid::parse_str(&data.claims.sub)
            .map_err(|e| AppError::Auth(format!("Invalid session: {}", e)))
    }

    /// Http-only cookie carrying `token`.
    pub fn cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .http_only(true)
            .path("/")
            .same_site(SameSite::Lax)
            .secure(self.secure_cookie)
            .max_age(time::Duration::seconds(self.cookie_ttl.num_seconds()))
            .build()
    }

    /// Same-named cookie that is already expired.
    pub fn expired_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .http_only(true)
            .path("/")
            .same_site(SameSite::Lax)
            .secure(self.secure_cookie)
            .max_age(time::Duration::ZERO)
            .expires(time::OffsetDateTime::now_utc())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> SessionIssuer {
        SessionIssuer::new("test-jwt-secret-min-32-chars!!!!".into(), 7, 7, false)
    }

    #[test]
    fn issued_token_validates_to_same_user() {
        let issuer = issuer();
        let id = Uuid::new_v4();
        let token = issuer.issue(id).unwrap();
        assert_eq!(issuer.validate(&token).unwrap(), id);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let other = SessionIssuer::new("another-secret-that-is-32-chars!!".into(), 7, 7, false);
        let token = other.issue(Uuid::new_v4()).unwrap();
        assert!(matches!(issuer().validate(&token), Err(AppError::Auth(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let expired = SessionIssuer::new("test-jwt-secret-min-32-chars!!!!".into(), -1, 7, false);
        let token = expired.issue(Uuid::new_v4()).unwrap();
        assert!(matches!(issuer().validate(&token), Err(AppError::Auth(_))));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(issuer().validate("not.a.jwt").is_err());
    }

    #[test]
    fn cookie_is_http_only_and_expiring() {
        let c = issuer().cookie("abc".into());
        assert_eq!(c.name(), "token");
        assert_eq!(c.value(), "abc");
        assert_eq!(c.http_only(), Some(true));
        assert_eq!(c.max_age(), Some(time::Duration::days(7)));
    }

    #[test]
    fn logout_cookie_is_already_expired() {
        let c = issuer().expired_cookie();
        assert_eq!(c.name(), "token");
        assert_eq!(c.value(), "");
        assert_eq!(c.max_age(), Some(time::Duration::ZERO));
    }
}
