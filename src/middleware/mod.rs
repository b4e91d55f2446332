//! Request extractors shared by the protected routes.

pub mod auth;

pub use auth::{AuthUser, CurrentUser};
