//! Authentication: password hashing, session tokens and the account endpoints.

mod handlers;
mod jwt;
mod password;

pub use handlers::{get_user, login, logout, register, update_password, update_profile, SessionResponse};
pub use jwt::{Claims, SessionIssuer, SESSION_COOKIE};
pub use password::{verify_dummy, HashedPassword};
