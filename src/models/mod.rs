//! Domain models: users, job postings and applications.

pub mod application;
pub mod job;
pub mod user;

pub use application::*;
pub use job::*;
pub use user::*;
