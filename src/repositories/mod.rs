//! Persistence ports. PostgreSQL adapters live in `db`; in-memory ones in `memory`.

pub mod memory;

pub use memory::{InMemoryApplicationRepository, InMemoryJobRepository, InMemoryUserRepository};

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::HashedPassword;
use crate::error::AppResult;
use crate::models::{Application, Job, JobFilter, NewApplication, NewJob, Profile, ResumeRef, Role, User};

/// A validated registration ready to be stored.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub password_hash: HashedPassword,
    pub profile: Profile,
    pub resume: Option<ResumeRef>,
    pub cover_letter: Option<String>,
}

/// Stored user together with its password hash.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: User,
    pub password_hash: HashedPassword,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. A duplicate email is `AppError::Conflict`.
    async fn create(&self, user: NewUser) -> AppResult<User>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// The only lookup that returns the password hash.
    async fn find_credentials_by_email(&self, email: &str) -> AppResult<Option<Credentials>>;

    async fn find_credentials_by_id(&self, id: Uuid) -> AppResult<Option<Credentials>>;

    /// Write the editable profile fields of `user`. Role and password are untouched.
    async fn update_profile(&self, user: &User) -> AppResult<User>;

    async fn update_password(&self, id: Uuid, hash: &HashedPassword) -> AppResult<()>;

    /// Point the stored resume reference at `resume`; nothing else is written.
    async fn update_resume(&self, id: Uuid, resume: &ResumeRef) -> AppResult<()>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: NewJob) -> AppResult<Job>;

    /// Newest first.
    async fn list(&self, filter: &JobFilter) -> AppResult<Vec<Job>>;

    /// Newest first.
    async fn list_by_poster(&self, user_id: Uuid) -> AppResult<Vec<Job>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Job>>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Insert an application. A second one for the same job and seeker is `AppError::Conflict`.
    async fn create(&self, application: NewApplication) -> AppResult<Application>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Application>>;

    async fn exists_for(&self, job_id: Uuid, job_seeker_id: Uuid) -> AppResult<bool>;

    /// Applications to the employer's jobs the employer has not deleted. Newest first.
    async fn list_for_employer(&self, employer_id: Uuid) -> AppResult<Vec<Application>>;

    /// The seeker's applications the seeker has not deleted. Newest first.
    async fn list_for_job_seeker(&self, job_seeker_id: Uuid) -> AppResult<Vec<Application>>;

    /// Hide the application from `role`'s side and return the updated record.
    async fn mark_deleted(&self, id: Uuid, role: Role) -> AppResult<Application>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}
