//! Job portal backend built with Rust.
//!
//! Accounts with Job Seeker / Employer roles, cookie-carried JWT sessions,
//! resume uploads, job postings and job applications.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod storage;

pub use config::Config;
pub use error::AppError;
pub use handlers::http::AppState;
pub use services::{AccountService, ApplicationService, JobService};

use axum::routing::{delete, get, post, put};
use handlers::{applications, http, jobs};

/// Build the API router (users, jobs, applications, health). Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    let user_routes = axum::Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/getuser", get(auth::get_user))
        .route("/update/profile", put(auth::update_profile))
        .route("/update/password", put(auth::update_password));

    let job_routes = axum::Router::new()
        .route("/post", post(jobs::post_job))
        .route("/getall", get(jobs::get_all_jobs))
        .route("/getmyjobs", get(jobs::get_my_jobs))
        .route("/delete/:id", delete(jobs::delete_job))
        .route("/get/:id", get(jobs::get_job));

    let application_routes = axum::Router::new()
        .route("/post/:id", post(applications::post_application))
        .route("/employer/getall", get(applications::employer_get_all))
        .route("/jobseeker/getall", get(applications::job_seeker_get_all))
        .route("/delete/:id", delete(applications::delete_application));

    axum::Router::new()
        .route("/health", get(http::health))
        .nest("/api/v1/user", user_routes)
        .nest("/api/v1/job", job_routes)
        .nest("/api/v1/application", application_routes)
        .with_state(state)
}
