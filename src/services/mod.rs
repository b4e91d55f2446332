//! Application services: account flows, job postings and job applications.

pub mod accounts;
pub mod applications;
pub mod jobs;

pub use accounts::{
    AccountService, LoginInput, PasswordChange, ProfileChanges, ProfileUpdate, RegisterInput,
    ResumeCleanup,
};
pub use applications::{ApplicationInput, ApplicationService};
pub use jobs::{JobService, PostJobInput};
