//! Database layer: pool and PostgreSQL repositories.

mod applications;
mod jobs;
mod pool;
mod users;

pub use applications::PgApplicationRepository;
pub use jobs::PgJobRepository;
pub use pool::{create_pool, run_migrations, DbPool};
pub use users::PgUserRepository;
