//! Entry point: load config, wire dependencies, and run the server.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use jobportal::auth::SessionIssuer;
use jobportal::config::Config;
use jobportal::db::{self, PgApplicationRepository, PgJobRepository, PgUserRepository};
use jobportal::storage::DiskResumeStore;
use jobportal::{create_app, AccountService, AppState, ApplicationService, JobService};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db_pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&db_pool).await?;
    tracing::info!("database ready");

    tokio::fs::create_dir_all(&config.upload_dir).await?;
    let resumes = Arc::new(DiskResumeStore::new(
        config.upload_dir.clone(),
        config.uploads_url(),
    ));
    let users = Arc::new(PgUserRepository::new(db_pool.clone()));
    let jobs = Arc::new(PgJobRepository::new(db_pool.clone()));
    let applications = Arc::new(PgApplicationRepository::new(db_pool));

    let state = AppState {
        accounts: AccountService::new(users, resumes.clone()),
        jobs: JobService::new(jobs.clone()),
        applications: ApplicationService::new(applications, jobs, resumes),
        sessions: SessionIssuer::new(
            config.jwt_secret.clone(),
            config.jwt_expire_days,
            config.cookie_expire_days,
            config.cookie_secure,
        ),
    };

    let cors = CorsLayer::new()
        .allow_origin(config.frontend_url.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    let app = create_app(state)
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    tracing::info!(addr = %config.server_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
