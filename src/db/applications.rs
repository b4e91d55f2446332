//! PostgreSQL application repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{ApplicantInfo, Application, DeletedBy, JobInfo, NewApplication, ResumeRef, Role};
use crate::repositories::ApplicationRepository;

const APPLICATION_COLUMNS: &str = "id, job_seeker_id, name, email, phone, address, \
     resume_public_id, resume_url, cover_letter, employer_id, job_id, job_title, \
     deleted_by_job_seeker, deleted_by_employer, created_at";

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: Uuid,
    job_seeker_id: Uuid,
    name: String,
    email: String,
    phone: String,
    address: String,
    resume_public_id: String,
    resume_url: String,
    cover_letter: String,
    employer_id: Uuid,
    job_id: Uuid,
    job_title: String,
    deleted_by_job_seeker: bool,
    deleted_by_employer: bool,
    created_at: DateTime<Utc>,
}

impl From<ApplicationRow> for Application {
    fn from(row: ApplicationRow) -> Self {
        Application {
            id: row.id,
            job_seeker_info: ApplicantInfo {
                id: row.job_seeker_id,
                name: row.name,
                email: row.email,
                phone: row.phone,
                address: row.address,
                resume: ResumeRef {
                    public_id: row.resume_public_id,
                    url: row.resume_url,
                },
                cover_letter: row.cover_letter,
            },
            employer_id: row.employer_id,
            job_info: JobInfo {
                job_id: row.job_id,
                job_title: row.job_title,
            },
            deleted_by: DeletedBy {
                job_seeker: row.deleted_by_job_seeker,
                employer: row.deleted_by_employer,
            },
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PgApplicationRepository {
    pool: DbPool,
}

impl PgApplicationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationRepository for PgApplicationRepository {
    async fn create(&self, new: NewApplication) -> AppResult<Application> {
        let sql = format!(
            r#"
            INSERT INTO applications (id, job_seeker_id, name, email, phone, address,
                                      resume_public_id, resume_url, cover_letter,
                                      employer_id, job_id, job_title)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        );
        let info = &new.job_seeker_info;
        let row = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(info.id)
            .bind(&info.name)
            .bind(&info.email)
            .bind(&info.phone)
            .bind(&info.address)
            .bind(&info.resume.public_id)
            .bind(&info.resume.url)
            .bind(&info.cover_letter)
            .bind(new.employer_id)
            .bind(new.job_info.job_id)
            .bind(&new.job_info.job_title)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    AppError::Conflict("You have already applied for this job.".to_string())
                }
                _ => AppError::Db(e),
            })?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Application>> {
        let sql = format!("SELECT {} FROM applications WHERE id = $1", APPLICATION_COLUMNS);
        let row = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Application::from))
    }

    async fn exists_for(&self, job_id: Uuid, job_seeker_id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM applications WHERE job_id = $1 AND job_seeker_id = $2)",
        )
        .bind(job_id)
        .bind(job_seeker_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn list_for_employer(&self, employer_id: Uuid) -> AppResult<Vec<Application>> {
        let sql = format!(
            "SELECT {} FROM applications WHERE employer_id = $1 AND NOT deleted_by_employer \
             ORDER BY created_at DESC",
            APPLICATION_COLUMNS
        );
        let rows = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(employer_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Application::from).collect())
    }

    async fn list_for_job_seeker(&self, job_seeker_id: Uuid) -> AppResult<Vec<Application>> {
        let sql = format!(
            "SELECT {} FROM applications WHERE job_seeker_id = $1 AND NOT deleted_by_job_seeker \
             ORDER BY created_at DESC",
            APPLICATION_COLUMNS
        );
        let rows = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(job_seeker_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Application::from).collect())
    }

    async fn mark_deleted(&self, id: Uuid, role: Role) -> AppResult<Application> {
        let column = match role {
            Role::JobSeeker => "deleted_by_job_seeker",
            Role::Employer => "deleted_by_employer",
        };
        let sql = format!(
            "UPDATE applications SET {} = TRUE WHERE id = $1 RETURNING {}",
            column, APPLICATION_COLUMNS
        );
        let row = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Application not found.".to_string()))?;
        Ok(row.into())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let r = sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(r.rows_affected() > 0)
    }
}
