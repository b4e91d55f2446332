//! PostgreSQL job repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{Job, JobFilter, NewJob, Website};
use crate::repositories::JobRepository;

const JOB_COLUMNS: &str = "id, title, job_type, location, company_name, introduction, \
     responsibilities, qualifications, offers, salary, hiring_multiple_candidates, \
     website_title, website_url, job_niche, posted_by, posted_on";

#[derive(Debug, FromRow)]
struct JobRow {
    id: Uuid,
    title: String,
    job_type: String,
    location: String,
    company_name: String,
    introduction: String,
    responsibilities: String,
    qualifications: String,
    offers: Option<String>,
    salary: String,
    hiring_multiple_candidates: bool,
    website_title: Option<String>,
    website_url: Option<String>,
    job_niche: String,
    posted_by: Uuid,
    posted_on: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = AppError;

    fn try_from(row: JobRow) -> AppResult<Self> {
        let job_type = row
            .job_type
            .parse()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("stored job type {:?} for {}", row.job_type, row.id)))?;
        let personal_website = match (row.website_title, row.website_url) {
            (Some(title), Some(url)) => Some(Website { title, url }),
            _ => None,
        };
        Ok(Job {
            id: row.id,
            title: row.title,
            job_type,
            location: row.location,
            company_name: row.company_name,
            introduction: row.introduction,
            responsibilities: row.responsibilities,
            qualifications: row.qualifications,
            offers: row.offers,
            salary: row.salary,
            hiring_multiple_candidates: row.hiring_multiple_candidates,
            personal_website,
            job_niche: row.job_niche,
            posted_by: row.posted_by,
            posted_on: row.posted_on,
        })
    }
}

/// `%kw%` with LIKE wildcards in the keyword escaped.
fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[derive(Clone)]
pub struct PgJobRepository {
    pool: DbPool,
}

impl PgJobRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn create(&self, new: NewJob) -> AppResult<Job> {
        let sql = format!(
            r#"
            INSERT INTO jobs (id, title, job_type, location, company_name, introduction,
                              responsibilities, qualifications, offers, salary,
                              hiring_multiple_candidates, website_title, website_url,
                              job_niche, posted_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {}
            "#,
            JOB_COLUMNS
        );
        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new.title)
            .bind(new.job_type.as_str())
            .bind(&new.location)
            .bind(&new.company_name)
            .bind(&new.introduction)
            .bind(&new.responsibilities)
            .bind(&new.qualifications)
            .bind(new.offers.as_deref())
            .bind(&new.salary)
            .bind(new.hiring_multiple_candidates)
            .bind(new.personal_website.as_ref().map(|w| w.title.as_str()))
            .bind(new.personal_website.as_ref().map(|w| w.url.as_str()))
            .bind(&new.job_niche)
            .bind(new.posted_by)
            .fetch_one(&self.pool)
            .await?;
        Job::try_from(row)
    }

    async fn list(&self, filter: &JobFilter) -> AppResult<Vec<Job>> {
        let sql = format!(
            r#"
            SELECT {} FROM jobs
            WHERE ($1::text IS NULL OR location = $1)
              AND ($2::text IS NULL OR job_niche = $2)
              AND ($3::text IS NULL
                   OR title ILIKE $3 OR company_name ILIKE $3 OR introduction ILIKE $3)
            ORDER BY posted_on DESC
            "#,
            JOB_COLUMNS
        );
        let rows = sqlx::query_as::<_, JobRow>(&sql)
            .bind(filter.city.as_deref())
            .bind(filter.niche.as_deref())
            .bind(filter.search_keyword.as_deref().map(like_pattern))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Job::try_from).collect()
    }

    async fn list_by_poster(&self, user_id: Uuid) -> AppResult<Vec<Job>> {
        let sql = format!(
            "SELECT {} FROM jobs WHERE posted_by = $1 ORDER BY posted_on DESC",
            JOB_COLUMNS
        );
        let rows = sqlx::query_as::<_, JobRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Job::try_from).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Job>> {
        let sql = format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS);
        sqlx::query_as::<_, JobRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Job::try_from)
            .transpose()
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let r = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(r.rows_affected() > 0)
    }
}
