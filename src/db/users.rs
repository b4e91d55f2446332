//! PostgreSQL user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::DbPool;
use crate::auth::HashedPassword;
use crate::error::{AppError, AppResult};
use crate::models::{Niches, Profile, ResumeRef, Role, User};
use crate::repositories::{Credentials, NewUser, UserRepository};

const USER_COLUMNS: &str = "id, name, email, phone, address, password_hash, role, \
     first_niche, second_niche, third_niche, resume_public_id, resume_url, cover_letter, created_at";

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    address: String,
    password_hash: String,
    role: String,
    first_niche: Option<String>,
    second_niche: Option<String>,
    third_niche: Option<String>,
    resume_public_id: Option<String>,
    resume_url: Option<String>,
    cover_letter: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for Credentials {
    type Error = AppError;

    fn try_from(row: UserRow) -> AppResult<Self> {
        let role: Role = row
            .role
            .parse()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("stored role {:?} for {}", row.role, row.id)))?;
        let profile = match role {
            Role::Employer => Profile::Employer,
            Role::JobSeeker => {
                let niches = Niches::from_parts(
                    row.first_niche.as_deref(),
                    row.second_niche.as_deref(),
                    row.third_niche.as_deref(),
                )
                .ok_or_else(|| AppError::Internal(anyhow::anyhow!("job seeker {} has incomplete niches", row.id)))?;
                Profile::JobSeeker { niches }
            }
        };
        let resume = match (row.resume_public_id, row.resume_url) {
            (Some(public_id), Some(url)) => Some(ResumeRef { public_id, url }),
            _ => None,
        };
        Ok(Credentials {
            user: User {
                id: row.id,
                name: row.name,
                email: row.email,
                phone: row.phone,
                address: row.address,
                profile,
                resume,
                cover_letter: row.cover_letter,
                created_at: row.created_at,
            },
            password_hash: HashedPassword::from_stored(row.password_hash),
        })
    }
}

fn map_write_error(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict("Email is already registered.".to_string())
        }
        _ => AppError::Db(e),
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: DbPool,
}

impl PgUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn credentials_by_id(&self, id: Uuid) -> AppResult<Option<Credentials>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Credentials::try_from)
            .transpose()
    }

    async fn credentials_by_email(&self, email: &str) -> AppResult<Option<Credentials>> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(Credentials::try_from)
            .transpose()
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, new: NewUser) -> AppResult<User> {
        let niches = new.profile.niches();
        let sql = format!(
            r#"
            INSERT INTO users (id, name, email, phone, address, password_hash, role,
                               first_niche, second_niche, third_niche,
                               resume_public_id, resume_url, cover_letter)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new.name)
            .bind(&new.email)
            .bind(&new.phone)
            .bind(&new.address)
            .bind(new.password_hash.as_str())
            .bind(new.profile.role().as_str())
            .bind(niches.map(|n| n.first()))
            .bind(niches.map(|n| n.second()))
            .bind(niches.map(|n| n.third()))
            .bind(new.resume.as_ref().map(|r| r.public_id.as_str()))
            .bind(new.resume.as_ref().map(|r| r.url.as_str()))
            .bind(new.cover_letter.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(Credentials::try_from(row)?.user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.credentials_by_id(id).await?.map(|c| c.user))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.credentials_by_email(email).await?.map(|c| c.user))
    }

    async fn find_credentials_by_email(&self, email: &str) -> AppResult<Option<Credentials>> {
        self.credentials_by_email(email).await
    }

    async fn find_credentials_by_id(&self, id: Uuid) -> AppResult<Option<Credentials>> {
        self.credentials_by_id(id).await
    }

    async fn update_profile(&self, user: &User) -> AppResult<User> {
        let niches = user.profile.niches();
        // Role is never written; niches only apply to rows that are already job seekers.
        let sql = format!(
            r#"
            UPDATE users SET
                name = $2, email = $3, phone = $4, address = $5,
                first_niche  = CASE WHEN role = 'Job Seeker' THEN $6 ELSE first_niche END,
                second_niche = CASE WHEN role = 'Job Seeker' THEN $7 ELSE second_niche END,
                third_niche  = CASE WHEN role = 'Job Seeker' THEN $8 ELSE third_niche END,
                resume_public_id = $9, resume_url = $10, cover_letter = $11
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(&user.address)
            .bind(niches.map(|n| n.first()))
            .bind(niches.map(|n| n.second()))
            .bind(niches.map(|n| n.third()))
            .bind(user.resume.as_ref().map(|r| r.public_id.as_str()))
            .bind(user.resume.as_ref().map(|r| r.url.as_str()))
            .bind(user.cover_letter.as_deref())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        Ok(Credentials::try_from(row)?.user)
    }

    async fn update_password(&self, id: Uuid, hash: &HashedPassword) -> AppResult<()> {
        let r = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(hash.as_str())
            .execute(&self.pool)
            .await?;
        if r.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    async fn update_resume(&self, id: Uuid, resume: &ResumeRef) -> AppResult<()> {
        let r = sqlx::query("UPDATE users SET resume_public_id = $2, resume_url = $3 WHERE id = $1")
            .bind(id)
            .bind(&resume.public_id)
            .bind(&resume.url)
            .execute(&self.pool)
            .await?;
        if r.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }
}
