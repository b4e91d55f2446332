//! In-memory repositories for tests and local runs without PostgreSQL.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ApplicationRepository, Credentials, JobRepository, NewUser, UserRepository};
use crate::auth::HashedPassword;
use crate::error::{AppError, AppResult};
use crate::models::{
    Application, DeletedBy, Job, JobFilter, NewApplication, NewJob, ResumeRef, Role, User,
};

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, Credentials>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

fn email_taken(users: &HashMap<Uuid, Credentials>, email: &str, except: Option<Uuid>) -> bool {
    users
        .values()
        .any(|c| c.user.email.eq_ignore_ascii_case(email) && Some(c.user.id) != except)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new: NewUser) -> AppResult<User> {
        let mut users = self.users.write().await;
        if email_taken(&users, &new.email, None) {
            return Err(AppError::Conflict("Email is already registered.".to_string()));
        }
        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            phone: new.phone,
            address: new.address,
            profile: new.profile,
            resume: new.resume,
            cover_letter: new.cover_letter,
            created_at: Utc::now(),
        };
        users.insert(
            user.id,
            Credentials {
                user: user.clone(),
                password_hash: new.password_hash,
            },
        );
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&id).map(|c| c.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|c| c.user.email.eq_ignore_ascii_case(email))
            .map(|c| c.user.clone()))
    }

    async fn find_credentials_by_email(&self, email: &str) -> AppResult<Option<Credentials>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|c| c.user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_credentials_by_id(&self, id: Uuid) -> AppResult<Option<Credentials>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn update_profile(&self, user: &User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, Some(user.id)) {
            return Err(AppError::Conflict("Email is already registered.".to_string()));
        }
        let stored = users
            .get_mut(&user.id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let role = stored.user.role();
        stored.user.name = user.name.clone();
        stored.user.email = user.email.clone();
        stored.user.phone = user.phone.clone();
        stored.user.address = user.address.clone();
        if user.role() == role {
            stored.user.profile = user.profile.clone();
        }
        stored.user.resume = user.resume.clone();
        stored.user.cover_letter = user.cover_letter.clone();
        Ok(stored.user.clone())
    }

    async fn update_password(&self, id: Uuid, hash: &HashedPassword) -> AppResult<()> {
        let mut users = self.users.write().await;
        let stored = users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        stored.password_hash = hash.clone();
        Ok(())
    }

    async fn update_resume(&self, id: Uuid, resume: &ResumeRef) -> AppResult<()> {
        let mut users = self.users.write().await;
        let stored = users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        stored.user.resume = Some(resume.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryJobRepository {
    jobs: Arc<RwLock<Vec<Job>>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create(&self, new: NewJob) -> AppResult<Job> {
        let job = Job {
            id: Uuid::new_v4(),
            title: new.title,
            job_type: new.job_type,
            location: new.location,
            company_name: new.company_name,
            introduction: new.introduction,
            responsibilities: new.responsibilities,
            qualifications: new.qualifications,
            offers: new.offers,
            salary: new.salary,
            hiring_multiple_candidates: new.hiring_multiple_candidates,
            personal_website: new.personal_website,
            job_niche: new.job_niche,
            posted_by: new.posted_by,
            posted_on: Utc::now(),
        };
        self.jobs.write().await.push(job.clone());
        Ok(job)
    }

    async fn list(&self, filter: &JobFilter) -> AppResult<Vec<Job>> {
        Ok(self
            .jobs
            .read()
            .await
            .iter()
            .rev()
            .filter(|j| filter.matches(j))
            .cloned()
            .collect())
    }

    async fn list_by_poster(&self, user_id: Uuid) -> AppResult<Vec<Job>> {
        Ok(self
            .jobs
            .read()
            .await
            .iter()
            .rev()
            .filter(|j| j.posted_by == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Job>> {
        Ok(self.jobs.read().await.iter().find(|j| j.id == id).cloned())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|j| j.id != id);
        Ok(jobs.len() != before)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryApplicationRepository {
    applications: Arc<RwLock<Vec<Application>>>,
}

impl InMemoryApplicationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.applications.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.applications.read().await.is_empty()
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn create(&self, new: NewApplication) -> AppResult<Application> {
        let mut applications = self.applications.write().await;
        if applications
            .iter()
            .any(|a| a.job_info.job_id == new.job_info.job_id && a.job_seeker_info.id == new.job_seeker_info.id)
        {
            return Err(AppError::Conflict("You have already applied for this job.".to_string()));
        }
        let application = Application {
            id: Uuid::new_v4(),
            job_seeker_info: new.job_seeker_info,
            employer_id: new.employer_id,
            job_info: new.job_info,
            deleted_by: DeletedBy::default(),
            created_at: Utc::now(),
        };
        applications.push(application.clone());
        Ok(application)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Application>> {
        Ok(self.applications.read().await.iter().find(|a| a.id == id).cloned())
    }

    async fn exists_for(&self, job_id: Uuid, job_seeker_id: Uuid) -> AppResult<bool> {
        Ok(self
            .applications
            .read()
            .await
            .iter()
            .any(|a| a.job_info.job_id == job_id && a.job_seeker_info.id == job_seeker_id))
    }

    async fn list_for_employer(&self, employer_id: Uuid) -> AppResult<Vec<Application>> {
        Ok(self
            .applications
            .read()
            .await
            .iter()
            .rev()
            .filter(|a| a.employer_id == employer_id && !a.deleted_by.employer)
            .cloned()
            .collect())
    }

    async fn list_for_job_seeker(&self, job_seeker_id: Uuid) -> AppResult<Vec<Application>> {
        Ok(self
            .applications
            .read()
            .await
            .iter()
            .rev()
            .filter(|a| a.job_seeker_info.id == job_seeker_id && !a.deleted_by.job_seeker)
            .cloned()
            .collect())
    }

    async fn mark_deleted(&self, id: Uuid, role: Role) -> AppResult<Application> {
        let mut applications = self.applications.write().await;
        let stored = applications
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound("Application not found.".to_string()))?;
        stored.deleted_by.mark(role);
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut applications = self.applications.write().await;
        let before = applications.len();
        applications.retain(|a| a.id != id);
        Ok(applications.len() != before)
    }
}
