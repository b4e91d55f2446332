//! Job applications: seekers apply, both parties list and delete their side.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{ApplicantInfo, Application, JobInfo, NewApplication, ResumeRef, User};
use crate::repositories::{ApplicationRepository, JobRepository};
use crate::storage::{ResumeStore, UploadedFile};

fn clean(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[derive(Debug, Default, Clone, Validate)]
pub struct ApplicationInput {
    pub name: Option<String>,
    #[validate(email(message = "Please provide a valid email."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub cover_letter: Option<String>,
}

impl ApplicationInput {
    fn normalized(self) -> Self {
        Self {
            name: clean(self.name),
            email: clean(self.email).map(|e| e.to_lowercase()),
            phone: clean(self.phone),
            address: clean(self.address),
            cover_letter: clean(self.cover_letter),
        }
    }
}

#[derive(Clone)]
pub struct ApplicationService {
    applications: Arc<dyn ApplicationRepository>,
    jobs: Arc<dyn JobRepository>,
    resumes: Arc<dyn ResumeStore>,
}

impl ApplicationService {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        jobs: Arc<dyn JobRepository>,
        resumes: Arc<dyn ResumeStore>,
    ) -> Self {
        Self {
            applications,
            jobs,
            resumes,
        }
    }

    /// Caller must already be checked as a job seeker. Without an attached file the
    /// profile resume is copied, so the application never shares a blob with the profile.
    pub async fn apply(
        &self,
        seeker: &User,
        job_id: Uuid,
        input: ApplicationInput,
        resume: Option<UploadedFile>,
    ) -> AppResult<Application> {
        let input = input.normalized();
        input.validate()?;
        let (Some(name), Some(email), Some(phone), Some(address), Some(cover_letter)) = (
            input.name,
            input.email,
            input.phone,
            input.address,
            input.cover_letter,
        ) else {
            return Err(AppError::Validation("All fields are required.".to_string()));
        };
        if resume.is_none() && seeker.resume.is_none() {
            return Err(AppError::Validation("Please upload your resume.".to_string()));
        }

        let job = self
            .jobs
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found.".to_string()))?;
        if self.applications.exists_for(job.id, seeker.id).await? {
            return Err(AppError::Conflict("You have already applied for this job.".to_string()));
        }

        let stored = self.store_resume(seeker, resume).await?;
        let new_application = NewApplication {
            job_seeker_info: ApplicantInfo {
                id: seeker.id,
                name,
                email,
                phone,
                address,
                resume: stored.clone(),
                cover_letter,
            },
            employer_id: job.posted_by,
            job_info: JobInfo {
                job_id: job.id,
                job_title: job.title,
            },
        };
        match self.applications.create(new_application).await {
            Ok(application) => {
                info!(application_id = %application.id, job_id = %job.id, job_seeker_id = %seeker.id, "application submitted");
                Ok(application)
            }
            Err(e) => {
                self.release(&stored.public_id).await;
                Err(e)
            }
        }
    }

    /// Caller must already be checked as an employer.
    pub async fn list_for_employer(&self, employer: &User) -> AppResult<Vec<Application>> {
        self.applications.list_for_employer(employer.id).await
    }

    /// Caller must already be checked as a job seeker.
    pub async fn list_for_job_seeker(&self, seeker: &User) -> AppResult<Vec<Application>> {
        self.applications.list_for_job_seeker(seeker.id).await
    }

    /// Hide the application from the caller's side. Once both sides have deleted it the
    /// record is removed and its resume released.
    pub async fn delete(&self, user: &User, id: Uuid) -> AppResult<()> {
        let role = user.role();
        let application = self
            .applications
            .find_by_id(id)
            .await?
            .filter(|a| !a.deleted_by.by(role))
            .ok_or_else(|| AppError::NotFound("Application not found.".to_string()))?;
        if !application.is_party(user.id, role) {
            return Err(AppError::Forbidden(
                "You can only delete your own applications.".to_string(),
            ));
        }

        let updated = self.applications.mark_deleted(id, role).await?;
        info!(application_id = %id, role = %role, "application deleted");
        if updated.deleted_by.both() && self.applications.delete(id).await? {
            self.release(&updated.job_seeker_info.resume.public_id).await;
            info!(application_id = %id, "application removed");
        }
        Ok(())
    }

    async fn store_resume(&self, seeker: &User, resume: Option<UploadedFile>) -> AppResult<ResumeRef> {
        match (resume, &seeker.resume) {
            (Some(file), _) => self.resumes.upload(file).await,
            (None, Some(profile_resume)) => self.resumes.duplicate(&profile_resume.public_id).await,
            (None, None) => Err(AppError::Validation("Please upload your resume.".to_string())),
        }
    }

    async fn release(&self, public_id: &str) {
        if let Err(e) = self.resumes.destroy(public_id).await {
            warn!(public_id = %public_id, error = %e, "failed to release application resume");
        }
    }
}
