//! Job postings: employers post and delete, everyone browses.

use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{Job, JobFilter, JobType, NewJob, User, Website};
use crate::repositories::JobRepository;

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostJobInput {
    pub title: Option<String>,
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub company_name: Option<String>,
    pub introduction: Option<String>,
    pub responsibilities: Option<String>,
    pub qualifications: Option<String>,
    pub offers: Option<String>,
    pub salary: Option<String>,
    pub hiring_multiple_candidates: Option<bool>,
    pub personal_website_title: Option<String>,
    #[validate(url(message = "Please provide a valid website URL."))]
    pub personal_website_url: Option<String>,
    pub job_niche: Option<String>,
}

fn clean(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl PostJobInput {
    fn normalized(self) -> Self {
        Self {
            title: clean(self.title),
            job_type: clean(self.job_type),
            location: clean(self.location),
            company_name: clean(self.company_name),
            introduction: clean(self.introduction),
            responsibilities: clean(self.responsibilities),
            qualifications: clean(self.qualifications),
            offers: clean(self.offers),
            salary: clean(self.salary),
            hiring_multiple_candidates: self.hiring_multiple_candidates,
            personal_website_title: clean(self.personal_website_title),
            personal_website_url: clean(self.personal_website_url),
            job_niche: clean(self.job_niche),
        }
    }

    fn into_new_job(self, posted_by: Uuid) -> AppResult<NewJob> {
        let input = self.normalized();
        input.validate()?;
        let (
            Some(title),
            Some(job_type),
            Some(location),
            Some(company_name),
            Some(introduction),
            Some(responsibilities),
            Some(qualifications),
            Some(salary),
            Some(job_niche),
        ) = (
            input.title,
            input.job_type,
            input.location,
            input.company_name,
            input.introduction,
            input.responsibilities,
            input.qualifications,
            input.salary,
            input.job_niche,
        )
        else {
            return Err(AppError::Validation(
                "Please provide full job details.".to_string(),
            ));
        };
        let job_type: JobType = job_type.parse()?;

        let personal_website = match (input.personal_website_title, input.personal_website_url) {
            (Some(title), Some(url)) => Some(Website { title, url }),
            (None, None) => None,
            _ => {
                return Err(AppError::Validation(
                    "Provide both the website url and title, or leave both blank.".to_string(),
                ))
            }
        };

        Ok(NewJob {
            title,
            job_type,
            location,
            company_name,
            introduction,
            responsibilities,
            qualifications,
            offers: input.offers,
            salary,
            hiring_multiple_candidates: input.hiring_multiple_candidates.unwrap_or(false),
            personal_website,
            job_niche,
            posted_by,
        })
    }
}

#[derive(Clone)]
pub struct JobService {
    jobs: Arc<dyn JobRepository>,
}

impl JobService {
    pub fn new(jobs: Arc<dyn JobRepository>) -> Self {
        Self { jobs }
    }

    /// Caller must already be checked as an employer.
    pub async fn post(&self, employer: &User, input: PostJobInput) -> AppResult<Job> {
        let new_job = input.into_new_job(employer.id)?;
        let job = self.jobs.create(new_job).await?;
        info!(job_id = %job.id, posted_by = %employer.id, "job posted");
        Ok(job)
    }

    pub async fn list(&self, filter: JobFilter) -> AppResult<Vec<Job>> {
        self.jobs.list(&filter.normalized()).await
    }

    pub async fn list_mine(&self, employer: &User) -> AppResult<Vec<Job>> {
        self.jobs.list_by_poster(employer.id).await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Job> {
        self.jobs
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found.".to_string()))
    }

    /// Only the employer who posted a job may delete it.
    pub async fn delete(&self, employer: &User, id: Uuid) -> AppResult<()> {
        let job = self.get(id).await?;
        if job.posted_by != employer.id {
            return Err(AppError::Forbidden(
                "You can only delete jobs you posted.".to_string(),
            ));
        }
        if !self.jobs.delete(id).await? {
            return Err(AppError::NotFound("Job not found.".to_string()));
        }
        info!(job_id = %id, "job deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Profile;
    use crate::repositories::InMemoryJobRepository;
    use chrono::Utc;

    fn employer() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Acme HR".into(),
            email: "hr@acme.test".into(),
            phone: "555".into(),
            address: "Acme Plaza".into(),
            profile: Profile::Employer,
            resume: None,
            cover_letter: None,
            created_at: Utc::now(),
        }
    }

    fn input(title: &str, location: &str, niche: &str) -> PostJobInput {
        PostJobInput {
            title: Some(title.into()),
            job_type: Some("Full-time".into()),
            location: Some(location.into()),
            company_name: Some("Acme".into()),
            introduction: Some("Join our platform team".into()),
            responsibilities: Some("Ship code".into()),
            qualifications: Some("3 years".into()),
            salary: Some("90000".into()),
            job_niche: Some(niche.into()),
            ..Default::default()
        }
    }

    fn service() -> JobService {
        JobService::new(Arc::new(InMemoryJobRepository::new()))
    }

    #[tokio::test]
    async fn post_requires_full_details() {
        let svc = service();
        let e = employer();
        let bad = PostJobInput {
            salary: None,
            ..input("Rust dev", "Berlin", "Backend")
        };
        assert!(matches!(svc.post(&e, bad).await, Err(AppError::Validation(_))));
        let job = svc.post(&e, input("Rust dev", "Berlin", "Backend")).await.unwrap();
        assert_eq!(job.posted_by, e.id);
        assert!(!job.hiring_multiple_candidates);
    }

    #[tokio::test]
    async fn website_needs_both_title_and_url() {
        let svc = service();
        let e = employer();
        let half = PostJobInput {
            personal_website_title: Some("Blog".into()),
            ..input("Rust dev", "Berlin", "Backend")
        };
        assert!(matches!(svc.post(&e, half).await, Err(AppError::Validation(_))));
        let full = PostJobInput {
            personal_website_title: Some("Blog".into()),
            personal_website_url: Some("https://acme.test".into()),
            ..input("Rust dev", "Berlin", "Backend")
        };
        let job = svc.post(&e, full).await.unwrap();
        assert_eq!(job.personal_website.unwrap().url, "https://acme.test");
    }

    #[tokio::test]
    async fn website_url_must_be_a_url() {
        let svc = service();
        let bad = PostJobInput {
            personal_website_title: Some("Blog".into()),
            personal_website_url: Some("acme dot test".into()),
            ..input("Rust dev", "Berlin", "Backend")
        };
        assert!(matches!(svc.post(&employer(), bad).await, Err(AppError::Validation(_))));

        // Blank url is treated as absent, not as an invalid url.
        let blank = PostJobInput {
            personal_website_url: Some("   ".into()),
            ..input("Rust dev", "Berlin", "Backend")
        };
        let job = svc.post(&employer(), blank).await.unwrap();
        assert!(job.personal_website.is_none());
    }

    #[tokio::test]
    async fn unknown_job_type_rejected() {
        let svc = service();
        let bad = PostJobInput {
            job_type: Some("Gig".into()),
            ..input("Rust dev", "Berlin", "Backend")
        };
        assert!(matches!(svc.post(&employer(), bad).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn list_filters_and_orders_newest_first() {
        let svc = service();
        let e = employer();
        svc.post(&e, input("Rust dev", "Berlin", "Backend")).await.unwrap();
        svc.post(&e, input("Go dev", "Paris", "Backend")).await.unwrap();
        svc.post(&e, input("Designer", "Berlin", "Design")).await.unwrap();

        let all = svc.list(JobFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].title, "Designer");

        let berlin = svc
            .list(JobFilter {
                city: Some("Berlin".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(berlin.len(), 2);

        let keyword = svc
            .list(JobFilter {
                search_keyword: Some("DEV".into()),
                niche: Some("Backend".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(keyword.len(), 2);
    }

    #[tokio::test]
    async fn only_poster_can_delete() {
        let svc = service();
        let owner = employer();
        let other = employer();
        let job = svc.post(&owner, input("Rust dev", "Berlin", "Backend")).await.unwrap();

        assert!(matches!(svc.delete(&other, job.id).await, Err(AppError::Forbidden(_))));
        svc.delete(&owner, job.id).await.unwrap();
        assert!(matches!(svc.get(job.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(svc.delete(&owner, job.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_mine_returns_only_own_jobs() {
        let svc = service();
        let a = employer();
        let b = employer();
        svc.post(&a, input("Rust dev", "Berlin", "Backend")).await.unwrap();
        svc.post(&b, input("Go dev", "Paris", "Backend")).await.unwrap();
        let mine = svc.list_mine(&a).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "Rust dev");
    }
}
