//! Job applications: a seeker's snapshot of contact details and resume, sent to one job.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{ResumeRef, Role};

/// Applicant details as submitted; later profile edits do not rewrite them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Blob owned by this application.
    pub resume: ResumeRef,
    pub cover_letter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInfo {
    pub job_id: Uuid,
    pub job_title: String,
}

/// Each party hides an application independently; the record goes once both have.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedBy {
    pub job_seeker: bool,
    pub employer: bool,
}

impl DeletedBy {
    pub fn mark(&mut self, role: Role) {
        match role {
            Role::JobSeeker => self.job_seeker = true,
            Role::Employer => self.employer = true,
        }
    }

    pub fn by(&self, role: Role) -> bool {
        match role {
            Role::JobSeeker => self.job_seeker,
            Role::Employer => self.employer,
        }
    }

    pub fn both(&self) -> bool {
        self.job_seeker && self.employer
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub job_seeker_info: ApplicantInfo,
    pub employer_id: Uuid,
    pub job_info: JobInfo,
    pub deleted_by: DeletedBy,
    pub created_at: DateTime<Utc>,
}

impl Application {
    /// Whether `user_id` acting as `role` is a party to this application.
    pub fn is_party(&self, user_id: Uuid, role: Role) -> bool {
        match role {
            Role::JobSeeker => self.job_seeker_info.id == user_id,
            Role::Employer => self.employer_id == user_id,
        }
    }
}

/// A validated application ready to be stored.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_seeker_info: ApplicantInfo,
    pub employer_id: Uuid,
    pub job_info: JobInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deleted_by_tracks_each_side() {
        let mut d = DeletedBy::default();
        d.mark(Role::Employer);
        assert!(d.by(Role::Employer));
        assert!(!d.by(Role::JobSeeker));
        assert!(!d.both());
        d.mark(Role::JobSeeker);
        assert!(d.both());
    }

    #[test]
    fn serializes_camel_case_snapshot() {
        let app = Application {
            id: Uuid::new_v4(),
            job_seeker_info: ApplicantInfo {
                id: Uuid::new_v4(),
                name: "Jane".into(),
                email: "jane@example.com".into(),
                phone: "555".into(),
                address: "1 Main St".into(),
                resume: ResumeRef {
                    public_id: "r/1.pdf".into(),
                    url: "http://x/r/1.pdf".into(),
                },
                cover_letter: "Hi".into(),
            },
            employer_id: Uuid::new_v4(),
            job_info: JobInfo {
                job_id: Uuid::new_v4(),
                job_title: "Rust dev".into(),
            },
            deleted_by: DeletedBy::default(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&app).unwrap();
        assert_eq!(json["jobSeekerInfo"]["coverLetter"], "Hi");
        assert_eq!(json["jobInfo"]["jobTitle"], "Rust dev");
        assert_eq!(json["deletedBy"]["employer"], false);
    }
}
