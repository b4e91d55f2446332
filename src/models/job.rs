//! Job postings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Full-time" => Ok(JobType::FullTime),
            "Part-time" => Ok(JobType::PartTime),
            other => Err(AppError::Validation(format!("Invalid job type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Website {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub job_type: JobType,
    pub location: String,
    pub company_name: String,
    pub introduction: String,
    pub responsibilities: String,
    pub qualifications: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offers: Option<String>,
    pub salary: String,
    pub hiring_multiple_candidates: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_website: Option<Website>,
    pub job_niche: String,
    pub posted_by: Uuid,
    pub posted_on: DateTime<Utc>,
}

/// A validated posting ready to be stored.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub job_type: JobType,
    pub location: String,
    pub company_name: String,
    pub introduction: String,
    pub responsibilities: String,
    pub qualifications: String,
    pub offers: Option<String>,
    pub salary: String,
    pub hiring_multiple_candidates: bool,
    pub personal_website: Option<Website>,
    pub job_niche: String,
    pub posted_by: Uuid,
}

/// Filters for browsing postings. Empty fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilter {
    pub city: Option<String>,
    pub niche: Option<String>,
    pub search_keyword: Option<String>,
}

impl JobFilter {
    /// Drop blank values so `?city=` behaves like an absent parameter.
    pub fn normalized(self) -> Self {
        let clean = |v: Option<String>| {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };
        Self {
            city: clean(self.city),
            niche: clean(self.niche),
            search_keyword: clean(self.search_keyword),
        }
    }

    pub fn matches(&self, job: &Job) -> bool {
        if let Some(city) = &self.city {
            if &job.location != city {
                return false;
            }
        }
        if let Some(niche) = &self.niche {
            if &job.job_niche != niche {
                return false;
            }
        }
        if let Some(keyword) = &self.search_keyword {
            let keyword = keyword.to_lowercase();
            let hit = [&job.title, &job.company_name, &job.introduction]
                .iter()
                .any(|field| field.to_lowercase().contains(&keyword));
            if !hit {
                return false;
            }
        }
        true
    }
}
