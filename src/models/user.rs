//! User accounts: role, niches and the public (secret-free) user record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;

/// Account role, fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Job Seeker")]
    JobSeeker,
    #[serde(rename = "Employer")]
    Employer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::JobSeeker => "Job Seeker",
            Role::Employer => "Employer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Job Seeker" => Ok(Role::JobSeeker),
            "Employer" => Ok(Role::Employer),
            other => Err(AppError::Validation(format!("Invalid role: {}", other))),
        }
    }
}

/// Three ranked job categories. Only constructible with three non-empty labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Niches {
    first_niche: String,
    second_niche: String,
    third_niche: String,
}

impl Niches {
    /// Build from optional form values; `None` when any is missing or blank.
    pub fn from_parts(
        first: Option<&str>,
        second: Option<&str>,
        third: Option<&str>,
    ) -> Option<Self> {
        let pick = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Some(Self {
            first_niche: pick(first)?,
            second_niche: pick(second)?,
            third_niche: pick(third)?,
        })
    }

    pub fn first(&self) -> &str {
        &self.first_niche
    }

    pub fn second(&self) -> &str {
        &self.second_niche
    }

    pub fn third(&self) -> &str {
        &self.third_niche
    }
}

/// Role together with the data only that role carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Profile {
    JobSeeker { niches: Niches },
    Employer,
}

impl Profile {
    pub fn role(&self) -> Role {
        match self {
            Profile::JobSeeker { .. } => Role::JobSeeker,
            Profile::Employer => Role::Employer,
        }
    }

    pub fn niches(&self) -> Option<&Niches> {
        match self {
            Profile::JobSeeker { niches } => Some(niches),
            Profile::Employer => None,
        }
    }
}

/// Reference to a resume held in the resume store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeRef {
    pub public_id: String,
    pub url: String,
}

/// A user record as seen by the rest of the application. Carries no secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub profile: Profile,
    pub resume: Option<ResumeRef>,
    pub cover_letter: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Role {
        self.profile.role()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserView<'a> {
    id: Uuid,
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    address: &'a str,
    role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    niches: Option<&'a Niches>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resume: Option<&'a ResumeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cover_letter: Option<&'a str>,
    created_at: DateTime<Utc>,
}

impl Serialize for User {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        UserView {
            id: self.id,
            name: &self.name,
            email: &self.email,
            phone: &self.phone,
            address: &self.address,
            role: self.role(),
            niches: self.profile.niches(),
            resume: self.resume.as_ref(),
            cover_letter: self.cover_letter.as_deref(),
            created_at: self.created_at,
        }
        .serialize(serializer)
    }
}
