//! Multipart form bodies for registration, profile updates and applications.

use axum::extract::Multipart;
use std::collections::HashMap;

use crate::error::AppResult;
use crate::services::{ApplicationInput, ProfileChanges, RegisterInput};
use crate::storage::UploadedFile;

/// Name of the file part carrying the resume.
pub const RESUME_FIELD: &str = "resume";

#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    pub resume: Option<UploadedFile>,
}

impl FormData {
    /// Drain the multipart stream. An empty `resume` part counts as no file.
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = FormData::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == RESUME_FIELD {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                if let Some(file_name) = file_name.filter(|n| !n.is_empty()) {
                    if !bytes.is_empty() {
                        form.resume = Some(UploadedFile {
                            file_name,
                            content_type,
                            bytes,
                        });
                    }
                }
                continue;
            }
            let value = field.text().await?;
            form.fields.insert(name, value);
        }
        Ok(form)
    }

    pub fn take(&mut self, key: &str) -> Option<String> {
        self.fields.remove(key)
    }

    pub fn into_register_input(mut self) -> (RegisterInput, Option<UploadedFile>) {
        let input = RegisterInput {
            name: self.take("name"),
            email: self.take("email"),
            phone: self.take("phone"),
            address: self.take("address"),
            password: self.take("password"),
            role: self.take("role"),
            first_niche: self.take("firstNiche"),
            second_niche: self.take("secondNiche"),
            third_niche: self.take("thirdNiche"),
            cover_letter: self.take("coverLetter"),
        };
        (input, self.resume)
    }

    /// `role` and `password` are not editable here and are dropped.
    pub fn into_profile_changes(mut self) -> (ProfileChanges, Option<UploadedFile>) {
        let changes = ProfileChanges {
            name: self.take("name"),
            email: self.take("email"),
            phone: self.take("phone"),
            address: self.take("address"),
            cover_letter: self.take("coverLetter"),
            first_niche: self.take("firstNiche"),
            second_niche: self.take("secondNiche"),
            third_niche: self.take("thirdNiche"),
        };
        (changes, self.resume)
    }

    pub fn into_application_input(mut self) -> (ApplicationInput, Option<UploadedFile>) {
        let input = ApplicationInput {
            name: self.take("name"),
            email: self.take("email"),
            phone: self.take("phone"),
            address: self.take("address"),
            cover_letter: self.take("coverLetter"),
        };
        (input, self.resume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        FormData {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            resume: None,
        }
    }

    #[test]
    fn register_fields_use_camel_case_names() {
        let (input, resume) = form(&[
            ("name", "Jane"),
            ("firstNiche", "Backend"),
            ("coverLetter", "Hello"),
        ])
        .into_register_input();
        assert_eq!(input.name.as_deref(), Some("Jane"));
        assert_eq!(input.first_niche.as_deref(), Some("Backend"));
        assert_eq!(input.cover_letter.as_deref(), Some("Hello"));
        assert!(input.email.is_none());
        assert!(resume.is_none());
    }

    #[test]
    fn profile_changes_ignore_role_and_password() {
        let (changes, _) = form(&[
            ("role", "Employer"),
            ("password", "hunter22"),
            ("thirdNiche", ""),
        ])
        .into_profile_changes();
        assert_eq!(changes.third_niche.as_deref(), Some(""));
        assert!(changes.name.is_none());
    }

    #[test]
    fn application_fields_use_camel_case_names() {
        let (input, _) = form(&[("coverLetter", "Hire me"), ("role", "Employer")])
            .into_application_input();
        assert_eq!(input.cover_letter.as_deref(), Some("Hire me"));
        assert!(input.name.is_none());
    }
}
