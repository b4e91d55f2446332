//! Account flows: registration, login, profile and password updates.

use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{verify_dummy, HashedPassword};
use crate::error::{AppError, AppResult};
use crate::models::{Niches, Profile, ResumeRef, Role, User};
use crate::repositories::{NewUser, UserRepository};
use crate::storage::{ResumeStore, UploadedFile};

const INVALID_CREDENTIALS: &str = "Invalid email, password or role.";

/// Trim and drop blank values.
fn clean(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Trim but keep explicit blanks, so a sent-but-empty field can be rejected.
fn trim(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string())
}

/// Registration form fields. Everything is optional here; presence is checked by the flow.
#[derive(Debug, Default, Clone, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 3, max = 30, message = "Name must contain between 3 and 30 characters."))]
    pub name: Option<String>,
    #[validate(email(message = "Please provide a valid email."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(length(min = 8, max = 32, message = "Password must contain between 8 and 32 characters."))]
    pub password: Option<String>,
    pub role: Option<String>,
    pub first_niche: Option<String>,
    pub second_niche: Option<String>,
    pub third_niche: Option<String>,
    pub cover_letter: Option<String>,
}

impl RegisterInput {
    fn normalized(self) -> Self {
        Self {
            name: clean(self.name),
            email: clean(self.email).map(|e| e.to_lowercase()),
            phone: clean(self.phone),
            address: clean(self.address),
            // Passwords are taken verbatim.
            password: self.password.filter(|p| !p.is_empty()),
            role: clean(self.role),
            first_niche: clean(self.first_niche),
            second_niche: clean(self.second_niche),
            third_niche: clean(self.third_niche),
            cover_letter: clean(self.cover_letter),
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct LoginInput {
    pub role: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Editable profile fields. `None` keeps the stored value.
#[derive(Debug, Default, Clone, Validate)]
pub struct ProfileChanges {
    #[validate(length(min = 3, max = 30, message = "Name must contain between 3 and 30 characters."))]
    pub name: Option<String>,
    #[validate(email(message = "Please provide a valid email."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub cover_letter: Option<String>,
    pub first_niche: Option<String>,
    pub second_niche: Option<String>,
    pub third_niche: Option<String>,
}

impl ProfileChanges {
    fn normalized(self) -> Self {
        Self {
            name: trim(self.name),
            email: trim(self.email).map(|e| e.to_lowercase()),
            phone: trim(self.phone),
            address: trim(self.address),
            cover_letter: trim(self.cover_letter),
            first_niche: trim(self.first_niche),
            second_niche: trim(self.second_niche),
            third_niche: trim(self.third_niche),
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

#[derive(Validate)]
struct NewPassword {
    #[validate(length(min = 8, max = 32, message = "Password must contain between 8 and 32 characters."))]
    value: String,
}

/// What happened to the previous resume when a new one replaced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeCleanup {
    NotNeeded,
    Released { public_id: String },
    Failed { public_id: String, reason: String },
}

impl ResumeCleanup {
    pub fn warning(&self) -> Option<String> {
        match self {
            ResumeCleanup::Failed { public_id, .. } => Some(format!(
                "Previous resume {} could not be deleted.",
                public_id
            )),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub user: User,
    pub cleanup: ResumeCleanup,
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    resumes: Arc<dyn ResumeStore>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>, resumes: Arc<dyn ResumeStore>) -> Self {
        Self { users, resumes }
    }

    pub async fn register(&self, input: RegisterInput, resume: Option<UploadedFile>) -> AppResult<User> {
        let input = input.normalized();
        let (Some(name), Some(email), Some(phone), Some(address), Some(password), Some(role)) = (
            input.name.as_deref(),
            input.email.as_deref(),
            input.phone.as_deref(),
            input.address.as_deref(),
            input.password.as_deref(),
            input.role.as_deref(),
        ) else {
            return Err(AppError::Validation("All fields are required.".to_string()));
        };

        let profile = match role.parse::<Role>()? {
            Role::JobSeeker => Profile::JobSeeker {
                niches: Niches::from_parts(
                    input.first_niche.as_deref(),
                    input.second_niche.as_deref(),
                    input.third_niche.as_deref(),
                )
                .ok_or_else(|| {
                    AppError::Validation("Please provide your preferred job niches.".to_string())
                })?,
            },
            Role::Employer => Profile::Employer,
        };
        input.validate()?;

        if self.users.find_by_email(email).await?.is_some() {
            return Err(AppError::Conflict("Email is already registered.".to_string()));
        }

        let password_hash = HashedPassword::hash(password)?;
        let uploaded = match resume {
            Some(file) => Some(self.resumes.upload(file).await?),
            None => None,
        };

        let new_user = NewUser {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            address: address.to_string(),
            password_hash,
            profile,
            resume: uploaded.clone(),
            cover_letter: input.cover_letter.clone(),
        };
        match self.users.create(new_user).await {
            Ok(user) => {
                info!(user_id = %user.id, role = %user.role(), "user registered");
                Ok(user)
            }
            Err(e) => {
                if let Some(r) = uploaded {
                    self.release(&r.public_id).await;
                }
                Err(e)
            }
        }
    }

    /// Check email, password and role together; every failure looks the same to the caller.
    pub async fn authenticate(&self, input: LoginInput) -> AppResult<User> {
        let (Some(role), Some(email), Some(password)) = (
            clean(input.role),
            clean(input.email).map(|e| e.to_lowercase()),
            input.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(AppError::Validation(
                "Email, password and role are required.".to_string(),
            ));
        };
        let role: Role = role.parse()?;

        let Some(creds) = self.users.find_credentials_by_email(&email).await? else {
            verify_dummy(&password);
            return Err(AppError::Credentials(INVALID_CREDENTIALS.to_string()));
        };
        if !creds.password_hash.verify(&password)? || creds.user.role() != role {
            return Err(AppError::Credentials(INVALID_CREDENTIALS.to_string()));
        }

        info!(user_id = %creds.user.id, "user logged in");
        Ok(creds.user)
    }

    pub async fn find(&self, id: Uuid) -> AppResult<Option<User>> {
        self.users.find_by_id(id).await
    }

    /// Merge `changes` over `current`, validate the result, swap the resume if one is
    /// attached, then persist.
    pub async fn update_profile(
        &self,
        current: &User,
        changes: ProfileChanges,
        resume: Option<UploadedFile>,
    ) -> AppResult<ProfileUpdate> {
        let changes = changes.normalized();
        changes.validate()?;

        let mut merged = current.clone();
        if let Some(name) = changes.name {
            merged.name = name;
        }
        if let Some(email) = changes.email {
            if email != current.email {
                if let Some(other) = self.users.find_by_email(&email).await? {
                    if other.id != current.id {
                        return Err(AppError::Conflict("Email is already registered.".to_string()));
                    }
                }
            }
            merged.email = email;
        }
        if let Some(phone) = changes.phone {
            if phone.is_empty() {
                return Err(AppError::Validation("Phone cannot be empty.".to_string()));
            }
            merged.phone = phone;
        }
        if let Some(address) = changes.address {
            if address.is_empty() {
                return Err(AppError::Validation("Address cannot be empty.".to_string()));
            }
            merged.address = address;
        }
        if let Some(cover_letter) = changes.cover_letter {
            merged.cover_letter = Some(cover_letter).filter(|c| !c.is_empty());
        }
        if let Profile::JobSeeker { niches } = &current.profile {
            let niches = Niches::from_parts(
                Some(changes.first_niche.as_deref().unwrap_or(niches.first())),
                Some(changes.second_niche.as_deref().unwrap_or(niches.second())),
                Some(changes.third_niche.as_deref().unwrap_or(niches.third())),
            )
            .ok_or_else(|| {
                AppError::Validation("Please provide all your preferred job niches.".to_string())
            })?;
            merged.profile = Profile::JobSeeker { niches };
        }

        let mut cleanup = ResumeCleanup::NotNeeded;
        let mut uploaded = None;
        if let Some(file) = resume {
            let new_ref = self.resumes.upload(file).await?;
            if let Some(previous) = &current.resume {
                cleanup = self.release_previous(&previous.public_id).await;
            }
            merged.resume = Some(new_ref.clone());
            uploaded = Some(new_ref);
        }

        match self.users.update_profile(&merged).await {
            Ok(user) => {
                info!(user_id = %user.id, "profile updated");
                Ok(ProfileUpdate { user, cleanup })
            }
            Err(e) => {
                if let Some(r) = uploaded {
                    self.settle_failed_swap(current.id, &cleanup, r).await;
                }
                Err(e)
            }
        }
    }

    pub async fn update_password(&self, user_id: Uuid, change: PasswordChange) -> AppResult<User> {
        let (Some(old), Some(new), Some(confirm)) = (
            change.old_password.filter(|p| !p.is_empty()),
            change.new_password.filter(|p| !p.is_empty()),
            change.confirm_password.filter(|p| !p.is_empty()),
        ) else {
            return Err(AppError::Validation(
                "Old password, new password and confirm password are required.".to_string(),
            ));
        };

        let creds = self
            .users
            .find_credentials_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Auth("User not found.".to_string()))?;
        if !creds.password_hash.verify(&old)? {
            return Err(AppError::Credentials("Old password is incorrect.".to_string()));
        }
        if new != confirm {
            return Err(AppError::Validation(
                "New password and confirm password do not match.".to_string(),
            ));
        }
        NewPassword { value: new.clone() }.validate()?;

        let hash = HashedPassword::hash(&new)?;
        self.users.update_password(user_id, &hash).await?;
        info!(user_id = %user_id, "password updated");
        Ok(creds.user)
    }

    async fn release_previous(&self, public_id: &str) -> ResumeCleanup {
        match self.resumes.destroy(public_id).await {
            Ok(()) => ResumeCleanup::Released {
                public_id: public_id.to_string(),
            },
            Err(e) => {
                warn!(public_id = %public_id, error = %e, "failed to delete previous resume");
                ResumeCleanup::Failed {
                    public_id: public_id.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// The profile write failed after a new resume was uploaded. While the previous blob
    /// still exists the new one is released; once it is gone the new one must be attached
    /// so the stored reference keeps resolving.
    async fn settle_failed_swap(&self, user_id: Uuid, cleanup: &ResumeCleanup, uploaded: ResumeRef) {
        if !matches!(cleanup, ResumeCleanup::Released { .. }) {
            self.release(&uploaded.public_id).await;
            return;
        }
        match self.users.update_resume(user_id, &uploaded).await {
            Ok(()) => info!(user_id = %user_id, public_id = %uploaded.public_id, "attached replacement resume after failed profile write"),
            Err(e) => warn!(
                user_id = %user_id,
                public_id = %uploaded.public_id,
                error = %e,
                "previous resume released but replacement could not be attached"
            ),
        }
    }

    /// Best-effort removal of a blob this flow uploaded but could not attach.
    async fn release(&self, public_id: &str) {
        if let Err(e) = self.resumes.destroy(public_id).await {
            warn!(public_id = %public_id, error = %e, "failed to release orphaned resume");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{Credentials, InMemoryUserRepository};
    use async_trait::async_trait;
    use axum::body::Bytes;
    use std::sync::Mutex;

    /// Records every call; `destroy` fails when `fail_destroy` is set.
    #[derive(Default)]
    struct RecordingStore {
        fail_destroy: bool,
        uploads: Mutex<Vec<String>>,
        destroyed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ResumeStore for RecordingStore {
        async fn upload(&self, file: UploadedFile) -> AppResult<ResumeRef> {
            let mut uploads = self.uploads.lock().unwrap();
            let public_id = format!("resumes/{}-{}", uploads.len(), file.file_name);
            uploads.push(public_id.clone());
            Ok(ResumeRef {
                url: format!("https://files.test/{}", public_id),
                public_id,
            })
        }

        async fn duplicate(&self, public_id: &str) -> AppResult<ResumeRef> {
            let copy_id = format!("{}-copy", public_id);
            Ok(ResumeRef {
                url: format!("https://files.test/{}", copy_id),
                public_id: copy_id,
            })
        }

        async fn destroy(&self, public_id: &str) -> AppResult<()> {
            self.destroyed.lock().unwrap().push(public_id.to_string());
            if self.fail_destroy {
                return Err(AppError::Storage("bucket unavailable".to_string()));
            }
            Ok(())
        }
    }

    /// Delegates to the in-memory repository but rejects every profile write.
    struct RejectingProfileWrites(InMemoryUserRepository);

    #[async_trait]
    impl UserRepository for RejectingProfileWrites {
        async fn create(&self, user: NewUser) -> AppResult<User> {
            self.0.create(user).await
        }

        async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
            self.0.find_by_id(id).await
        }

        async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
            self.0.find_by_email(email).await
        }

        async fn find_credentials_by_email(&self, email: &str) -> AppResult<Option<Credentials>> {
            self.0.find_credentials_by_email(email).await
        }

        async fn find_credentials_by_id(&self, id: Uuid) -> AppResult<Option<Credentials>> {
            self.0.find_credentials_by_id(id).await
        }

        async fn update_profile(&self, _user: &User) -> AppResult<User> {
            Err(AppError::Internal(anyhow::anyhow!("connection reset")))
        }

        async fn update_password(&self, id: Uuid, hash: &HashedPassword) -> AppResult<()> {
            self.0.update_password(id, hash).await
        }

        async fn update_resume(&self, id: Uuid, resume: &ResumeRef) -> AppResult<()> {
            self.0.update_resume(id, resume).await
        }
    }

    fn service(store: Arc<RecordingStore>) -> (AccountService, InMemoryUserRepository) {
        let repo = InMemoryUserRepository::new();
        (AccountService::new(Arc::new(repo.clone()), store), repo)
    }

    fn seeker(email: &str) -> RegisterInput {
        RegisterInput {
            name: Some("Jane Seeker".into()),
            email: Some(email.into()),
            phone: Some("5551234".into()),
            address: Some("1 Main St".into()),
            password: Some("password123".into()),
            role: Some("Job Seeker".into()),
            first_niche: Some("Backend".into()),
            second_niche: Some("DevOps".into()),
            third_niche: Some("Data".into()),
            cover_letter: None,
        }
    }

    fn employer(email: &str) -> RegisterInput {
        RegisterInput {
            role: Some("Employer".into()),
            first_niche: None,
            second_niche: None,
            third_niche: None,
            ..seeker(email)
        }
    }

    fn file(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.into(),
            content_type: Some("application/pdf".into()),
            bytes: Bytes::from_static(b"%PDF"),
        }
    }

    fn login(email: &str, password: &str, role: &str) -> LoginInput {
        LoginInput {
            role: Some(role.into()),
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict_and_keeps_one_record() {
        let (svc, repo) = service(Arc::default());
        svc.register(seeker("jane@example.com"), None).await.unwrap();
        let err = svc
            .register(employer("Jane@Example.com"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn missing_required_field_is_validation_error() {
        let (svc, _) = service(Arc::default());
        let input = RegisterInput {
            phone: None,
            ..seeker("a@example.com")
        };
        assert!(matches!(
            svc.register(input, None).await,
            Err(AppError::Validation(_))
        ));
        let input = RegisterInput {
            address: Some("   ".into()),
            ..seeker("a@example.com")
        };
        assert!(matches!(
            svc.register(input, None).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn job_seeker_needs_three_niches() {
        let (svc, repo) = service(Arc::default());
        let input = RegisterInput {
            third_niche: None,
            ..seeker("a@example.com")
        };
        assert!(matches!(
            svc.register(input, None).await,
            Err(AppError::Validation(_))
        ));
        assert!(repo.is_empty().await);

        let user = svc.register(seeker("a@example.com"), None).await.unwrap();
        let niches = user.profile.niches().unwrap();
        assert_eq!(
            (niches.first(), niches.second(), niches.third()),
            ("Backend", "DevOps", "Data")
        );
    }

    #[tokio::test]
    async fn employer_ignores_niches() {
        let (svc, _) = service(Arc::default());
        let input = RegisterInput {
            first_niche: Some("Backend".into()),
            ..employer("boss@example.com")
        };
        let user = svc.register(input, None).await.unwrap();
        assert_eq!(user.profile, Profile::Employer);
    }

    #[tokio::test]
    async fn invalid_role_or_fields_rejected() {
        let (svc, _) = service(Arc::default());
        let input = RegisterInput {
            role: Some("Admin".into()),
            ..seeker("a@example.com")
        };
        assert!(matches!(svc.register(input, None).await, Err(AppError::Validation(_))));
        let input = RegisterInput {
            email: Some("not-an-email".into()),
            ..seeker("a@example.com")
        };
        assert!(matches!(svc.register(input, None).await, Err(AppError::Validation(_))));
        let input = RegisterInput {
            password: Some("short".into()),
            ..seeker("a@example.com")
        };
        assert!(matches!(svc.register(input, None).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn register_with_resume_stores_reference() {
        let store = Arc::new(RecordingStore::default());
        let (svc, _) = service(store.clone());
        let user = svc
            .register(seeker("a@example.com"), Some(file("cv.pdf")))
            .await
            .unwrap();
        let resume = user.resume.unwrap();
        assert_eq!(resume.public_id, "resumes/0-cv.pdf");
        assert_eq!(store.uploads.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn login_checks_password_and_role() {
        let (svc, _) = service(Arc::default());
        let registered = svc.register(seeker("a@example.com"), None).await.unwrap();

        let err = svc
            .authenticate(login("a@example.com", "password123", "Employer"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Credentials(ref m) if m == INVALID_CREDENTIALS));

        let err = svc
            .authenticate(login("a@example.com", "wrong-password", "Job Seeker"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Credentials(ref m) if m == INVALID_CREDENTIALS));

        let err = svc
            .authenticate(login("nobody@example.com", "password123", "Job Seeker"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Credentials(ref m) if m == INVALID_CREDENTIALS));

        let user = svc
            .authenticate(login("A@example.com", "password123", "Job Seeker"))
            .await
            .unwrap();
        assert_eq!(user, registered);
    }

    #[tokio::test]
    async fn login_requires_all_fields() {
        let (svc, _) = service(Arc::default());
        let input = LoginInput {
            role: None,
            ..login("a@example.com", "password123", "Employer")
        };
        assert!(matches!(svc.authenticate(input).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn wrong_old_password_keeps_hash() {
        let (svc, repo) = service(Arc::default());
        let user = svc.register(seeker("a@example.com"), None).await.unwrap();
        let before = repo.find_credentials_by_id(user.id).await.unwrap().unwrap();

        let err = svc
            .update_password(
                user.id,
                PasswordChange {
                    old_password: Some("not-my-password".into()),
                    new_password: Some("newpassword1".into()),
                    confirm_password: Some("newpassword1".into()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Credentials(_)));

        let after = repo.find_credentials_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(before.password_hash, after.password_hash);
    }

    #[tokio::test]
    async fn mismatched_confirmation_is_validation_error() {
        let (svc, _) = service(Arc::default());
        let user = svc.register(seeker("a@example.com"), None).await.unwrap();
        let err = svc
            .update_password(
                user.id,
                PasswordChange {
                    old_password: Some("password123".into()),
                    new_password: Some("newpassword1".into()),
                    confirm_password: Some("newpassword2".into()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn password_update_replaces_hash() {
        let (svc, _) = service(Arc::default());
        let user = svc.register(seeker("a@example.com"), None).await.unwrap();
        svc.update_password(
            user.id,
            PasswordChange {
                old_password: Some("password123".into()),
                new_password: Some("newpassword1".into()),
                confirm_password: Some("newpassword1".into()),
            },
        )
        .await
        .unwrap();

        assert!(svc
            .authenticate(login("a@example.com", "password123", "Job Seeker"))
            .await
            .is_err());
        assert!(svc
            .authenticate(login("a@example.com", "newpassword1", "Job Seeker"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn profile_update_merges_and_keeps_role() {
        let (svc, _) = service(Arc::default());
        let user = svc.register(seeker("a@example.com"), None).await.unwrap();
        let update = svc
            .update_profile(
                &user,
                ProfileChanges {
                    name: Some("Jane Renamed".into()),
                    second_niche: Some("Security".into()),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(update.user.name, "Jane Renamed");
        assert_eq!(update.user.phone, user.phone);
        assert_eq!(update.user.role(), Role::JobSeeker);
        let niches = update.user.profile.niches().unwrap();
        assert_eq!(niches.first(), "Backend");
        assert_eq!(niches.second(), "Security");
        assert_eq!(update.cleanup, ResumeCleanup::NotNeeded);
    }

    #[tokio::test]
    async fn profile_update_rejects_blank_niche_for_job_seeker() {
        let (svc, _) = service(Arc::default());
        let user = svc.register(seeker("a@example.com"), None).await.unwrap();
        let err = svc
            .update_profile(
                &user,
                ProfileChanges {
                    third_niche: Some("  ".into()),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn profile_update_rejects_taken_email() {
        let (svc, _) = service(Arc::default());
        svc.register(employer("taken@example.com"), None).await.unwrap();
        let user = svc.register(seeker("a@example.com"), None).await.unwrap();
        let err = svc
            .update_profile(
                &user,
                ProfileChanges {
                    email: Some("taken@example.com".into()),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn new_resume_releases_old_one_exactly_once() {
        let store = Arc::new(RecordingStore::default());
        let (svc, _) = service(store.clone());
        let user = svc
            .register(seeker("a@example.com"), Some(file("old.pdf")))
            .await
            .unwrap();
        let old_id = user.resume.clone().unwrap().public_id;

        let update = svc
            .update_profile(&user, ProfileChanges::default(), Some(file("new.pdf")))
            .await
            .unwrap();
        assert_eq!(*store.destroyed.lock().unwrap(), vec![old_id.clone()]);
        assert_eq!(update.cleanup, ResumeCleanup::Released { public_id: old_id });
        assert_eq!(update.user.resume.unwrap().public_id, "resumes/1-new.pdf");
    }

    #[tokio::test]
    async fn failed_release_is_recorded_not_fatal() {
        let store = Arc::new(RecordingStore {
            fail_destroy: true,
            ..Default::default()
        });
        let (svc, _) = service(store.clone());
        let user = svc
            .register(seeker("a@example.com"), Some(file("old.pdf")))
            .await
            .unwrap();
        let old_id = user.resume.clone().unwrap().public_id;

        let update = svc
            .update_profile(&user, ProfileChanges::default(), Some(file("new.pdf")))
            .await
            .unwrap();
        assert_eq!(*store.destroyed.lock().unwrap(), vec![old_id.clone()]);
        assert!(matches!(update.cleanup, ResumeCleanup::Failed { ref public_id, .. } if *public_id == old_id));
        let warning = update.cleanup.warning().unwrap();
        assert!(warning.contains(&old_id));
        assert!(!warning.contains("bucket unavailable"));
        assert_eq!(update.user.resume.unwrap().public_id, "resumes/1-new.pdf");
    }

    #[tokio::test]
    async fn failed_save_after_release_keeps_a_resolvable_resume() {
        let store = Arc::new(RecordingStore::default());
        let repo = InMemoryUserRepository::new();
        let svc = AccountService::new(Arc::new(RejectingProfileWrites(repo.clone())), store.clone());
        let user = svc
            .register(seeker("a@example.com"), Some(file("old.pdf")))
            .await
            .unwrap();
        let old_id = user.resume.clone().unwrap().public_id;

        let err = svc
            .update_profile(&user, ProfileChanges::default(), Some(file("new.pdf")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));

        // Old blob is gone; the stored reference moved to the new one, which was kept.
        assert_eq!(*store.destroyed.lock().unwrap(), vec![old_id]);
        let stored = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.resume.unwrap().public_id, "resumes/1-new.pdf");
        assert_eq!(stored.name, user.name);
    }

    #[tokio::test]
    async fn failed_save_with_old_resume_intact_releases_new_one() {
        let store = Arc::new(RecordingStore {
            fail_destroy: true,
            ..Default::default()
        });
        let repo = InMemoryUserRepository::new();
        let svc = AccountService::new(Arc::new(RejectingProfileWrites(repo.clone())), store.clone());
        let user = svc
            .register(seeker("a@example.com"), Some(file("old.pdf")))
            .await
            .unwrap();
        let old_id = user.resume.clone().unwrap().public_id;

        assert!(svc
            .update_profile(&user, ProfileChanges::default(), Some(file("new.pdf")))
            .await
            .is_err());
        assert_eq!(
            *store.destroyed.lock().unwrap(),
            vec![old_id.clone(), "resumes/1-new.pdf".to_string()]
        );
        let stored = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.resume.unwrap().public_id, old_id);
    }

    #[tokio::test]
    async fn get_user_is_idempotent() {
        let (svc, _) = service(Arc::default());
        let user = svc.register(seeker("a@example.com"), None).await.unwrap();
        let first = svc.find(user.id).await.unwrap();
        let second = svc.find(user.id).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, Some(user));
    }
}
