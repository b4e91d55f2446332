//! Password hashing (argon2). Only `HashedPassword` values reach the store.

use crate::error::{AppError, AppResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::OnceLock;

/// An argon2 PHC string.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    pub fn hash(password: &str) -> AppResult<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("hash: {}", e)))?
            .to_string();
        Ok(Self(hash))
    }

    /// Wrap a hash read back from storage.
    pub fn from_stored(hash: String) -> Self {
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn verify(&self, password: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(&self.0)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("parse hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

impl std::fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HashedPassword(..)")
    }
}

/// Burn one verification when there is no stored hash to compare against,
/// so unknown-email logins cost the same as wrong-password ones.
pub fn verify_dummy(password: &str) {
    static DUMMY: OnceLock<Option<HashedPassword>> = OnceLock::new();
    let dummy = DUMMY.get_or_init(|| HashedPassword::hash("dummy-password-for-timing").ok());
    if let Some(hash) = dummy {
        let _ = hash.verify(password);
    }
}
