//! Password hashing and the bootstrap administrator.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::{
    config::AdminBootstrap,
    models::NewMentee,
    repository::{Repository, RepositoryError},
};

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns an error message if the hasher rejects its parameters.
pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| e.to_string())
}

/// Verify a password against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// ensure_admin
///
/// Creates the configured administrator unless a mentee with that username
/// already exists. Existing accounts are left untouched.
///
/// # Errors
///
/// Returns the store error if the lookup or insert fails.
pub async fn ensure_admin(
    repo: &dyn Repository,
    bootstrap: &AdminBootstrap,
) -> Result<bool, RepositoryError> {
    if repo.find_credentials(&bootstrap.username).await?.is_some() {
        return Ok(false);
    }

    let password_hash =
        hash_password(&bootstrap.password).map_err(RepositoryError::Unavailable)?;
    match repo
        .create_mentee(NewMentee {
            username: bootstrap.username.clone(),
            password_hash,
            is_admin: true,
        })
        .await
    {
        Ok(_) => Ok(true),
        // Another instance created it first.
        Err(RepositoryError::Conflict(_)) => Ok(false),
        Err(e) => Err(e),
    }
}
