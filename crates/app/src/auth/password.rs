//! Admin password hashing with bcrypt.
//!
//! Hashing runs on the blocking pool so a login never stalls the runtime.

use bcrypt::BcryptError;
use thiserror::Error;
use tokio::task::{JoinError, spawn_blocking};
use zeroize::Zeroizing;

const COST: u32 = 10;

/// Well-formed hash checked when a username does not exist, so unknown users
/// take as long to reject as wrong passwords.
pub(crate) const UNKNOWN_USER_HASH: &str =
    "$2a$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy";

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password")]
    Hash(#[from] BcryptError),

    #[error("password hashing task failed")]
    Task(#[from] JoinError),
}

/// Hash a password with a fresh salt.
///
/// # Errors
///
/// Returns [`PasswordError`] when bcrypt rejects the input or the blocking task
/// is cancelled.
pub async fn hash_password(password: &str) -> Result<String, PasswordError> {
    let password = Zeroizing::new(password.to_owned());

    Ok(spawn_blocking(move || bcrypt::hash(password.as_bytes(), COST)).await??)
}

/// Check a password against a stored hash. Malformed hashes never match.
///
/// # Errors
///
/// Returns [`PasswordError::Task`] when the blocking task is cancelled.
pub async fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let password = Zeroizing::new(password.to_owned());
    let stored = stored.to_owned();

    let verified = spawn_blocking(move || bcrypt::verify(password.as_bytes(), &stored)).await?;

    Ok(verified.unwrap_or(false))
}
