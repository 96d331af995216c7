use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::AppError;

/// A real hash of a throwaway password. Lookups for unknown emails are verified against
/// it so a failed login costs the same whether or not the account exists.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("metocast-timing-equalizer").ok());

/// Hashes `plain` with Argon2id and a fresh random salt, returning a PHC string.
pub fn hash_password(plain: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

/// A hash that cannot be parsed never verifies.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is not a valid PHC string");
            false
        }
    }
}

/// Burns one verification for a login whose email matched no account.
pub fn verify_against_dummy(plain: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(plain, hash);
    }
}

// Argon2 takes tens of milliseconds per call. The async variants below run it on the
// blocking pool so request handling never stalls a runtime worker.

/// `hash_password` on the blocking pool.
pub async fn hash(plain: &str) -> Result<String, AppError> {
    let plain = plain.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .map_err(|e| AppError::Internal(format!("password hashing task failed: {e}")))?
}

/// `verify_password` on the blocking pool. A task that fails to complete never verifies.
pub async fn verify(plain: &str, hash: &str) -> bool {
    let (plain, hash) = (plain.to_owned(), hash.to_owned());
    tokio::task::spawn_blocking(move || verify_password(&plain, &hash))
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "password verification task failed");
            false
        })
}

/// `verify_against_dummy` on the blocking pool.
pub async fn verify_unknown_account(plain: &str) {
    let plain = plain.to_owned();
    if let Err(e) = tokio::task::spawn_blocking(move || verify_against_dummy(&plain)).await {
        tracing::error!(error = %e, "password verification task failed");
    }
}

