use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use anyhow::Context;
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

lazy_static! {
    /// Hash checked against when the account does not exist, so a login for an
    /// unknown user costs the same as one with a wrong password.
    static ref DUMMY_HASH: Option<String> = hash_password("mtaa-dummy-password").ok();
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Constant-time check of `plain` against a stored PHC string. Fails closed:
/// an unparseable digest or any verifier error is a mismatch.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "argon2 parse hash error");
            return false;
        }
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

/// Burns one verification against [`DUMMY_HASH`]. The result is always false.
pub fn verify_dummy(plain: &str) -> bool {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(plain, hash);
    }
    false
}

/// [`hash_password`] on the blocking pool, so the async workers keep serving
/// requests while Argon2 runs.
pub async fn hash_password_blocking(plain: &str) -> anyhow::Result<String> {
    let plain = plain.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .context("password hashing task failed")?
}

/// Verifies `plain` against `stored` on the blocking pool. With no stored
/// hash it burns a dummy verification and returns false.
pub async fn verify_credentials(plain: &str, stored: Option<&str>) -> bool {
    let plain = plain.to_owned();
    let stored = stored.map(str::to_owned);
    tokio::task::spawn_blocking(move || match stored {
        Some(hash) => verify_password(&plain, &hash),
        None => verify_dummy(&plain),
    })
    .await
    .unwrap_or_else(|e| {
        error!(error = %e, "password verification task failed");
        false
    })
}
