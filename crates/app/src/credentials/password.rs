//! Password hashing.

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier as _, Version,
    password_hash::SaltString,
};
use rand::{RngCore, rngs::OsRng};
use thiserror::Error;
use tokio::task::{self, JoinError};
use tracing::warn;
use zeroize::Zeroizing;

/// Number of random salt bytes mixed into every hash.
const SALT_BYTES: usize = 16;

#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("invalid password hashing parameters")]
    InvalidParams(#[source] argon2::Error),

    #[error("failed to hash password")]
    Hash(#[source] argon2::password_hash::Error),

    #[error("password hashing task failed")]
    Task(#[source] JoinError),
}

/// Argon2id hasher with a tunable work factor.
///
/// Hashes are emitted as PHC strings, which record the algorithm, version and cost
/// parameters next to the salt. Verification reads those parameters back out of the
/// stored hash, so raising the configured cost never invalidates existing hashes.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::DEFAULT,
        }
    }
}

impl PasswordHasher {
    /// Build a hasher with explicit cost parameters.
    ///
    /// # Errors
    ///
    /// Returns an error when the parameters are outside the ranges Argon2 accepts.
    pub fn new(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, PasswordHashError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(PasswordHashError::InvalidParams)?;

        Ok(Self { params })
    }

    /// Hash a secret with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns an error when the salt cannot be encoded or hashing fails.
    pub fn hash_password(&self, plain: &str) -> Result<String, PasswordHashError> {
        let mut salt_bytes = [0_u8; SALT_BYTES];

        OsRng.fill_bytes(&mut salt_bytes);

        let salt = SaltString::encode_b64(&salt_bytes).map_err(PasswordHashError::Hash)?;

        let hash = self
            .argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(PasswordHashError::Hash)?;

        Ok(hash.to_string())
    }

    /// Check a secret against a stored hash.
    ///
    /// Malformed or foreign hashes verify as `false`; this never errors.
    pub fn verify_password(&self, plain: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }

    /// Whether a stored hash was produced with different cost parameters than this
    /// hasher uses, and should be replaced on the next successful login.
    pub fn needs_rehash(&self, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return true;
        };

        if parsed.algorithm != Algorithm::Argon2id.ident() {
            return true;
        }

        match Params::try_from(&parsed) {
            Ok(stored) => {
                stored.m_cost() != self.params.m_cost()
                    || stored.t_cost() != self.params.t_cost()
                    || stored.p_cost() != self.params.p_cost()
            }
            Err(_unreadable) => true,
        }
    }

    /// Hash on the blocking pool.
    ///
    /// Argon2 is deliberately slow, so async callers go through here rather than
    /// [`Self::hash_password`] to keep the worker threads free for other requests.
    ///
    /// # Errors
    ///
    /// Returns an error when hashing fails or the blocking task is cancelled.
    pub async fn hash(&self, plain: &str) -> Result<String, PasswordHashError> {
        let hasher = self.clone();
        let plain = Zeroizing::new(plain.to_owned());

        task::spawn_blocking(move || hasher.hash_password(plain.as_str()))
            .await
            .map_err(PasswordHashError::Task)?
    }

    /// Check a secret against a stored hash on the blocking pool.
    pub async fn verify(&self, plain: &str, hash: &str) -> bool {
        self.position(plain, vec![hash.to_owned()]).await.is_some()
    }

    /// Index of the first stored hash `plain` verifies against.
    ///
    /// Every candidate is checked inside one blocking task. A failed task counts as no
    /// match.
    pub async fn position(&self, plain: &str, hashes: Vec<String>) -> Option<usize> {
        if hashes.is_empty() {
            return None;
        }

        let hasher = self.clone();
        let plain = Zeroizing::new(plain.to_owned());

        let verified = task::spawn_blocking(move || {
            hashes
                .iter()
                .position(|hash| hasher.verify_password(plain.as_str(), hash))
        })
        .await;

        match verified {
            Ok(found) => found,
            Err(error) => {
                warn!(%error, "password verification task failed");

                None
            }
        }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use testresult::TestResult;

    use super::*;

    fn cheap() -> PasswordHasher {
        PasswordHasher::new(1024, 1, 1).expect("cheap params are valid")
    }

    #[test]
    fn verify_accepts_the_original_password() -> TestResult {
        let hasher = cheap();
        let hash = hasher.hash_password("longenough1")?;

        assert!(hasher.verify_password("longenough1", &hash), "password should verify");

        Ok(())
    }

    #[test]
    fn verify_rejects_other_passwords() -> TestResult {
        let hasher = cheap();
        let hash = hasher.hash_password("longenough1")?;

        assert!(!hasher.verify_password("longenough2", &hash), "wrong password");
        assert!(!hasher.verify_password("", &hash), "empty password");

        Ok(())
    }

    #[test]
    fn verify_returns_false_for_malformed_hash() {
        let hasher = cheap();

        assert!(!hasher.verify_password("anything", "not-a-hash"), "garbage hash");
        assert!(!hasher.verify_password("anything", ""), "empty hash");
        assert!(
            !hasher.verify_password("anything", "$2b$12$abcdefghijklmnopqrstuv"),
            "bcrypt-style hash"
        );
    }

    #[test]
    fn hashes_are_salted() -> TestResult {
        let hasher = cheap();

        let first = hasher.hash_password("same-password")?;
        let second = hasher.hash_password("same-password")?;

        assert_ne!(first, second, "two hashes of one password must differ");

        Ok(())
    }

    #[test]
    fn verify_detects_cost_from_the_stored_hash() -> TestResult {
        let old = cheap();
        let hash = old.hash_password("longenough1")?;

        let stronger = PasswordHasher::new(2048, 2, 1)?;

        assert!(
            stronger.verify_password("longenough1", &hash),
            "changing the configured cost must not invalidate stored hashes"
        );

        Ok(())
    }

    #[test]
    fn needs_rehash_tracks_parameter_changes() -> TestResult {
        let old = cheap();
        let hash = old.hash_password("longenough1")?;

        assert!(!old.needs_rehash(&hash), "same params");
        assert!(PasswordHasher::new(2048, 1, 1)?.needs_rehash(&hash), "memory changed");
        assert!(old.needs_rehash("garbage"), "unreadable hash");

        Ok(())
    }

    #[tokio::test]
    async fn async_verify_matches_sync_verify() -> TestResult {
        let hasher = cheap();
        let hash = hasher.hash("longenough1").await?;

        assert!(hasher.verify("longenough1", &hash).await, "password should verify");
        assert!(!hasher.verify("longenough2", &hash).await, "wrong password");

        Ok(())
    }

    #[tokio::test]
    async fn position_finds_the_matching_candidate() -> TestResult {
        let hasher = cheap();
        let candidates = vec![
            hasher.hash("first-secret").await?,
            hasher.hash("second-secret").await?,
        ];

        assert_eq!(hasher.position("second-secret", candidates.clone()).await, Some(1));
        assert_eq!(hasher.position("third-secret", candidates).await, None);
        assert_eq!(hasher.position("anything", Vec::new()).await, None);

        Ok(())
    }

    #[tokio::test(flavor = "current_thread")]
    async fn hashing_does_not_stall_other_tasks() -> TestResult {
        let hasher = PasswordHasher::default();

        let timer = tokio::spawn(async {
            tokio::time::sleep(Duration::from_millis(1)).await;

            Instant::now()
        });

        let hash = hasher.hash("longenough1").await?;
        let verified = hasher
            .position("longenough1", vec![hash.clone(), hash.clone(), hash.clone(), hash])
            .await;
        let finished = Instant::now();

        let woke = timer.await?;

        assert_eq!(verified, Some(0), "first candidate matches");
        assert!(
            woke < finished,
            "a 1ms timer on the same single-threaded runtime must fire while hashing runs"
        );

        Ok(())
    }
}
