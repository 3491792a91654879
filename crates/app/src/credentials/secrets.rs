//! At-rest encryption for third-party secrets.

use std::fmt;

use aes_gcm::{Aes256Gcm, KeyInit, Nonce, aead::Aead};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::Zeroize;

const KEY_BYTES: usize = 32;
const NONCE_BYTES: usize = 12;
const TAG_BYTES: usize = 16;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret ciphertext is malformed")]
    Malformed,

    #[error("failed to encrypt secret")]
    Encrypt,

    #[error("failed to decrypt secret")]
    Decrypt,
}

/// AES-256-GCM box keyed from the deployment master secret.
///
/// The key is the SHA-256 digest of the master secret, so no separate key store is
/// needed. Rotating the key means rotating the master secret.
#[derive(Clone)]
pub struct SecretBox {
    key: [u8; KEY_BYTES],
}

impl fmt::Debug for SecretBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBox(**redacted**)")
    }
}

impl Drop for SecretBox {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl SecretBox {
    #[must_use]
    pub fn from_master_secret(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let mut key = [0_u8; KEY_BYTES];

        key.copy_from_slice(&digest);

        Self { key }
    }

    /// Encrypt a secret to `base64(nonce || ciphertext)`.
    ///
    /// # Errors
    ///
    /// Returns an error when the cipher rejects the input.
    pub fn encrypt_secret(&self, plain: &str) -> Result<String, SecretError> {
        let cipher = self.cipher()?;

        let mut nonce = [0_u8; NONCE_BYTES];

        OsRng.fill_bytes(&mut nonce);

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plain.as_bytes())
            .map_err(|_aead| SecretError::Encrypt)?;

        let mut sealed = Vec::with_capacity(NONCE_BYTES + ciphertext.len());

        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);

        Ok(STANDARD.encode(sealed))
    }

    /// Reverse [`SecretBox::encrypt_secret`].
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::Malformed`] for input that was never produced by this
    /// box, and [`SecretError::Decrypt`] when authentication fails.
    pub fn decrypt_secret(&self, sealed: &str) -> Result<String, SecretError> {
        let bytes = STANDARD
            .decode(sealed)
            .map_err(|_decode| SecretError::Malformed)?;

        if bytes.len() < NONCE_BYTES + TAG_BYTES {
            return Err(SecretError::Malformed);
        }

        let (nonce, ciphertext) = bytes.split_at(NONCE_BYTES);

        let plain = self
            .cipher()?
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_aead| SecretError::Decrypt)?;

        String::from_utf8(plain).map_err(|_utf8| SecretError::Malformed)
    }

    fn cipher(&self) -> Result<Aes256Gcm, SecretError> {
        Aes256Gcm::new_from_slice(&self.key).map_err(|_length| SecretError::Encrypt)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn decrypt_recovers_plaintext() -> TestResult {
        let secrets = SecretBox::from_master_secret("master");
        let sealed = secrets.encrypt_secret("ya29.provider-access-token")?;

        assert_ne!(sealed, "ya29.provider-access-token");
        assert_eq!(secrets.decrypt_secret(&sealed)?, "ya29.provider-access-token");

        Ok(())
    }

    #[test]
    fn same_master_secret_derives_same_key() -> TestResult {
        let sealed = SecretBox::from_master_secret("master").encrypt_secret("value")?;

        assert_eq!(
            SecretBox::from_master_secret("master").decrypt_secret(&sealed)?,
            "value"
        );

        Ok(())
    }

    #[test]
    fn other_master_secret_cannot_decrypt() -> TestResult {
        let sealed = SecretBox::from_master_secret("master").encrypt_secret("value")?;

        let result = SecretBox::from_master_secret("rotated").decrypt_secret(&sealed);

        assert!(
            matches!(result, Err(SecretError::Decrypt)),
            "expected Decrypt, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn truncated_input_is_malformed() {
        let secrets = SecretBox::from_master_secret("master");

        assert!(
            matches!(secrets.decrypt_secret("AAAA"), Err(SecretError::Malformed)),
            "short input"
        );
        assert!(
            matches!(secrets.decrypt_secret("%%%"), Err(SecretError::Malformed)),
            "bad base64"
        );
    }

    #[test]
    fn nonces_are_fresh() -> TestResult {
        let secrets = SecretBox::from_master_secret("master");

        assert_ne!(secrets.encrypt_secret("value")?, secrets.encrypt_secret("value")?);

        Ok(())
    }
}
