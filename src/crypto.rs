//! AES-256-GCM encryption for provider credentials at rest.
//!
//! Settings rows store secret values as `iv:tag:data`, each part
//! standalone base64. The key is supplied as 64 hex characters via
//! configuration and never persisted.

use aes_gcm::{aead::Aead, Aes256Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

const KEY_LENGTH: usize = 32;
const NONCE_LENGTH: usize = 12;
const TAG_LENGTH: usize = 16;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
    #[error("malformed ciphertext: expected iv:tag:data")]
    MalformedCiphertext,
    #[error("encryption failure")]
    EncryptFailure,
    #[error("decryption failure")]
    DecryptFailure,
    #[error("base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),
    #[error("key is not valid hex")]
    InvalidHexKey,
}

impl From<CryptoError> for crate::errors::ServiceError {
    fn from(err: CryptoError) -> Self {
        crate::errors::ServiceError::CryptoError(err.to_string())
    }
}

/// The application secret key used to encrypt stored provider credentials.
#[derive(Clone)]
pub struct SecretKey([u8; KEY_LENGTH]);

impl SecretKey {
    /// Construct from a 64-character hex string.
    pub fn from_hex(value: &str) -> Result<Self, CryptoError> {
        let decoded = hex::decode(value.trim()).map_err(|_| CryptoError::InvalidHexKey)?;
        Self::from_bytes(decoded)
    }

    pub fn from_bytes<B: AsRef<[u8]>>(bytes: B) -> Result<Self, CryptoError> {
        let slice = bytes.as_ref();
        if slice.len() != KEY_LENGTH {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_LENGTH,
                actual: slice.len(),
            });
        }
        let mut array = [0u8; KEY_LENGTH];
        array.copy_from_slice(slice);
        Ok(Self(array))
    }

    /// Encrypt a secret value for storage, producing `iv:tag:data`.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let cipher = Aes256Gcm::new_from_slice(&self.0).map_err(|_| {
            CryptoError::InvalidKeyLength {
                expected: KEY_LENGTH,
                actual: self.0.len(),
            }
        })?;
        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        // aes-gcm appends the tag to the ciphertext; split it back out
        // to match the stored iv:tag:data layout.
        let mut sealed = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::EncryptFailure)?;
        if sealed.len() < TAG_LENGTH {
            return Err(CryptoError::EncryptFailure);
        }
        let tag = sealed.split_off(sealed.len() - TAG_LENGTH);

        Ok(format!(
            "{}:{}:{}",
            BASE64_STANDARD.encode(nonce_bytes),
            BASE64_STANDARD.encode(tag),
            BASE64_STANDARD.encode(sealed)
        ))
    }

    /// Decrypt a stored `iv:tag:data` value.
    pub fn decrypt(&self, stored: &str) -> Result<String, CryptoError> {
        let mut parts = stored.splitn(3, ':');
        let (iv_b64, tag_b64, data_b64) = match (parts.next(), parts.next(), parts.next()) {
            (Some(iv), Some(tag), Some(data)) => (iv, tag, data),
            _ => return Err(CryptoError::MalformedCiphertext),
        };

        let nonce_bytes = BASE64_STANDARD.decode(iv_b64)?;
        let tag = BASE64_STANDARD.decode(tag_b64)?;
        let data = BASE64_STANDARD.decode(data_b64)?;
        if nonce_bytes.len() != NONCE_LENGTH || tag.len() != TAG_LENGTH {
            return Err(CryptoError::MalformedCiphertext);
        }

        let cipher = Aes256Gcm::new_from_slice(&self.0).map_err(|_| {
            CryptoError::InvalidKeyLength {
                expected: KEY_LENGTH,
                actual: self.0.len(),
            }
        })?;
        let mut sealed = data;
        sealed.extend_from_slice(&tag);

        let plaintext = cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), sealed.as_ref())
            .map_err(|_| CryptoError::DecryptFailure)?;
        String::from_utf8(plaintext).map_err(|_| CryptoError::DecryptFailure)
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretKey")
            .field("bytes", &"***redacted***")
            .finish()
    }
}

/// Stable fingerprint over a credential set, used to key the
/// provider-client cache so rotated credentials never hit a stale client.
pub fn credential_fingerprint(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> SecretKey {
        SecretKey::from_bytes([7u8; KEY_LENGTH]).expect("key")
    }

    #[test]
    fn round_trip() {
        let key = test_key();
        let stored = key.encrypt("sk_live_abc123").expect("encrypt");
        assert_eq!(stored.matches(':').count(), 2);
        let plain = key.decrypt(&stored).expect("decrypt");
        assert_eq!(plain, "sk_live_abc123");
    }

    #[test]
    fn hex_key_parsing() {
        let hex_key = "00".repeat(KEY_LENGTH);
        let key = SecretKey::from_hex(&hex_key).expect("parse");
        let stored = key.encrypt("secret").expect("encrypt");
        assert_eq!(key.decrypt(&stored).expect("decrypt"), "secret");

        assert!(SecretKey::from_hex("beef").is_err());
        assert!(SecretKey::from_hex("zz".repeat(KEY_LENGTH).as_str()).is_err());
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let key = test_key();
        let stored = key.encrypt("secret").expect("encrypt");
        let mut parts: Vec<String> = stored.split(':').map(String::from).collect();
        parts[2] = BASE64_STANDARD.encode(b"tampered-payload");
        assert!(matches!(
            key.decrypt(&parts.join(":")),
            Err(CryptoError::DecryptFailure)
        ));
    }

    #[test]
    fn malformed_layout_is_rejected() {
        let key = test_key();
        assert!(matches!(
            key.decrypt("not-three-parts"),
            Err(CryptoError::MalformedCiphertext)
        ));
        assert!(matches!(
            key.decrypt("a:b"),
            Err(CryptoError::MalformedCiphertext)
        ));
    }

    #[test]
    fn fingerprint_is_stable_and_order_sensitive() {
        let a = credential_fingerprint(&["client", "secret"]);
        let b = credential_fingerprint(&["client", "secret"]);
        let c = credential_fingerprint(&["secret", "client"]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
