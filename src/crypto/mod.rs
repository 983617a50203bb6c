//! AES-256-GCM cipher backing encrypted text columns.
//!
//! Encrypted columns are stored as base64 text: a random 12-byte nonce
//! followed by the sealed payload and its tag. The row mapper decrypts them on
//! read and the converter contract encrypts them on bind.
//!
//! # Example
//!
//! ```rust
//! use querymap::crypto::TextCipher;
//!
//! let cipher = TextCipher::generate();
//! let stored = cipher.encrypt_text("4111-1111").expect("encryption failed");
//! assert_eq!(cipher.decrypt_text(&stored).expect("decryption failed"), "4111-1111");
//! ```

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use thiserror::Error;

/// The length of an AES-256 key in bytes.
pub const KEY_LENGTH: usize = 32;

pub type CryptoResult<T> = Result<T, CryptoError>;

/// Cipher failures.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Encryption operation failed.
    #[error("encryption failed")]
    EncryptionFailed,

    /// Decryption operation failed.
    #[error("decryption failed")]
    DecryptionFailed,

    /// The provided key has an invalid length (must be 32 bytes).
    #[error("invalid key length: expected {KEY_LENGTH} bytes")]
    InvalidKeyLength,

    /// The ciphertext is malformed or too short.
    #[error("invalid ciphertext")]
    InvalidCiphertext,
}

/// Symmetric cipher for text columns.
#[derive(Clone)]
pub struct TextCipher {
    key: [u8; KEY_LENGTH],
}

impl fmt::Debug for TextCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextCipher").finish_non_exhaustive()
    }
}

impl TextCipher {
    pub fn new(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Build a cipher from a base64-encoded key, as found in configuration.
    pub fn from_encoded_key(encoded: &str) -> CryptoResult<Self> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|_| CryptoError::InvalidKeyLength)?;
        let key: [u8; KEY_LENGTH] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength)?;
        Ok(Self::new(key))
    }

    /// Build a cipher around a freshly generated random key.
    ///
    /// # Panics
    ///
    /// Panics if the system's random number generator fails.
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_LENGTH];
        SystemRandom::new()
            .fill(&mut key)
            .expect("failed to generate random key");
        Self::new(key)
    }

    pub fn encoded_key(&self) -> String {
        BASE64.encode(self.key)
    }

    /// Seal `plaintext` and return `base64(nonce || sealed || tag)`.
    pub fn encrypt_text(&self, plaintext: &str) -> CryptoResult<String> {
        let mut nonce = [0u8; NONCE_LEN];
        SystemRandom::new()
            .fill(&mut nonce)
            .map_err(|_| CryptoError::EncryptionFailed)?;

        let mut sealed = plaintext.as_bytes().to_vec();
        self.aead_key(CryptoError::EncryptionFailed)?
            .seal_in_place_append_tag(Nonce::assume_unique_for_key(nonce), Aad::empty(), &mut sealed)
            .map_err(|_| CryptoError::EncryptionFailed)?;

        let mut stored = nonce.to_vec();
        stored.append(&mut sealed);
        Ok(BASE64.encode(stored))
    }

    /// Open a value produced by [`encrypt_text`](Self::encrypt_text).
    ///
    /// Malformed input yields `InvalidCiphertext`; a wrong key or tampered
    /// payload yields `DecryptionFailed`.
    pub fn decrypt_text(&self, stored: &str) -> CryptoResult<String> {
        let data = BASE64
            .decode(stored)
            .map_err(|_| CryptoError::InvalidCiphertext)?;
        let Some((nonce, payload)) = data.split_first_chunk::<NONCE_LEN>() else {
            return Err(CryptoError::InvalidCiphertext);
        };
        if payload.is_empty() {
            return Err(CryptoError::InvalidCiphertext);
        }

        let mut in_out = payload.to_vec();
        let opened = self
            .aead_key(CryptoError::DecryptionFailed)?
            .open_in_place(Nonce::assume_unique_for_key(*nonce), Aad::empty(), &mut in_out)
            .map_err(|_| CryptoError::DecryptionFailed)?;

        String::from_utf8(opened.to_vec()).map_err(|_| CryptoError::DecryptionFailed)
    }

    fn aead_key(&self, on_error: CryptoError) -> CryptoResult<LessSafeKey> {
        UnboundKey::new(&AES_256_GCM, &self.key)
            .map(LessSafeKey::new)
            .map_err(|_| on_error)
    }
}
