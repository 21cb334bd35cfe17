// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # AES-256-GCM Encryption
//!
//! Authenticated encryption for secrets the wallet keeps on the device
//! (exported key material, backup blobs). This sits next to signing because
//! it handles the same trust boundary, not because anything consensus
//! critical depends on it.
//!
//! ## Nonce management
//!
//! GCM is unforgiving about nonce reuse: two messages under the same key and
//! nonce leak the XOR of the plaintexts and allow tag forgery. Every call to
//! [`encrypt`] draws a fresh 96-bit nonce from `OsRng`.
//!
//! ## Wire format
//!
//! ```text
//! nonce (12) || ciphertext (n) || tag (16)
//! ```
//!
//! [`decrypt`] never returns partial plaintext: it is either the complete,
//! authenticated payload or an error.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Key, Nonce,
};
use rand::RngCore;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::{AES_KEY_LENGTH, AES_NONCE_LENGTH, AES_TAG_LENGTH};

/// Errors that can occur during encryption/decryption.
///
/// The difference between "wrong key" and "corrupted ciphertext" is none of
/// an attacker's business, so both surface as `DecryptionFailed`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncryptionError {
    #[error("encryption failed")]
    EncryptionFailed,

    #[error("decryption failed -- wrong key or corrupted ciphertext")]
    DecryptionFailed,

    #[error("invalid key length: expected {AES_KEY_LENGTH} bytes, got {got}")]
    InvalidKeyLength { got: usize },

    #[error("ciphertext too short: need at least {} bytes, got {got}", AES_NONCE_LENGTH + AES_TAG_LENGTH)]
    CiphertextTooShort { got: usize },
}

/// A 256-bit symmetric key. Wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; AES_KEY_LENGTH]);

impl SymmetricKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; AES_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Generate a random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; AES_KEY_LENGTH];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Length-checked construction for keys that come from storage.
    pub fn from_slice(slice: &[u8]) -> Result<Self, EncryptionError> {
        let bytes: [u8; AES_KEY_LENGTH] = slice
            .try_into()
            .map_err(|_| EncryptionError::InvalidKeyLength { got: slice.len() })?;
        Ok(Self(bytes))
    }

    /// The AES round keys inside the returned cipher are wiped when it
    /// drops. The key is borrowed in place rather than copied.
    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.0))
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey(<redacted>)")
    }
}

/// Sealed output of [`encrypt`]: `nonce || ciphertext || tag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherText(Vec<u8>);

impl CipherText {
    /// Wrap bytes read back from storage. Validity is checked on decrypt.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Encrypt `payload` under `key` with a random nonce.
///
/// # Example
///
/// ```
/// use algowallet_protocol::crypto::{decrypt, encrypt, SymmetricKey};
///
/// let key = SymmetricKey::generate();
/// let sealed = encrypt(b"25-word mnemonic", &key).unwrap();
/// assert_eq!(decrypt(&sealed, &key).unwrap(), b"25-word mnemonic");
/// ```
pub fn encrypt(payload: &[u8], key: &SymmetricKey) -> Result<CipherText, EncryptionError> {
    encrypt_with_aad(payload, b"", key)
}

/// Decrypt data previously sealed with [`encrypt`].
pub fn decrypt(data: &CipherText, key: &SymmetricKey) -> Result<Vec<u8>, EncryptionError> {
    decrypt_with_aad(data, b"", key)
}

/// Encrypt with Additional Authenticated Data.
///
/// The AAD is authenticated but not encrypted, and must be supplied again,
/// byte for byte, at decryption time.
pub fn encrypt_with_aad(
    payload: &[u8],
    aad: &[u8],
    key: &SymmetricKey,
) -> Result<CipherText, EncryptionError> {
    let mut nonce_bytes = [0u8; AES_NONCE_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = key
        .cipher()
        .encrypt(nonce, Payload { msg: payload, aad })
        .map_err(|_| EncryptionError::EncryptionFailed)?;

    let mut out = Vec::with_capacity(AES_NONCE_LENGTH + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(CipherText(out))
}

/// Decrypt data sealed with [`encrypt_with_aad`].
pub fn decrypt_with_aad(
    data: &CipherText,
    aad: &[u8],
    key: &SymmetricKey,
) -> Result<Vec<u8>, EncryptionError> {
    let bytes = data.as_bytes();
    if bytes.len() < AES_NONCE_LENGTH + AES_TAG_LENGTH {
        return Err(EncryptionError::CiphertextTooShort { got: bytes.len() });
    }

    let (nonce_bytes, ciphertext) = bytes.split_at(AES_NONCE_LENGTH);
    key.cipher()
        .decrypt(
            Nonce::from_slice(nonce_bytes),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| EncryptionError::DecryptionFailed)
}
