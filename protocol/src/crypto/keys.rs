// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Key Management
//!
//! Ed25519 secret keys and detached signatures.
//!
//! Algorand hands private keys around in two shapes: the bare 32-byte seed,
//! and the 64-byte `seed || public_key` layout its SDKs export. Both are
//! accepted by [`SecretKey::from_bytes`]; the 64-byte form has its public
//! half checked against the seed so a corrupted export cannot silently sign
//! for the wrong account.
//!
//! ## Security considerations
//!
//! - The signing key is zeroized on drop (ed25519-dalek's `SigningKey`
//!   implements `ZeroizeOnDrop`). Intermediate copies made while parsing
//!   live in [`Zeroizing`] buffers so error paths wipe them too.
//! - Key bytes are never logged, and `Debug` only prints the address.

use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::config::{EXPANDED_SECRET_KEY_LENGTH, SIGNATURE_LENGTH, SIGNING_KEY_LENGTH};
use crate::identity::Address;

/// Errors that can occur while loading key material.
///
/// Intentionally vague about *why* a key was rejected beyond its length.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid secret key length: expected {SIGNING_KEY_LENGTH} or {EXPANDED_SECRET_KEY_LENGTH} bytes, got {got}")]
    InvalidLength { got: usize },

    #[error("keypair validation failed: public key does not match secret key")]
    KeypairMismatch,

    #[error("invalid signature length: expected {SIGNATURE_LENGTH} bytes, got {got}")]
    InvalidSignatureLength { got: usize },
}

/// An Ed25519 secret key able to authorize transactions.
///
/// `SecretKey` intentionally does NOT implement `Serialize`. Exporting
/// secret material should be a deliberate call to
/// [`to_expanded_bytes`](Self::to_expanded_bytes), never a side effect of
/// dumping a struct.
pub struct SecretKey {
    signing_key: SigningKey,
}

impl SecretKey {
    /// Generate a fresh key using the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Construct a key deterministically from a 32-byte seed.
    pub fn from_seed(seed: &[u8; SIGNING_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Parse raw key bytes: either a 32-byte seed or the 64-byte
    /// `seed || public_key` layout.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        match bytes.len() {
            SIGNING_KEY_LENGTH => {
                let mut seed = Zeroizing::new([0u8; SIGNING_KEY_LENGTH]);
                seed.copy_from_slice(bytes);
                Ok(Self::from_seed(&seed))
            }
            EXPANDED_SECRET_KEY_LENGTH => {
                let mut expanded = Zeroizing::new([0u8; EXPANDED_SECRET_KEY_LENGTH]);
                expanded.copy_from_slice(bytes);
                let signing_key = SigningKey::from_keypair_bytes(&expanded)
                    .map_err(|_| KeyError::KeypairMismatch)?;
                Ok(Self { signing_key })
            }
            got => Err(KeyError::InvalidLength { got }),
        }
    }

    /// The raw 32-byte Ed25519 public key.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// The account address this key signs for by default.
    pub fn address(&self) -> Address {
        Address::from_public_key(self.public_key_bytes())
    }

    /// Export the 64-byte `seed || public_key` form.
    ///
    /// **Handle with extreme care.** The buffer wipes itself when dropped.
    pub fn to_expanded_bytes(&self) -> Zeroizing<[u8; EXPANDED_SECRET_KEY_LENGTH]> {
        Zeroizing::new(self.signing_key.to_keypair_bytes())
    }

    /// Sign a message as-is. Callers in this crate always prepend a domain
    /// prefix first; see [`crate::crypto::signatures`].
    pub(crate) fn sign_raw(&self, message: &[u8]) -> Signature {
        Signature::from_bytes(self.signing_key.sign(message).to_bytes())
    }
}

impl Clone for SecretKey {
    /// Every copy of a private key is another thing to protect.
    fn clone(&self) -> Self {
        let seed = Zeroizing::new(self.signing_key.to_bytes());
        Self::from_seed(&seed)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(addr={})", self.address())
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A detached 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    bytes: [u8; SIGNATURE_LENGTH],
}

impl Signature {
    /// Create a signature from its raw representation.
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Try to create a signature from a byte slice of unknown length.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; SIGNATURE_LENGTH] = slice
            .try_into()
            .map_err(|_| KeyError::InvalidSignatureLength { got: slice.len() })?;
        Ok(Self { bytes })
    }

    /// Returns the raw signature bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.bytes
    }

    /// Hex-encoded representation. 128 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        write!(f, "Signature({}...{})", &hex_str[..8], &hex_str[120..])
    }
}
