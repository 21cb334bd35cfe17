// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Digital Signatures
//!
//! Domain-separated Ed25519 signing and verification.
//!
//! Nothing in this crate signs raw bytes. Every signature covers
//! `prefix || payload`, where the prefix names what is being signed:
//!
//! - `"TX"` — an encoded transaction (see [`crate::transaction::signing`]).
//! - `"MX"` — an arbitrary message handed to the wallet by a dApp.
//!
//! Because the prefixes differ, a signature a user gives to "sign this
//! message" can never authorize a transaction, even if the message bytes
//! happen to be a valid encoded transaction.
//!
//! ## Strictness
//!
//! Verification uses `verify_strict`, which rejects small-order public keys
//! and malleable signature encodings.

use ed25519_dalek::{Signature as DalekSignature, VerifyingKey};
use thiserror::Error;

use super::keys::{SecretKey, Signature};
use crate::config::{ARBITRARY_BYTES_DOMAIN_PREFIX, VERIFYING_KEY_LENGTH};
use crate::identity::Address;

/// Errors during signature verification.
///
/// Intentionally vague: we don't tell attackers why verification failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature verification failed")]
    VerificationFailed,

    #[error("invalid public key")]
    InvalidPublicKey,
}

fn prefixed(prefix: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(prefix.len() + payload.len());
    message.extend_from_slice(prefix);
    message.extend_from_slice(payload);
    message
}

/// Sign `prefix || payload`.
pub fn sign_with_prefix(key: &SecretKey, prefix: &[u8], payload: &[u8]) -> Signature {
    key.sign_raw(&prefixed(prefix, payload))
}

/// Verify a signature over `prefix || payload` against a raw public key.
pub fn verify_with_prefix(
    public_key: &[u8; VERIFYING_KEY_LENGTH],
    prefix: &[u8],
    payload: &[u8],
    signature: &Signature,
) -> Result<(), SignatureError> {
    let verifying_key =
        VerifyingKey::from_bytes(public_key).map_err(|_| SignatureError::InvalidPublicKey)?;
    let signature = DalekSignature::from_bytes(signature.as_bytes());

    verifying_key
        .verify_strict(&prefixed(prefix, payload), &signature)
        .map_err(|_| SignatureError::VerificationFailed)
}

/// Sign an arbitrary (non-transaction) payload.
///
/// # Example
///
/// ```
/// use algowallet_protocol::crypto::{SecretKey, sign_arbitrary_bytes, verify_arbitrary_bytes};
///
/// let key = SecretKey::generate();
/// let sig = sign_arbitrary_bytes(b"log in to example.com", &key);
/// assert!(verify_arbitrary_bytes(&key.address(), b"log in to example.com", &sig).is_ok());
/// ```
pub fn sign_arbitrary_bytes(payload: &[u8], key: &SecretKey) -> Signature {
    sign_with_prefix(key, ARBITRARY_BYTES_DOMAIN_PREFIX, payload)
}

/// Verify a signature produced by [`sign_arbitrary_bytes`].
pub fn verify_arbitrary_bytes(
    signer: &Address,
    payload: &[u8],
    signature: &Signature,
) -> Result<(), SignatureError> {
    verify_with_prefix(
        signer.as_bytes(),
        ARBITRARY_BYTES_DOMAIN_PREFIX,
        payload,
        signature,
    )
}
