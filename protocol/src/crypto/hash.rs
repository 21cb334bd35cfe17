// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Hashing Utilities
//!
//! The Algorand protocol uses exactly one hash function for everything we
//! touch: **SHA-512/256** (SHA-512 with a distinct IV, truncated to 256
//! bits). Transaction ids, group ids and address checksums are all built on
//! it.
//!
//! Protocol hashes are always *domain separated*: a short ASCII tag such as
//! `"TX"` or `"TG"` is hashed in front of the payload so that a digest of
//! one kind of object can never be confused with a digest of another.
//! [`hash_with_prefix`] is the only way callers in this crate should build
//! those digests.

use sha2::{Digest, Sha512_256};

use crate::config::HASH_OUTPUT_LENGTH;

/// Compute the SHA-512/256 hash of the input data.
///
/// # Example
///
/// ```
/// use algowallet_protocol::crypto::sha512_256;
///
/// let hash = sha512_256(b"algorand");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha512_256(data: &[u8]) -> [u8; HASH_OUTPUT_LENGTH] {
    Sha512_256::digest(data).into()
}

/// Hash multiple byte slices together without concatenation overhead.
pub fn sha512_256_multi(parts: &[&[u8]]) -> [u8; HASH_OUTPUT_LENGTH] {
    let mut hasher = Sha512_256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Compute `SHA-512/256(prefix || data)`.
///
/// This is how the protocol derives every identifier: `prefix` is one of
/// the domain tags in [`crate::config`].
pub fn hash_with_prefix(prefix: &[u8], data: &[u8]) -> [u8; HASH_OUTPUT_LENGTH] {
    sha512_256_multi(&[prefix, data])
}
