// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Cryptographic Primitives
//!
//! Everything security-related in the core flows through here:
//!
//! - **Ed25519** for signatures: deterministic, which the protocol relies on.
//! - **SHA-512/256** for every protocol digest.
//! - **AES-256-GCM** for local secret storage.
//!
//! Everything here is a thin, type-safe wrapper around audited
//! implementations. We don't roll our own.

pub mod encryption;
pub mod hash;
pub mod keys;
pub mod signatures;

pub use encryption::{decrypt, encrypt, CipherText, EncryptionError, SymmetricKey};
pub use hash::{hash_with_prefix, sha512_256};
pub use keys::{KeyError, SecretKey, Signature};
pub use signatures::{sign_arbitrary_bytes, verify_arbitrary_bytes, SignatureError};
