// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Protocol Configuration & Constants
//!
//! Every magic number the transaction core depends on lives here. These are
//! consensus values of the Algorand network: change one and the network
//! starts rejecting what we build, so they only move when the protocol does.
//!
//! The one piece of *tunable* configuration is [`BuilderConfig`], which
//! controls builder policy (validity window length, genesis id inclusion,
//! fee overrides). Network state itself is never configured here, it arrives
//! per call as [`TransactionParams`](crate::transaction::TransactionParams).

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Domain separation prefixes
// ---------------------------------------------------------------------------

/// Prefix hashed/signed in front of every encoded transaction.
pub const TX_DOMAIN_PREFIX: &[u8] = b"TX";

/// Prefix hashed in front of the encoded transaction-group digest list.
pub const TX_GROUP_DOMAIN_PREFIX: &[u8] = b"TG";

/// Prefix signed in front of arbitrary (non-transaction) payloads. Keeps a
/// signed message from ever being a valid transaction signature.
pub const ARBITRARY_BYTES_DOMAIN_PREFIX: &[u8] = b"MX";

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Ed25519 seed length in bytes.
pub const SIGNING_KEY_LENGTH: usize = 32;

/// Algorand's native private key layout: `seed || public_key`.
pub const EXPANDED_SECRET_KEY_LENGTH: usize = 64;

/// Public (verifying) key length in bytes. Also the raw address length.
pub const VERIFYING_KEY_LENGTH: usize = 32;

/// Ed25519 signature length. Always 64 bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// SHA-512/256 digest length. Used for transaction ids, group ids and
/// address checksums.
pub const HASH_OUTPUT_LENGTH: usize = 32;

/// Number of trailing digest bytes appended to a public key as its checksum.
pub const ADDRESS_CHECKSUM_LENGTH: usize = 4;

/// Length of a canonical base32 address string (36 bytes, unpadded).
pub const ADDRESS_STRING_LENGTH: usize = 58;

/// Length of a base32 transaction id string (32 bytes, unpadded).
pub const TX_ID_STRING_LENGTH: usize = 52;

/// AES-256-GCM key length in bytes.
pub const AES_KEY_LENGTH: usize = 32;

/// AES-256-GCM nonce length in bytes. Twelve. Not 16. Not 8.
pub const AES_NONCE_LENGTH: usize = 12;

/// AES-256-GCM authentication tag length in bytes.
pub const AES_TAG_LENGTH: usize = 16;

// ---------------------------------------------------------------------------
// Transaction Limits
// ---------------------------------------------------------------------------

/// Number of rounds a freshly built transaction stays valid for.
pub const ROUND_THRESHOLD: u64 = 1_000;

/// Protocol minimum fee in microAlgos.
pub const MIN_TXN_FEE: u64 = 1_000;

/// Maximum number of transactions in one atomic group.
pub const MAX_GROUP_SIZE: usize = 16;

/// Maximum note length in bytes.
pub const MAX_NOTE_LENGTH: usize = 1_024;

/// Bytes a single-signature envelope adds on top of the bare transaction
/// encoding:
///
/// ```text
/// map header (1) + "sig" (4) + bin8 header (2) + signature (64) + "txn" (4) = 75
/// ```
pub const SIGNATURE_ENCODING_OVERHEAD: usize = 75;

/// Upper bound on fee fixed-point iterations. The encoded fee can only grow
/// by a handful of bytes, so this is never reached in practice.
pub const MAX_FEE_ITERATIONS: usize = 8;

// ---------------------------------------------------------------------------
// Builder configuration
// ---------------------------------------------------------------------------

/// Errors raised by [`BuilderConfig::validate`] and JSON loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("round threshold must be > 0")]
    ZeroRoundThreshold,

    #[error("flat fee {flat_fee} exceeds max fee {max_fee}")]
    FlatFeeAboveMax { flat_fee: u64, max_fee: u64 },

    #[error("invalid builder config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Policy knobs for the transaction builders.
///
/// The defaults match what the wallet ships with. Offline-signing flows that
/// need smaller payloads turn `include_genesis_id` off; everything else
/// should leave it on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Length of the validity window, in rounds.
    pub round_threshold: u64,
    /// Whether the `gen` field is written into built transactions.
    pub include_genesis_id: bool,
    /// Fixed fee, bypassing size-based fee estimation. Still floored at the
    /// network minimum.
    pub flat_fee: Option<u64>,
    /// Refuse to build transactions whose computed fee exceeds this.
    pub max_fee: Option<u64>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            round_threshold: ROUND_THRESHOLD,
            include_genesis_id: true,
            flat_fee: None,
            max_fee: None,
        }
    }
}

impl BuilderConfig {
    /// Parse a config from JSON, filling unspecified fields with defaults,
    /// and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that could never build a valid transaction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.round_threshold == 0 {
            return Err(ConfigError::ZeroRoundThreshold);
        }
        if let (Some(flat_fee), Some(max_fee)) = (self.flat_fee, self.max_fee) {
            if flat_fee > max_fee {
                return Err(ConfigError::FlatFeeAboveMax { flat_fee, max_fee });
            }
        }
        Ok(())
    }
}
