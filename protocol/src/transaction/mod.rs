// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Transaction Module
//!
//! Construction, canonical encoding, grouping, signing and verification of
//! Algorand transactions.
//!
//! ## Architecture
//!
//! ```text
//! types.rs        — Header/body model, params, ids, encoded & signed forms
//! codec.rs        — Canonical MessagePack encode/decode, signed envelope
//! builder.rs      — Intent -> canonical unsigned bytes, fee sizing
//! group.rs        — Atomic group id assignment and verification
//! signing.rs      — Ed25519 signing, rekeyed-sender handling
//! verification.rs — Signature checks on signed transactions
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build** — [`TransactionBuilder`] turns an intent and
//!    [`TransactionParams`] into an [`EncodedTransaction`].
//! 2. **Group** (optional) — [`TransactionBuilder::group`] stamps a shared
//!    group id and re-sizes the fees; [`assign_group_id`] only stamps.
//! 3. **Sign** — [`sign_transaction`] produces a [`SignedTransaction`].
//! 4. **Submit** — `SignedTransaction::to_bytes` is what goes on the wire.
//!
//! ## Design Decisions
//!
//! - Everything downstream of the builder works on bytes, not structs: ids
//!   and signatures are defined over the canonical encoding, so that is the
//!   only form that gets passed around.
//! - All amounts are `u64` in the smallest denomination.
//! - The transaction id does not change when a transaction is signed.

pub mod builder;
pub mod codec;
pub mod group;
pub mod signing;
pub mod types;
pub mod verification;

pub use builder::{
    build_asset_accept, build_asset_clawback, build_asset_opt_out, build_asset_transfer,
    build_group, build_key_registration, build_payment, build_rekey, BuildError,
    TransactionBuilder,
};
pub use codec::{decode, decode_signed, encode, encode_signed, EncodingError};
pub use group::{assign_group_id, compute_group_id, find_and_verify_groups, GroupError};
pub use signing::{sign_transaction, sign_transaction_with_key_bytes, SigningError};
pub use types::{
    EncodedTransaction, GroupId, SignedTransaction, TransactionKind, TransactionParams,
    TxId, UnsignedTransaction,
};
pub use verification::{verify_signed_bytes, verify_signed_transaction, VerificationError};
