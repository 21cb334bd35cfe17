// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Atomic Groups
//!
//! An atomic group is an ordered list of up to 16 transactions that confirm
//! together or not at all. Every member carries the same `grp` value:
//!
//! ```text
//! txid_i   = SHA-512/256("TX" || encode(member_i with grp cleared))
//! group_id = SHA-512/256("TG" || encode({ "txlist": [txid_1, ..., txid_n] }))
//! ```
//!
//! Order matters: swapping two members yields a different group id.
//!
//! [`find_and_verify_groups`] is what the wallet runs on a batch handed to
//! it by a dApp before showing anything to the user. It splits the batch
//! into groups and recomputes every group id, so a dApp cannot slip an
//! extra transaction into a group the user thinks they are approving.

use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

use super::codec::{decode, encode, encode_txid_list, EncodingError};
use super::types::{Digest, EncodedTransaction, GroupId, UnsignedTransaction};
use crate::config::{MAX_GROUP_SIZE, TX_GROUP_DOMAIN_PREFIX};
use crate::crypto::hash::hash_with_prefix;

/// Errors from group assignment or verification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GroupError {
    #[error("cannot group an empty list of transactions")]
    EmptyGroup,

    #[error("group has {size} transactions, maximum is {MAX_GROUP_SIZE}")]
    GroupTooLarge { size: usize },

    #[error("group id mismatch at index {index}: stored {stored}, computed {computed}")]
    VerificationFailed {
        index: usize,
        stored: GroupId,
        computed: GroupId,
    },

    #[error("group {group} reappears at index {index} after its run ended")]
    NonContiguous { index: usize, group: GroupId },

    #[error("transaction {index} could not be decoded: {source}")]
    Decode {
        index: usize,
        #[source]
        source: EncodingError,
    },

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

pub(crate) fn check_size(size: usize) -> Result<(), GroupError> {
    match size {
        0 => Err(GroupError::EmptyGroup),
        n if n > MAX_GROUP_SIZE => Err(GroupError::GroupTooLarge { size: n }),
        _ => Ok(()),
    }
}

/// Compute the group id for `txs`, in order. Any group already stamped on
/// a member is ignored.
pub fn compute_group_id(txs: &[UnsignedTransaction]) -> Result<GroupId, GroupError> {
    check_size(txs.len())?;

    let ids = txs
        .iter()
        .map(|tx| {
            let mut member = tx.clone();
            member.header.group = None;
            Ok(encode(&member)?.raw_tx_id())
        })
        .collect::<Result<Vec<Digest>, EncodingError>>()?;

    let preimage = encode_txid_list(&ids)?;
    Ok(GroupId::from_bytes(hash_with_prefix(
        TX_GROUP_DOMAIN_PREFIX,
        &preimage,
    )))
}

pub(crate) fn decode_all(txs: &[EncodedTransaction]) -> Result<Vec<UnsignedTransaction>, GroupError> {
    txs.iter()
        .enumerate()
        .map(|(index, tx)| decode(tx.as_bytes()).map_err(|source| GroupError::Decode { index, source }))
        .collect()
}

/// Stamp a fresh group id into every transaction and re-encode them.
///
/// Fees are left exactly as built, so a member sized by fee rate now pays
/// for 34 bytes less than it carries. Group through
/// [`TransactionBuilder::group`](super::builder::TransactionBuilder::group)
/// to have the fees re-sized.
pub fn assign_group_id(txs: &[EncodedTransaction]) -> Result<Vec<EncodedTransaction>, GroupError> {
    check_size(txs.len())?;

    let mut decoded = decode_all(txs)?;
    let group = compute_group_id(&decoded)?;

    let grouped = decoded
        .iter_mut()
        .map(|tx| {
            tx.header.group = Some(*group.as_bytes());
            encode(tx)
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(%group, size = grouped.len(), "assigned group id");
    Ok(grouped)
}

/// Split a batch into its atomic groups and verify each group id.
///
/// Transactions without a group are returned as singleton partitions.
/// Consecutive transactions sharing a group form one partition, whose
/// recomputed id must match the stored one. The first problem fails the
/// whole batch; an empty batch yields no partitions.
pub fn find_and_verify_groups(
    txs: &[EncodedTransaction],
) -> Result<Vec<Vec<EncodedTransaction>>, GroupError> {
    let decoded = decode_all(txs)?;

    let mut partitions = Vec::new();
    let mut seen: HashSet<Digest> = HashSet::new();
    let mut start = 0;

    while start < decoded.len() {
        let Some(stored) = decoded[start].header.group else {
            partitions.push(vec![txs[start].clone()]);
            start += 1;
            continue;
        };

        if !seen.insert(stored) {
            return Err(GroupError::NonContiguous {
                index: start,
                group: GroupId::from_bytes(stored),
            });
        }

        let run = decoded[start..]
            .iter()
            .take_while(|tx| tx.header.group == Some(stored))
            .count();
        let end = start + run;

        let computed = compute_group_id(&decoded[start..end])?;
        if *computed.as_bytes() != stored {
            warn!(index = start, size = run, "group id does not match its members");
            return Err(GroupError::VerificationFailed {
                index: start,
                stored: GroupId::from_bytes(stored),
                computed,
            });
        }

        partitions.push(txs[start..end].to_vec());
        start = end;
    }

    debug!(
        transactions = txs.len(),
        partitions = partitions.len(),
        "verified transaction groups"
    );
    Ok(partitions)
}
