// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! Transaction construction from user intent.
//!
//! The UI hands us an *intent* ("send 5 Algos to this address", "opt in to
//! asset 31566704") plus the network's suggested [`TransactionParams`]; the
//! builder turns that into canonical unsigned bytes ready for grouping or
//! signing.
//!
//! What the builder decides for the caller:
//!
//! - the validity window, `[last_round, last_round + round_threshold]`;
//! - whether the genesis id is written (the genesis hash always is);
//! - the fee, sized from the *final* encoding.
//!
//! ## Fee sizing
//!
//! `fee = max((encoded_len + 75) * fee_per_byte, min_fee)`, where 75 bytes
//! is the single-signature envelope overhead. Writing the fee changes the
//! encoded length, so the builder re-encodes until the fee stops moving.
//! Both sides are monotone, so this settles in two or three rounds.
//!
//! Grouping adds a 32-byte `grp` to every member, so a group has to be
//! sized again after it is formed. [`TransactionBuilder::group`] does that:
//! it settles each member's fee with a placeholder group of the same
//! encoded size, then stamps the real group id computed over the settled
//! members.
//!
//! The builder does not sign and never looks at balances. Signing happens in
//! [`super::signing`]; whether the account can afford the transaction is the
//! network's call.

use thiserror::Error;
use tracing::debug;

use super::codec::{encode, EncodingError};
use super::group::{check_size, compute_group_id, decode_all, GroupError};
use super::types::{
    AssetTransferFields, Digest, EncodedTransaction, KeyRegistrationFields, PaymentFields,
    TransactionBody, TransactionHeader, TransactionParams, UnsignedTransaction,
};
use crate::config::{
    BuilderConfig, ConfigError, MAX_FEE_ITERATIONS, MAX_NOTE_LENGTH, SIGNATURE_ENCODING_OVERHEAD,
};
use crate::identity::{Address, AddressError};

/// Errors raised while building a transaction.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid {field} address: {source}")]
    InvalidAddress {
        field: &'static str,
        #[source]
        source: AddressError,
    },

    /// The zero address is never written to the wire, so using it here
    /// would silently drop the field.
    #[error("{field} address must not be the zero address")]
    ZeroAddress { field: &'static str },

    #[error("note is {len} bytes, maximum is {MAX_NOTE_LENGTH}")]
    NoteTooLong { len: usize },

    #[error("fee {fee} exceeds configured maximum {max_fee}")]
    FeeExceedsMaximum { fee: u64, max_fee: u64 },

    #[error("fee did not settle after {MAX_FEE_ITERATIONS} iterations")]
    FeeDidNotConverge,

    #[error("validity window overflows: last round {last_round} + threshold {round_threshold}")]
    ValidityOverflow { last_round: u64, round_threshold: u64 },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Group(#[from] GroupError),
}

fn parse_address(field: &'static str, value: &str) -> Result<Address, BuildError> {
    value
        .parse()
        .map_err(|source| BuildError::InvalidAddress { field, source })
}

/// Parse an address that must be written to the wire.
fn parse_nonzero(field: &'static str, value: &str) -> Result<Address, BuildError> {
    let address = parse_address(field, value)?;
    if address.is_zero() {
        return Err(BuildError::ZeroAddress { field });
    }
    Ok(address)
}

fn parse_optional(field: &'static str, value: Option<&str>) -> Result<Option<Address>, BuildError> {
    value.map(|v| parse_nonzero(field, v)).transpose()
}

// ---------------------------------------------------------------------------
// Intents
// ---------------------------------------------------------------------------

/// Send Algos from one account to another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentIntent {
    pub from: String,
    pub to: String,
    /// Amount in microAlgos.
    pub amount: u64,
    /// Close the sender's account, sending whatever remains here.
    pub close_remainder_to: Option<String>,
    pub note: Vec<u8>,
}

/// Move units of an asset the sender already holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetTransferIntent {
    pub from: String,
    pub to: String,
    pub asset_id: u64,
    /// Amount in the asset's base units.
    pub amount: u64,
    pub note: Vec<u8>,
}

/// Opt the account in to an asset so it can receive it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetAcceptIntent {
    pub from: String,
    pub asset_id: u64,
    pub note: Vec<u8>,
}

/// Opt out of an asset, returning any remaining balance to the creator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetOptOutIntent {
    pub from: String,
    /// The asset creator's address; receives the closed-out holding.
    pub creator: String,
    pub asset_id: u64,
    pub note: Vec<u8>,
}

/// Hand the account's signing authority to another key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RekeyIntent {
    pub from: String,
    pub rekey_to: String,
    pub note: Vec<u8>,
}

/// Forcibly move an asset out of an account. Only valid when `clawback` is
/// the asset's clawback address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetClawbackIntent {
    pub clawback: String,
    /// Account the asset is taken from.
    pub revoke_from: String,
    pub to: String,
    pub asset_id: u64,
    pub amount: u64,
    pub note: Vec<u8>,
}

/// Participation keys for an online key registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipationKeys {
    pub vote_key: Digest,
    pub selection_key: Digest,
    pub state_proof_key: Option<[u8; 64]>,
    pub vote_first: u64,
    pub vote_last: u64,
    pub vote_key_dilution: u64,
}

/// Register participation keys (online) or go offline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyRegistrationIntent {
    pub from: String,
    /// `None` registers the account offline.
    pub participation: Option<ParticipationKeys>,
    /// Permanently opt out of rewards and participation. Offline only.
    pub non_participation: bool,
    pub note: Vec<u8>,
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Builds transactions against one snapshot of network parameters.
///
/// # Usage
///
/// ```
/// use algowallet_protocol::transaction::builder::{PaymentIntent, TransactionBuilder};
/// use algowallet_protocol::transaction::{codec, TransactionParams};
/// use algowallet_protocol::crypto::SecretKey;
///
/// let params = TransactionParams {
///     fee: 0,
///     min_fee: 1_000,
///     last_round: 36_000_000,
///     genesis_id: "mainnet-v1.0".into(),
///     genesis_hash: [7u8; 32],
///     consensus_version: None,
/// };
/// let alice = SecretKey::generate().address().to_string();
/// let bob = SecretKey::generate().address().to_string();
///
/// let encoded = TransactionBuilder::new(&params)
///     .payment(&PaymentIntent {
///         from: alice,
///         to: bob,
///         amount: 5_000_000,
///         ..PaymentIntent::default()
///     })
///     .unwrap();
///
/// let tx = codec::decode(encoded.as_bytes()).unwrap();
/// assert_eq!(tx.header.fee, 1_000);
/// assert_eq!(tx.header.last_valid, 36_001_000);
/// ```
#[derive(Debug, Clone)]
pub struct TransactionBuilder<'a> {
    params: &'a TransactionParams,
    config: BuilderConfig,
}

impl<'a> TransactionBuilder<'a> {
    /// Creates a builder with the default [`BuilderConfig`].
    pub fn new(params: &'a TransactionParams) -> Self {
        Self {
            params,
            config: BuilderConfig::default(),
        }
    }

    /// Replaces the builder policy. The config is validated first.
    pub fn with_config(mut self, config: BuilderConfig) -> Result<Self, BuildError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Plain Algo payment, optionally closing the sender's account.
    pub fn payment(&self, intent: &PaymentIntent) -> Result<EncodedTransaction, BuildError> {
        let sender = parse_address("sender", &intent.from)?;
        let body = TransactionBody::Payment(PaymentFields {
            receiver: parse_address("receiver", &intent.to)?,
            amount: intent.amount,
            close_remainder_to: parse_optional("close", intent.close_remainder_to.as_deref())?,
        });
        self.finish(self.header(sender, &intent.note)?, body)
    }

    pub fn asset_transfer(
        &self,
        intent: &AssetTransferIntent,
    ) -> Result<EncodedTransaction, BuildError> {
        let sender = parse_address("sender", &intent.from)?;
        let body = TransactionBody::AssetTransfer(AssetTransferFields {
            asset_id: intent.asset_id,
            amount: intent.amount,
            receiver: parse_address("receiver", &intent.to)?,
            ..AssetTransferFields::default()
        });
        self.finish(self.header(sender, &intent.note)?, body)
    }

    /// Zero-amount self-transfer of the asset, which opts the sender in.
    pub fn asset_accept(&self, intent: &AssetAcceptIntent) -> Result<EncodedTransaction, BuildError> {
        let sender = parse_address("sender", &intent.from)?;
        let body = TransactionBody::AssetTransfer(AssetTransferFields {
            asset_id: intent.asset_id,
            receiver: sender,
            ..AssetTransferFields::default()
        });
        self.finish(self.header(sender, &intent.note)?, body)
    }

    /// Zero-amount transfer to the creator that also closes the holding to
    /// the creator, leaving the sender with no balance and no opt-in.
    pub fn asset_opt_out(
        &self,
        intent: &AssetOptOutIntent,
    ) -> Result<EncodedTransaction, BuildError> {
        let sender = parse_address("sender", &intent.from)?;
        let creator = parse_nonzero("creator", &intent.creator)?;
        let body = TransactionBody::AssetTransfer(AssetTransferFields {
            asset_id: intent.asset_id,
            receiver: creator,
            close_remainder_to: Some(creator),
            ..AssetTransferFields::default()
        });
        self.finish(self.header(sender, &intent.note)?, body)
    }

    /// Zero-amount self-payment carrying the new authorizing address.
    pub fn rekey(&self, intent: &RekeyIntent) -> Result<EncodedTransaction, BuildError> {
        let sender = parse_address("sender", &intent.from)?;
        let mut header = self.header(sender, &intent.note)?;
        header.rekey_to = Some(parse_nonzero("rekey", &intent.rekey_to)?);
        let body = TransactionBody::Payment(PaymentFields {
            receiver: sender,
            ..PaymentFields::default()
        });
        self.finish(header, body)
    }

    /// Asset transfer sent by the clawback account on behalf of
    /// `revoke_from`.
    pub fn asset_clawback(
        &self,
        intent: &AssetClawbackIntent,
    ) -> Result<EncodedTransaction, BuildError> {
        let sender = parse_address("clawback", &intent.clawback)?;
        let body = TransactionBody::AssetTransfer(AssetTransferFields {
            asset_id: intent.asset_id,
            amount: intent.amount,
            receiver: parse_address("receiver", &intent.to)?,
            close_remainder_to: None,
            asset_sender: Some(parse_address("revoke", &intent.revoke_from)?),
        });
        self.finish(self.header(sender, &intent.note)?, body)
    }

    pub fn key_registration(
        &self,
        intent: &KeyRegistrationIntent,
    ) -> Result<EncodedTransaction, BuildError> {
        let sender = parse_address("sender", &intent.from)?;
        let fields = match &intent.participation {
            Some(keys) => KeyRegistrationFields {
                vote_key: Some(keys.vote_key),
                selection_key: Some(keys.selection_key),
                state_proof_key: keys.state_proof_key,
                vote_first: keys.vote_first,
                vote_last: keys.vote_last,
                vote_key_dilution: keys.vote_key_dilution,
                non_participation: intent.non_participation,
            },
            None => KeyRegistrationFields {
                non_participation: intent.non_participation,
                ..KeyRegistrationFields::default()
            },
        };
        let body = TransactionBody::KeyRegistration(fields);
        self.finish(self.header(sender, &intent.note)?, body)
    }

    /// Form an atomic group from built transactions and re-size every
    /// member's fee for the `grp` field it now carries.
    ///
    /// Each member is settled with a placeholder group, which encodes to the
    /// same length as the real one, so the fees are final before the group
    /// id is computed over them. Fees follow this builder's params and
    /// config, including `flat_fee` and `max_fee`.
    ///
    /// Use [`super::group::assign_group_id`] instead when the fees must stay
    /// exactly as built.
    pub fn group(&self, txs: &[EncodedTransaction]) -> Result<Vec<EncodedTransaction>, BuildError> {
        check_size(txs.len())?;

        let mut members = decode_all(txs)?;
        for tx in &mut members {
            tx.header.group = Some(GROUP_PLACEHOLDER);
            self.apply_fee(tx)?;
        }

        let group = compute_group_id(&members)?;
        let grouped = members
            .iter_mut()
            .map(|tx| {
                tx.header.group = Some(*group.as_bytes());
                encode(tx)
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            %group,
            size = grouped.len(),
            total_fee = members
                .iter()
                .fold(0u64, |sum, tx| sum.saturating_add(tx.header.fee)),
            "grouped transactions"
        );
        Ok(grouped)
    }

    // -- internals ----------------------------------------------------------

    fn header(&self, sender: Address, note: &[u8]) -> Result<TransactionHeader, BuildError> {
        if note.len() > MAX_NOTE_LENGTH {
            return Err(BuildError::NoteTooLong { len: note.len() });
        }

        let first_valid = self.params.last_round;
        let last_valid = first_valid
            .checked_add(self.config.round_threshold)
            .ok_or(BuildError::ValidityOverflow {
                last_round: first_valid,
                round_threshold: self.config.round_threshold,
            })?;

        let genesis_id = (self.config.include_genesis_id && !self.params.genesis_id.is_empty())
            .then(|| self.params.genesis_id.clone());

        Ok(TransactionHeader {
            sender,
            fee: 0,
            first_valid,
            last_valid,
            genesis_id,
            genesis_hash: Some(self.params.genesis_hash),
            note: note.to_vec(),
            lease: None,
            group: None,
            rekey_to: None,
        })
    }

    /// Size-based fee for an unsigned encoding of `encoded_len` bytes.
    fn size_fee(&self, encoded_len: usize) -> Result<u64, BuildError> {
        let signed_len = encoded_len
            .checked_add(SIGNATURE_ENCODING_OVERHEAD)
            .and_then(|len| u64::try_from(len).ok())
            .ok_or(EncodingError::NumericOverflow("fee"))?;
        let fee = signed_len
            .checked_mul(self.params.fee)
            .ok_or(EncodingError::NumericOverflow("fee"))?;
        Ok(fee.max(self.params.min_fee))
    }

    /// Write the fee the config calls for and return the final encoding.
    fn apply_fee(&self, tx: &mut UnsignedTransaction) -> Result<EncodedTransaction, BuildError> {
        let encoded = match self.config.flat_fee {
            Some(flat_fee) => {
                tx.header.fee = flat_fee.max(self.params.min_fee);
                encode(tx)?
            }
            None => self.settle_fee(tx)?,
        };

        if let Some(max_fee) = self.config.max_fee {
            if tx.header.fee > max_fee {
                return Err(BuildError::FeeExceedsMaximum {
                    fee: tx.header.fee,
                    max_fee,
                });
            }
        }
        Ok(encoded)
    }

    fn finish(
        &self,
        header: TransactionHeader,
        body: TransactionBody,
    ) -> Result<EncodedTransaction, BuildError> {
        let mut tx = UnsignedTransaction::new(header, body);
        let encoded = self.apply_fee(&mut tx)?;

        debug!(
            kind = %tx.kind(),
            tx_id = %encoded.tx_id(),
            fee = tx.header.fee,
            first_valid = tx.header.first_valid,
            last_valid = tx.header.last_valid,
            len = encoded.len(),
            "built transaction"
        );
        Ok(encoded)
    }

    /// Re-encode until the fee written into the transaction pays for the
    /// transaction's own size.
    fn settle_fee(&self, tx: &mut UnsignedTransaction) -> Result<EncodedTransaction, BuildError> {
        for _ in 0..MAX_FEE_ITERATIONS {
            let encoded = encode(tx)?;
            let fee = self.size_fee(encoded.len())?;
            if fee == tx.header.fee {
                return Ok(encoded);
            }
            tx.header.fee = fee;
        }
        Err(BuildError::FeeDidNotConverge)
    }
}

/// Stands in for the group id while fees are sized. Any non-zero value
/// encodes to the same length.
const GROUP_PLACEHOLDER: Digest = [0xFF; 32];

// ---------------------------------------------------------------------------
// Free functions (default config)
// ---------------------------------------------------------------------------

pub fn build_payment(
    intent: &PaymentIntent,
    params: &TransactionParams,
) -> Result<EncodedTransaction, BuildError> {
    TransactionBuilder::new(params).payment(intent)
}

pub fn build_asset_transfer(
    intent: &AssetTransferIntent,
    params: &TransactionParams,
) -> Result<EncodedTransaction, BuildError> {
    TransactionBuilder::new(params).asset_transfer(intent)
}

pub fn build_asset_accept(
    intent: &AssetAcceptIntent,
    params: &TransactionParams,
) -> Result<EncodedTransaction, BuildError> {
    TransactionBuilder::new(params).asset_accept(intent)
}

pub fn build_asset_opt_out(
    intent: &AssetOptOutIntent,
    params: &TransactionParams,
) -> Result<EncodedTransaction, BuildError> {
    TransactionBuilder::new(params).asset_opt_out(intent)
}

pub fn build_rekey(
    intent: &RekeyIntent,
    params: &TransactionParams,
) -> Result<EncodedTransaction, BuildError> {
    TransactionBuilder::new(params).rekey(intent)
}

pub fn build_asset_clawback(
    intent: &AssetClawbackIntent,
    params: &TransactionParams,
) -> Result<EncodedTransaction, BuildError> {
    TransactionBuilder::new(params).asset_clawback(intent)
}

pub fn build_key_registration(
    intent: &KeyRegistrationIntent,
    params: &TransactionParams,
) -> Result<EncodedTransaction, BuildError> {
    TransactionBuilder::new(params).key_registration(intent)
}

/// Group built transactions and re-size their fees under `params`.
pub fn build_group(
    txs: &[EncodedTransaction],
    params: &TransactionParams,
) -> Result<Vec<EncodedTransaction>, BuildError> {
    TransactionBuilder::new(params).group(txs)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ROUND_THRESHOLD;
    use crate::transaction::codec::decode;
    use crate::transaction::group::{assign_group_id, find_and_verify_groups};
    use crate::transaction::types::TransactionKind;

    fn params(fee: u64) -> TransactionParams {
        TransactionParams {
            fee,
            min_fee: 1_000,
            last_round: 100,
            genesis_id: "testnet-v1.0".into(),
            genesis_hash: [0x48; 32],
            consensus_version: None,
        }
    }

    fn addr(byte: u8) -> String {
        Address::from_public_key([byte; 32]).to_string()
    }

    fn pay(amount: u64) -> PaymentIntent {
        PaymentIntent {
            from: addr(1),
            to: addr(2),
            amount,
            ..PaymentIntent::default()
        }
    }

    #[test]
    fn payment_scenario() {
        let encoded = build_payment(&pay(1_000_000), &params(1)).unwrap();
        let tx = decode(encoded.as_bytes()).unwrap();

        let signed_size = (encoded.len() + SIGNATURE_ENCODING_OVERHEAD) as u64;
        assert_eq!(tx.header.fee, signed_size.max(1_000));
        assert_eq!(tx.header.first_valid, 100);
        assert_eq!(tx.header.last_valid, 100 + ROUND_THRESHOLD);
        assert_eq!(tx.header.genesis_id.as_deref(), Some("testnet-v1.0"));
        assert_eq!(tx.header.genesis_hash, Some([0x48; 32]));
        assert_eq!(tx.kind(), TransactionKind::Payment);
    }

    #[test]
    fn fee_tracks_final_encoding_size() {
        // High enough per-byte rate that the size-based fee beats the floor.
        let encoded = build_payment(&pay(1), &params(50)).unwrap();
        let tx = decode(encoded.as_bytes()).unwrap();
        let signed_size = (encoded.len() + SIGNATURE_ENCODING_OVERHEAD) as u64;
        assert_eq!(tx.header.fee, signed_size * 50);
        assert!(tx.header.fee > 1_000);
    }

    #[test]
    fn zero_fee_rate_uses_min_fee() {
        let encoded = build_payment(&pay(1), &params(0)).unwrap();
        assert_eq!(decode(encoded.as_bytes()).unwrap().header.fee, 1_000);
    }

    #[test]
    fn flat_fee_floored_at_min_fee() {
        let p = params(1_000);
        let builder = TransactionBuilder::new(&p)
            .with_config(BuilderConfig {
                flat_fee: Some(10),
                ..BuilderConfig::default()
            })
            .unwrap();
        let tx = decode(builder.payment(&pay(1)).unwrap().as_bytes()).unwrap();
        assert_eq!(tx.header.fee, 1_000);
    }

    #[test]
    fn max_fee_enforced() {
        let p = params(100);
        let builder = TransactionBuilder::new(&p)
            .with_config(BuilderConfig {
                max_fee: Some(2_000),
                ..BuilderConfig::default()
            })
            .unwrap();
        assert!(matches!(
            builder.payment(&pay(1)),
            Err(BuildError::FeeExceedsMaximum { max_fee: 2_000, .. })
        ));
    }

    #[test]
    fn fee_rate_overflow_is_an_error() {
        let err = build_payment(&pay(1), &params(u64::MAX)).unwrap_err();
        assert!(matches!(
            err,
            BuildError::Encoding(EncodingError::NumericOverflow("fee"))
        ));
    }

    #[test]
    fn genesis_id_can_be_left_out() {
        let p = params(0);
        let builder = TransactionBuilder::new(&p)
            .with_config(BuilderConfig {
                include_genesis_id: false,
                ..BuilderConfig::default()
            })
            .unwrap();
        let tx = decode(builder.payment(&pay(1)).unwrap().as_bytes()).unwrap();
        assert_eq!(tx.header.genesis_id, None);
        assert!(tx.header.genesis_hash.is_some());
    }

    #[test]
    fn invalid_config_rejected() {
        let p = params(0);
        let result = TransactionBuilder::new(&p).with_config(BuilderConfig {
            round_threshold: 0,
            ..BuilderConfig::default()
        });
        assert!(matches!(
            result,
            Err(BuildError::Config(ConfigError::ZeroRoundThreshold))
        ));
    }

    #[test]
    fn validity_window_overflow() {
        let mut p = params(0);
        p.last_round = u64::MAX - 10;
        assert!(matches!(
            build_payment(&pay(1), &p),
            Err(BuildError::ValidityOverflow { .. })
        ));
    }

    #[test]
    fn note_limit() {
        let mut intent = pay(1);
        intent.note = vec![0xAB; MAX_NOTE_LENGTH];
        let tx = decode(build_payment(&intent, &params(0)).unwrap().as_bytes()).unwrap();
        assert_eq!(tx.header.note.len(), MAX_NOTE_LENGTH);

        intent.note.push(0);
        assert!(matches!(
            build_payment(&intent, &params(0)),
            Err(BuildError::NoteTooLong { len }) if len == MAX_NOTE_LENGTH + 1
        ));
    }

    #[test]
    fn invalid_address_names_the_field() {
        let mut intent = pay(1);
        intent.to = "not-an-address".into();
        match build_payment(&intent, &params(0)) {
            Err(BuildError::InvalidAddress { field, .. }) => assert_eq!(field, "receiver"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn asset_accept_is_self_transfer() {
        let intent = AssetAcceptIntent {
            from: addr(1),
            asset_id: 31566704,
            note: Vec::new(),
        };
        let tx = decode(build_asset_accept(&intent, &params(0)).unwrap().as_bytes()).unwrap();
        assert_eq!(tx.kind(), TransactionKind::AssetAccept);
        match tx.body {
            TransactionBody::AssetTransfer(axfer) => {
                assert_eq!(axfer.receiver.to_string(), addr(1));
                assert_eq!(axfer.amount, 0);
                assert_eq!(axfer.asset_id, 31566704);
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn asset_opt_out_closes_to_creator() {
        let intent = AssetOptOutIntent {
            from: addr(1),
            creator: addr(7),
            asset_id: 42,
            note: Vec::new(),
        };
        let tx = decode(build_asset_opt_out(&intent, &params(0)).unwrap().as_bytes()).unwrap();
        assert_eq!(tx.kind(), TransactionKind::AssetOptOut);
        match tx.body {
            TransactionBody::AssetTransfer(axfer) => {
                assert_eq!(axfer.receiver.to_string(), addr(7));
                assert_eq!(axfer.close_remainder_to.map(|a| a.to_string()), Some(addr(7)));
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn rekey_sets_auth_target() {
        let intent = RekeyIntent {
            from: addr(1),
            rekey_to: addr(3),
            note: Vec::new(),
        };
        let tx = decode(build_rekey(&intent, &params(0)).unwrap().as_bytes()).unwrap();
        assert_eq!(tx.kind(), TransactionKind::Rekey);
        assert_eq!(tx.header.rekey_to.map(|a| a.to_string()), Some(addr(3)));
    }

    #[test]
    fn clawback_sender_is_clawback_account() {
        let intent = AssetClawbackIntent {
            clawback: addr(5),
            revoke_from: addr(6),
            to: addr(7),
            asset_id: 9,
            amount: 100,
            note: Vec::new(),
        };
        let tx = decode(build_asset_clawback(&intent, &params(0)).unwrap().as_bytes()).unwrap();
        assert_eq!(tx.kind(), TransactionKind::AssetClawback);
        assert_eq!(tx.sender().to_string(), addr(5));
    }

    #[test]
    fn asset_transfer_requires_asset_id() {
        let intent = AssetTransferIntent {
            from: addr(1),
            to: addr(2),
            asset_id: 0,
            amount: 5,
            note: Vec::new(),
        };
        assert!(matches!(
            build_asset_transfer(&intent, &params(0)),
            Err(BuildError::Encoding(EncodingError::MissingField("xaid")))
        ));
    }

    #[test]
    fn key_registration_online_and_offline() {
        let online = KeyRegistrationIntent {
            from: addr(1),
            participation: Some(ParticipationKeys {
                vote_key: [1u8; 32],
                selection_key: [2u8; 32],
                state_proof_key: Some([3u8; 64]),
                vote_first: 100,
                vote_last: 1_000_100,
                vote_key_dilution: 1_000,
            }),
            ..KeyRegistrationIntent::default()
        };
        let tx = decode(build_key_registration(&online, &params(0)).unwrap().as_bytes()).unwrap();
        assert_eq!(tx.kind(), TransactionKind::KeyRegistration);

        let offline = KeyRegistrationIntent {
            from: addr(1),
            ..KeyRegistrationIntent::default()
        };
        let tx = decode(build_key_registration(&offline, &params(0)).unwrap().as_bytes()).unwrap();
        match tx.body {
            TransactionBody::KeyRegistration(k) => assert!(!k.is_online()),
            other => panic!("unexpected body: {:?}", other),
        }

        let conflicting = KeyRegistrationIntent {
            non_participation: true,
            ..online
        };
        assert!(matches!(
            build_key_registration(&conflicting, &params(0)),
            Err(BuildError::Encoding(EncodingError::ConflictingField("nonpart")))
        ));
    }

    #[test]
    fn building_is_deterministic() {
        let a = build_payment(&pay(77), &params(1)).unwrap();
        let b = build_payment(&pay(77), &params(1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_address_rejected_where_it_would_be_dropped() {
        let zero = Address::ZERO.to_string();

        let rekey = RekeyIntent {
            from: addr(1),
            rekey_to: zero.clone(),
            note: Vec::new(),
        };
        assert!(matches!(
            build_rekey(&rekey, &params(0)),
            Err(BuildError::ZeroAddress { field: "rekey" })
        ));

        let mut close = pay(1);
        close.close_remainder_to = Some(zero.clone());
        assert!(matches!(
            build_payment(&close, &params(0)),
            Err(BuildError::ZeroAddress { field: "close" })
        ));

        let opt_out = AssetOptOutIntent {
            from: addr(1),
            creator: zero,
            asset_id: 42,
            note: Vec::new(),
        };
        assert!(matches!(
            build_asset_opt_out(&opt_out, &params(0)),
            Err(BuildError::ZeroAddress { field: "creator" })
        ));
    }

    #[test]
    fn payment_close_to_nonzero_address_is_kept() {
        let mut intent = pay(1);
        intent.close_remainder_to = Some(addr(9));
        let tx = decode(build_payment(&intent, &params(0)).unwrap().as_bytes()).unwrap();
        match tx.body {
            TransactionBody::Payment(pay) => {
                assert_eq!(pay.close_remainder_to.map(|a| a.to_string()), Some(addr(9)));
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    fn assert_fee_covers_size(encoded: &EncodedTransaction, rate: u64) {
        let tx = decode(encoded.as_bytes()).unwrap();
        let signed_size = (encoded.len() + SIGNATURE_ENCODING_OVERHEAD) as u64;
        assert_eq!(tx.header.fee, (signed_size * rate).max(1_000));
    }

    #[test]
    fn grouping_resizes_fees_for_the_group_field() {
        let p = params(50);
        let builder = TransactionBuilder::new(&p);
        let mut back = pay(2);
        back.from = addr(2);
        back.to = addr(1);
        let txs = [builder.payment(&pay(1)).unwrap(), builder.payment(&back).unwrap()];

        // Stamping alone leaves every member short by 34 bytes of fee.
        for tx in assign_group_id(&txs).unwrap() {
            let fee = decode(tx.as_bytes()).unwrap().header.fee;
            let required = (tx.len() + SIGNATURE_ENCODING_OVERHEAD) as u64 * 50;
            assert!(fee < required);
        }

        let grouped = builder.group(&txs).unwrap();
        assert_eq!(grouped.len(), 2);
        for tx in &grouped {
            assert!(decode(tx.as_bytes()).unwrap().header.group.is_some());
            assert_fee_covers_size(tx, 50);
        }
        assert_eq!(find_and_verify_groups(&grouped).unwrap(), vec![grouped.clone()]);

        // Already settled, so grouping again changes nothing.
        assert_eq!(builder.group(&grouped).unwrap(), grouped);
    }

    #[test]
    fn grouping_at_floor_rate_keeps_min_fee() {
        let grouped = build_group(&[build_payment(&pay(1), &params(0)).unwrap()], &params(0)).unwrap();
        assert_fee_covers_size(&grouped[0], 0);
        assert_eq!(grouped, assign_group_id(&grouped).unwrap());
    }

    #[test]
    fn grouping_honours_fee_config() {
        let p = params(100);
        let tx = build_payment(&pay(1), &params(0)).unwrap();
        let capped = TransactionBuilder::new(&p)
            .with_config(BuilderConfig {
                max_fee: Some(2_000),
                ..BuilderConfig::default()
            })
            .unwrap();
        assert!(matches!(
            capped.group(&[tx.clone()]),
            Err(BuildError::FeeExceedsMaximum { max_fee: 2_000, .. })
        ));

        let flat = TransactionBuilder::new(&p)
            .with_config(BuilderConfig {
                flat_fee: Some(3_000),
                ..BuilderConfig::default()
            })
            .unwrap();
        let grouped = flat.group(&[tx]).unwrap();
        assert_eq!(decode(grouped[0].as_bytes()).unwrap().header.fee, 3_000);
    }

    #[test]
    fn grouping_checks_size_and_input() {
        let p = params(0);
        let builder = TransactionBuilder::new(&p);
        assert!(matches!(
            builder.group(&[]),
            Err(BuildError::Group(GroupError::EmptyGroup))
        ));
        assert!(matches!(
            builder.group(&[EncodedTransaction::from_bytes(vec![0xc1])]),
            Err(BuildError::Group(GroupError::Decode { index: 0, .. }))
        ));
    }
}
