// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! Core type definitions for Algorand transactions.
//!
//! These types mirror the protocol's wire model: a common
//! [`TransactionHeader`] plus a [`TransactionBody`] for each wire type
//! (`pay`, `axfer`, `acfg`, `keyreg`). The wallet-level notions a user
//! actually picks from (opt-in, opt-out, clawback, rekey) are not separate
//! wire types; they are recovered from the body with
//! [`UnsignedTransaction::kind`].
//!
//! All amounts, fees, rounds and asset ids are `u64` in the smallest unit.
//! No floating point anywhere near money.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use data_encoding::BASE32_NOPAD;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{HASH_OUTPUT_LENGTH, TX_DOMAIN_PREFIX};
use crate::crypto::hash::hash_with_prefix;
use crate::crypto::keys::Signature;
use crate::identity::Address;

/// A 32-byte protocol digest.
pub type Digest = [u8; HASH_OUTPUT_LENGTH];

// ---------------------------------------------------------------------------
// TransactionParams
// ---------------------------------------------------------------------------

/// Suggested network parameters, fetched once per building session.
///
/// Field names follow algod's `/v2/transactions/params` response so the
/// JSON body can be handed straight to [`TransactionParams::from_json`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransactionParams {
    /// Fee rate in microAlgos per byte of signed transaction.
    pub fee: u64,
    /// Network minimum fee in microAlgos.
    pub min_fee: u64,
    /// Latest round seen by the node; the validity window starts here.
    pub last_round: u64,
    /// Human-readable network name, e.g. `mainnet-v1.0`.
    pub genesis_id: String,
    /// Digest of the network's genesis block.
    #[serde(with = "genesis_hash_base64")]
    pub genesis_hash: Digest,
    /// Consensus protocol version reported by the node. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consensus_version: Option<String>,
}

impl TransactionParams {
    /// Parse an algod suggested-params JSON body.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

mod genesis_hash_base64 {
    use super::{Digest, BASE64};
    use base64::Engine as _;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(hash: &Digest, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Digest, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        let bytes = BASE64.decode(encoded.as_bytes()).map_err(de::Error::custom)?;
        bytes.try_into().map_err(|bytes: Vec<u8>| {
            de::Error::custom(format!("genesis hash must be 32 bytes, got {}", bytes.len()))
        })
    }
}

// ---------------------------------------------------------------------------
// Header & bodies
// ---------------------------------------------------------------------------

/// Fields shared by every transaction type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransactionHeader {
    /// `snd` — the account paying the fee and authorizing the transaction.
    pub sender: Address,
    /// `fee` — total fee in microAlgos.
    pub fee: u64,
    /// `fv` — first round the transaction may be confirmed in.
    pub first_valid: u64,
    /// `lv` — last round the transaction may be confirmed in.
    pub last_valid: u64,
    /// `gen` — network name; omitted for offline-signing flows.
    pub genesis_id: Option<String>,
    /// `gh` — network genesis digest. Required.
    pub genesis_hash: Option<Digest>,
    /// `note` — arbitrary bytes.
    pub note: Vec<u8>,
    /// `lx` — mutual-exclusion lease.
    pub lease: Option<Digest>,
    /// `grp` — atomic group id, stamped by group assignment.
    pub group: Option<Digest>,
    /// `rekey` — new authorizing address for the sender after this
    /// transaction confirms.
    pub rekey_to: Option<Address>,
}

/// `pay` body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaymentFields {
    /// `rcv`
    pub receiver: Address,
    /// `amt` — microAlgos.
    pub amount: u64,
    /// `close` — send the remaining balance here and close the account.
    pub close_remainder_to: Option<Address>,
}

/// `axfer` body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetTransferFields {
    /// `xaid` — required.
    pub asset_id: u64,
    /// `aamt` — base units of the asset.
    pub amount: u64,
    /// `arcv`
    pub receiver: Address,
    /// `aclose` — send the remaining holding here and opt out.
    pub close_remainder_to: Option<Address>,
    /// `asnd` — account the asset is clawed back from. Only the asset's
    /// clawback address may set this.
    pub asset_sender: Option<Address>,
}

/// `apar` — asset parameters, used when creating or reconfiguring an asset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetParams {
    /// `t`
    pub total: u64,
    /// `dc`
    pub decimals: u32,
    /// `df`
    pub default_frozen: bool,
    /// `un`
    pub unit_name: Option<String>,
    /// `an`
    pub asset_name: Option<String>,
    /// `au`
    pub url: Option<String>,
    /// `am`
    pub metadata_hash: Option<Digest>,
    /// `m`
    pub manager: Option<Address>,
    /// `r`
    pub reserve: Option<Address>,
    /// `f`
    pub freeze: Option<Address>,
    /// `c`
    pub clawback: Option<Address>,
}

/// `acfg` body. `asset_id == 0` creates an asset; otherwise the asset is
/// reconfigured, or destroyed when `params` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetConfigFields {
    /// `caid`
    pub asset_id: u64,
    /// `apar`
    pub params: Option<AssetParams>,
}

/// `keyreg` body. An online registration carries the participation keys;
/// an offline one carries none.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyRegistrationFields {
    /// `votekey`
    pub vote_key: Option<Digest>,
    /// `selkey`
    pub selection_key: Option<Digest>,
    /// `sprfkey`
    pub state_proof_key: Option<[u8; 64]>,
    /// `votefst`
    pub vote_first: u64,
    /// `votelst`
    pub vote_last: u64,
    /// `votekd`
    pub vote_key_dilution: u64,
    /// `nonpart` — permanently mark the account as non-participating.
    pub non_participation: bool,
}

impl KeyRegistrationFields {
    /// Returns `true` when participation keys are present.
    pub fn is_online(&self) -> bool {
        self.vote_key.is_some() || self.selection_key.is_some() || self.state_proof_key.is_some()
    }
}

/// Wire-level transaction body, tagged by the `type` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionBody {
    Payment(PaymentFields),
    AssetTransfer(AssetTransferFields),
    AssetConfig(AssetConfigFields),
    KeyRegistration(KeyRegistrationFields),
}

impl TransactionBody {
    /// The value written into the `type` field.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Payment(_) => "pay",
            Self::AssetTransfer(_) => "axfer",
            Self::AssetConfig(_) => "acfg",
            Self::KeyRegistration(_) => "keyreg",
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionKind
// ---------------------------------------------------------------------------

/// What a transaction *means* to the wallet user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Algo transfer between accounts.
    Payment,
    /// Zero-amount self-payment that changes the authorizing key.
    Rekey,
    /// Asset transfer between accounts.
    AssetTransfer,
    /// Zero-amount asset self-transfer that opts the sender in.
    AssetAccept,
    /// Zero-amount asset transfer that closes the holding out.
    AssetOptOut,
    /// Forced transfer by the asset's clawback account.
    AssetClawback,
    /// Asset creation, reconfiguration or destruction.
    AssetConfig,
    /// Consensus participation key (de)registration.
    KeyRegistration,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Payment => "Payment",
            Self::Rekey => "Rekey",
            Self::AssetTransfer => "AssetTransfer",
            Self::AssetAccept => "AssetAccept",
            Self::AssetOptOut => "AssetOptOut",
            Self::AssetClawback => "AssetClawback",
            Self::AssetConfig => "AssetConfig",
            Self::KeyRegistration => "KeyRegistration",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// UnsignedTransaction
// ---------------------------------------------------------------------------

/// A complete, unsigned transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub header: TransactionHeader,
    pub body: TransactionBody,
}

impl UnsignedTransaction {
    pub fn new(header: TransactionHeader, body: TransactionBody) -> Self {
        Self { header, body }
    }

    pub fn sender(&self) -> &Address {
        &self.header.sender
    }

    pub fn group(&self) -> Option<&Digest> {
        self.header.group.as_ref()
    }

    /// Classify the transaction the way the wallet presents it.
    pub fn kind(&self) -> TransactionKind {
        let sender = &self.header.sender;
        match &self.body {
            TransactionBody::Payment(pay) => {
                let self_payment = pay.amount == 0
                    && pay.receiver == *sender
                    && pay.close_remainder_to.is_none();
                if self_payment && self.header.rekey_to.is_some() {
                    TransactionKind::Rekey
                } else {
                    TransactionKind::Payment
                }
            }
            TransactionBody::AssetTransfer(axfer) => {
                if axfer.asset_sender.is_some() {
                    TransactionKind::AssetClawback
                } else if axfer.amount == 0 && axfer.close_remainder_to.is_some() {
                    TransactionKind::AssetOptOut
                } else if axfer.amount == 0 && axfer.receiver == *sender {
                    TransactionKind::AssetAccept
                } else {
                    TransactionKind::AssetTransfer
                }
            }
            TransactionBody::AssetConfig(_) => TransactionKind::AssetConfig,
            TransactionBody::KeyRegistration(_) => TransactionKind::KeyRegistration,
        }
    }
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// A transaction id: `SHA-512/256("TX" || encoded_unsigned_txn)`.
///
/// Displayed as 52 characters of unpadded base32.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxId(Digest);

impl TxId {
    pub fn from_bytes(bytes: Digest) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &Digest {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&BASE32_NOPAD.encode(&self.0))
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({})", self)
    }
}

/// An atomic group id. Displayed as standard base64, like the explorers do.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(Digest);

impl GroupId {
    pub fn from_bytes(bytes: Digest) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &Digest {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&BASE64.encode(self.0))
    }
}

impl fmt::Debug for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupId({})", self)
    }
}

// ---------------------------------------------------------------------------
// Encoded & signed forms
// ---------------------------------------------------------------------------

/// Canonical bytes of an unsigned transaction, as produced by
/// [`super::codec::encode`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EncodedTransaction(Vec<u8>);

impl EncodedTransaction {
    /// Wrap bytes that are already known to be a canonical encoding.
    /// Untrusted input should go through [`super::codec::decode`] first.
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

    /// Raw id digest, without base32 encoding.
    pub fn raw_tx_id(&self) -> Digest {
        hash_with_prefix(TX_DOMAIN_PREFIX, &self.0)
    }

    pub fn tx_id(&self) -> TxId {
        TxId(self.raw_tx_id())
    }
}

impl fmt::Debug for EncodedTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedTransaction({} bytes, id={})", self.0.len(), self.tx_id())
    }
}

impl AsRef<[u8]> for EncodedTransaction {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A transaction plus its detached signature.
///
/// `auth_address` is set when the key that signed is not the sender's own
/// key, i.e. the sender has been rekeyed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub transaction: EncodedTransaction,
    pub signature: Signature,
    pub auth_address: Option<Address>,
}

impl SignedTransaction {
    /// The id of the inner transaction. Signing never changes it.
    pub fn tx_id(&self) -> TxId {
        self.transaction.tx_id()
    }

    /// Network-submittable envelope bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, super::codec::EncodingError> {
        super::codec::encode_signed(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAINNET_PARAMS: &str = r#"{
        "consensus-version": "https://github.com/algorandfoundation/specs/tree/925a46433742afb0b51bb939354bd907fa88bf95",
        "fee": 0,
        "genesis-hash": "wGHE2Pwdvd7S12BL5FaOP20EGYesN73ktiC1qzkkit8=",
        "genesis-id": "mainnet-v1.0",
        "last-round": 36000000,
        "min-fee": 1000
    }"#;

    fn addr(byte: u8) -> Address {
        Address::from_public_key([byte; 32])
    }

    fn header(sender: Address) -> TransactionHeader {
        TransactionHeader {
            sender,
            ..TransactionHeader::default()
        }
    }

    #[test]
    fn params_from_algod_json() {
        let params = TransactionParams::from_json(MAINNET_PARAMS).unwrap();
        assert_eq!(params.fee, 0);
        assert_eq!(params.min_fee, 1000);
        assert_eq!(params.last_round, 36_000_000);
        assert_eq!(params.genesis_id, "mainnet-v1.0");
        assert_eq!(
            BASE64.encode(params.genesis_hash),
            "wGHE2Pwdvd7S12BL5FaOP20EGYesN73ktiC1qzkkit8="
        );
        assert!(params.consensus_version.is_some());
    }

    #[test]
    fn params_json_roundtrip() {
        let params = TransactionParams::from_json(MAINNET_PARAMS).unwrap();
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(TransactionParams::from_json(&json).unwrap(), params);
    }

    #[test]
    fn params_reject_short_genesis_hash() {
        let json = MAINNET_PARAMS.replace(
            "wGHE2Pwdvd7S12BL5FaOP20EGYesN73ktiC1qzkkit8=",
            "AAAA",
        );
        assert!(TransactionParams::from_json(&json).is_err());
    }

    #[test]
    fn payment_kind_classification() {
        let sender = addr(1);
        let pay = UnsignedTransaction::new(
            header(sender),
            TransactionBody::Payment(PaymentFields {
                receiver: addr(2),
                amount: 5,
                close_remainder_to: None,
            }),
        );
        assert_eq!(pay.kind(), TransactionKind::Payment);

        let mut rekey_header = header(sender);
        rekey_header.rekey_to = Some(addr(3));
        let rekey = UnsignedTransaction::new(
            rekey_header,
            TransactionBody::Payment(PaymentFields {
                receiver: sender,
                ..PaymentFields::default()
            }),
        );
        assert_eq!(rekey.kind(), TransactionKind::Rekey);
    }

    #[test]
    fn asset_kind_classification() {
        let sender = addr(1);
        let build = |fields: AssetTransferFields| {
            UnsignedTransaction::new(header(sender), TransactionBody::AssetTransfer(fields))
        };

        let accept = build(AssetTransferFields {
            asset_id: 10,
            receiver: sender,
            ..AssetTransferFields::default()
        });
        assert_eq!(accept.kind(), TransactionKind::AssetAccept);

        let opt_out = build(AssetTransferFields {
            asset_id: 10,
            receiver: addr(9),
            close_remainder_to: Some(addr(9)),
            ..AssetTransferFields::default()
        });
        assert_eq!(opt_out.kind(), TransactionKind::AssetOptOut);

        let clawback = build(AssetTransferFields {
            asset_id: 10,
            amount: 4,
            receiver: addr(5),
            asset_sender: Some(addr(6)),
            ..AssetTransferFields::default()
        });
        assert_eq!(clawback.kind(), TransactionKind::AssetClawback);

        let transfer = build(AssetTransferFields {
            asset_id: 10,
            amount: 4,
            receiver: addr(5),
            ..AssetTransferFields::default()
        });
        assert_eq!(transfer.kind(), TransactionKind::AssetTransfer);
    }

    #[test]
    fn type_tags() {
        assert_eq!(TransactionBody::Payment(PaymentFields::default()).type_tag(), "pay");
        assert_eq!(
            TransactionBody::KeyRegistration(KeyRegistrationFields::default()).type_tag(),
            "keyreg"
        );
    }

    #[test]
    fn tx_id_display_is_52_chars() {
        let encoded = EncodedTransaction::from_bytes(vec![0x80]);
        let id = encoded.tx_id().to_string();
        assert_eq!(id.len(), crate::config::TX_ID_STRING_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_uppercase() || ('2'..='7').contains(&c)));
    }

    #[test]
    fn kind_display() {
        assert_eq!(TransactionKind::AssetOptOut.to_string(), "AssetOptOut");
    }
}
