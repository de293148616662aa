//! Request option types.

use serde::{Deserialize, Serialize};
use sol_core::{Pubkey, Signature};

use crate::commitment::CommitmentLevel;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiAccountEncoding {
    #[serde(rename = "binary")]
    Binary,
    #[serde(rename = "base58")]
    Base58,
    #[default]
    #[serde(rename = "base64")]
    Base64,
    #[serde(rename = "jsonParsed")]
    JsonParsed,
    #[serde(rename = "base64+zstd")]
    Base64Zstd,
}

/// Return only `length` bytes of account data starting at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSlice {
    pub offset: usize,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memcmp {
    pub offset: usize,
    /// Base58 encoded bytes to compare against.
    pub bytes: String,
}

impl Memcmp {
    pub fn new_base58_encoded(offset: usize, bytes: &[u8]) -> Self {
        Self {
            offset,
            bytes: bs58::encode(bytes).into_string(),
        }
    }
}

/// `getProgramAccounts` filter. Serializes as `{"dataSize": n}` or
/// `{"memcmp": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RpcFilter {
    DataSize(u64),
    Memcmp(Memcmp),
}

/// Serializes as `{"mint": key}` or `{"programId": key}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenAccountsFilter {
    Mint(Pubkey),
    ProgramId(Pubkey),
}

/// Which accounts `getLargestAccounts` ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LargestAccountsFilter {
    Circulating,
    NonCirculating,
}

/// Options for sending a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOpts {
    /// Return as soon as the node accepts the transaction.
    pub skip_confirmation: bool,
    /// Skip the node's simulation of the transaction.
    pub skip_preflight: bool,
    /// Commitment for preflight, and for confirmation when it runs.
    pub preflight_commitment: CommitmentLevel,
    /// How often the node rebroadcasts the transaction.
    pub max_retries: Option<usize>,
    /// Bounds confirmation polling when known.
    pub last_valid_block_height: Option<u64>,
}

impl Default for TxOpts {
    fn default() -> Self {
        Self {
            skip_confirmation: true,
            skip_preflight: false,
            preflight_commitment: CommitmentLevel::Finalized,
            max_retries: None,
            last_valid_block_height: None,
        }
    }
}

impl TxOpts {
    pub fn confirmed(preflight_commitment: CommitmentLevel) -> Self {
        Self {
            skip_confirmation: false,
            preflight_commitment,
            ..Self::default()
        }
    }
}

/// Paging for `getSignaturesForAddress`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignaturesForAddressOpts {
    pub before: Option<Signature>,
    pub until: Option<Signature>,
    pub limit: Option<usize>,
}
