//! Typed RPC results.

use std::collections::HashMap;

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sol_core::{Hash, Pubkey, Signature};

use crate::commitment::CommitmentLevel;
use crate::error::RpcError;
use crate::options::UiAccountEncoding;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiAccount {
    pub lamports: u64,
    pub data: UiAccountData,
    pub owner: Pubkey,
    pub executable: bool,
    pub rent_epoch: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<u64>,
}

impl UiAccount {
    pub fn decode_data(&self) -> Result<Vec<u8>, RpcError> {
        self.data.decode()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedAccount {
    pub program: String,
    pub parsed: Value,
    pub space: u64,
}

/// Account data as returned by the node for the requested encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UiAccountData {
    /// Bare base58 string from the legacy `binary` encoding.
    LegacyBinary(String),
    Json(ParsedAccount),
    /// `[data, encoding]`
    Binary(String, UiAccountEncoding),
}

impl UiAccountData {
    /// Raw account bytes. `jsonParsed` and compressed data cannot be
    /// decoded back to bytes.
    pub fn decode(&self) -> Result<Vec<u8>, RpcError> {
        match self {
            Self::LegacyBinary(s) | Self::Binary(s, UiAccountEncoding::Binary | UiAccountEncoding::Base58) => {
                bs58::decode(s)
                    .into_vec()
                    .map_err(|e| RpcError::InvalidResponse(format!("bad base58 account data: {e}")))
            }
            Self::Binary(s, UiAccountEncoding::Base64) => base64::engine::general_purpose::STANDARD
                .decode(s)
                .map_err(|e| RpcError::InvalidResponse(format!("bad base64 account data: {e}"))),
            Self::Binary(_, encoding) => Err(RpcError::InvalidResponse(format!(
                "cannot decode {encoding:?} account data"
            ))),
            Self::Json(_) => Err(RpcError::InvalidResponse(
                "cannot decode jsonParsed account data".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcKeyedAccount {
    pub pubkey: Pubkey,
    pub account: UiAccount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlockhash {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatus {
    pub slot: u64,
    /// `None` once the block is rooted.
    pub confirmations: Option<usize>,
    pub err: Option<Value>,
    #[serde(default)]
    pub confirmation_status: Option<CommitmentLevel>,
}

impl TransactionStatus {
    /// Nodes that predate `confirmationStatus` only report confirmations,
    /// where `None` means rooted.
    pub fn confirmation_level(&self) -> CommitmentLevel {
        match (self.confirmation_status, self.confirmations) {
            (Some(level), _) => level,
            (None, None) => CommitmentLevel::Finalized,
            (None, Some(_)) => CommitmentLevel::Processed,
        }
    }

    pub fn satisfies_commitment(&self, commitment: CommitmentLevel) -> bool {
        self.confirmation_level() >= commitment
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcConfirmedTransactionStatusWithSignature {
    pub signature: Signature,
    pub slot: u64,
    pub err: Option<Value>,
    pub memo: Option<String>,
    pub block_time: Option<i64>,
    #[serde(default)]
    pub confirmation_status: Option<CommitmentLevel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochInfo {
    pub epoch: u64,
    pub slot_index: u64,
    pub slots_in_epoch: u64,
    pub absolute_slot: u64,
    pub block_height: u64,
    #[serde(default)]
    pub transaction_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcVersionInfo {
    #[serde(rename = "solana-core")]
    pub solana_core: String,
    #[serde(rename = "feature-set", default)]
    pub feature_set: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcIdentity {
    pub identity: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcSimulateTransactionResult {
    pub err: Option<Value>,
    pub logs: Option<Vec<String>>,
    #[serde(default)]
    pub accounts: Option<Vec<Option<UiAccount>>>,
    #[serde(default)]
    pub units_consumed: Option<u64>,
    #[serde(default)]
    pub return_data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiTokenAmount {
    pub ui_amount: Option<f64>,
    pub decimals: u8,
    /// Raw amount in base units.
    pub amount: String,
    #[serde(default)]
    pub ui_amount_string: String,
}

impl UiTokenAmount {
    pub fn amount_u64(&self) -> Result<u64, RpcError> {
        self.amount
            .parse()
            .map_err(|e| RpcError::InvalidResponse(format!("bad token amount {:?}: {e}", self.amount)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTokenAccountBalance {
    pub address: Pubkey,
    #[serde(flatten)]
    pub amount: UiTokenAmount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcSupply {
    pub total: u64,
    pub circulating: u64,
    pub non_circulating: u64,
    #[serde(default)]
    pub non_circulating_accounts: Vec<Pubkey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcPerfSample {
    pub slot: u64,
    pub num_transactions: u64,
    pub num_slots: u64,
    pub sample_period_secs: u16,
    #[serde(default)]
    pub num_non_vote_transactions: Option<u64>,
}

/// A confirmed transaction. The transaction and its meta are kept as JSON
/// since their shape depends on the requested encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedConfirmedTransaction {
    pub slot: u64,
    #[serde(default)]
    pub block_time: Option<i64>,
    pub transaction: Value,
    #[serde(default)]
    pub meta: Option<Value>,
    #[serde(default)]
    pub version: Option<Value>,
}

/// A confirmed block with its transactions in `json` encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedConfirmedBlock {
    pub previous_blockhash: Hash,
    pub blockhash: Hash,
    pub parent_slot: u64,
    #[serde(default)]
    pub transactions: Vec<Value>,
    #[serde(default)]
    pub rewards: Vec<RpcReward>,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub block_height: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReward {
    pub pubkey: Pubkey,
    pub lamports: i64,
    pub post_balance: u64,
    #[serde(default)]
    pub reward_type: Option<String>,
    #[serde(default)]
    pub commission: Option<u8>,
}

/// Stake voted on a block, indexed by lockout depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlockCommitment {
    pub commitment: Option<Vec<u64>>,
    pub total_stake: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcContactInfo {
    pub pubkey: Pubkey,
    pub gossip: Option<String>,
    pub tpu: Option<String>,
    pub rpc: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub feature_set: Option<u32>,
    #[serde(default)]
    pub shred_version: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochSchedule {
    pub slots_per_epoch: u64,
    pub leader_schedule_slot_offset: u64,
    pub warmup: bool,
    pub first_normal_epoch: u64,
    pub first_normal_slot: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcInflationGovernor {
    pub initial: f64,
    pub terminal: f64,
    pub taper: f64,
    pub foundation: f64,
    pub foundation_term: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RpcInflationRate {
    pub total: f64,
    pub validator: f64,
    pub foundation: f64,
    pub epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcInflationReward {
    pub epoch: u64,
    pub effective_slot: u64,
    pub amount: u64,
    pub post_balance: u64,
    #[serde(default)]
    pub commission: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcAccountBalance {
    pub address: Pubkey,
    pub lamports: u64,
}

/// Slot indexes within the epoch, keyed by validator identity.
pub type RpcLeaderSchedule = HashMap<Pubkey, Vec<u64>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcVoteAccountInfo {
    pub vote_pubkey: Pubkey,
    pub node_pubkey: Pubkey,
    pub activated_stake: u64,
    pub commission: u8,
    pub epoch_vote_account: bool,
    /// `(epoch, credits, previous_credits)` for recent epochs.
    pub epoch_credits: Vec<(u64, u64, u64)>,
    pub last_vote: u64,
    #[serde(default)]
    pub root_slot: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcVoteAccountStatus {
    pub current: Vec<RpcVoteAccountInfo>,
    pub delinquent: Vec<RpcVoteAccountInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StakeActivationState {
    Activating,
    Active,
    Deactivating,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcStakeActivation {
    pub state: StakeActivationState,
    pub active: u64,
    pub inactive: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn account_json(data: Value) -> Value {
        json!({
            "lamports": 1_000_000_000u64,
            "data": data,
            "owner": "11111111111111111111111111111111",
            "executable": false,
            "rentEpoch": 18_446_744_073_709_551_615u64,
            "space": 3
        })
    }

    #[test]
    fn base64_account_data_decodes() {
        let account: UiAccount = serde_json::from_value(account_json(json!(["AQID", "base64"]))).unwrap();
        assert_eq!(account.decode_data().unwrap(), vec![1, 2, 3]);
        assert_eq!(account.rent_epoch, u64::MAX);
        assert_eq!(account.space, Some(3));
    }

    #[test]
    fn base58_and_legacy_data_decode() {
        let account: UiAccount = serde_json::from_value(account_json(json!(["Ldp", "base58"]))).unwrap();
        assert_eq!(account.decode_data().unwrap(), vec![1, 2, 3]);
        let legacy: UiAccount = serde_json::from_value(account_json(json!("Ldp"))).unwrap();
        assert_eq!(legacy.decode_data().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn parsed_data_is_not_decodable() {
        let account: UiAccount = serde_json::from_value(account_json(json!({
            "program": "spl-token",
            "parsed": {"type": "account"},
            "space": 165
        })))
        .unwrap();
        assert!(matches!(account.data, UiAccountData::Json(_)));
        assert!(account.decode_data().is_err());
    }

    #[test]
    fn status_levels() {
        let status: TransactionStatus = serde_json::from_value(json!({
            "slot": 5,
            "confirmations": 3,
            "err": null,
            "confirmationStatus": "confirmed"
        }))
        .unwrap();
        assert!(status.satisfies_commitment(CommitmentLevel::Processed));
        assert!(status.satisfies_commitment(CommitmentLevel::Confirmed));
        assert!(!status.satisfies_commitment(CommitmentLevel::Finalized));

        let rooted: TransactionStatus =
            serde_json::from_value(json!({"slot": 5, "confirmations": null, "err": null})).unwrap();
        assert_eq!(rooted.confirmation_level(), CommitmentLevel::Finalized);
    }

    #[test]
    fn token_amount_parses() {
        let amount: UiTokenAmount = serde_json::from_value(json!({
            "amount": "9864",
            "decimals": 2,
            "uiAmount": 98.64,
            "uiAmountString": "98.64"
        }))
        .unwrap();
        assert_eq!(amount.amount_u64().unwrap(), 9864);
    }

    #[test]
    fn largest_account_flattens_amount() {
        let balance: RpcTokenAccountBalance = serde_json::from_value(json!({
            "address": "11111111111111111111111111111111",
            "amount": "771",
            "decimals": 2,
            "uiAmount": 7.71,
            "uiAmountString": "7.71"
        }))
        .unwrap();
        assert_eq!(balance.amount.amount, "771");
    }

    #[test]
    fn version_info_uses_dashed_keys() {
        let version: RpcVersionInfo =
            serde_json::from_value(json!({"solana-core": "1.18.22", "feature-set": 4215500110u32})).unwrap();
        assert_eq!(version.solana_core, "1.18.22");
        assert_eq!(version.feature_set, Some(4_215_500_110));
    }

    #[test]
    fn leader_schedule_keys_parse_as_pubkeys() {
        let schedule: RpcLeaderSchedule = serde_json::from_value(json!({
            "4Qkev8aNZcqFNSRhQzwyLMFSsi94jHqE8WNVTJzTP99F": [0, 1, 2]
        }))
        .unwrap();
        let leader: Pubkey = "4Qkev8aNZcqFNSRhQzwyLMFSsi94jHqE8WNVTJzTP99F".parse().unwrap();
        assert_eq!(schedule[&leader], vec![0, 1, 2]);
    }

    #[test]
    fn vote_account_credits_are_triples() {
        let status: RpcVoteAccountStatus = serde_json::from_value(json!({
            "current": [{
                "commission": 0,
                "epochVoteAccount": true,
                "epochCredits": [[1, 64, 0], [2, 192, 64]],
                "nodePubkey": "B97CCUW3AEZFGy6uUg6zUdnNYvnVq5VG8PUtb2HayTDD",
                "lastVote": 147,
                "activatedStake": 42,
                "votePubkey": "3ZT31jkAGhUaw8jsy4bTknwBMP8i4Eueh52By4zXcsVw"
            }],
            "delinquent": []
        }))
        .unwrap();
        assert_eq!(status.current[0].epoch_credits[1], (2, 192, 64));
        assert_eq!(status.current[0].root_slot, 0);
        assert!(status.delinquent.is_empty());
    }
}
