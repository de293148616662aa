//! Async JSON-RPC client.
//!
//! Every query accepts an optional commitment and falls back to the client's
//! default. Params are built by hand to match the node's JSON-RPC API.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use sol_core::{Hash, Message, Pubkey, Signature, Transaction};
use tokio::time::Instant;

use crate::commitment::CommitmentLevel;
use crate::config::RpcConfig;
use crate::error::RpcError;
use crate::options::{
    DataSlice, LargestAccountsFilter, RpcFilter, SignaturesForAddressOpts, TokenAccountsFilter, TxOpts,
    UiAccountEncoding,
};
use crate::request::{parse_batch_response, parse_response, RpcRequest, RpcResponse};
use crate::response::{
    EncodedConfirmedBlock, EncodedConfirmedTransaction, EpochInfo, EpochSchedule, RpcAccountBalance,
    RpcBlockCommitment, RpcBlockhash, RpcConfirmedTransactionStatusWithSignature, RpcContactInfo, RpcIdentity,
    RpcInflationGovernor, RpcInflationRate, RpcInflationReward, RpcKeyedAccount, RpcLeaderSchedule,
    RpcPerfSample, RpcSimulateTransactionResult, RpcStakeActivation, RpcSupply, RpcTokenAccountBalance,
    RpcVersionInfo, RpcVoteAccountStatus, TransactionStatus, UiAccount, UiTokenAmount,
};
use crate::transport::{HttpTransport, RpcTransport};

pub struct RpcClient<T: RpcTransport = HttpTransport> {
    transport: T,
    commitment: CommitmentLevel,
    next_id: AtomicU64,
    confirm_timeout: Duration,
    poll_interval: Duration,
}

impl RpcClient<HttpTransport> {
    /// Client for `endpoint` with default settings.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, RpcError> {
        Self::from_config(&RpcConfig::new(endpoint))
    }

    pub fn from_config(config: &RpcConfig) -> Result<Self, RpcError> {
        Ok(Self::with_transport(HttpTransport::new(config)?, config))
    }
}

fn commitment_config(commitment: CommitmentLevel) -> Map<String, Value> {
    let mut config = Map::new();
    config.insert("commitment".into(), json!(commitment));
    config
}

fn base64_encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

impl<T: RpcTransport> RpcClient<T> {
    pub fn with_transport(transport: T, config: &RpcConfig) -> Self {
        Self {
            transport,
            commitment: config.commitment,
            next_id: AtomicU64::new(1),
            confirm_timeout: Duration::from_secs(config.confirm_timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }

    pub fn commitment(&self) -> CommitmentLevel {
        self.commitment
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn commitment_or_default(&self, commitment: Option<CommitmentLevel>) -> CommitmentLevel {
        commitment.unwrap_or(self.commitment)
    }

    fn next_request_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Send one request and return its raw `result`.
    pub async fn call_raw(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_request_id();
        let request = RpcRequest::new(id, method, params);
        tracing::debug!(method, id, endpoint = self.transport.endpoint(), "rpc call");
        let body = serde_json::to_string(&request)?;
        let reply = self.transport.send(body).await?;
        parse_response(&reply, id).inspect_err(|e| {
            tracing::debug!(method, id, error = %e, "rpc call failed");
        })
    }

    /// Send one request and deserialize its `result`.
    pub async fn call<R: DeserializeOwned>(&self, method: &str, params: Value) -> Result<R, RpcError> {
        let result = self.call_raw(method, params).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Send several requests in one round trip. Results come back in the
    /// order of `calls`, each with its own success or error.
    pub async fn batch(&self, calls: Vec<(String, Value)>) -> Result<Vec<Result<Value, RpcError>>, RpcError> {
        if calls.is_empty() {
            return Ok(Vec::new());
        }
        let requests: Vec<RpcRequest> = calls
            .into_iter()
            .map(|(method, params)| RpcRequest::new(self.next_request_id(), method, params))
            .collect();
        let ids: Vec<u64> = requests.iter().map(|r| r.id).collect();
        tracing::debug!(
            count = requests.len(),
            endpoint = self.transport.endpoint(),
            "rpc batch"
        );
        let body = serde_json::to_string(&requests)?;
        let reply = self.transport.send(body).await?;
        parse_batch_response(&reply, &ids)
    }

    // -- Cluster ---------------------------------------------------------------

    /// `true` when the node reports itself healthy.
    pub async fn is_connected(&self) -> bool {
        match self.get_health().await {
            Ok(health) => health == "ok",
            Err(e) => {
                tracing::warn!(endpoint = self.transport.endpoint(), error = %e, "health check failed");
                false
            }
        }
    }

    pub async fn get_health(&self) -> Result<String, RpcError> {
        self.call("getHealth", json!([])).await
    }

    pub async fn get_version(&self) -> Result<RpcVersionInfo, RpcError> {
        self.call("getVersion", json!([])).await
    }

    pub async fn get_genesis_hash(&self) -> Result<Hash, RpcError> {
        self.call("getGenesisHash", json!([])).await
    }

    pub async fn get_identity(&self) -> Result<RpcIdentity, RpcError> {
        self.call("getIdentity", json!([])).await
    }

    pub async fn get_slot(&self, commitment: Option<CommitmentLevel>) -> Result<u64, RpcError> {
        let config = commitment_config(self.commitment_or_default(commitment));
        self.call("getSlot", json!([config])).await
    }

    pub async fn get_block_height(&self, commitment: Option<CommitmentLevel>) -> Result<u64, RpcError> {
        let config = commitment_config(self.commitment_or_default(commitment));
        self.call("getBlockHeight", json!([config])).await
    }

    pub async fn get_epoch_info(&self, commitment: Option<CommitmentLevel>) -> Result<EpochInfo, RpcError> {
        let config = commitment_config(self.commitment_or_default(commitment));
        self.call("getEpochInfo", json!([config])).await
    }

    pub async fn get_transaction_count(&self, commitment: Option<CommitmentLevel>) -> Result<u64, RpcError> {
        let config = commitment_config(self.commitment_or_default(commitment));
        self.call("getTransactionCount", json!([config])).await
    }

    pub async fn get_supply(&self, commitment: Option<CommitmentLevel>) -> Result<RpcResponse<RpcSupply>, RpcError> {
        let config = commitment_config(self.commitment_or_default(commitment));
        self.call("getSupply", json!([config])).await
    }

    pub async fn get_recent_performance_samples(&self, limit: Option<usize>) -> Result<Vec<RpcPerfSample>, RpcError> {
        let params = match limit {
            Some(limit) => json!([limit]),
            None => json!([]),
        };
        self.call("getRecentPerformanceSamples", params).await
    }

    pub async fn get_block_time(&self, slot: u64) -> Result<Option<i64>, RpcError> {
        self.call("getBlockTime", json!([slot])).await
    }

    pub async fn get_cluster_nodes(&self) -> Result<Vec<RpcContactInfo>, RpcError> {
        self.call("getClusterNodes", json!([])).await
    }

    pub async fn get_slot_leader(&self, commitment: Option<CommitmentLevel>) -> Result<Pubkey, RpcError> {
        let config = commitment_config(self.commitment_or_default(commitment));
        self.call("getSlotLeader", json!([config])).await
    }

    /// Leaders for `limit` slots starting at `start_slot`.
    pub async fn get_slot_leaders(&self, start_slot: u64, limit: u64) -> Result<Vec<Pubkey>, RpcError> {
        self.call("getSlotLeaders", json!([start_slot, limit])).await
    }

    /// Leader schedule for the epoch containing `slot`, or the current epoch
    /// when `slot` is `None`. `None` when the node has no schedule for it.
    pub async fn get_leader_schedule(
        &self,
        slot: Option<u64>,
        commitment: Option<CommitmentLevel>,
    ) -> Result<Option<RpcLeaderSchedule>, RpcError> {
        let config = commitment_config(self.commitment_or_default(commitment));
        self.call("getLeaderSchedule", json!([slot, config])).await
    }

    pub async fn get_epoch_schedule(&self) -> Result<EpochSchedule, RpcError> {
        self.call("getEpochSchedule", json!([])).await
    }

    pub async fn get_vote_accounts(&self, commitment: Option<CommitmentLevel>) -> Result<RpcVoteAccountStatus, RpcError> {
        let config = commitment_config(self.commitment_or_default(commitment));
        self.call("getVoteAccounts", json!([config])).await
    }

    pub async fn get_largest_accounts(
        &self,
        filter: Option<LargestAccountsFilter>,
        commitment: Option<CommitmentLevel>,
    ) -> Result<RpcResponse<Vec<RpcAccountBalance>>, RpcError> {
        let mut config = commitment_config(self.commitment_or_default(commitment));
        if let Some(filter) = filter {
            config.insert("filter".into(), json!(filter));
        }
        self.call("getLargestAccounts", json!([config])).await
    }

    /// Ask the node to shut down. Only honored by validators started with
    /// RPC exit enabled.
    pub async fn validator_exit(&self) -> Result<bool, RpcError> {
        let exiting: bool = self.call("validatorExit", json!([])).await?;
        tracing::warn!(endpoint = self.transport.endpoint(), exiting, "validator exit requested");
        Ok(exiting)
    }

    // -- Blocks --------------------------------------------------------------------

    /// A confirmed block with transactions in `json` encoding.
    pub async fn get_block(
        &self,
        slot: u64,
        commitment: Option<CommitmentLevel>,
        max_supported_transaction_version: Option<u8>,
    ) -> Result<EncodedConfirmedBlock, RpcError> {
        let mut config = commitment_config(self.commitment_or_default(commitment));
        config.insert("encoding".into(), json!("json"));
        if let Some(version) = max_supported_transaction_version {
            config.insert("maxSupportedTransactionVersion".into(), json!(version));
        }
        self.call("getBlock", json!([slot, config])).await
    }

    /// Confirmed slots from `start_slot` through `end_slot` (or the latest
    /// confirmed slot).
    pub async fn get_blocks(&self, start_slot: u64, end_slot: Option<u64>) -> Result<Vec<u64>, RpcError> {
        let params = match end_slot {
            Some(end_slot) => json!([start_slot, end_slot]),
            None => json!([start_slot]),
        };
        self.call("getBlocks", params).await
    }

    pub async fn get_block_commitment(&self, slot: u64) -> Result<RpcBlockCommitment, RpcError> {
        self.call("getBlockCommitment", json!([slot])).await
    }

    pub async fn get_first_available_block(&self) -> Result<u64, RpcError> {
        self.call("getFirstAvailableBlock", json!([])).await
    }

    pub async fn get_minimum_ledger_slot(&self) -> Result<u64, RpcError> {
        self.call("minimumLedgerSlot", json!([])).await
    }

    // -- Inflation and staking -----------------------------------------------------

    pub async fn get_inflation_governor(
        &self,
        commitment: Option<CommitmentLevel>,
    ) -> Result<RpcInflationGovernor, RpcError> {
        let config = commitment_config(self.commitment_or_default(commitment));
        self.call("getInflationGovernor", json!([config])).await
    }

    pub async fn get_inflation_rate(&self) -> Result<RpcInflationRate, RpcError> {
        self.call("getInflationRate", json!([])).await
    }

    /// Rewards paid to `addresses` in `epoch` (the previous epoch when
    /// `None`). Entries are `None` for addresses that earned nothing.
    pub async fn get_inflation_reward(
        &self,
        addresses: &[Pubkey],
        epoch: Option<u64>,
        commitment: Option<CommitmentLevel>,
    ) -> Result<Vec<Option<RpcInflationReward>>, RpcError> {
        let mut config = commitment_config(self.commitment_or_default(commitment));
        if let Some(epoch) = epoch {
            config.insert("epoch".into(), json!(epoch));
        }
        self.call("getInflationReward", json!([addresses, config])).await
    }

    pub async fn get_stake_activation(
        &self,
        stake_account: &Pubkey,
        epoch: Option<u64>,
        commitment: Option<CommitmentLevel>,
    ) -> Result<RpcStakeActivation, RpcError> {
        let mut config = commitment_config(self.commitment_or_default(commitment));
        if let Some(epoch) = epoch {
            config.insert("epoch".into(), json!(epoch));
        }
        self.call("getStakeActivation", json!([stake_account, config])).await
    }

    // -- Accounts ----------------------------------------------------------------

    pub async fn get_balance(
        &self,
        pubkey: &Pubkey,
        commitment: Option<CommitmentLevel>,
    ) -> Result<RpcResponse<u64>, RpcError> {
        let config = commitment_config(self.commitment_or_default(commitment));
        self.call("getBalance", json!([pubkey, config])).await
    }

    fn account_config(
        &self,
        commitment: Option<CommitmentLevel>,
        encoding: UiAccountEncoding,
        data_slice: Option<DataSlice>,
    ) -> Map<String, Value> {
        let mut config = commitment_config(self.commitment_or_default(commitment));
        config.insert("encoding".into(), json!(encoding));
        if let Some(slice) = data_slice {
            config.insert("dataSlice".into(), json!(slice));
        }
        config
    }

    pub async fn get_account_info(
        &self,
        pubkey: &Pubkey,
        commitment: Option<CommitmentLevel>,
        encoding: UiAccountEncoding,
        data_slice: Option<DataSlice>,
    ) -> Result<RpcResponse<Option<UiAccount>>, RpcError> {
        let config = self.account_config(commitment, encoding, data_slice);
        self.call("getAccountInfo", json!([pubkey, config])).await
    }

    /// Raw data of an account, or `None` if it does not exist.
    pub async fn get_account_data(
        &self,
        pubkey: &Pubkey,
        commitment: Option<CommitmentLevel>,
    ) -> Result<Option<Vec<u8>>, RpcError> {
        let response = self
            .get_account_info(pubkey, commitment, UiAccountEncoding::Base64, None)
            .await?;
        response.value.map(|account| account.decode_data()).transpose()
    }

    pub async fn get_multiple_accounts(
        &self,
        pubkeys: &[Pubkey],
        commitment: Option<CommitmentLevel>,
        encoding: UiAccountEncoding,
        data_slice: Option<DataSlice>,
    ) -> Result<RpcResponse<Vec<Option<UiAccount>>>, RpcError> {
        let config = self.account_config(commitment, encoding, data_slice);
        self.call("getMultipleAccounts", json!([pubkeys, config])).await
    }

    pub async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        commitment: Option<CommitmentLevel>,
        encoding: UiAccountEncoding,
        data_slice: Option<DataSlice>,
        filters: &[RpcFilter],
    ) -> Result<Vec<RpcKeyedAccount>, RpcError> {
        let mut config = self.account_config(commitment, encoding, data_slice);
        if !filters.is_empty() {
            config.insert("filters".into(), json!(filters));
        }
        self.call("getProgramAccounts", json!([program_id, config])).await
    }

    pub async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
        commitment: Option<CommitmentLevel>,
    ) -> Result<u64, RpcError> {
        let config = commitment_config(self.commitment_or_default(commitment));
        self.call("getMinimumBalanceForRentExemption", json!([data_len, config]))
            .await
    }

    pub async fn request_airdrop(
        &self,
        pubkey: &Pubkey,
        lamports: u64,
        commitment: Option<CommitmentLevel>,
    ) -> Result<Signature, RpcError> {
        let config = commitment_config(self.commitment_or_default(commitment));
        let signature: Option<Signature> = self
            .call("requestAirdrop", json!([pubkey, lamports, config]))
            .await?;
        signature.ok_or(RpcError::NoResult)
    }

    // -- Blockhashes and fees ------------------------------------------------------

    pub async fn get_latest_blockhash(
        &self,
        commitment: Option<CommitmentLevel>,
    ) -> Result<RpcResponse<RpcBlockhash>, RpcError> {
        let config = commitment_config(self.commitment_or_default(commitment));
        self.call("getLatestBlockhash", json!([config])).await
    }

    pub async fn is_blockhash_valid(
        &self,
        blockhash: &Hash,
        commitment: Option<CommitmentLevel>,
    ) -> Result<RpcResponse<bool>, RpcError> {
        let config = commitment_config(self.commitment_or_default(commitment));
        self.call("isBlockhashValid", json!([blockhash, config])).await
    }

    /// Fee in lamports the cluster would charge for `message`. `None` when
    /// the message's blockhash has expired.
    pub async fn get_fee_for_message(
        &self,
        message: &Message,
        commitment: Option<CommitmentLevel>,
    ) -> Result<RpcResponse<Option<u64>>, RpcError> {
        let config = commitment_config(self.commitment_or_default(commitment));
        let encoded = base64_encode(&message.serialize()?);
        self.call("getFeeForMessage", json!([encoded, config])).await
    }

    // -- Signatures and transactions -------------------------------------------------

    pub async fn get_signature_statuses(
        &self,
        signatures: &[Signature],
        search_transaction_history: bool,
    ) -> Result<RpcResponse<Vec<Option<TransactionStatus>>>, RpcError> {
        let params = if search_transaction_history {
            json!([signatures, {"searchTransactionHistory": true}])
        } else {
            json!([signatures])
        };
        self.call("getSignatureStatuses", params).await
    }

    pub async fn get_signatures_for_address(
        &self,
        address: &Pubkey,
        opts: &SignaturesForAddressOpts,
        commitment: Option<CommitmentLevel>,
    ) -> Result<Vec<RpcConfirmedTransactionStatusWithSignature>, RpcError> {
        let mut config = commitment_config(self.commitment_or_default(commitment));
        if let Some(before) = &opts.before {
            config.insert("before".into(), json!(before));
        }
        if let Some(until) = &opts.until {
            config.insert("until".into(), json!(until));
        }
        if let Some(limit) = opts.limit {
            config.insert("limit".into(), json!(limit));
        }
        self.call("getSignaturesForAddress", json!([address, config])).await
    }

    /// A confirmed transaction in `json` encoding, or `None` if the node
    /// does not know it.
    pub async fn get_transaction(
        &self,
        signature: &Signature,
        commitment: Option<CommitmentLevel>,
        max_supported_transaction_version: Option<u8>,
    ) -> Result<Option<EncodedConfirmedTransaction>, RpcError> {
        let mut config = commitment_config(self.commitment_or_default(commitment));
        config.insert("encoding".into(), json!("json"));
        if let Some(version) = max_supported_transaction_version {
            config.insert("maxSupportedTransactionVersion".into(), json!(version));
        }
        self.call("getTransaction", json!([signature, config])).await
    }

    // -- Tokens ------------------------------------------------------------------------

    pub async fn get_token_account_balance(
        &self,
        account: &Pubkey,
        commitment: Option<CommitmentLevel>,
    ) -> Result<RpcResponse<UiTokenAmount>, RpcError> {
        let config = commitment_config(self.commitment_or_default(commitment));
        self.call("getTokenAccountBalance", json!([account, config])).await
    }

    pub async fn get_token_supply(
        &self,
        mint: &Pubkey,
        commitment: Option<CommitmentLevel>,
    ) -> Result<RpcResponse<UiTokenAmount>, RpcError> {
        let config = commitment_config(self.commitment_or_default(commitment));
        self.call("getTokenSupply", json!([mint, config])).await
    }

    pub async fn get_token_largest_accounts(
        &self,
        mint: &Pubkey,
        commitment: Option<CommitmentLevel>,
    ) -> Result<RpcResponse<Vec<RpcTokenAccountBalance>>, RpcError> {
        let config = commitment_config(self.commitment_or_default(commitment));
        self.call("getTokenLargestAccounts", json!([mint, config])).await
    }

    pub async fn get_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        filter: &TokenAccountsFilter,
        commitment: Option<CommitmentLevel>,
        encoding: UiAccountEncoding,
    ) -> Result<RpcResponse<Vec<RpcKeyedAccount>>, RpcError> {
        let config = self.account_config(commitment, encoding, None);
        self.call("getTokenAccountsByOwner", json!([owner, filter, config]))
            .await
    }

    pub async fn get_token_accounts_by_delegate(
        &self,
        delegate: &Pubkey,
        filter: &TokenAccountsFilter,
        commitment: Option<CommitmentLevel>,
        encoding: UiAccountEncoding,
    ) -> Result<RpcResponse<Vec<RpcKeyedAccount>>, RpcError> {
        let config = self.account_config(commitment, encoding, None);
        self.call("getTokenAccountsByDelegate", json!([delegate, filter, config]))
            .await
    }

    // -- Submission ----------------------------------------------------------------------

    /// Submit a signed, serialized transaction. When `opts.skip_confirmation`
    /// is false this waits for `opts.preflight_commitment`.
    pub async fn send_raw_transaction(&self, tx: &[u8], opts: &TxOpts) -> Result<Signature, RpcError> {
        let mut config = Map::new();
        config.insert("encoding".into(), json!("base64"));
        config.insert("skipPreflight".into(), json!(opts.skip_preflight));
        config.insert("preflightCommitment".into(), json!(opts.preflight_commitment));
        if let Some(max_retries) = opts.max_retries {
            config.insert("maxRetries".into(), json!(max_retries));
        }

        let result = self
            .call_raw("sendTransaction", json!([base64_encode(tx), config]))
            .await?;
        let signature: Signature = match result {
            Value::String(s) if !s.is_empty() => s.parse()?,
            _ => return Err(RpcError::NoResult),
        };
        tracing::info!(
            endpoint = self.transport.endpoint(),
            %signature,
            "transaction sent"
        );

        if !opts.skip_confirmation {
            self.confirm_transaction(
                &signature,
                Some(opts.preflight_commitment),
                opts.last_valid_block_height,
            )
            .await?;
        }
        Ok(signature)
    }

    pub async fn send_transaction(&self, tx: &Transaction, opts: &TxOpts) -> Result<Signature, RpcError> {
        let wire = tx.serialize()?;
        self.send_raw_transaction(&wire, opts).await
    }

    /// Simulate `tx`. With `sig_verify` off the transaction may be unsigned.
    pub async fn simulate_transaction(
        &self,
        tx: &Transaction,
        sig_verify: bool,
        commitment: Option<CommitmentLevel>,
    ) -> Result<RpcResponse<RpcSimulateTransactionResult>, RpcError> {
        let wire = if sig_verify {
            tx.serialize()?
        } else {
            tx.serialize_unchecked()?
        };
        let mut config = commitment_config(self.commitment_or_default(commitment));
        config.insert("encoding".into(), json!("base64"));
        config.insert("sigVerify".into(), json!(sig_verify));
        self.call("simulateTransaction", json!([base64_encode(&wire), config]))
            .await
    }

    async fn signature_status(&self, signature: &Signature) -> Result<Option<TransactionStatus>, RpcError> {
        let response = self
            .get_signature_statuses(std::slice::from_ref(signature), false)
            .await?;
        Ok(response.value.into_iter().next().flatten())
    }

    /// `Some` once `status` reached `commitment`. A failed transaction that
    /// reached it is an error.
    fn settled(
        signature: &Signature,
        status: Option<TransactionStatus>,
        commitment: CommitmentLevel,
    ) -> Result<Option<TransactionStatus>, RpcError> {
        match status {
            Some(status) if status.satisfies_commitment(commitment) => match &status.err {
                Some(err) if !err.is_null() => Err(RpcError::TransactionFailed {
                    signature: signature.to_string(),
                    err: err.clone(),
                }),
                _ => Ok(Some(status)),
            },
            _ => Ok(None),
        }
    }

    /// Poll until `signature` reaches `commitment`.
    ///
    /// With `last_valid_block_height` polling stops once the chain passes
    /// that height. Without it polling stops after the configured
    /// confirmation timeout.
    pub async fn confirm_transaction(
        &self,
        signature: &Signature,
        commitment: Option<CommitmentLevel>,
        last_valid_block_height: Option<u64>,
    ) -> Result<TransactionStatus, RpcError> {
        let commitment = self.commitment_or_default(commitment);
        tracing::debug!(%signature, %commitment, ?last_valid_block_height, "confirming transaction");

        match last_valid_block_height {
            Some(last_valid) => {
                let mut block_height = self.get_block_height(Some(commitment)).await?;
                while block_height <= last_valid {
                    let status = self.signature_status(signature).await?;
                    if let Some(status) = Self::settled(signature, status, commitment)? {
                        tracing::info!(%signature, slot = status.slot, %commitment, "transaction confirmed");
                        return Ok(status);
                    }
                    tokio::time::sleep(self.poll_interval).await;
                    block_height = self.get_block_height(Some(commitment)).await?;
                }
                tracing::warn!(%signature, block_height, last_valid, "transaction expired");
                Err(RpcError::TransactionExpiredBlockheightExceeded(signature.to_string()))
            }
            None => {
                let deadline = Instant::now() + self.confirm_timeout;
                while Instant::now() < deadline {
                    let status = self.signature_status(signature).await?;
                    if let Some(status) = Self::settled(signature, status, commitment)? {
                        tracing::info!(%signature, slot = status.slot, %commitment, "transaction confirmed");
                        return Ok(status);
                    }
                    tokio::time::sleep(self.poll_interval).await;
                }
                tracing::warn!(%signature, timeout_secs = self.confirm_timeout.as_secs(), "confirmation timed out");
                Err(RpcError::UnconfirmedTransaction(signature.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use std::sync::Arc;

    fn client(mock: &Arc<MockTransport>) -> RpcClient<Arc<MockTransport>> {
        RpcClient::with_transport(Arc::clone(mock), &RpcConfig::new("http://localhost:8899"))
    }

    #[tokio::test]
    async fn request_ids_increase() {
        let mock = Arc::new(MockTransport::new().with_result("getSlot", json!(10)));
        let client = client(&mock);
        client.get_slot(None).await.unwrap();
        client.get_slot(None).await.unwrap();
        let ids: Vec<u64> = mock
            .requests()
            .iter()
            .map(|r| r["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn default_commitment_is_sent() {
        let mock = Arc::new(MockTransport::new().with_result("getBlockHeight", json!(77)));
        let client = client(&mock);
        assert_eq!(client.get_block_height(None).await.unwrap(), 77);
        client
            .get_block_height(Some(CommitmentLevel::Processed))
            .await
            .unwrap();
        let requests = mock.requests_for("getBlockHeight");
        assert_eq!(requests[0]["params"][0]["commitment"], "finalized");
        assert_eq!(requests[1]["params"][0]["commitment"], "processed");
    }

    #[tokio::test]
    async fn rpc_errors_surface() {
        let mock = Arc::new(MockTransport::new());
        mock.push_error("getHealth", -32005, "Node is unhealthy");
        let client = client(&mock);
        assert!(matches!(
            client.get_health().await,
            Err(RpcError::Rpc { code: -32005, .. })
        ));
        assert!(!client.is_connected().await);
    }

    #[tokio::test]
    async fn empty_send_result_is_no_result() {
        let mock = Arc::new(MockTransport::new().with_result("sendTransaction", json!(null)));
        let client = client(&mock);
        assert!(matches!(
            client.send_raw_transaction(&[1, 2, 3], &TxOpts::default()).await,
            Err(RpcError::NoResult)
        ));
    }

    #[tokio::test]
    async fn send_params_follow_opts() {
        let sig = Signature::default().to_string();
        let mock = Arc::new(MockTransport::new().with_result("sendTransaction", json!(sig)));
        let client = client(&mock);
        let opts = TxOpts {
            skip_preflight: true,
            preflight_commitment: CommitmentLevel::Confirmed,
            max_retries: Some(5),
            ..TxOpts::default()
        };
        client.send_raw_transaction(&[1, 2, 3], &opts).await.unwrap();

        let params = &mock.requests_for("sendTransaction")[0]["params"];
        assert_eq!(params[0], "AQID");
        assert_eq!(
            params[1],
            json!({
                "encoding": "base64",
                "skipPreflight": true,
                "preflightCommitment": "confirmed",
                "maxRetries": 5,
            })
        );
        assert_eq!(mock.call_count("getSignatureStatuses"), 0);
    }

    #[test]
    fn settled_status_rules() {
        let sig = Signature::default();
        let status = |level: &str, err: Value| -> Option<TransactionStatus> {
            serde_json::from_value(json!({
                "slot": 1, "confirmations": 0, "err": err, "confirmationStatus": level
            }))
            .unwrap()
        };

        assert!(RpcClient::<MockTransport>::settled(&sig, None, CommitmentLevel::Processed)
            .unwrap()
            .is_none());
        assert!(
            RpcClient::<MockTransport>::settled(&sig, status("processed", Value::Null), CommitmentLevel::Confirmed)
                .unwrap()
                .is_none()
        );
        assert!(
            RpcClient::<MockTransport>::settled(&sig, status("finalized", Value::Null), CommitmentLevel::Confirmed)
                .unwrap()
                .is_some()
        );
        assert!(matches!(
            RpcClient::<MockTransport>::settled(
                &sig,
                status("confirmed", json!({"InstructionError": [0, "Custom"]})),
                CommitmentLevel::Confirmed
            ),
            Err(RpcError::TransactionFailed { .. })
        ));
    }

    #[tokio::test]
    async fn empty_batch_sends_nothing() {
        let mock = Arc::new(MockTransport::new());
        let client = client(&mock);
        assert!(client.batch(Vec::new()).await.unwrap().is_empty());
        assert!(mock.requests().is_empty());
    }
}
