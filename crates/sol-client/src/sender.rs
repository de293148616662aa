//! Build, sign, send and confirm transactions.

use sol_core::{Hash, Instruction, Message, Pubkey, Signature, Signer, SolError, Transaction};
use sol_programs::system_program;
use sol_rpc::{
    CommitmentLevel, RpcClient, RpcResponse, RpcSimulateTransactionResult, RpcTransport, TransactionStatus,
    TxOpts,
};

use crate::error::ClientError;
use crate::nonce::NonceInfo;

/// How a [`TransactionSender`] submits and confirms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Skip the node's simulation of the transaction.
    pub skip_preflight: bool,
    /// Level the node simulates at. `None` follows the confirmation level.
    pub preflight_commitment: Option<CommitmentLevel>,
    /// How often the node rebroadcasts the transaction.
    pub max_retries: Option<usize>,
    /// Level to confirm at. `None` uses the client's commitment.
    pub commitment: Option<CommitmentLevel>,
}

impl SendOptions {
    pub fn with_commitment(commitment: CommitmentLevel) -> Self {
        Self {
            commitment: Some(commitment),
            ..Self::default()
        }
    }
}

/// A signed transaction and the last block height its blockhash is valid
/// for. Durable-nonce transactions do not expire by height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltTransaction {
    pub transaction: Transaction,
    pub last_valid_block_height: Option<u64>,
}

impl BuiltTransaction {
    pub fn signature(&self) -> Option<&Signature> {
        self.transaction.signature()
    }
}

/// The payer first, then every other signer whose key has not been seen.
fn collect_signers<'s>(payer: &'s dyn Signer, signers: &[&'s dyn Signer]) -> Vec<&'s dyn Signer> {
    let mut seen = vec![payer.pubkey()];
    let mut out = vec![payer];
    for signer in signers {
        let key = signer.pubkey();
        if !seen.contains(&key) {
            seen.push(key);
            out.push(*signer);
        }
    }
    out
}

pub struct TransactionSender<'a, T: RpcTransport> {
    client: &'a RpcClient<T>,
    options: SendOptions,
}

impl<'a, T: RpcTransport> TransactionSender<'a, T> {
    pub fn new(client: &'a RpcClient<T>) -> Self {
        Self::with_options(client, SendOptions::default())
    }

    pub fn with_options(client: &'a RpcClient<T>, options: SendOptions) -> Self {
        Self { client, options }
    }

    pub fn client(&self) -> &'a RpcClient<T> {
        self.client
    }

    pub fn options(&self) -> &SendOptions {
        &self.options
    }

    fn commitment(&self) -> CommitmentLevel {
        self.options.commitment.unwrap_or_else(|| self.client.commitment())
    }

    async fn latest_blockhash(&self) -> Result<(Hash, u64), ClientError> {
        let response = self.client.get_latest_blockhash(Some(self.commitment())).await?;
        let blockhash = response.value;
        tracing::debug!(
            blockhash = %blockhash.blockhash,
            last_valid_block_height = blockhash.last_valid_block_height,
            slot = response.context.slot,
            "fetched latest blockhash"
        );
        Ok((blockhash.blockhash, blockhash.last_valid_block_height))
    }

    /// Compile `instructions` against the latest blockhash and sign with
    /// `payer` and `signers`. Repeated signers are signed once.
    pub async fn build_transaction(
        &self,
        instructions: &[Instruction],
        payer: &dyn Signer,
        signers: &[&dyn Signer],
    ) -> Result<BuiltTransaction, ClientError> {
        let (blockhash, last_valid_block_height) = self.latest_blockhash().await?;
        let transaction = Transaction::new_signed_with_payer(
            instructions,
            &payer.pubkey(),
            &collect_signers(payer, signers),
            blockhash,
        )?;
        tracing::debug!(
            payer = %payer.pubkey(),
            instructions = instructions.len(),
            %blockhash,
            "built transaction"
        );
        Ok(BuiltTransaction {
            transaction,
            last_valid_block_height: Some(last_valid_block_height),
        })
    }

    /// Build against a durable nonce: `advance_nonce_account` goes first and
    /// the stored nonce replaces the recent blockhash. The nonce authority
    /// must be `payer` or one of `signers`.
    pub fn build_with_nonce(
        &self,
        instructions: &[Instruction],
        payer: &dyn Signer,
        signers: &[&dyn Signer],
        nonce: &NonceInfo,
    ) -> Result<BuiltTransaction, ClientError> {
        let mut all = Vec::with_capacity(instructions.len() + 1);
        all.push(system_program::advance_nonce_account(
            &nonce.nonce_account,
            &nonce.nonce_authority,
        ));
        all.extend_from_slice(instructions);
        let transaction = Transaction::new_signed_with_payer(
            &all,
            &payer.pubkey(),
            &collect_signers(payer, signers),
            nonce.nonce,
        )?;
        tracing::debug!(
            payer = %payer.pubkey(),
            nonce_account = %nonce.nonce_account,
            nonce = %nonce.nonce,
            "built durable-nonce transaction"
        );
        Ok(BuiltTransaction {
            transaction,
            last_valid_block_height: None,
        })
    }

    fn tx_opts(&self) -> TxOpts {
        TxOpts {
            skip_confirmation: true,
            skip_preflight: self.options.skip_preflight,
            preflight_commitment: self.options.preflight_commitment.unwrap_or_else(|| self.commitment()),
            max_retries: self.options.max_retries,
            last_valid_block_height: None,
        }
    }

    /// Submit without waiting for confirmation.
    pub async fn send(&self, built: &BuiltTransaction) -> Result<Signature, ClientError> {
        Ok(self.client.send_transaction(&built.transaction, &self.tx_opts()).await?)
    }

    /// Submit and poll until the transaction reaches the configured
    /// commitment, bounded by its blockhash's last valid block height.
    pub async fn confirm_built(&self, built: &BuiltTransaction) -> Result<TransactionStatus, ClientError> {
        let signature = self.send(built).await?;
        let status = self
            .client
            .confirm_transaction(&signature, Some(self.commitment()), built.last_valid_block_height)
            .await?;
        tracing::info!(%signature, slot = status.slot, commitment = %self.commitment(), "transaction landed");
        Ok(status)
    }

    /// Build, send and confirm `instructions`.
    pub async fn send_and_confirm(
        &self,
        instructions: &[Instruction],
        payer: &dyn Signer,
        signers: &[&dyn Signer],
    ) -> Result<Signature, ClientError> {
        let built = self.build_transaction(instructions, payer, signers).await?;
        self.confirm_built(&built).await?;
        signature_of(&built)
    }

    /// Like [`Self::send_and_confirm`] with a durable nonce in place of a
    /// recent blockhash. Confirmation is bounded by the client's timeout.
    pub async fn send_and_confirm_with_nonce(
        &self,
        instructions: &[Instruction],
        payer: &dyn Signer,
        signers: &[&dyn Signer],
        nonce: &NonceInfo,
    ) -> Result<Signature, ClientError> {
        let built = self.build_with_nonce(instructions, payer, signers, nonce)?;
        self.confirm_built(&built).await?;
        signature_of(&built)
    }

    async fn unsigned_message(&self, instructions: &[Instruction], payer: &Pubkey) -> Result<Message, ClientError> {
        let (blockhash, _) = self.latest_blockhash().await?;
        Ok(Message::compile(instructions, payer, blockhash)?)
    }

    /// Simulate `instructions` without signing them.
    pub async fn simulate(
        &self,
        instructions: &[Instruction],
        payer: &Pubkey,
    ) -> Result<RpcResponse<RpcSimulateTransactionResult>, ClientError> {
        let message = self.unsigned_message(instructions, payer).await?;
        let transaction = Transaction::new_unsigned(message);
        let response = self
            .client
            .simulate_transaction(&transaction, false, Some(self.commitment()))
            .await?;
        tracing::debug!(
            slot = response.context.slot,
            units_consumed = ?response.value.units_consumed,
            failed = response.value.err.is_some(),
            "simulated transaction"
        );
        Ok(response)
    }

    /// Fee in lamports for `instructions` paid by `payer`.
    pub async fn estimate_fee(&self, instructions: &[Instruction], payer: &Pubkey) -> Result<u64, ClientError> {
        let message = self.unsigned_message(instructions, payer).await?;
        let response = self
            .client
            .get_fee_for_message(&message, Some(self.commitment()))
            .await?;
        response
            .value
            .ok_or_else(|| ClientError::FeeUnavailable(message.recent_blockhash().to_string()))
    }
}

fn signature_of(built: &BuiltTransaction) -> Result<Signature, ClientError> {
    built
        .signature()
        .copied()
        .ok_or_else(|| SolError::SigningError("transaction has no signatures".into()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sol_core::Keypair;

    #[test]
    fn payer_comes_first_and_duplicates_drop() {
        let payer = Keypair::from_seed(&[1u8; 32]);
        let other = Keypair::from_seed(&[2u8; 32]);
        let signers = collect_signers(&payer, &[&other, &payer, &other]);
        let keys: Vec<_> = signers.iter().map(|s| s.pubkey()).collect();
        assert_eq!(keys, vec![payer.pubkey(), other.pubkey()]);
    }

    #[test]
    fn preflight_follows_confirmation_level() {
        let client = RpcClient::with_transport(
            sol_rpc::mock::MockTransport::new(),
            &sol_rpc::RpcConfig::new("mock").with_commitment(CommitmentLevel::Processed),
        );
        let sender = TransactionSender::new(&client);
        assert_eq!(sender.tx_opts().preflight_commitment, CommitmentLevel::Processed);

        let sender = TransactionSender::with_options(&client, SendOptions::with_commitment(CommitmentLevel::Confirmed));
        assert_eq!(sender.tx_opts().preflight_commitment, CommitmentLevel::Confirmed);

        let explicit = SendOptions {
            preflight_commitment: Some(CommitmentLevel::Finalized),
            skip_preflight: true,
            max_retries: Some(3),
            commitment: Some(CommitmentLevel::Confirmed),
        };
        let opts = TransactionSender::with_options(&client, explicit).tx_opts();
        assert_eq!(opts.preflight_commitment, CommitmentLevel::Finalized);
        assert!(opts.skip_preflight);
        assert!(opts.skip_confirmation);
        assert_eq!(opts.max_retries, Some(3));
    }
}
