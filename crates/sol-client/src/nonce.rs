//! Durable transaction nonces.
//!
//! A nonce account stores a blockhash that stays valid until the account is
//! advanced. Transactions built against it carry `advance_nonce_account` as
//! their first instruction and the stored nonce as their blockhash.

use sol_core::{Hash, Pubkey};
use sol_programs::system_program::{self, NonceAccount};
pub use sol_programs::system_program::{NonceData, NonceState, NonceVersion};
use sol_rpc::{CommitmentLevel, RpcClient, RpcTransport};

use crate::error::ClientError;

/// Where a durable-nonce transaction gets its blockhash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonceInfo {
    pub nonce_account: Pubkey,
    pub nonce_authority: Pubkey,
    pub nonce: Hash,
}

fn invalid(msg: impl Into<String>) -> ClientError {
    ClientError::InvalidAccountData(msg.into())
}

/// Decode the nonce account state held in `data`.
pub fn parse_nonce_account(data: &[u8]) -> Result<(NonceVersion, NonceState), ClientError> {
    let account = NonceAccount::unpack(data).map_err(|e| invalid(e.to_string()))?;
    Ok((account.version, account.state))
}

/// Fetch `nonce_account` and return its current nonce.
pub async fn fetch_nonce_info<T: RpcTransport>(
    client: &RpcClient<T>,
    nonce_account: &Pubkey,
    commitment: Option<CommitmentLevel>,
) -> Result<NonceInfo, ClientError> {
    let response = client
        .get_account_info(nonce_account, commitment, sol_rpc::UiAccountEncoding::Base64, None)
        .await?;
    let account = response
        .value
        .ok_or(ClientError::AccountNotFound(*nonce_account))?;
    if account.owner != system_program::ID {
        return Err(invalid(format!(
            "nonce account {nonce_account} is owned by {}",
            account.owner
        )));
    }
    let data = account.decode_data()?;
    let (_, state) = parse_nonce_account(&data)?;
    let nonce = state
        .data()
        .ok_or_else(|| invalid(format!("nonce account {nonce_account} is not initialized")))?;
    tracing::debug!(%nonce_account, nonce = %nonce.durable_nonce, "fetched durable nonce");
    Ok(NonceInfo {
        nonce_account: *nonce_account,
        nonce_authority: nonce.authority,
        nonce: nonce.durable_nonce,
    })
}
