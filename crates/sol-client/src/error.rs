use sol_core::{Pubkey, SolError};
use sol_programs::ProgramError;
use sol_rpc::RpcError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Sol(#[from] SolError),

    #[error(transparent)]
    Program(#[from] ProgramError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("account {0} not found")]
    AccountNotFound(Pubkey),

    #[error("invalid account data: {0}")]
    InvalidAccountData(String),

    #[error("fee unavailable: blockhash {0} has expired")]
    FeeUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_convert() {
        let err: ClientError = RpcError::NoResult.into();
        assert!(matches!(err, ClientError::Rpc(RpcError::NoResult)));
        let err: ClientError = ProgramError::InvalidArgument("m".into()).into();
        assert!(matches!(err, ClientError::Program(_)));
        let err: ClientError = SolError::SigningError("s".into()).into();
        assert_eq!(err.to_string(), "signing error: s");
    }

    #[test]
    fn display_account_not_found() {
        let err = ClientError::AccountNotFound(Pubkey::default());
        assert_eq!(err.to_string(), "account 11111111111111111111111111111111 not found");
    }
}
