use sol_core::{Pubkey, SolError};
use thiserror::Error;

/// Errors raised while building or decoding program instructions.
#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("invalid program id: expected {expected}, got {actual}")]
    InvalidProgramId { expected: Pubkey, actual: Pubkey },

    #[error("invalid instruction data: {0}")]
    InvalidInstructionData(String),

    #[error("not enough accounts: expected at least {expected}, got {actual}")]
    NotEnoughAccounts { expected: usize, actual: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Sol(#[from] SolError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_enough_accounts_display() {
        let err = ProgramError::NotEnoughAccounts {
            expected: 3,
            actual: 1,
        };
        assert_eq!(err.to_string(), "not enough accounts: expected at least 3, got 1");
    }

    #[test]
    fn sol_error_is_transparent() {
        let err: ProgramError = SolError::InvalidSeeds("too long".into()).into();
        assert_eq!(err.to_string(), "invalid seeds: too long");
    }
}
