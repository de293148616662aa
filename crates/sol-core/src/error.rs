use thiserror::Error;

/// Errors raised while handling keys, messages and transactions.
#[derive(Debug, Error)]
pub enum SolError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid seeds: {0}")]
    InvalidSeeds(String),

    #[error("message compile error: {0}")]
    MessageCompileError(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("transaction too large: {size} bytes (max {max})")]
    TransactionTooLarge { size: usize, max: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_private_key() {
        let err = SolError::InvalidPrivateKey("key too short".into());
        assert_eq!(err.to_string(), "invalid private key: key too short");
    }

    #[test]
    fn display_invalid_seeds() {
        let err = SolError::InvalidSeeds("seed longer than 32 bytes".into());
        assert_eq!(err.to_string(), "invalid seeds: seed longer than 32 bytes");
    }

    #[test]
    fn display_message_compile_error() {
        let err = SolError::MessageCompileError("no instructions provided".into());
        assert_eq!(
            err.to_string(),
            "message compile error: no instructions provided"
        );
    }

    #[test]
    fn display_transaction_too_large() {
        let err = SolError::TransactionTooLarge {
            size: 1500,
            max: 1232,
        };
        assert_eq!(
            err.to_string(),
            "transaction too large: 1500 bytes (max 1232)"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing keypair");
        let err: SolError = io.into();
        assert!(err.to_string().contains("missing keypair"));
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> =
            Box::new(SolError::SigningError("test".into()));
        assert!(err.to_string().contains("test"));
    }
}
