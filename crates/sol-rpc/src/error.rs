use serde_json::Value;
use sol_core::SolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("http status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("request timed out")]
    Timeout,

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rpc error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    #[error("rpc response carried no result")]
    NoResult,

    #[error("unable to confirm transaction {0}")]
    UnconfirmedTransaction(String),

    #[error("{0} has expired: block height exceeded")]
    TransactionExpiredBlockheightExceeded(String),

    #[error("transaction {signature} failed: {err}")]
    TransactionFailed { signature: String, err: Value },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Sol(#[from] SolError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RpcError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),
}
