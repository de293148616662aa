//! End-to-end Solana client workflows.
//!
//! [`TransactionSender`] turns instructions into a confirmed transaction:
//! fetch a blockhash (or use a durable nonce), compile, sign, send, and poll
//! until the requested commitment. [`TokenClient`] wraps the SPL Token
//! program on top of it.

pub mod cluster;
pub mod error;
pub mod logging;
pub mod nonce;
pub mod sender;
pub mod token;

// Re-export key public types for ergonomic imports.
pub use cluster::{cluster_api_url, Cluster};
pub use error::ClientError;
pub use logging::init_tracing;
pub use nonce::{fetch_nonce_info, parse_nonce_account, NonceInfo, NonceState};
pub use sender::{BuiltTransaction, SendOptions, TransactionSender};
pub use token::{Authority, TokenClient};
