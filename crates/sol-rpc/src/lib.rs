//! JSON-RPC client for a Solana node.
//!
//! [`RpcClient`] is generic over its [`RpcTransport`]: [`HttpTransport`]
//! talks to a real node over HTTP, [`mock::MockTransport`] answers from
//! scripted replies for tests.

pub mod backoff;
pub mod client;
pub mod commitment;
pub mod config;
pub mod error;
pub mod mock;
pub mod options;
pub mod request;
pub mod response;
pub mod transport;

// Re-export key public types for ergonomic imports.
pub use client::RpcClient;
pub use commitment::CommitmentLevel;
pub use config::{load_config, RpcConfig};
pub use error::{ConfigError, RpcError};
pub use options::{
    DataSlice, LargestAccountsFilter, Memcmp, RpcFilter, SignaturesForAddressOpts, TokenAccountsFilter, TxOpts,
    UiAccountEncoding,
};
pub use request::{RpcResponse, RpcResponseContext};
pub use response::{
    EncodedConfirmedBlock, EncodedConfirmedTransaction, EpochInfo, EpochSchedule, RpcAccountBalance,
    RpcBlockCommitment, RpcBlockhash, RpcConfirmedTransactionStatusWithSignature, RpcContactInfo, RpcIdentity,
    RpcInflationGovernor, RpcInflationRate, RpcInflationReward, RpcKeyedAccount, RpcLeaderSchedule,
    RpcPerfSample, RpcReward, RpcSimulateTransactionResult, RpcStakeActivation, RpcSupply,
    RpcTokenAccountBalance, RpcVersionInfo, RpcVoteAccountInfo, RpcVoteAccountStatus, StakeActivationState,
    TransactionStatus, UiAccount, UiAccountData, UiTokenAmount,
};
pub use transport::{HttpTransport, RpcTransport};
