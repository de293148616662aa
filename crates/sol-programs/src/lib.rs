//! Instruction builders and decoders for the native and SPL programs.
//!
//! Covers the System, Stake, Vote, SPL Token (and Token-2022), Associated
//! Token Account, Memo and Compute Budget programs, plus the well-known
//! sysvar ids.
//! Instruction data is encoded by hand, so no program crates are needed.

mod data;

pub mod associated_token;
pub mod compute_budget;
pub mod error;
pub mod memo;
pub mod spl_token;
pub mod stake_program;
pub mod system_program;
pub mod sysvar;
pub mod vote_program;

// Re-export key public types for ergonomic imports.
pub use compute_budget::ComputeBudgetInstruction;
pub use error::ProgramError;
pub use spl_token::{AccountState, AuthorityType, Mint, TokenAccount, TokenInstruction};
pub use stake_program::{Authorized, Lockup, StakeInstruction};
pub use system_program::{NonceAccount, NonceState, SystemInstruction};
pub use vote_program::VoteInstruction;
