//! Core Solana types for the RPC client.
//!
//! This crate handles keys, addresses, program-derived addresses, message
//! compilation and the transaction wire format without pulling in
//! `solana-sdk`. The compact binary format is implemented by hand on top of
//! `ed25519-dalek` for signing and `bs58` for Base58 text forms.

pub mod error;
pub mod hash;
pub mod instruction;
pub mod keypair;
pub mod message;
pub mod pubkey;
pub mod shortvec;
pub mod signature;
pub mod transaction;

// Re-export key public types for ergonomic imports.
pub use error::SolError;
pub use hash::Hash;
pub use instruction::{AccountMeta, CompiledInstruction, Instruction};
pub use keypair::{Keypair, Signer};
pub use message::{Message, MessageHeader};
pub use pubkey::{validate_address, Pubkey};
pub use signature::Signature;
pub use transaction::{sign_raw_transaction, Transaction, PACKET_DATA_SIZE};

/// Native lamports per SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;
