//! Program instructions, before and after compilation into a message.

use crate::pubkey::Pubkey;

/// An account referenced by an instruction, with its access flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    /// A writable account.
    pub fn new(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    /// A read-only account.
    pub fn new_readonly(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// A single call into an on-chain program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

impl Instruction {
    pub fn new_with_bytes(program_id: Pubkey, data: &[u8], accounts: Vec<AccountMeta>) -> Self {
        Self {
            program_id,
            accounts,
            data: data.to_vec(),
        }
    }
}

/// An instruction whose account references have been replaced by indices
/// into the message's `account_keys`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_meta_helpers_set_writable_flag() {
        let key = Pubkey::new_from_array([1u8; 32]);
        let writable = AccountMeta::new(key, true);
        let readonly = AccountMeta::new_readonly(key, false);
        assert!(writable.is_writable && writable.is_signer);
        assert!(!readonly.is_writable && !readonly.is_signer);
    }

    #[test]
    fn new_with_bytes_copies_data() {
        let program = Pubkey::new_from_array([2u8; 32]);
        let ix = Instruction::new_with_bytes(program, &[1, 2, 3], vec![]);
        assert_eq!(ix.data, vec![1, 2, 3]);
        assert_eq!(ix.program_id, program);
    }
}
