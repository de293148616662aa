//! SPL Memo program.

use sol_core::{AccountMeta, Instruction, Pubkey};

use crate::data::check_program_id;
use crate::error::ProgramError;

/// Memo Program ID (v2): `MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr`
pub const ID: Pubkey = Pubkey::new_from_array([
    0x05, 0x4a, 0x53, 0x5a, 0x99, 0x29, 0x21, 0x06, 0x4d, 0x24, 0xe8, 0x71, 0x60, 0xda, 0x38, 0x7c,
    0x7c, 0x35, 0xb5, 0xdd, 0xbc, 0x92, 0xbb, 0x81, 0xe4, 0x1f, 0xa8, 0x40, 0x41, 0x05, 0x44, 0x8d,
]);

/// Build a memo instruction. Every key in `signers` must sign the
/// transaction; an empty list produces an unsigned memo.
pub fn build_memo(message: &str, signers: &[&Pubkey]) -> Instruction {
    Instruction {
        program_id: ID,
        accounts: signers
            .iter()
            .map(|s| AccountMeta::new_readonly(**s, true))
            .collect(),
        data: message.as_bytes().to_vec(),
    }
}

/// Returns the memo text of a memo instruction.
pub fn decode_memo(ix: &Instruction) -> Result<String, ProgramError> {
    check_program_id(ix, &ID)?;
    String::from_utf8(ix.data.clone())
        .map_err(|e| ProgramError::InvalidInstructionData(format!("memo is not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_id_matches_base58() {
        assert_eq!(ID.to_string(), "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr");
    }

    #[test]
    fn signers_are_readonly_signers() {
        let a = Pubkey::new_from_array([1; 32]);
        let b = Pubkey::new_from_array([2; 32]);
        let ix = build_memo("gm", &[&a, &b]);
        assert_eq!(ix.data, b"gm");
        assert_eq!(ix.accounts.len(), 2);
        assert!(ix.accounts.iter().all(|m| m.is_signer && !m.is_writable));
        assert_eq!(decode_memo(&ix).unwrap(), "gm");
    }

    #[test]
    fn unsigned_memo_has_no_accounts() {
        let ix = build_memo("hello 🌍", &[]);
        assert!(ix.accounts.is_empty());
        assert_eq!(decode_memo(&ix).unwrap(), "hello 🌍");
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        let mut ix = build_memo("", &[]);
        ix.data = vec![0xff, 0xfe];
        assert!(matches!(
            decode_memo(&ix),
            Err(ProgramError::InvalidInstructionData(_))
        ));
    }

    #[test]
    fn decode_rejects_other_programs() {
        let mut ix = build_memo("x", &[]);
        ix.program_id = Pubkey::default();
        assert!(decode_memo(&ix).is_err());
    }
}
