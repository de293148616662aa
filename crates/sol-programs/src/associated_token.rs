//! Associated Token Account (ATA) program.
//!
//! The ATA is a program derived address with seeds
//! `[wallet, token_program_id, mint]` under the ATA program.

use sol_core::{AccountMeta, Instruction, Pubkey};

use crate::error::ProgramError;
use crate::spl_token::TOKEN_PROGRAM_ID;
use crate::{system_program, sysvar};

/// Associated Token Account Program ID: `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ID: Pubkey = Pubkey::new_from_array([
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e, 0x0d, 0x83,
    0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8, 0xdb, 0xe9, 0xf8, 0x59,
]);

const IDEMPOTENT_TAG: u8 = 1;

/// Derive the associated token account for `wallet` and `mint` under the
/// SPL Token program.
pub fn get_associated_token_address(wallet: &Pubkey, mint: &Pubkey) -> Result<Pubkey, ProgramError> {
    get_associated_token_address_with_program_id(wallet, mint, &TOKEN_PROGRAM_ID)
}

pub fn get_associated_token_address_with_program_id(
    wallet: &Pubkey,
    mint: &Pubkey,
    token_program_id: &Pubkey,
) -> Result<Pubkey, ProgramError> {
    let (address, _bump) = Pubkey::find_program_address(
        &[wallet.as_ref(), token_program_id.as_ref(), mint.as_ref()],
        &ID,
    )?;
    Ok(address)
}

fn build_create(
    payer: &Pubkey,
    wallet: &Pubkey,
    mint: &Pubkey,
    token_program_id: &Pubkey,
    data: Vec<u8>,
) -> Result<Instruction, ProgramError> {
    let ata = get_associated_token_address_with_program_id(wallet, mint, token_program_id)?;
    Ok(Instruction {
        program_id: ID,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(ata, false),
            AccountMeta::new_readonly(*wallet, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(system_program::ID, false),
            AccountMeta::new_readonly(*token_program_id, false),
            AccountMeta::new_readonly(sysvar::RENT, false),
        ],
        data,
    })
}

/// Create the associated token account. Fails on chain if it already exists.
pub fn create_associated_token_account(
    payer: &Pubkey,
    wallet: &Pubkey,
    mint: &Pubkey,
    token_program_id: &Pubkey,
) -> Result<Instruction, ProgramError> {
    build_create(payer, wallet, mint, token_program_id, Vec::new())
}

/// Create the associated token account, succeeding if it already exists.
pub fn create_associated_token_account_idempotent(
    payer: &Pubkey,
    wallet: &Pubkey,
    mint: &Pubkey,
    token_program_id: &Pubkey,
) -> Result<Instruction, ProgramError> {
    build_create(payer, wallet, mint, token_program_id, vec![IDEMPOTENT_TAG])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spl_token::TOKEN_2022_PROGRAM_ID;

    fn key(b: u8) -> Pubkey {
        Pubkey::new_from_array([b; 32])
    }

    #[test]
    fn program_id_matches_base58() {
        assert_eq!(ID.to_string(), "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");
    }

    #[test]
    fn ata_is_off_curve() {
        let ata = get_associated_token_address(&key(0xAA), &key(0xBB)).unwrap();
        assert!(!ata.is_on_curve(), "PDA must NOT be on the Ed25519 curve");
    }

    #[test]
    fn ata_is_deterministic() {
        let a = get_associated_token_address(&key(0x11), &key(0x22)).unwrap();
        let b = get_associated_token_address(&key(0x11), &key(0x22)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_wallets_give_different_atas() {
        let a = get_associated_token_address(&key(0x01), &key(0xFF)).unwrap();
        let b = get_associated_token_address(&key(0x02), &key(0xFF)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn different_mints_give_different_atas() {
        let a = get_associated_token_address(&key(0xAA), &key(0x01)).unwrap();
        let b = get_associated_token_address(&key(0xAA), &key(0x02)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn token_program_changes_the_address() {
        let classic = get_associated_token_address(&key(0xAA), &key(0x01)).unwrap();
        let t22 =
            get_associated_token_address_with_program_id(&key(0xAA), &key(0x01), &TOKEN_2022_PROGRAM_ID)
                .unwrap();
        assert_ne!(classic, t22);
    }

    #[test]
    fn create_instruction_layout() {
        let payer = key(1);
        let wallet = key(2);
        let mint = key(3);
        let ix = create_associated_token_account(&payer, &wallet, &mint, &TOKEN_PROGRAM_ID).unwrap();
        assert_eq!(ix.program_id, ID);
        assert!(ix.data.is_empty());
        assert_eq!(ix.accounts.len(), 7);
        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert_eq!(
            ix.accounts[1].pubkey,
            get_associated_token_address(&wallet, &mint).unwrap()
        );
        assert!(ix.accounts[1].is_writable && !ix.accounts[1].is_signer);
        assert_eq!(ix.accounts[4].pubkey, system_program::ID);
        assert_eq!(ix.accounts[5].pubkey, TOKEN_PROGRAM_ID);
        assert_eq!(ix.accounts[6].pubkey, sysvar::RENT);
        assert!(ix.accounts[2..].iter().all(|m| !m.is_writable && !m.is_signer));
    }

    #[test]
    fn idempotent_create_has_tag() {
        let ix = create_associated_token_account_idempotent(&key(1), &key(2), &key(3), &TOKEN_PROGRAM_ID)
            .unwrap();
        assert_eq!(ix.data, vec![1]);
    }
}
