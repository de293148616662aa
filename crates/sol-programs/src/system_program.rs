//! System Program instructions: account creation, transfers and durable nonces.
//!
//! Instruction data starts with a u32 LE tag. Seeds are bincode strings
//! (u64 LE length followed by the UTF-8 bytes).

use sol_core::{AccountMeta, Hash, Instruction, Pubkey};

use crate::data::{check_accounts, check_program_id, push_string, DataReader};
use crate::error::ProgramError;
use crate::sysvar;

/// The System Program public key: 32 zero bytes.
/// Base58: `11111111111111111111111111111111`
pub const ID: Pubkey = Pubkey::new_from_array([0u8; 32]);

/// Size of a nonce account's state.
pub const NONCE_STATE_SIZE: u64 = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemInstruction {
    CreateAccount {
        lamports: u64,
        space: u64,
        owner: Pubkey,
    },
    Assign {
        owner: Pubkey,
    },
    Transfer {
        lamports: u64,
    },
    CreateAccountWithSeed {
        base: Pubkey,
        seed: String,
        lamports: u64,
        space: u64,
        owner: Pubkey,
    },
    AdvanceNonceAccount,
    WithdrawNonceAccount {
        lamports: u64,
    },
    InitializeNonceAccount {
        authority: Pubkey,
    },
    AuthorizeNonceAccount {
        new_authority: Pubkey,
    },
    Allocate {
        space: u64,
    },
    AllocateWithSeed {
        base: Pubkey,
        seed: String,
        space: u64,
        owner: Pubkey,
    },
    AssignWithSeed {
        base: Pubkey,
        seed: String,
        owner: Pubkey,
    },
    TransferWithSeed {
        lamports: u64,
        from_seed: String,
        from_owner: Pubkey,
    },
}

impl SystemInstruction {
    fn tag(&self) -> u32 {
        match self {
            Self::CreateAccount { .. } => 0,
            Self::Assign { .. } => 1,
            Self::Transfer { .. } => 2,
            Self::CreateAccountWithSeed { .. } => 3,
            Self::AdvanceNonceAccount => 4,
            Self::WithdrawNonceAccount { .. } => 5,
            Self::InitializeNonceAccount { .. } => 6,
            Self::AuthorizeNonceAccount { .. } => 7,
            Self::Allocate { .. } => 8,
            Self::AllocateWithSeed { .. } => 9,
            Self::AssignWithSeed { .. } => 10,
            Self::TransferWithSeed { .. } => 11,
        }
    }

    /// Minimum number of accounts the program expects.
    fn min_accounts(&self) -> usize {
        match self {
            Self::Assign { .. } | Self::Allocate { .. } => 1,
            Self::AdvanceNonceAccount | Self::InitializeNonceAccount { .. } => 3,
            Self::TransferWithSeed { .. } => 3,
            Self::WithdrawNonceAccount { .. } => 5,
            _ => 2,
        }
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(52);
        buf.extend_from_slice(&self.tag().to_le_bytes());
        match self {
            Self::CreateAccount {
                lamports,
                space,
                owner,
            } => {
                buf.extend_from_slice(&lamports.to_le_bytes());
                buf.extend_from_slice(&space.to_le_bytes());
                buf.extend_from_slice(owner.as_ref());
            }
            Self::Assign { owner } => buf.extend_from_slice(owner.as_ref()),
            Self::Transfer { lamports } | Self::WithdrawNonceAccount { lamports } => {
                buf.extend_from_slice(&lamports.to_le_bytes());
            }
            Self::CreateAccountWithSeed {
                base,
                seed,
                lamports,
                space,
                owner,
            } => {
                buf.extend_from_slice(base.as_ref());
                push_string(&mut buf, seed);
                buf.extend_from_slice(&lamports.to_le_bytes());
                buf.extend_from_slice(&space.to_le_bytes());
                buf.extend_from_slice(owner.as_ref());
            }
            Self::AdvanceNonceAccount => {}
            Self::InitializeNonceAccount { authority: key }
            | Self::AuthorizeNonceAccount { new_authority: key } => {
                buf.extend_from_slice(key.as_ref());
            }
            Self::Allocate { space } => buf.extend_from_slice(&space.to_le_bytes()),
            Self::AllocateWithSeed {
                base,
                seed,
                space,
                owner,
            } => {
                buf.extend_from_slice(base.as_ref());
                push_string(&mut buf, seed);
                buf.extend_from_slice(&space.to_le_bytes());
                buf.extend_from_slice(owner.as_ref());
            }
            Self::AssignWithSeed { base, seed, owner } => {
                buf.extend_from_slice(base.as_ref());
                push_string(&mut buf, seed);
                buf.extend_from_slice(owner.as_ref());
            }
            Self::TransferWithSeed {
                lamports,
                from_seed,
                from_owner,
            } => {
                buf.extend_from_slice(&lamports.to_le_bytes());
                push_string(&mut buf, from_seed);
                buf.extend_from_slice(from_owner.as_ref());
            }
        }
        buf
    }

    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        let mut r = DataReader::new(data);
        let ix = match r.u32()? {
            0 => Self::CreateAccount {
                lamports: r.u64()?,
                space: r.u64()?,
                owner: r.pubkey()?,
            },
            1 => Self::Assign { owner: r.pubkey()? },
            2 => Self::Transfer { lamports: r.u64()? },
            3 => Self::CreateAccountWithSeed {
                base: r.pubkey()?,
                seed: r.string()?,
                lamports: r.u64()?,
                space: r.u64()?,
                owner: r.pubkey()?,
            },
            4 => Self::AdvanceNonceAccount,
            5 => Self::WithdrawNonceAccount { lamports: r.u64()? },
            6 => Self::InitializeNonceAccount {
                authority: r.pubkey()?,
            },
            7 => Self::AuthorizeNonceAccount {
                new_authority: r.pubkey()?,
            },
            8 => Self::Allocate { space: r.u64()? },
            9 => Self::AllocateWithSeed {
                base: r.pubkey()?,
                seed: r.string()?,
                space: r.u64()?,
                owner: r.pubkey()?,
            },
            10 => Self::AssignWithSeed {
                base: r.pubkey()?,
                seed: r.string()?,
                owner: r.pubkey()?,
            },
            11 => Self::TransferWithSeed {
                lamports: r.u64()?,
                from_seed: r.string()?,
                from_owner: r.pubkey()?,
            },
            tag => {
                return Err(ProgramError::InvalidInstructionData(format!(
                    "unknown system instruction {tag}"
                )))
            }
        };
        r.finish()?;
        Ok(ix)
    }

    /// Decode a System Program instruction, checking the program id and the
    /// number of accounts.
    pub fn decode(ix: &Instruction) -> Result<Self, ProgramError> {
        check_program_id(ix, &ID)?;
        let decoded = Self::unpack(&ix.data)?;
        check_accounts(ix, decoded.min_accounts())?;
        Ok(decoded)
    }
}

fn instruction(data: SystemInstruction, accounts: Vec<AccountMeta>) -> Instruction {
    Instruction {
        program_id: ID,
        accounts,
        data: data.pack(),
    }
}

pub fn create_account(
    from: &Pubkey,
    to: &Pubkey,
    lamports: u64,
    space: u64,
    owner: &Pubkey,
) -> Instruction {
    instruction(
        SystemInstruction::CreateAccount {
            lamports,
            space,
            owner: *owner,
        },
        vec![AccountMeta::new(*from, true), AccountMeta::new(*to, true)],
    )
}

/// `to` must equal `Pubkey::create_with_seed(base, seed, owner)`.
pub fn create_account_with_seed(
    from: &Pubkey,
    to: &Pubkey,
    base: &Pubkey,
    seed: &str,
    lamports: u64,
    space: u64,
    owner: &Pubkey,
) -> Instruction {
    let mut accounts = vec![AccountMeta::new(*from, true), AccountMeta::new(*to, false)];
    if base != from {
        accounts.push(AccountMeta::new_readonly(*base, true));
    }
    instruction(
        SystemInstruction::CreateAccountWithSeed {
            base: *base,
            seed: seed.to_string(),
            lamports,
            space,
            owner: *owner,
        },
        accounts,
    )
}

pub fn assign(account: &Pubkey, owner: &Pubkey) -> Instruction {
    instruction(
        SystemInstruction::Assign { owner: *owner },
        vec![AccountMeta::new(*account, true)],
    )
}

pub fn assign_with_seed(account: &Pubkey, base: &Pubkey, seed: &str, owner: &Pubkey) -> Instruction {
    instruction(
        SystemInstruction::AssignWithSeed {
            base: *base,
            seed: seed.to_string(),
            owner: *owner,
        },
        vec![
            AccountMeta::new(*account, false),
            AccountMeta::new_readonly(*base, true),
        ],
    )
}

/// Move `lamports` from `from` to `to`. A zero amount is accepted here and
/// left to the runtime.
pub fn transfer(from: &Pubkey, to: &Pubkey, lamports: u64) -> Instruction {
    instruction(
        SystemInstruction::Transfer { lamports },
        vec![AccountMeta::new(*from, true), AccountMeta::new(*to, false)],
    )
}

pub fn transfer_with_seed(
    from: &Pubkey,
    from_base: &Pubkey,
    from_seed: &str,
    from_owner: &Pubkey,
    to: &Pubkey,
    lamports: u64,
) -> Instruction {
    instruction(
        SystemInstruction::TransferWithSeed {
            lamports,
            from_seed: from_seed.to_string(),
            from_owner: *from_owner,
        },
        vec![
            AccountMeta::new(*from, false),
            AccountMeta::new_readonly(*from_base, true),
            AccountMeta::new(*to, false),
        ],
    )
}

pub fn allocate(account: &Pubkey, space: u64) -> Instruction {
    instruction(
        SystemInstruction::Allocate { space },
        vec![AccountMeta::new(*account, true)],
    )
}

pub fn allocate_with_seed(
    account: &Pubkey,
    base: &Pubkey,
    seed: &str,
    space: u64,
    owner: &Pubkey,
) -> Instruction {
    instruction(
        SystemInstruction::AllocateWithSeed {
            base: *base,
            seed: seed.to_string(),
            space,
            owner: *owner,
        },
        vec![
            AccountMeta::new(*account, false),
            AccountMeta::new_readonly(*base, true),
        ],
    )
}

fn initialize_nonce_account(nonce: &Pubkey, authority: &Pubkey) -> Instruction {
    instruction(
        SystemInstruction::InitializeNonceAccount {
            authority: *authority,
        },
        vec![
            AccountMeta::new(*nonce, false),
            AccountMeta::new_readonly(sysvar::RECENT_BLOCKHASHES, false),
            AccountMeta::new_readonly(sysvar::RENT, false),
        ],
    )
}

/// Create and initialize a durable nonce account.
pub fn create_nonce_account(
    from: &Pubkey,
    nonce: &Pubkey,
    authority: &Pubkey,
    lamports: u64,
) -> Vec<Instruction> {
    vec![
        create_account(from, nonce, lamports, NONCE_STATE_SIZE, &ID),
        initialize_nonce_account(nonce, authority),
    ]
}

pub fn create_nonce_account_with_seed(
    from: &Pubkey,
    nonce: &Pubkey,
    base: &Pubkey,
    seed: &str,
    authority: &Pubkey,
    lamports: u64,
) -> Vec<Instruction> {
    vec![
        create_account_with_seed(from, nonce, base, seed, lamports, NONCE_STATE_SIZE, &ID),
        initialize_nonce_account(nonce, authority),
    ]
}

/// Must be the first instruction of a transaction that uses the nonce as its
/// blockhash.
pub fn advance_nonce_account(nonce: &Pubkey, authority: &Pubkey) -> Instruction {
    instruction(
        SystemInstruction::AdvanceNonceAccount,
        vec![
            AccountMeta::new(*nonce, false),
            AccountMeta::new_readonly(sysvar::RECENT_BLOCKHASHES, false),
            AccountMeta::new_readonly(*authority, true),
        ],
    )
}

pub fn withdraw_nonce_account(
    nonce: &Pubkey,
    authority: &Pubkey,
    to: &Pubkey,
    lamports: u64,
) -> Instruction {
    instruction(
        SystemInstruction::WithdrawNonceAccount { lamports },
        vec![
            AccountMeta::new(*nonce, false),
            AccountMeta::new(*to, false),
            AccountMeta::new_readonly(sysvar::RECENT_BLOCKHASHES, false),
            AccountMeta::new_readonly(sysvar::RENT, false),
            AccountMeta::new_readonly(*authority, true),
        ],
    )
}

pub fn authorize_nonce_account(nonce: &Pubkey, authority: &Pubkey, new_authority: &Pubkey) -> Instruction {
    instruction(
        SystemInstruction::AuthorizeNonceAccount {
            new_authority: *new_authority,
        },
        vec![
            AccountMeta::new(*nonce, false),
            AccountMeta::new_readonly(*authority, true),
        ],
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceVersion {
    Legacy,
    Current,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonceData {
    pub authority: Pubkey,
    pub durable_nonce: Hash,
    pub lamports_per_signature: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceState {
    Uninitialized,
    Initialized(NonceData),
}

impl NonceState {
    pub fn data(&self) -> Option<&NonceData> {
        match self {
            Self::Initialized(data) => Some(data),
            Self::Uninitialized => None,
        }
    }
}

/// Contents of a nonce account owned by the System Program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonceAccount {
    pub version: NonceVersion,
    pub state: NonceState,
}

impl NonceAccount {
    /// Decode the 80-byte state: `version: u32`, `state: u32`, then for an
    /// initialized account the authority, the durable nonce and
    /// `lamports_per_signature: u64`. Uninitialized accounts are zeroed past
    /// the state tag.
    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        if data.len() as u64 != NONCE_STATE_SIZE {
            return Err(ProgramError::InvalidArgument(format!(
                "nonce account must be {NONCE_STATE_SIZE} bytes, got {}",
                data.len()
            )));
        }
        let mut r = DataReader::new(data);
        let version = match r.u32()? {
            0 => NonceVersion::Legacy,
            1 => NonceVersion::Current,
            other => {
                return Err(ProgramError::InvalidArgument(format!(
                    "unknown nonce version {other}"
                )))
            }
        };
        let state = match r.u32()? {
            0 => NonceState::Uninitialized,
            1 => NonceState::Initialized(NonceData {
                authority: r.pubkey()?,
                durable_nonce: r.hash()?,
                lamports_per_signature: r.u64()?,
            }),
            other => {
                return Err(ProgramError::InvalidArgument(format!(
                    "unknown nonce state {other}"
                )))
            }
        };
        Ok(Self { version, state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(b: u8) -> Pubkey {
        Pubkey::new_from_array([b; 32])
    }

    fn nonce_account_data(authority: u8, nonce: u8, fee: u64) -> Vec<u8> {
        let mut data = Vec::with_capacity(NONCE_STATE_SIZE as usize);
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&[authority; 32]);
        data.extend_from_slice(&[nonce; 32]);
        data.extend_from_slice(&fee.to_le_bytes());
        data
    }

    #[test]
    fn nonce_account_unpacks_initialized_state() {
        let account = NonceAccount::unpack(&nonce_account_data(7, 9, 5000)).unwrap();
        assert_eq!(account.version, NonceVersion::Current);
        let data = account.state.data().unwrap();
        assert_eq!(data.authority, key(7));
        assert_eq!(data.durable_nonce, Hash::new_from_array([9; 32]));
        assert_eq!(data.lamports_per_signature, 5000);
    }

    #[test]
    fn nonce_account_zeroed_is_uninitialized() {
        let account = NonceAccount::unpack(&[0u8; 80]).unwrap();
        assert_eq!(account.version, NonceVersion::Legacy);
        assert_eq!(account.state, NonceState::Uninitialized);
    }

    #[test]
    fn nonce_account_rejects_bad_layout() {
        assert!(NonceAccount::unpack(&[0u8; 79]).is_err());

        let mut data = nonce_account_data(1, 2, 0);
        data[4] = 3;
        let err = NonceAccount::unpack(&data).unwrap_err();
        assert!(err.to_string().contains("unknown nonce state 3"));

        let mut data = nonce_account_data(1, 2, 0);
        data[0] = 2;
        assert!(NonceAccount::unpack(&data).is_err());
    }

    #[test]
    fn transfer_instruction_data_is_12_bytes() {
        let ix = transfer(&key(1), &key(2), 1_000_000);
        assert_eq!(ix.data.len(), 12);
        assert_eq!(&ix.data[..4], &[2, 0, 0, 0]);
        assert_eq!(&ix.data[4..], &1_000_000u64.to_le_bytes());
    }

    #[test]
    fn transfer_has_correct_accounts() {
        let ix = transfer(&key(0xaa), &key(0xbb), 500);
        assert_eq!(ix.program_id, ID);
        assert_eq!(ix.accounts.len(), 2);
        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert!(!ix.accounts[1].is_signer && ix.accounts[1].is_writable);
    }

    #[test]
    fn zero_lamport_transfer_is_allowed() {
        let ix = transfer(&key(1), &key(2), 0);
        assert_eq!(
            SystemInstruction::decode(&ix).unwrap(),
            SystemInstruction::Transfer { lamports: 0 }
        );
    }

    #[test]
    fn create_account_decodes() {
        let ix = create_account(&key(1), &key(2), 123, 1, &key(9));
        assert_eq!(ix.data.len(), 52);
        assert_eq!(
            SystemInstruction::decode(&ix).unwrap(),
            SystemInstruction::CreateAccount {
                lamports: 123,
                space: 1,
                owner: key(9),
            }
        );
    }

    #[test]
    fn create_account_with_seed_adds_distinct_base_signer() {
        let ix = create_account_with_seed(&key(1), &key(3), &key(2), "gqln", 123, 4, &key(9));
        assert_eq!(ix.accounts.len(), 3);
        assert!(ix.accounts[2].is_signer && !ix.accounts[2].is_writable);
        assert_eq!(
            SystemInstruction::decode(&ix).unwrap(),
            SystemInstruction::CreateAccountWithSeed {
                base: key(2),
                seed: "gqln".into(),
                lamports: 123,
                space: 4,
                owner: key(9),
            }
        );

        let same_base = create_account_with_seed(&key(1), &key(3), &key(1), "gqln", 123, 4, &key(9));
        assert_eq!(same_base.accounts.len(), 2);
    }

    #[test]
    fn seeded_variants_decode() {
        let ix = allocate_with_seed(&key(1), &key(2), "gqln", 65537, &key(3));
        assert_eq!(
            SystemInstruction::decode(&ix).unwrap(),
            SystemInstruction::AllocateWithSeed {
                base: key(2),
                seed: "gqln".into(),
                space: 65537,
                owner: key(3),
            }
        );

        let ix = assign_with_seed(&key(1), &key(2), "seed", &key(3));
        assert!(matches!(
            SystemInstruction::decode(&ix).unwrap(),
            SystemInstruction::AssignWithSeed { .. }
        ));

        let ix = transfer_with_seed(&key(1), &key(2), "seed", &key(3), &key(4), 77);
        assert_eq!(
            SystemInstruction::decode(&ix).unwrap(),
            SystemInstruction::TransferWithSeed {
                lamports: 77,
                from_seed: "seed".into(),
                from_owner: key(3),
            }
        );
    }

    #[test]
    fn assign_and_allocate_decode() {
        assert_eq!(
            SystemInstruction::decode(&assign(&key(1), &key(5))).unwrap(),
            SystemInstruction::Assign { owner: key(5) }
        );
        assert_eq!(
            SystemInstruction::decode(&allocate(&key(1), 12345)).unwrap(),
            SystemInstruction::Allocate { space: 12345 }
        );
    }

    #[test]
    fn create_nonce_account_is_two_instructions() {
        let ixs = create_nonce_account(&key(1), &key(2), &key(1), 2_000_000);
        assert_eq!(ixs.len(), 2);
        assert_eq!(
            SystemInstruction::decode(&ixs[0]).unwrap(),
            SystemInstruction::CreateAccount {
                lamports: 2_000_000,
                space: NONCE_STATE_SIZE,
                owner: ID,
            }
        );
        assert_eq!(
            SystemInstruction::decode(&ixs[1]).unwrap(),
            SystemInstruction::InitializeNonceAccount { authority: key(1) }
        );
        assert_eq!(ixs[1].accounts[1].pubkey, sysvar::RECENT_BLOCKHASHES);
        assert_eq!(ixs[1].accounts[2].pubkey, sysvar::RENT);
    }

    #[test]
    fn nonce_management_instructions_decode() {
        let ix = advance_nonce_account(&key(2), &key(1));
        assert_eq!(ix.data, vec![4, 0, 0, 0]);
        assert!(ix.accounts[2].is_signer);
        assert_eq!(
            SystemInstruction::decode(&ix).unwrap(),
            SystemInstruction::AdvanceNonceAccount
        );

        let ix = withdraw_nonce_account(&key(2), &key(1), &key(3), 10);
        assert_eq!(ix.accounts.len(), 5);
        assert_eq!(
            SystemInstruction::decode(&ix).unwrap(),
            SystemInstruction::WithdrawNonceAccount { lamports: 10 }
        );

        let ix = authorize_nonce_account(&key(2), &key(1), &key(4));
        assert_eq!(
            SystemInstruction::decode(&ix).unwrap(),
            SystemInstruction::AuthorizeNonceAccount { new_authority: key(4) }
        );
    }

    #[test]
    fn decode_rejects_foreign_program() {
        let mut ix = transfer(&key(1), &key(2), 5);
        ix.program_id = key(7);
        assert!(matches!(
            SystemInstruction::decode(&ix),
            Err(ProgramError::InvalidProgramId { .. })
        ));
    }

    #[test]
    fn decode_rejects_missing_accounts() {
        let mut ix = transfer(&key(1), &key(2), 5);
        ix.accounts.pop();
        assert!(matches!(
            SystemInstruction::decode(&ix),
            Err(ProgramError::NotEnoughAccounts { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn unpack_rejects_unknown_tag_and_trailing_bytes() {
        assert!(SystemInstruction::unpack(&[42, 0, 0, 0]).is_err());
        let mut data = SystemInstruction::Transfer { lamports: 1 }.pack();
        data.push(0);
        assert!(SystemInstruction::unpack(&data).is_err());
    }
}
