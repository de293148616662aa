//! Stake Program instructions: creating, delegating, deactivating and
//! withdrawing from stake accounts.
//!
//! Like the System Program, instruction data starts with a u32 LE tag.

use sol_core::{AccountMeta, Instruction, Pubkey};

use crate::data::{check_accounts, check_program_id, DataReader};
use crate::error::ProgramError;
use crate::{system_program, sysvar};

/// `Stake11111111111111111111111111111111111111`
pub const ID: Pubkey = Pubkey::new_from_array([
    0x06, 0xa1, 0xd8, 0x17, 0x91, 0x37, 0x54, 0x2a, 0x98, 0x34, 0x37, 0xbd, 0xfe, 0x2a, 0x7a, 0xb2,
    0x55, 0x7f, 0x53, 0x5c, 0x8a, 0x78, 0x72, 0x2b, 0x68, 0xa4, 0x9d, 0xc0, 0x00, 0x00, 0x00, 0x00,
]);

/// `StakeConfig11111111111111111111111111111111`
pub const CONFIG_ID: Pubkey = Pubkey::new_from_array([
    0x06, 0xa1, 0xd8, 0x17, 0xa5, 0x02, 0x05, 0x0b, 0x68, 0x07, 0x91, 0xe6, 0xce, 0x6d, 0xb8, 0x8e,
    0x1e, 0x5b, 0x71, 0x50, 0xf6, 0x1f, 0xc6, 0x79, 0x0a, 0x4e, 0xb4, 0xd1, 0x00, 0x00, 0x00, 0x00,
]);

/// Size of a stake account's state.
pub const STAKE_STATE_SIZE: u64 = 200;

/// Keys allowed to delegate and to withdraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authorized {
    pub staker: Pubkey,
    pub withdrawer: Pubkey,
}

impl Authorized {
    /// One key holding both authorities.
    pub fn auto(authority: &Pubkey) -> Self {
        Self {
            staker: *authority,
            withdrawer: *authority,
        }
    }
}

/// Withdrawals are locked until both the timestamp and the epoch pass,
/// unless the custodian signs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lockup {
    pub unix_timestamp: i64,
    pub epoch: u64,
    pub custodian: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StakeInstruction {
    Initialize { authorized: Authorized, lockup: Lockup },
    DelegateStake,
    Withdraw { lamports: u64 },
    Deactivate,
}

impl StakeInstruction {
    fn tag(&self) -> u32 {
        match self {
            Self::Initialize { .. } => 0,
            Self::DelegateStake => 2,
            Self::Withdraw { .. } => 4,
            Self::Deactivate => 5,
        }
    }

    fn min_accounts(&self) -> usize {
        match self {
            Self::Initialize { .. } => 2,
            Self::DelegateStake => 6,
            Self::Withdraw { .. } => 5,
            Self::Deactivate => 3,
        }
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(116);
        buf.extend_from_slice(&self.tag().to_le_bytes());
        match self {
            Self::Initialize { authorized, lockup } => {
                buf.extend_from_slice(authorized.staker.as_ref());
                buf.extend_from_slice(authorized.withdrawer.as_ref());
                buf.extend_from_slice(&lockup.unix_timestamp.to_le_bytes());
                buf.extend_from_slice(&lockup.epoch.to_le_bytes());
                buf.extend_from_slice(lockup.custodian.as_ref());
            }
            Self::Withdraw { lamports } => buf.extend_from_slice(&lamports.to_le_bytes()),
            Self::DelegateStake | Self::Deactivate => {}
        }
        buf
    }

    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        let mut r = DataReader::new(data);
        let ix = match r.u32()? {
            0 => Self::Initialize {
                authorized: Authorized {
                    staker: r.pubkey()?,
                    withdrawer: r.pubkey()?,
                },
                lockup: Lockup {
                    unix_timestamp: r.i64()?,
                    epoch: r.u64()?,
                    custodian: r.pubkey()?,
                },
            },
            2 => Self::DelegateStake,
            4 => Self::Withdraw { lamports: r.u64()? },
            5 => Self::Deactivate,
            tag => {
                return Err(ProgramError::InvalidInstructionData(format!(
                    "unsupported stake instruction {tag}"
                )))
            }
        };
        r.finish()?;
        Ok(ix)
    }

    pub fn decode(ix: &Instruction) -> Result<Self, ProgramError> {
        check_program_id(ix, &ID)?;
        let decoded = Self::unpack(&ix.data)?;
        check_accounts(ix, decoded.min_accounts())?;
        Ok(decoded)
    }
}

fn instruction(data: StakeInstruction, accounts: Vec<AccountMeta>) -> Instruction {
    Instruction {
        program_id: ID,
        accounts,
        data: data.pack(),
    }
}

pub fn initialize(stake: &Pubkey, authorized: &Authorized, lockup: &Lockup) -> Instruction {
    instruction(
        StakeInstruction::Initialize {
            authorized: *authorized,
            lockup: *lockup,
        },
        vec![
            AccountMeta::new(*stake, false),
            AccountMeta::new_readonly(sysvar::RENT, false),
        ],
    )
}

pub fn delegate_stake(stake: &Pubkey, authorized: &Pubkey, vote: &Pubkey) -> Instruction {
    instruction(
        StakeInstruction::DelegateStake,
        vec![
            AccountMeta::new(*stake, false),
            AccountMeta::new_readonly(*vote, false),
            AccountMeta::new_readonly(sysvar::CLOCK, false),
            AccountMeta::new_readonly(sysvar::STAKE_HISTORY, false),
            AccountMeta::new_readonly(CONFIG_ID, false),
            AccountMeta::new_readonly(*authorized, true),
        ],
    )
}

pub fn deactivate_stake(stake: &Pubkey, authorized: &Pubkey) -> Instruction {
    instruction(
        StakeInstruction::Deactivate,
        vec![
            AccountMeta::new(*stake, false),
            AccountMeta::new_readonly(sysvar::CLOCK, false),
            AccountMeta::new_readonly(*authorized, true),
        ],
    )
}

/// A lockup still in force needs the custodian's signature too.
pub fn withdraw(
    stake: &Pubkey,
    withdrawer: &Pubkey,
    to: &Pubkey,
    lamports: u64,
    custodian: Option<&Pubkey>,
) -> Instruction {
    let mut accounts = vec![
        AccountMeta::new(*stake, false),
        AccountMeta::new(*to, false),
        AccountMeta::new_readonly(sysvar::CLOCK, false),
        AccountMeta::new_readonly(sysvar::STAKE_HISTORY, false),
        AccountMeta::new_readonly(*withdrawer, true),
    ];
    if let Some(custodian) = custodian {
        accounts.push(AccountMeta::new_readonly(*custodian, true));
    }
    instruction(StakeInstruction::Withdraw { lamports }, accounts)
}

/// Create the stake account (which must sign) and initialize it.
pub fn create_account(
    from: &Pubkey,
    stake: &Pubkey,
    authorized: &Authorized,
    lockup: &Lockup,
    lamports: u64,
) -> Vec<Instruction> {
    vec![
        system_program::create_account(from, stake, lamports, STAKE_STATE_SIZE, &ID),
        initialize(stake, authorized, lockup),
    ]
}

/// Like [`create_account`] with the address derived from `base` and `seed`.
pub fn create_account_with_seed(
    from: &Pubkey,
    stake: &Pubkey,
    base: &Pubkey,
    seed: &str,
    authorized: &Authorized,
    lockup: &Lockup,
    lamports: u64,
) -> Vec<Instruction> {
    vec![
        system_program::create_account_with_seed(from, stake, base, seed, lamports, STAKE_STATE_SIZE, &ID),
        initialize(stake, authorized, lockup),
    ]
}

/// Create, initialize and delegate in one go. The staker authority signs
/// the delegation.
pub fn create_account_and_delegate_stake(
    from: &Pubkey,
    stake: &Pubkey,
    vote: &Pubkey,
    authorized: &Authorized,
    lockup: &Lockup,
    lamports: u64,
) -> Vec<Instruction> {
    let mut instructions = create_account(from, stake, authorized, lockup, lamports);
    instructions.push(delegate_stake(stake, &authorized.staker, vote));
    instructions
}

#[allow(clippy::too_many_arguments)]
pub fn create_account_with_seed_and_delegate_stake(
    from: &Pubkey,
    stake: &Pubkey,
    base: &Pubkey,
    seed: &str,
    vote: &Pubkey,
    authorized: &Authorized,
    lockup: &Lockup,
    lamports: u64,
) -> Vec<Instruction> {
    let mut instructions = create_account_with_seed(from, stake, base, seed, authorized, lockup, lamports);
    instructions.push(delegate_stake(stake, &authorized.staker, vote));
    instructions
}
