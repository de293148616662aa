//! SPL Token instructions and account layouts.
//!
//! Implements the token instruction set and the mint / token account state
//! layouts without pulling in the `spl-token` crate. Every builder takes the
//! token program id so Token-2022 can be targeted with the same code.
//!
//! Instruction data is a one-byte tag followed by little-endian arguments.

use sol_core::{AccountMeta, Instruction, Pubkey};

use crate::data::{check_accounts, push_optional_pubkey, DataReader};
use crate::error::ProgramError;
use crate::sysvar;

/// SPL Token Program ID: `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`
pub const TOKEN_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    0x06, 0xdd, 0xf6, 0xe1, 0xd7, 0x65, 0xa1, 0x93, 0xd9, 0xcb, 0xe1, 0x46, 0xce, 0xeb, 0x79, 0xac,
    0x1c, 0xb4, 0x85, 0xed, 0x5f, 0x5b, 0x37, 0x91, 0x3a, 0x8c, 0xf5, 0x85, 0x7e, 0xff, 0x00, 0xa9,
]);

/// Token-2022 Program ID: `TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb`
pub const TOKEN_2022_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    0x06, 0xdd, 0xf6, 0xe1, 0xee, 0x75, 0x8f, 0xde, 0x18, 0x42, 0x5d, 0xbc, 0xe4, 0x6c, 0xcd, 0xda,
    0xb6, 0x1a, 0xfc, 0x4d, 0x83, 0xb9, 0x0d, 0x27, 0xfe, 0xbd, 0xf9, 0x28, 0xd8, 0xa1, 0x8b, 0xfc,
]);

/// Wrapped SOL mint: `So11111111111111111111111111111111111111112`
pub const NATIVE_MINT: Pubkey = Pubkey::new_from_array([
    0x06, 0x9b, 0x88, 0x57, 0xfe, 0xab, 0x81, 0x84, 0xfb, 0x68, 0x7f, 0x63, 0x46, 0x18, 0xc0, 0x35,
    0xda, 0xc4, 0x39, 0xdc, 0x1a, 0xeb, 0x3b, 0x55, 0x98, 0xa0, 0xf0, 0x00, 0x00, 0x00, 0x00, 0x01,
]);

pub const MINT_LEN: usize = 82;
pub const ACCOUNT_LEN: usize = 165;
pub const MULTISIG_LEN: usize = 355;

/// Minimum and maximum number of multisig signers.
pub const MIN_SIGNERS: usize = 1;
pub const MAX_SIGNERS: usize = 11;

/// Token-2022 stores an account type byte right after the base account
/// layout when extensions are present.
const ACCOUNT_TYPE_MINT: u8 = 1;
const ACCOUNT_TYPE_ACCOUNT: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorityType {
    MintTokens = 0,
    FreezeAccount = 1,
    AccountOwner = 2,
    CloseAccount = 3,
}

impl TryFrom<u8> for AuthorityType {
    type Error = ProgramError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::MintTokens),
            1 => Ok(Self::FreezeAccount),
            2 => Ok(Self::AccountOwner),
            3 => Ok(Self::CloseAccount),
            other => Err(ProgramError::InvalidInstructionData(format!(
                "invalid authority type {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenInstruction {
    InitializeMint {
        decimals: u8,
        mint_authority: Pubkey,
        freeze_authority: Option<Pubkey>,
    },
    InitializeAccount,
    InitializeMultisig {
        m: u8,
    },
    Transfer {
        amount: u64,
    },
    Approve {
        amount: u64,
    },
    Revoke,
    SetAuthority {
        authority_type: AuthorityType,
        new_authority: Option<Pubkey>,
    },
    MintTo {
        amount: u64,
    },
    Burn {
        amount: u64,
    },
    CloseAccount,
    FreezeAccount,
    ThawAccount,
    TransferChecked {
        amount: u64,
        decimals: u8,
    },
    ApproveChecked {
        amount: u64,
        decimals: u8,
    },
    MintToChecked {
        amount: u64,
        decimals: u8,
    },
    BurnChecked {
        amount: u64,
        decimals: u8,
    },
    SyncNative,
}

impl TokenInstruction {
    fn tag(&self) -> u8 {
        match self {
            Self::InitializeMint { .. } => 0,
            Self::InitializeAccount => 1,
            Self::InitializeMultisig { .. } => 2,
            Self::Transfer { .. } => 3,
            Self::Approve { .. } => 4,
            Self::Revoke => 5,
            Self::SetAuthority { .. } => 6,
            Self::MintTo { .. } => 7,
            Self::Burn { .. } => 8,
            Self::CloseAccount => 9,
            Self::FreezeAccount => 10,
            Self::ThawAccount => 11,
            Self::TransferChecked { .. } => 12,
            Self::ApproveChecked { .. } => 13,
            Self::MintToChecked { .. } => 14,
            Self::BurnChecked { .. } => 15,
            Self::SyncNative => 17,
        }
    }

    fn min_accounts(&self) -> usize {
        match self {
            Self::SyncNative => 1,
            Self::InitializeMint { .. } | Self::Revoke | Self::SetAuthority { .. } => 2,
            Self::InitializeAccount | Self::TransferChecked { .. } | Self::ApproveChecked { .. } => 4,
            _ => 3,
        }
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(67);
        buf.push(self.tag());
        match self {
            Self::InitializeMint {
                decimals,
                mint_authority,
                freeze_authority,
            } => {
                buf.push(*decimals);
                buf.extend_from_slice(mint_authority.as_ref());
                push_optional_pubkey(&mut buf, freeze_authority.as_ref());
            }
            Self::InitializeMultisig { m } => buf.push(*m),
            Self::Transfer { amount }
            | Self::Approve { amount }
            | Self::MintTo { amount }
            | Self::Burn { amount } => buf.extend_from_slice(&amount.to_le_bytes()),
            Self::SetAuthority {
                authority_type,
                new_authority,
            } => {
                buf.push(*authority_type as u8);
                push_optional_pubkey(&mut buf, new_authority.as_ref());
            }
            Self::TransferChecked { amount, decimals }
            | Self::ApproveChecked { amount, decimals }
            | Self::MintToChecked { amount, decimals }
            | Self::BurnChecked { amount, decimals } => {
                buf.extend_from_slice(&amount.to_le_bytes());
                buf.push(*decimals);
            }
            Self::InitializeAccount
            | Self::Revoke
            | Self::CloseAccount
            | Self::FreezeAccount
            | Self::ThawAccount
            | Self::SyncNative => {}
        }
        buf
    }

    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        let mut r = DataReader::new(data);
        let ix = match r.u8()? {
            0 => Self::InitializeMint {
                decimals: r.u8()?,
                mint_authority: r.pubkey()?,
                freeze_authority: r.optional_pubkey()?,
            },
            1 => Self::InitializeAccount,
            2 => Self::InitializeMultisig { m: r.u8()? },
            3 => Self::Transfer { amount: r.u64()? },
            4 => Self::Approve { amount: r.u64()? },
            5 => Self::Revoke,
            6 => Self::SetAuthority {
                authority_type: AuthorityType::try_from(r.u8()?)?,
                new_authority: r.optional_pubkey()?,
            },
            7 => Self::MintTo { amount: r.u64()? },
            8 => Self::Burn { amount: r.u64()? },
            9 => Self::CloseAccount,
            10 => Self::FreezeAccount,
            11 => Self::ThawAccount,
            12 => Self::TransferChecked {
                amount: r.u64()?,
                decimals: r.u8()?,
            },
            13 => Self::ApproveChecked {
                amount: r.u64()?,
                decimals: r.u8()?,
            },
            14 => Self::MintToChecked {
                amount: r.u64()?,
                decimals: r.u8()?,
            },
            15 => Self::BurnChecked {
                amount: r.u64()?,
                decimals: r.u8()?,
            },
            17 => Self::SyncNative,
            tag => {
                return Err(ProgramError::InvalidInstructionData(format!(
                    "unknown token instruction {tag}"
                )))
            }
        };
        r.finish()?;
        Ok(ix)
    }

    /// Decode a token instruction. Both the SPL Token and Token-2022
    /// program ids are accepted.
    pub fn decode(ix: &Instruction) -> Result<Self, ProgramError> {
        if ix.program_id != TOKEN_PROGRAM_ID && ix.program_id != TOKEN_2022_PROGRAM_ID {
            return Err(ProgramError::InvalidProgramId {
                expected: TOKEN_PROGRAM_ID,
                actual: ix.program_id,
            });
        }
        let decoded = Self::unpack(&ix.data)?;
        check_accounts(ix, decoded.min_accounts())?;
        Ok(decoded)
    }
}

/// Append the authority account. With multisig signers the authority is the
/// read-only multisig account and each signer follows as a read-only signer.
fn push_authority(
    accounts: &mut Vec<AccountMeta>,
    authority: &Pubkey,
    signers: &[&Pubkey],
) -> Result<(), ProgramError> {
    if signers.len() > MAX_SIGNERS {
        return Err(ProgramError::InvalidArgument(format!(
            "{} multisig signers exceeds the limit of {MAX_SIGNERS}",
            signers.len()
        )));
    }
    if signers.is_empty() {
        accounts.push(AccountMeta::new_readonly(*authority, true));
    } else {
        accounts.push(AccountMeta::new_readonly(*authority, false));
        accounts.extend(signers.iter().map(|s| AccountMeta::new_readonly(**s, true)));
    }
    Ok(())
}

fn instruction(
    token_program_id: &Pubkey,
    data: TokenInstruction,
    accounts: Vec<AccountMeta>,
) -> Instruction {
    Instruction {
        program_id: *token_program_id,
        accounts,
        data: data.pack(),
    }
}

/// Must be in the same transaction as the `create_account` that allocates
/// the mint, otherwise another party can initialize it first.
pub fn initialize_mint(
    token_program_id: &Pubkey,
    mint: &Pubkey,
    mint_authority: &Pubkey,
    freeze_authority: Option<&Pubkey>,
    decimals: u8,
) -> Result<Instruction, ProgramError> {
    Ok(instruction(
        token_program_id,
        TokenInstruction::InitializeMint {
            decimals,
            mint_authority: *mint_authority,
            freeze_authority: freeze_authority.copied(),
        },
        vec![
            AccountMeta::new(*mint, false),
            AccountMeta::new_readonly(sysvar::RENT, false),
        ],
    ))
}

pub fn initialize_account(
    token_program_id: &Pubkey,
    account: &Pubkey,
    mint: &Pubkey,
    owner: &Pubkey,
) -> Result<Instruction, ProgramError> {
    Ok(instruction(
        token_program_id,
        TokenInstruction::InitializeAccount,
        vec![
            AccountMeta::new(*account, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(*owner, false),
            AccountMeta::new_readonly(sysvar::RENT, false),
        ],
    ))
}

pub fn initialize_multisig(
    token_program_id: &Pubkey,
    multisig: &Pubkey,
    signers: &[&Pubkey],
    m: u8,
) -> Result<Instruction, ProgramError> {
    if !(MIN_SIGNERS..=MAX_SIGNERS).contains(&signers.len()) {
        return Err(ProgramError::InvalidArgument(format!(
            "multisig needs {MIN_SIGNERS}..={MAX_SIGNERS} signers, got {}",
            signers.len()
        )));
    }
    if m == 0 || m as usize > signers.len() {
        return Err(ProgramError::InvalidArgument(format!(
            "required signatures {m} must be in 1..={}",
            signers.len()
        )));
    }
    let mut accounts = vec![
        AccountMeta::new(*multisig, false),
        AccountMeta::new_readonly(sysvar::RENT, false),
    ];
    accounts.extend(signers.iter().map(|s| AccountMeta::new_readonly(**s, false)));
    Ok(instruction(
        token_program_id,
        TokenInstruction::InitializeMultisig { m },
        accounts,
    ))
}

/// Transfer `amount` base units (for a token with 6 decimals, `1_000_000`
/// is one whole token).
pub fn transfer(
    token_program_id: &Pubkey,
    source: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    signers: &[&Pubkey],
    amount: u64,
) -> Result<Instruction, ProgramError> {
    let mut accounts = vec![
        AccountMeta::new(*source, false),
        AccountMeta::new(*destination, false),
    ];
    push_authority(&mut accounts, authority, signers)?;
    Ok(instruction(
        token_program_id,
        TokenInstruction::Transfer { amount },
        accounts,
    ))
}

pub fn approve(
    token_program_id: &Pubkey,
    source: &Pubkey,
    delegate: &Pubkey,
    owner: &Pubkey,
    signers: &[&Pubkey],
    amount: u64,
) -> Result<Instruction, ProgramError> {
    let mut accounts = vec![
        AccountMeta::new(*source, false),
        AccountMeta::new_readonly(*delegate, false),
    ];
    push_authority(&mut accounts, owner, signers)?;
    Ok(instruction(
        token_program_id,
        TokenInstruction::Approve { amount },
        accounts,
    ))
}

pub fn revoke(
    token_program_id: &Pubkey,
    source: &Pubkey,
    owner: &Pubkey,
    signers: &[&Pubkey],
) -> Result<Instruction, ProgramError> {
    let mut accounts = vec![AccountMeta::new(*source, false)];
    push_authority(&mut accounts, owner, signers)?;
    Ok(instruction(token_program_id, TokenInstruction::Revoke, accounts))
}

/// Set or clear (`new_authority = None`) an authority of a mint or account.
pub fn set_authority(
    token_program_id: &Pubkey,
    owned: &Pubkey,
    new_authority: Option<&Pubkey>,
    authority_type: AuthorityType,
    owner: &Pubkey,
    signers: &[&Pubkey],
) -> Result<Instruction, ProgramError> {
    let mut accounts = vec![AccountMeta::new(*owned, false)];
    push_authority(&mut accounts, owner, signers)?;
    Ok(instruction(
        token_program_id,
        TokenInstruction::SetAuthority {
            authority_type,
            new_authority: new_authority.copied(),
        },
        accounts,
    ))
}

pub fn mint_to(
    token_program_id: &Pubkey,
    mint: &Pubkey,
    account: &Pubkey,
    mint_authority: &Pubkey,
    signers: &[&Pubkey],
    amount: u64,
) -> Result<Instruction, ProgramError> {
    let mut accounts = vec![AccountMeta::new(*mint, false), AccountMeta::new(*account, false)];
    push_authority(&mut accounts, mint_authority, signers)?;
    Ok(instruction(
        token_program_id,
        TokenInstruction::MintTo { amount },
        accounts,
    ))
}

pub fn burn(
    token_program_id: &Pubkey,
    account: &Pubkey,
    mint: &Pubkey,
    authority: &Pubkey,
    signers: &[&Pubkey],
    amount: u64,
) -> Result<Instruction, ProgramError> {
    let mut accounts = vec![AccountMeta::new(*account, false), AccountMeta::new(*mint, false)];
    push_authority(&mut accounts, authority, signers)?;
    Ok(instruction(
        token_program_id,
        TokenInstruction::Burn { amount },
        accounts,
    ))
}

/// Close a token account, sending its lamports to `destination`. Non-native
/// accounts must hold a zero token balance.
pub fn close_account(
    token_program_id: &Pubkey,
    account: &Pubkey,
    destination: &Pubkey,
    owner: &Pubkey,
    signers: &[&Pubkey],
) -> Result<Instruction, ProgramError> {
    let mut accounts = vec![
        AccountMeta::new(*account, false),
        AccountMeta::new(*destination, false),
    ];
    push_authority(&mut accounts, owner, signers)?;
    Ok(instruction(token_program_id, TokenInstruction::CloseAccount, accounts))
}

fn freeze_or_thaw(
    data: TokenInstruction,
    token_program_id: &Pubkey,
    account: &Pubkey,
    mint: &Pubkey,
    freeze_authority: &Pubkey,
    signers: &[&Pubkey],
) -> Result<Instruction, ProgramError> {
    let mut accounts = vec![
        AccountMeta::new(*account, false),
        AccountMeta::new_readonly(*mint, false),
    ];
    push_authority(&mut accounts, freeze_authority, signers)?;
    Ok(instruction(token_program_id, data, accounts))
}

pub fn freeze_account(
    token_program_id: &Pubkey,
    account: &Pubkey,
    mint: &Pubkey,
    freeze_authority: &Pubkey,
    signers: &[&Pubkey],
) -> Result<Instruction, ProgramError> {
    freeze_or_thaw(
        TokenInstruction::FreezeAccount,
        token_program_id,
        account,
        mint,
        freeze_authority,
        signers,
    )
}

pub fn thaw_account(
    token_program_id: &Pubkey,
    account: &Pubkey,
    mint: &Pubkey,
    freeze_authority: &Pubkey,
    signers: &[&Pubkey],
) -> Result<Instruction, ProgramError> {
    freeze_or_thaw(
        TokenInstruction::ThawAccount,
        token_program_id,
        account,
        mint,
        freeze_authority,
        signers,
    )
}

/// Like `transfer`, but the program also asserts the mint and decimals.
#[allow(clippy::too_many_arguments)]
pub fn transfer_checked(
    token_program_id: &Pubkey,
    source: &Pubkey,
    mint: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    signers: &[&Pubkey],
    amount: u64,
    decimals: u8,
) -> Result<Instruction, ProgramError> {
    let mut accounts = vec![
        AccountMeta::new(*source, false),
        AccountMeta::new_readonly(*mint, false),
        AccountMeta::new(*destination, false),
    ];
    push_authority(&mut accounts, authority, signers)?;
    Ok(instruction(
        token_program_id,
        TokenInstruction::TransferChecked { amount, decimals },
        accounts,
    ))
}

#[allow(clippy::too_many_arguments)]
pub fn approve_checked(
    token_program_id: &Pubkey,
    source: &Pubkey,
    mint: &Pubkey,
    delegate: &Pubkey,
    owner: &Pubkey,
    signers: &[&Pubkey],
    amount: u64,
    decimals: u8,
) -> Result<Instruction, ProgramError> {
    let mut accounts = vec![
        AccountMeta::new(*source, false),
        AccountMeta::new_readonly(*mint, false),
        AccountMeta::new_readonly(*delegate, false),
    ];
    push_authority(&mut accounts, owner, signers)?;
    Ok(instruction(
        token_program_id,
        TokenInstruction::ApproveChecked { amount, decimals },
        accounts,
    ))
}

pub fn mint_to_checked(
    token_program_id: &Pubkey,
    mint: &Pubkey,
    account: &Pubkey,
    mint_authority: &Pubkey,
    signers: &[&Pubkey],
    amount: u64,
    decimals: u8,
) -> Result<Instruction, ProgramError> {
    let mut accounts = vec![AccountMeta::new(*mint, false), AccountMeta::new(*account, false)];
    push_authority(&mut accounts, mint_authority, signers)?;
    Ok(instruction(
        token_program_id,
        TokenInstruction::MintToChecked { amount, decimals },
        accounts,
    ))
}

pub fn burn_checked(
    token_program_id: &Pubkey,
    account: &Pubkey,
    mint: &Pubkey,
    authority: &Pubkey,
    signers: &[&Pubkey],
    amount: u64,
    decimals: u8,
) -> Result<Instruction, ProgramError> {
    let mut accounts = vec![AccountMeta::new(*account, false), AccountMeta::new(*mint, false)];
    push_authority(&mut accounts, authority, signers)?;
    Ok(instruction(
        token_program_id,
        TokenInstruction::BurnChecked { amount, decimals },
        accounts,
    ))
}

/// Sync a wrapped SOL account's token amount with its lamports.
pub fn sync_native(token_program_id: &Pubkey, account: &Pubkey) -> Result<Instruction, ProgramError> {
    Ok(instruction(
        token_program_id,
        TokenInstruction::SyncNative,
        vec![AccountMeta::new(*account, false)],
    ))
}

// ---------------------------------------------------------------------------
// Account layouts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountState {
    Uninitialized = 0,
    Initialized = 1,
    Frozen = 2,
}

/// Reader over packed account state. Options are `COption`: a u32 LE tag
/// followed by the value, present even when the tag is zero.
struct StateReader<'a>(DataReader<'a>);

impl StateReader<'_> {
    fn coption_pubkey(&mut self) -> Result<Option<Pubkey>, ProgramError> {
        let tag = self.0.u32()?;
        let key = self.0.pubkey()?;
        match tag {
            0 => Ok(None),
            1 => Ok(Some(key)),
            other => Err(invalid_state(format!("invalid COption tag {other}"))),
        }
    }

    fn coption_u64(&mut self) -> Result<Option<u64>, ProgramError> {
        let tag = self.0.u32()?;
        let value = self.0.u64()?;
        match tag {
            0 => Ok(None),
            1 => Ok(Some(value)),
            other => Err(invalid_state(format!("invalid COption tag {other}"))),
        }
    }

    fn bool(&mut self) -> Result<bool, ProgramError> {
        match self.0.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(invalid_state(format!("invalid bool {other}"))),
        }
    }
}

fn invalid_state(msg: String) -> ProgramError {
    ProgramError::InvalidArgument(format!("invalid token account state: {msg}"))
}

/// Return the base layout of `data`, accepting Token-2022 accounts that
/// carry extensions after it.
fn base_layout(data: &[u8], len: usize, account_type: u8) -> Result<&[u8], ProgramError> {
    if data.len() == len {
        return Ok(data);
    }
    if data.len() > ACCOUNT_LEN && data[ACCOUNT_LEN] == account_type {
        return Ok(&data[..len]);
    }
    Err(invalid_state(format!(
        "expected {len} bytes, got {}",
        data.len()
    )))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mint {
    pub mint_authority: Option<Pubkey>,
    pub supply: u64,
    pub decimals: u8,
    pub is_initialized: bool,
    pub freeze_authority: Option<Pubkey>,
}

impl Mint {
    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        let mut r = StateReader(DataReader::new(base_layout(data, MINT_LEN, ACCOUNT_TYPE_MINT)?));
        Ok(Self {
            mint_authority: r.coption_pubkey()?,
            supply: r.0.u64()?,
            decimals: r.0.u8()?,
            is_initialized: r.bool()?,
            freeze_authority: r.coption_pubkey()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAccount {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub delegate: Option<Pubkey>,
    pub state: AccountState,
    /// Rent-exempt reserve for wrapped SOL accounts.
    pub is_native: Option<u64>,
    pub delegated_amount: u64,
    pub close_authority: Option<Pubkey>,
}

impl TokenAccount {
    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        let mut r = StateReader(DataReader::new(base_layout(
            data,
            ACCOUNT_LEN,
            ACCOUNT_TYPE_ACCOUNT,
        )?));
        Ok(Self {
            mint: r.0.pubkey()?,
            owner: r.0.pubkey()?,
            amount: r.0.u64()?,
            delegate: r.coption_pubkey()?,
            state: match r.0.u8()? {
                0 => AccountState::Uninitialized,
                1 => AccountState::Initialized,
                2 => AccountState::Frozen,
                other => return Err(invalid_state(format!("invalid account state {other}"))),
            },
            is_native: r.coption_u64()?,
            delegated_amount: r.0.u64()?,
            close_authority: r.coption_pubkey()?,
        })
    }

    pub fn is_frozen(&self) -> bool {
        self.state == AccountState::Frozen
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multisig {
    pub m: u8,
    pub n: u8,
    pub is_initialized: bool,
    pub signers: Vec<Pubkey>,
}

impl Multisig {
    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        if data.len() != MULTISIG_LEN {
            return Err(invalid_state(format!(
                "expected {MULTISIG_LEN} bytes, got {}",
                data.len()
            )));
        }
        let mut r = StateReader(DataReader::new(data));
        let m = r.0.u8()?;
        let n = r.0.u8()?;
        let is_initialized = r.bool()?;
        if n as usize > MAX_SIGNERS {
            return Err(invalid_state(format!("{n} signers exceeds {MAX_SIGNERS}")));
        }
        let signers = (0..n).map(|_| r.0.pubkey()).collect::<Result<_, _>>()?;
        Ok(Self {
            m,
            n,
            is_initialized,
            signers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(b: u8) -> Pubkey {
        Pubkey::new_from_array([b; 32])
    }

    // -- Constant verification ----------------------------------------------

    #[test]
    fn program_ids_match_base58() {
        assert_eq!(TOKEN_PROGRAM_ID.to_string(), "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
        assert_eq!(
            TOKEN_2022_PROGRAM_ID.to_string(),
            "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb"
        );
        assert_eq!(NATIVE_MINT.to_string(), "So11111111111111111111111111111111111111112");
    }

    // -- Transfer -----------------------------------------------------------

    #[test]
    fn transfer_data_encoding() {
        let ix = transfer(&TOKEN_PROGRAM_ID, &key(1), &key(2), &key(3), &[], 500_000).unwrap();
        assert_eq!(ix.data.len(), 9);
        assert_eq!(ix.data[0], 3);
        assert_eq!(u64::from_le_bytes(ix.data[1..9].try_into().unwrap()), 500_000);
        assert_eq!(ix.program_id, TOKEN_PROGRAM_ID);
    }

    #[test]
    fn transfer_account_roles() {
        let ix = transfer(&TOKEN_PROGRAM_ID, &key(1), &key(2), &key(3), &[], 100).unwrap();
        assert_eq!(ix.accounts.len(), 3);
        assert!(ix.accounts[0].is_writable && !ix.accounts[0].is_signer);
        assert!(ix.accounts[1].is_writable && !ix.accounts[1].is_signer);
        assert!(ix.accounts[2].is_signer && !ix.accounts[2].is_writable);
    }

    #[test]
    fn multisig_authority_is_not_signer() {
        let ix = transfer(&TOKEN_PROGRAM_ID, &key(1), &key(2), &key(3), &[&key(4), &key(5)], 1).unwrap();
        assert_eq!(ix.accounts.len(), 5);
        assert!(!ix.accounts[2].is_signer);
        assert!(ix.accounts[3].is_signer && !ix.accounts[3].is_writable);
        assert!(ix.accounts[4].is_signer);
    }

    #[test]
    fn too_many_multisig_signers_rejected() {
        let signer = key(9);
        let signers = vec![&signer; MAX_SIGNERS + 1];
        assert!(transfer(&TOKEN_PROGRAM_ID, &key(1), &key(2), &key(3), &signers, 1).is_err());
    }

    #[test]
    fn custom_program_id_is_used() {
        let ix = transfer(&TOKEN_2022_PROGRAM_ID, &key(1), &key(2), &key(3), &[], 1).unwrap();
        assert_eq!(ix.program_id, TOKEN_2022_PROGRAM_ID);
        assert!(TokenInstruction::decode(&ix).is_ok());
    }

    #[test]
    fn transfer_checked_layout() {
        let ix = transfer_checked(&TOKEN_PROGRAM_ID, &key(1), &key(5), &key(2), &key(3), &[], 1000, 6)
            .unwrap();
        assert_eq!(ix.data.len(), 10);
        assert_eq!(ix.data[0], 12);
        assert_eq!(ix.data[9], 6);
        assert_eq!(ix.accounts[1].pubkey, key(5));
        assert!(!ix.accounts[1].is_writable);
        assert_eq!(
            TokenInstruction::decode(&ix).unwrap(),
            TokenInstruction::TransferChecked {
                amount: 1000,
                decimals: 6,
            }
        );
    }

    // -- Initialization -----------------------------------------------------

    #[test]
    fn initialize_mint_layout() {
        let ix = initialize_mint(&TOKEN_PROGRAM_ID, &key(1), &key(2), Some(&key(3)), 6).unwrap();
        assert_eq!(ix.data.len(), 67);
        assert_eq!(ix.data[0], 0);
        assert_eq!(ix.data[1], 6);
        assert_eq!(ix.data[34], 1);
        assert_eq!(ix.accounts[1].pubkey, sysvar::RENT);
        assert_eq!(
            TokenInstruction::decode(&ix).unwrap(),
            TokenInstruction::InitializeMint {
                decimals: 6,
                mint_authority: key(2),
                freeze_authority: Some(key(3)),
            }
        );

        let no_freeze = initialize_mint(&TOKEN_PROGRAM_ID, &key(1), &key(2), None, 0).unwrap();
        assert_eq!(no_freeze.data.len(), 67);
        assert_eq!(no_freeze.data[34], 0);
    }

    #[test]
    fn initialize_account_accounts() {
        let ix = initialize_account(&TOKEN_PROGRAM_ID, &key(1), &key(2), &key(3)).unwrap();
        assert_eq!(ix.data, vec![1]);
        let keys: Vec<Pubkey> = ix.accounts.iter().map(|m| m.pubkey).collect();
        assert_eq!(keys, vec![key(1), key(2), key(3), sysvar::RENT]);
    }

    #[test]
    fn initialize_multisig_validates_m() {
        let a = key(4);
        let b = key(5);
        let ix = initialize_multisig(&TOKEN_PROGRAM_ID, &key(1), &[&a, &b], 2).unwrap();
        assert_eq!(ix.data, vec![2, 2]);
        assert_eq!(ix.accounts.len(), 4);
        assert!(initialize_multisig(&TOKEN_PROGRAM_ID, &key(1), &[&a, &b], 3).is_err());
        assert!(initialize_multisig(&TOKEN_PROGRAM_ID, &key(1), &[&a], 0).is_err());
        assert!(initialize_multisig(&TOKEN_PROGRAM_ID, &key(1), &[], 1).is_err());
    }

    // -- Other instructions decode ------------------------------------------

    #[test]
    fn authority_instructions_decode() {
        let ix = set_authority(
            &TOKEN_PROGRAM_ID,
            &key(1),
            None,
            AuthorityType::CloseAccount,
            &key(2),
            &[],
        )
        .unwrap();
        assert_eq!(ix.data.len(), 35);
        assert_eq!(
            TokenInstruction::decode(&ix).unwrap(),
            TokenInstruction::SetAuthority {
                authority_type: AuthorityType::CloseAccount,
                new_authority: None,
            }
        );

        let ix = approve(&TOKEN_PROGRAM_ID, &key(1), &key(2), &key(3), &[], 123).unwrap();
        assert_eq!(TokenInstruction::decode(&ix).unwrap(), TokenInstruction::Approve { amount: 123 });
        let ix = revoke(&TOKEN_PROGRAM_ID, &key(1), &key(3), &[]).unwrap();
        assert_eq!(TokenInstruction::decode(&ix).unwrap(), TokenInstruction::Revoke);
        let ix = approve_checked(&TOKEN_PROGRAM_ID, &key(1), &key(4), &key(2), &key(3), &[], 5, 2).unwrap();
        assert_eq!(
            TokenInstruction::decode(&ix).unwrap(),
            TokenInstruction::ApproveChecked { amount: 5, decimals: 2 }
        );
    }

    #[test]
    fn supply_instructions_decode() {
        let cases = [
            (
                mint_to(&TOKEN_PROGRAM_ID, &key(1), &key(2), &key(3), &[], 7).unwrap(),
                TokenInstruction::MintTo { amount: 7 },
            ),
            (
                mint_to_checked(&TOKEN_PROGRAM_ID, &key(1), &key(2), &key(3), &[], 7, 9).unwrap(),
                TokenInstruction::MintToChecked { amount: 7, decimals: 9 },
            ),
            (
                burn(&TOKEN_PROGRAM_ID, &key(2), &key(1), &key(3), &[], 4).unwrap(),
                TokenInstruction::Burn { amount: 4 },
            ),
            (
                burn_checked(&TOKEN_PROGRAM_ID, &key(2), &key(1), &key(3), &[], 4, 9).unwrap(),
                TokenInstruction::BurnChecked { amount: 4, decimals: 9 },
            ),
            (
                close_account(&TOKEN_PROGRAM_ID, &key(2), &key(5), &key(3), &[]).unwrap(),
                TokenInstruction::CloseAccount,
            ),
            (
                freeze_account(&TOKEN_PROGRAM_ID, &key(2), &key(1), &key(3), &[]).unwrap(),
                TokenInstruction::FreezeAccount,
            ),
            (
                thaw_account(&TOKEN_PROGRAM_ID, &key(2), &key(1), &key(3), &[]).unwrap(),
                TokenInstruction::ThawAccount,
            ),
            (
                sync_native(&TOKEN_PROGRAM_ID, &key(2)).unwrap(),
                TokenInstruction::SyncNative,
            ),
        ];
        for (ix, expected) in cases {
            assert_eq!(TokenInstruction::decode(&ix).unwrap(), expected);
        }
    }

    #[test]
    fn sync_native_uses_tag_17() {
        let ix = sync_native(&TOKEN_PROGRAM_ID, &key(2)).unwrap();
        assert_eq!(ix.data, vec![17]);
    }

    #[test]
    fn decode_rejects_other_programs() {
        let mut ix = transfer(&TOKEN_PROGRAM_ID, &key(1), &key(2), &key(3), &[], 1).unwrap();
        ix.program_id = key(8);
        assert!(matches!(
            TokenInstruction::decode(&ix),
            Err(ProgramError::InvalidProgramId { .. })
        ));
    }

    #[test]
    fn unpack_rejects_unknown_tag() {
        assert!(TokenInstruction::unpack(&[16]).is_err());
        assert!(TokenInstruction::unpack(&[]).is_err());
    }

    // -- Layouts ------------------------------------------------------------

    fn mint_bytes() -> Vec<u8> {
        let mut data = Vec::with_capacity(MINT_LEN);
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&[2u8; 32]);
        data.extend_from_slice(&1_000_000u64.to_le_bytes());
        data.push(6);
        data.push(1);
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&[0u8; 32]);
        data
    }

    fn account_bytes() -> Vec<u8> {
        let mut data = Vec::with_capacity(ACCOUNT_LEN);
        data.extend_from_slice(&[1u8; 32]);
        data.extend_from_slice(&[2u8; 32]);
        data.extend_from_slice(&42u64.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&[0u8; 32]);
        data.push(2);
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&2_039_280u64.to_le_bytes());
        data.extend_from_slice(&0u64.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&[3u8; 32]);
        data
    }

    #[test]
    fn mint_unpack() {
        let data = mint_bytes();
        assert_eq!(data.len(), MINT_LEN);
        let mint = Mint::unpack(&data).unwrap();
        assert_eq!(mint.mint_authority, Some(key(2)));
        assert_eq!(mint.supply, 1_000_000);
        assert_eq!(mint.decimals, 6);
        assert!(mint.is_initialized);
        assert_eq!(mint.freeze_authority, None);
    }

    #[test]
    fn token_account_unpack() {
        let data = account_bytes();
        assert_eq!(data.len(), ACCOUNT_LEN);
        let account = TokenAccount::unpack(&data).unwrap();
        assert_eq!(account.mint, key(1));
        assert_eq!(account.owner, key(2));
        assert_eq!(account.amount, 42);
        assert_eq!(account.delegate, None);
        assert!(account.is_frozen());
        assert_eq!(account.is_native, Some(2_039_280));
        assert_eq!(account.close_authority, Some(key(3)));
    }

    #[test]
    fn token_2022_extensions_are_tolerated() {
        let mut data = account_bytes();
        data.push(ACCOUNT_TYPE_ACCOUNT);
        data.extend_from_slice(&[0u8; 8]);
        assert!(TokenAccount::unpack(&data).is_ok());
        assert!(Mint::unpack(&data).is_err());
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(Mint::unpack(&[0u8; 10]).is_err());
        assert!(TokenAccount::unpack(&mint_bytes()).is_err());
    }

    #[test]
    fn multisig_unpack() {
        let mut data = vec![2, 3, 1];
        data.extend_from_slice(&[4u8; 32]);
        data.extend_from_slice(&[5u8; 32]);
        data.extend_from_slice(&[6u8; 32]);
        data.resize(MULTISIG_LEN, 0);
        let multisig = Multisig::unpack(&data).unwrap();
        assert_eq!(multisig.m, 2);
        assert_eq!(multisig.signers, vec![key(4), key(5), key(6)]);
    }
}
