//! Vote Program instructions. Only withdrawing from a vote account is
//! supported.

use sol_core::{AccountMeta, Instruction, Pubkey};

use crate::data::{check_accounts, check_program_id, DataReader};
use crate::error::ProgramError;

/// `Vote111111111111111111111111111111111111111`
pub const ID: Pubkey = Pubkey::new_from_array([
    0x07, 0x61, 0x48, 0x1d, 0x35, 0x74, 0x74, 0xbb, 0x7c, 0x4d, 0x76, 0x24, 0xeb, 0xd3, 0xbd, 0xb3,
    0xd8, 0x35, 0x5e, 0x73, 0xd1, 0x10, 0x43, 0xfc, 0x0d, 0xa3, 0x53, 0x80, 0x00, 0x00, 0x00, 0x00,
]);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteInstruction {
    Withdraw { lamports: u64 },
}

impl VoteInstruction {
    pub fn pack(&self) -> Vec<u8> {
        match self {
            Self::Withdraw { lamports } => {
                let mut buf = Vec::with_capacity(12);
                buf.extend_from_slice(&3u32.to_le_bytes());
                buf.extend_from_slice(&lamports.to_le_bytes());
                buf
            }
        }
    }

    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        let mut r = DataReader::new(data);
        let ix = match r.u32()? {
            3 => Self::Withdraw { lamports: r.u64()? },
            tag => {
                return Err(ProgramError::InvalidInstructionData(format!(
                    "unsupported vote instruction {tag}"
                )))
            }
        };
        r.finish()?;
        Ok(ix)
    }

    pub fn decode(ix: &Instruction) -> Result<Self, ProgramError> {
        check_program_id(ix, &ID)?;
        let decoded = Self::unpack(&ix.data)?;
        check_accounts(ix, 3)?;
        Ok(decoded)
    }
}

/// Move `lamports` out of `vote` into `to`, signed by the authorized
/// withdrawer.
pub fn withdraw(vote: &Pubkey, withdrawer: &Pubkey, lamports: u64, to: &Pubkey) -> Instruction {
    Instruction {
        program_id: ID,
        accounts: vec![
            AccountMeta::new(*vote, false),
            AccountMeta::new(*to, false),
            AccountMeta::new_readonly(*withdrawer, true),
        ],
        data: VoteInstruction::Withdraw { lamports }.pack(),
    }
}
