//! Compute Budget program: compute unit limit and priority fee.

use sol_core::{Instruction, Pubkey};

use crate::data::{check_program_id, DataReader};
use crate::error::ProgramError;

/// Compute Budget Program ID: `ComputeBudget111111111111111111111111111111`
pub const ID: Pubkey = Pubkey::new_from_array([
    0x03, 0x06, 0x46, 0x6f, 0xe5, 0x21, 0x17, 0x32, 0xff, 0xec, 0xad, 0xba, 0x72, 0xc3, 0x9b, 0xe7,
    0xbc, 0x8c, 0xe5, 0xbb, 0xc5, 0xf7, 0x12, 0x6b, 0x2c, 0x43, 0x9b, 0x3a, 0x40, 0x00, 0x00, 0x00,
]);

pub const MIN_HEAP_FRAME_BYTES: u32 = 32 * 1024;
pub const MAX_HEAP_FRAME_BYTES: u32 = 256 * 1024;
const HEAP_FRAME_GRANULARITY: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeBudgetInstruction {
    RequestHeapFrame(u32),
    SetComputeUnitLimit(u32),
    /// Price in micro-lamports per compute unit.
    SetComputeUnitPrice(u64),
    SetLoadedAccountsDataSizeLimit(u32),
}

impl ComputeBudgetInstruction {
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(9);
        match self {
            Self::RequestHeapFrame(bytes) => {
                buf.push(1);
                buf.extend_from_slice(&bytes.to_le_bytes());
            }
            Self::SetComputeUnitLimit(units) => {
                buf.push(2);
                buf.extend_from_slice(&units.to_le_bytes());
            }
            Self::SetComputeUnitPrice(micro_lamports) => {
                buf.push(3);
                buf.extend_from_slice(&micro_lamports.to_le_bytes());
            }
            Self::SetLoadedAccountsDataSizeLimit(bytes) => {
                buf.push(4);
                buf.extend_from_slice(&bytes.to_le_bytes());
            }
        }
        buf
    }

    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        let mut r = DataReader::new(data);
        let ix = match r.u8()? {
            1 => Self::RequestHeapFrame(r.u32()?),
            2 => Self::SetComputeUnitLimit(r.u32()?),
            3 => Self::SetComputeUnitPrice(r.u64()?),
            4 => Self::SetLoadedAccountsDataSizeLimit(r.u32()?),
            tag => {
                return Err(ProgramError::InvalidInstructionData(format!(
                    "unknown compute budget instruction {tag}"
                )))
            }
        };
        r.finish()?;
        Ok(ix)
    }

    pub fn decode(ix: &Instruction) -> Result<Self, ProgramError> {
        check_program_id(ix, &ID)?;
        Self::unpack(&ix.data)
    }

    fn into_instruction(self) -> Instruction {
        Instruction::new_with_bytes(ID, &self.pack(), Vec::new())
    }
}

/// Request a larger heap. `bytes` must be a multiple of 1024 between 32 KiB
/// and 256 KiB.
pub fn request_heap_frame(bytes: u32) -> Result<Instruction, ProgramError> {
    if !(MIN_HEAP_FRAME_BYTES..=MAX_HEAP_FRAME_BYTES).contains(&bytes)
        || bytes % HEAP_FRAME_GRANULARITY != 0
    {
        return Err(ProgramError::InvalidArgument(format!(
            "heap frame {bytes} must be a multiple of {HEAP_FRAME_GRANULARITY} in \
             {MIN_HEAP_FRAME_BYTES}..={MAX_HEAP_FRAME_BYTES}"
        )));
    }
    Ok(ComputeBudgetInstruction::RequestHeapFrame(bytes).into_instruction())
}

pub fn set_compute_unit_limit(units: u32) -> Instruction {
    ComputeBudgetInstruction::SetComputeUnitLimit(units).into_instruction()
}

pub fn set_compute_unit_price(micro_lamports: u64) -> Instruction {
    ComputeBudgetInstruction::SetComputeUnitPrice(micro_lamports).into_instruction()
}

pub fn set_loaded_accounts_data_size_limit(bytes: u32) -> Instruction {
    ComputeBudgetInstruction::SetLoadedAccountsDataSizeLimit(bytes).into_instruction()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_id_matches_base58() {
        assert_eq!(ID.to_string(), "ComputeBudget111111111111111111111111111111");
    }

    #[test]
    fn unit_limit_layout() {
        let ix = set_compute_unit_limit(200_000);
        assert_eq!(ix.data, vec![2, 0x40, 0x0d, 0x03, 0x00]);
        assert!(ix.accounts.is_empty());
    }

    #[test]
    fn unit_price_layout() {
        let ix = set_compute_unit_price(1);
        assert_eq!(ix.data, vec![3, 1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(
            ComputeBudgetInstruction::decode(&ix).unwrap(),
            ComputeBudgetInstruction::SetComputeUnitPrice(1)
        );
    }

    #[test]
    fn heap_frame_bounds() {
        assert!(request_heap_frame(32 * 1024).is_ok());
        assert!(request_heap_frame(256 * 1024).is_ok());
        assert!(request_heap_frame(31 * 1024).is_err());
        assert!(request_heap_frame(257 * 1024).is_err());
        assert!(request_heap_frame(40 * 1024 + 1).is_err());
    }

    #[test]
    fn decode_roundtrips_every_variant() {
        let ixs = [
            request_heap_frame(64 * 1024).unwrap(),
            set_compute_unit_limit(1_400_000),
            set_compute_unit_price(5_000),
            set_loaded_accounts_data_size_limit(65_536),
        ];
        let decoded: Vec<_> = ixs
            .iter()
            .map(|ix| ComputeBudgetInstruction::decode(ix).unwrap())
            .collect();
        assert_eq!(
            decoded,
            vec![
                ComputeBudgetInstruction::RequestHeapFrame(64 * 1024),
                ComputeBudgetInstruction::SetComputeUnitLimit(1_400_000),
                ComputeBudgetInstruction::SetComputeUnitPrice(5_000),
                ComputeBudgetInstruction::SetLoadedAccountsDataSizeLimit(65_536),
            ]
        );
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(ComputeBudgetInstruction::unpack(&[0]).is_err());
        assert!(ComputeBudgetInstruction::unpack(&[2, 1]).is_err());
        assert!(ComputeBudgetInstruction::unpack(&[2, 1, 0, 0, 0, 9]).is_err());
    }
}
