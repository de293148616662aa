//! Little-endian instruction data encoding shared by the program modules.

use sol_core::{Hash, Instruction, Pubkey};

use crate::error::ProgramError;

/// Reads fixed-width fields from instruction data.
pub(crate) struct DataReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DataReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], ProgramError> {
        let end = self.pos.saturating_add(len);
        let bytes = self.data.get(self.pos..end).ok_or_else(|| {
            ProgramError::InvalidInstructionData(format!(
                "need {len} bytes at offset {}, have {}",
                self.pos,
                self.data.len()
            ))
        })?;
        self.pos = end;
        Ok(bytes)
    }

    pub(crate) fn u8(&mut self) -> Result<u8, ProgramError> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn u32(&mut self) -> Result<u32, ProgramError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    pub(crate) fn u64(&mut self) -> Result<u64, ProgramError> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(buf))
    }

    pub(crate) fn i64(&mut self) -> Result<i64, ProgramError> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(i64::from_le_bytes(buf))
    }

    pub(crate) fn pubkey(&mut self) -> Result<Pubkey, ProgramError> {
        Ok(Pubkey::try_from_slice(self.take(32)?)?)
    }

    pub(crate) fn hash(&mut self) -> Result<Hash, ProgramError> {
        let mut buf = [0u8; 32];
        buf.copy_from_slice(self.take(32)?);
        Ok(Hash::new_from_array(buf))
    }

    /// A bincode string: u64 LE length followed by UTF-8 bytes.
    pub(crate) fn string(&mut self) -> Result<String, ProgramError> {
        let len = usize::try_from(self.u64()?)
            .map_err(|_| ProgramError::InvalidInstructionData("string length overflow".into()))?;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ProgramError::InvalidInstructionData(format!("seed is not UTF-8: {e}")))
    }

    /// A `COption<Pubkey>` packed as a one-byte tag, optionally followed by
    /// the key. A `None` tag may be followed by a zeroed key, which is skipped.
    pub(crate) fn optional_pubkey(&mut self) -> Result<Option<Pubkey>, ProgramError> {
        match self.u8()? {
            0 => {
                if self.data.len() - self.pos >= 32 {
                    self.take(32)?;
                }
                Ok(None)
            }
            1 => Ok(Some(self.pubkey()?)),
            tag => Err(ProgramError::InvalidInstructionData(format!(
                "invalid option tag {tag}"
            ))),
        }
    }

    pub(crate) fn finish(&self) -> Result<(), ProgramError> {
        if self.pos != self.data.len() {
            return Err(ProgramError::InvalidInstructionData(format!(
                "{} unexpected trailing bytes",
                self.data.len() - self.pos
            )));
        }
        Ok(())
    }
}

pub(crate) fn push_string(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u64).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
}

/// Packs `COption<Pubkey>` as a tag byte plus a key, zeroed when absent.
pub(crate) fn push_optional_pubkey(buf: &mut Vec<u8>, key: Option<&Pubkey>) {
    match key {
        Some(key) => {
            buf.push(1);
            buf.extend_from_slice(key.as_ref());
        }
        None => {
            buf.push(0);
            buf.extend_from_slice(&[0u8; 32]);
        }
    }
}

pub(crate) fn check_program_id(ix: &Instruction, expected: &Pubkey) -> Result<(), ProgramError> {
    if ix.program_id != *expected {
        return Err(ProgramError::InvalidProgramId {
            expected: *expected,
            actual: ix.program_id,
        });
    }
    Ok(())
}

pub(crate) fn check_accounts(ix: &Instruction, expected: usize) -> Result<(), ProgramError> {
    if ix.accounts.len() < expected {
        return Err(ProgramError::NotEnoughAccounts {
            expected,
            actual: ix.accounts.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_round_trips_through_bincode_layout() {
        let mut buf = Vec::new();
        push_string(&mut buf, "gqln");
        assert_eq!(&buf[..8], &4u64.to_le_bytes());
        let mut reader = DataReader::new(&buf);
        assert_eq!(reader.string().unwrap(), "gqln");
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn optional_pubkey_accepts_short_none() {
        let mut reader = DataReader::new(&[0]);
        assert_eq!(reader.optional_pubkey().unwrap(), None);
        assert!(reader.finish().is_ok());

        let mut buf = Vec::new();
        push_optional_pubkey(&mut buf, None);
        assert_eq!(buf.len(), 33);
        let mut reader = DataReader::new(&buf);
        assert_eq!(reader.optional_pubkey().unwrap(), None);
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn truncated_data_is_rejected() {
        let mut reader = DataReader::new(&[1, 2, 3]);
        assert!(reader.u32().is_err());
    }
}
