//! Legacy transaction messages: compilation and wire format.
//!
//! ```text
//! Message:
//!   num_required_sigs     u8
//!   num_readonly_signed   u8
//!   num_readonly_unsigned u8
//!   num_accounts          compact-u16
//!   account_keys          32 bytes * num_accounts
//!   recent_blockhash      32 bytes
//!   num_instructions      compact-u16
//!   instructions[]
//!
//! Instruction:
//!   program_id_index      u8
//!   num_accounts          compact-u16
//!   account_indices       u8 * num_accounts
//!   data_len              compact-u16
//!   data                  u8 * data_len
//! ```

use crate::error::SolError;
use crate::hash::Hash;
use crate::instruction::{AccountMeta, CompiledInstruction, Instruction};
use crate::pubkey::Pubkey;
use crate::shortvec::{write_len, Reader};

/// Account indices are a single byte, so a message addresses at most 256 keys.
pub const MAX_ACCOUNTS: usize = 256;

/// Versioned messages set the high bit of the first byte.
const VERSION_PREFIX_MASK: u8 = 0x80;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageHeader {
    /// The first `num_required_signatures` account keys are signers.
    pub num_required_signatures: u8,
    /// How many of the signing accounts are read-only.
    pub num_readonly_signed_accounts: u8,
    /// How many of the non-signing accounts are read-only.
    pub num_readonly_unsigned_accounts: u8,
}

/// A compiled legacy message. Always carries at least one signer, the fee
/// payer, at index 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    header: MessageHeader,
    account_keys: Vec<Pubkey>,
    recent_blockhash: Hash,
    instructions: Vec<CompiledInstruction>,
}

struct AccountEntry {
    pubkey: Pubkey,
    is_signer: bool,
    is_writable: bool,
}

impl AccountEntry {
    fn class(&self) -> u8 {
        match (self.is_signer, self.is_writable) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        }
    }
}

impl Message {
    /// Compile `instructions` into a message paid for by `payer`.
    ///
    /// Accounts are ordered writable signers, read-only signers, writable
    /// non-signers, read-only non-signers. Inside a class accounts keep the
    /// order they were first referenced in, with program ids coming after
    /// every instruction account. The fee payer always comes first.
    pub fn compile(
        instructions: &[Instruction],
        payer: &Pubkey,
        recent_blockhash: Hash,
    ) -> Result<Self, SolError> {
        if instructions.is_empty() {
            return Err(SolError::MessageCompileError("no instructions provided".into()));
        }

        let mut entries: Vec<AccountEntry> = Vec::new();
        let mut upsert = |pubkey: Pubkey, signer: bool, writable: bool| {
            if let Some(entry) = entries.iter_mut().find(|e| e.pubkey == pubkey) {
                entry.is_signer |= signer;
                entry.is_writable |= writable;
            } else {
                entries.push(AccountEntry {
                    pubkey,
                    is_signer: signer,
                    is_writable: writable,
                });
            }
        };

        upsert(*payer, true, true);
        for meta in instructions.iter().flat_map(|ix| &ix.accounts) {
            upsert(meta.pubkey, meta.is_signer, meta.is_writable);
        }
        for ix in instructions {
            upsert(ix.program_id, false, false);
        }

        if entries.len() > MAX_ACCOUNTS {
            return Err(SolError::MessageCompileError(format!(
                "{} unique accounts exceeds the limit of {MAX_ACCOUNTS}",
                entries.len()
            )));
        }

        // Stable sort keeps first-seen order within a class; the payer is
        // the first writable signer so it stays at index 0.
        entries.sort_by_key(AccountEntry::class);

        let count = |pred: fn(&AccountEntry) -> bool| -> Result<u8, SolError> {
            let n = entries.iter().filter(|e| pred(e)).count();
            u8::try_from(n).map_err(|_| {
                SolError::MessageCompileError(format!("{n} accounts do not fit in a header count"))
            })
        };
        let header = MessageHeader {
            num_required_signatures: count(|e| e.is_signer)?,
            num_readonly_signed_accounts: count(|e| e.is_signer && !e.is_writable)?,
            num_readonly_unsigned_accounts: count(|e| !e.is_signer && !e.is_writable)?,
        };

        let account_keys: Vec<Pubkey> = entries.iter().map(|e| e.pubkey).collect();
        let index_of = |key: &Pubkey| -> Result<u8, SolError> {
            account_keys
                .iter()
                .position(|k| k == key)
                .map(|i| i as u8)
                .ok_or_else(|| SolError::MessageCompileError(format!("account {key} not in account keys")))
        };

        let mut compiled = Vec::with_capacity(instructions.len());
        for ix in instructions {
            let accounts = ix
                .accounts
                .iter()
                .map(|meta| index_of(&meta.pubkey))
                .collect::<Result<Vec<u8>, SolError>>()?;
            compiled.push(CompiledInstruction {
                program_id_index: index_of(&ix.program_id)?,
                accounts,
                data: ix.data.clone(),
            });
        }

        Ok(Self {
            header,
            account_keys,
            recent_blockhash,
            instructions: compiled,
        })
    }

    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    pub fn account_keys(&self) -> &[Pubkey] {
        &self.account_keys
    }

    pub fn recent_blockhash(&self) -> &Hash {
        &self.recent_blockhash
    }

    pub fn instructions(&self) -> &[CompiledInstruction] {
        &self.instructions
    }

    /// The same message re-targeted at a different blockhash.
    pub fn with_blockhash(&self, recent_blockhash: Hash) -> Self {
        Self {
            recent_blockhash,
            ..self.clone()
        }
    }

    pub fn fee_payer(&self) -> &Pubkey {
        &self.account_keys[0]
    }

    pub fn is_signer(&self, index: usize) -> bool {
        index < self.header.num_required_signatures as usize
    }

    pub fn is_writable(&self, index: usize) -> bool {
        let num_keys = self.account_keys.len();
        let num_signers = self.header.num_required_signatures as usize;
        if index >= num_keys {
            false
        } else if index < num_signers {
            index < num_signers - self.header.num_readonly_signed_accounts as usize
        } else {
            index < num_keys - self.header.num_readonly_unsigned_accounts as usize
        }
    }

    /// Keys that must sign, in signature-slot order.
    pub fn signer_keys(&self) -> &[Pubkey] {
        &self.account_keys[..self.header.num_required_signatures as usize]
    }

    /// Program invoked by the instruction at `instruction_index`.
    pub fn program_id(&self, instruction_index: usize) -> Option<&Pubkey> {
        let ix = self.instructions.get(instruction_index)?;
        self.account_keys.get(ix.program_id_index as usize)
    }

    pub fn account_index(&self, pubkey: &Pubkey) -> Option<usize> {
        self.account_keys.iter().position(|k| k == pubkey)
    }

    /// Expand a compiled instruction back into keys and account flags.
    pub fn decompile_instruction(&self, ix: &CompiledInstruction) -> Result<Instruction, SolError> {
        let key = |index: u8| {
            self.account_keys.get(index as usize).copied().ok_or_else(|| {
                SolError::SerializationError(format!("account index {index} out of range"))
            })
        };
        let accounts = ix
            .accounts
            .iter()
            .map(|&index| {
                Ok(AccountMeta {
                    pubkey: key(index)?,
                    is_signer: self.is_signer(index as usize),
                    is_writable: self.is_writable(index as usize),
                })
            })
            .collect::<Result<Vec<_>, SolError>>()?;
        Ok(Instruction {
            program_id: key(ix.program_id_index)?,
            accounts,
            data: ix.data.clone(),
        })
    }

    /// Serialize the message (the bytes that get signed).
    pub fn serialize(&self) -> Result<Vec<u8>, SolError> {
        let mut buf = Vec::with_capacity(3 + 1 + 32 * self.account_keys.len() + 32 + 64);

        buf.push(self.header.num_required_signatures);
        buf.push(self.header.num_readonly_signed_accounts);
        buf.push(self.header.num_readonly_unsigned_accounts);

        write_len(&mut buf, self.account_keys.len())?;
        for key in &self.account_keys {
            buf.extend_from_slice(key.as_ref());
        }

        buf.extend_from_slice(self.recent_blockhash.as_ref());

        write_len(&mut buf, self.instructions.len())?;
        for ix in &self.instructions {
            buf.push(ix.program_id_index);
            write_len(&mut buf, ix.accounts.len())?;
            buf.extend_from_slice(&ix.accounts);
            write_len(&mut buf, ix.data.len())?;
            buf.extend_from_slice(&ix.data);
        }

        Ok(buf)
    }

    /// Parse a legacy message. Versioned messages and trailing bytes are
    /// rejected.
    pub fn deserialize(data: &[u8]) -> Result<Self, SolError> {
        let mut reader = Reader::new(data);
        let message = Self::read(&mut reader)?;
        reader.finish()?;
        Ok(message)
    }

    pub(crate) fn read(reader: &mut Reader<'_>) -> Result<Self, SolError> {
        let first = reader.read_u8()?;
        if first & VERSION_PREFIX_MASK != 0 {
            return Err(SolError::SerializationError(format!(
                "versioned message (version {}) is not supported",
                first & !VERSION_PREFIX_MASK
            )));
        }
        let header = MessageHeader {
            num_required_signatures: first,
            num_readonly_signed_accounts: reader.read_u8()?,
            num_readonly_unsigned_accounts: reader.read_u8()?,
        };

        let num_keys = reader.read_len()?;
        let mut account_keys = Vec::with_capacity(num_keys.min(MAX_ACCOUNTS));
        for _ in 0..num_keys {
            account_keys.push(Pubkey::new_from_array(reader.read_array()?));
        }

        let recent_blockhash = Hash::new_from_array(reader.read_array()?);

        let num_instructions = reader.read_len()?;
        let mut instructions = Vec::with_capacity(num_instructions.min(64));
        for _ in 0..num_instructions {
            let program_id_index = reader.read_u8()?;
            let accounts_len = reader.read_len()?;
            let accounts = reader.read_bytes(accounts_len)?.to_vec();
            let data_len = reader.read_len()?;
            let data = reader.read_bytes(data_len)?.to_vec();
            instructions.push(CompiledInstruction {
                program_id_index,
                accounts,
                data,
            });
        }

        let message = Self {
            header,
            account_keys,
            recent_blockhash,
            instructions,
        };
        message.sanitize()?;
        Ok(message)
    }

    /// Structural checks on a message that did not come from `compile`.
    fn sanitize(&self) -> Result<(), SolError> {
        let num_keys = self.account_keys.len();
        let h = &self.header;
        let invalid = |msg: String| Err(SolError::SerializationError(msg));

        if num_keys > MAX_ACCOUNTS {
            return invalid(format!("{num_keys} account keys exceeds {MAX_ACCOUNTS}"));
        }
        if h.num_required_signatures == 0 {
            return invalid("message has no fee payer".into());
        }
        if h.num_required_signatures as usize + h.num_readonly_unsigned_accounts as usize > num_keys {
            return invalid("header counts exceed number of account keys".into());
        }
        if h.num_readonly_signed_accounts >= h.num_required_signatures {
            return invalid("fee payer must be writable".into());
        }
        for ix in &self.instructions {
            // Index 0 is the fee payer, which cannot be a program.
            if ix.program_id_index == 0 || ix.program_id_index as usize >= num_keys {
                return invalid(format!("program id index {} out of range", ix.program_id_index));
            }
            if let Some(bad) = ix.accounts.iter().find(|i| **i as usize >= num_keys) {
                return invalid(format!("account index {bad} out of range"));
            }
        }
        Ok(())
    }
}
