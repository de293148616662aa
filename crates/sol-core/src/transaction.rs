//! Signed transactions and their wire format.
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message                 (see `message`)
//! ```
//!
//! There is one signature slot per required signer, in the order of the
//! message's signer keys. Unsigned slots hold the all-zero signature.

use crate::error::SolError;
use crate::hash::Hash;
use crate::instruction::Instruction;
use crate::keypair::Signer;
use crate::message::Message;
use crate::pubkey::Pubkey;
use crate::shortvec::{write_len, Reader};
use crate::signature::{Signature, SIGNATURE_BYTES};

/// Maximum size of a serialized transaction: an IPv6 MTU minus headers
/// (1280 - 40 - 8).
pub const PACKET_DATA_SIZE: usize = 1280 - 40 - 8;

pub const SIGNATURE_LENGTH: usize = SIGNATURE_BYTES;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub signatures: Vec<Signature>,
    pub message: Message,
}

impl Transaction {
    /// A transaction with a default signature in every required slot.
    pub fn new_unsigned(message: Message) -> Self {
        let slots = message.header().num_required_signatures as usize;
        Self {
            signatures: vec![Signature::default(); slots],
            message,
        }
    }

    /// Build and fully sign a transaction for `message`.
    pub fn new(signers: &[&dyn Signer], message: Message) -> Result<Self, SolError> {
        let mut tx = Self::new_unsigned(message);
        tx.sign(signers, None)?;
        Ok(tx)
    }

    /// Compile `instructions` for `payer` against `recent_blockhash` and sign.
    pub fn new_signed_with_payer(
        instructions: &[Instruction],
        payer: &Pubkey,
        signers: &[&dyn Signer],
        recent_blockhash: Hash,
    ) -> Result<Self, SolError> {
        let message = Message::compile(instructions, payer, recent_blockhash)?;
        Self::new(signers, message)
    }

    /// Sign with every required signer.
    ///
    /// Fails if a required signer is missing or if a signer is not required
    /// by the message. A new `recent_blockhash` resets all existing
    /// signatures. On error the transaction is left unchanged.
    pub fn sign(&mut self, signers: &[&dyn Signer], recent_blockhash: Option<Hash>) -> Result<(), SolError> {
        let (message, mut signatures) = self.prepare(recent_blockhash);
        let positions = positions_of(&message, signers)?;

        if let Some(missing) = message
            .signer_keys()
            .iter()
            .enumerate()
            .find(|(i, _)| !positions.contains(i))
            .map(|(_, key)| key)
        {
            return Err(SolError::SigningError(format!("missing signer {missing}")));
        }

        fill_signatures(&message, signers, &positions, &mut signatures)?;
        self.message = message;
        self.signatures = signatures;
        Ok(())
    }

    /// Sign with a subset of the required signers, leaving other slots as
    /// they are.
    pub fn partial_sign(
        &mut self,
        signers: &[&dyn Signer],
        recent_blockhash: Option<Hash>,
    ) -> Result<(), SolError> {
        let (message, mut signatures) = self.prepare(recent_blockhash);
        let positions = positions_of(&message, signers)?;
        fill_signatures(&message, signers, &positions, &mut signatures)?;
        self.message = message;
        self.signatures = signatures;
        Ok(())
    }

    fn prepare(&self, recent_blockhash: Option<Hash>) -> (Message, Vec<Signature>) {
        match recent_blockhash {
            Some(hash) if hash != *self.message.recent_blockhash() => {
                let message = self.message.with_blockhash(hash);
                let slots = self.signatures.len();
                (message, vec![Signature::default(); slots])
            }
            _ => (self.message.clone(), self.signatures.clone()),
        }
    }

    /// Place a signature produced elsewhere (offline or hardware signer).
    pub fn add_signature(&mut self, pubkey: &Pubkey, signature: Signature) -> Result<(), SolError> {
        let position = self.signer_position(pubkey).ok_or_else(|| {
            SolError::SigningError(format!("{pubkey} is not a required signer"))
        })?;
        let message_bytes = self.message.serialize()?;
        if !signature.verify(pubkey, &message_bytes) {
            return Err(SolError::SigningError(format!(
                "signature does not verify for {pubkey}"
            )));
        }
        let slot = self
            .signatures
            .get_mut(position)
            .ok_or_else(|| SolError::SigningError(format!("no signature slot {position}")))?;
        *slot = signature;
        Ok(())
    }

    /// Slot index of `pubkey` among the required signers.
    pub fn signer_position(&self, pubkey: &Pubkey) -> Option<usize> {
        self.message.signer_keys().iter().position(|k| k == pubkey)
    }

    pub fn is_signed(&self) -> bool {
        !self.signatures.is_empty() && self.signatures.iter().all(|s| !s.is_default())
    }

    /// Check every signature against its signer key.
    pub fn verify(&self) -> Result<(), SolError> {
        let message_bytes = self.message.serialize()?;
        let keys = self.message.signer_keys();
        if keys.len() != self.signatures.len() {
            return Err(SolError::SigningError(format!(
                "{} signatures for {} required signers",
                self.signatures.len(),
                keys.len()
            )));
        }
        for (key, signature) in keys.iter().zip(&self.signatures) {
            if !signature.verify(key, &message_bytes) {
                return Err(SolError::SigningError(format!("invalid signature for {key}")));
            }
        }
        Ok(())
    }

    /// The fee payer's signature, which identifies the transaction.
    pub fn signature(&self) -> Option<&Signature> {
        self.signatures.first()
    }

    /// Wire bytes of a fully signed transaction.
    pub fn serialize(&self) -> Result<Vec<u8>, SolError> {
        if !self.is_signed() {
            return Err(SolError::SigningError("transaction is not fully signed".into()));
        }
        self.verify()?;
        self.serialize_unchecked()
    }

    /// Wire bytes without signature checks, for simulation.
    pub fn serialize_unchecked(&self) -> Result<Vec<u8>, SolError> {
        let message_bytes = self.message.serialize()?;
        let mut wire = Vec::with_capacity(1 + SIGNATURE_LENGTH * self.signatures.len() + message_bytes.len());

        write_len(&mut wire, self.signatures.len())?;
        for signature in &self.signatures {
            wire.extend_from_slice(signature.as_ref());
        }
        wire.extend_from_slice(&message_bytes);

        if wire.len() > PACKET_DATA_SIZE {
            return Err(SolError::TransactionTooLarge {
                size: wire.len(),
                max: PACKET_DATA_SIZE,
            });
        }
        Ok(wire)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, SolError> {
        let mut reader = Reader::new(data);
        let num_signatures = reader.read_len()?;
        let mut signatures = Vec::with_capacity(num_signatures.min(PACKET_DATA_SIZE / SIGNATURE_LENGTH));
        for _ in 0..num_signatures {
            signatures.push(Signature::new_from_array(reader.read_array()?));
        }
        let message = Message::read(&mut reader)?;
        reader.finish()?;

        let required = message.header().num_required_signatures as usize;
        if num_signatures != required {
            return Err(SolError::SerializationError(format!(
                "{num_signatures} signatures but message requires {required}"
            )));
        }
        Ok(Self { signatures, message })
    }
}

fn positions_of(message: &Message, signers: &[&dyn Signer]) -> Result<Vec<usize>, SolError> {
    let keys = message.signer_keys();
    signers
        .iter()
        .map(|signer| {
            let pubkey = signer.pubkey();
            keys.iter().position(|k| *k == pubkey).ok_or_else(|| {
                SolError::SigningError(format!("keypair {pubkey} is not a required signer"))
            })
        })
        .collect()
}

fn fill_signatures(
    message: &Message,
    signers: &[&dyn Signer],
    positions: &[usize],
    signatures: &mut [Signature],
) -> Result<(), SolError> {
    let message_bytes = message.serialize()?;
    for (signer, position) in signers.iter().zip(positions) {
        let slot = signatures
            .get_mut(*position)
            .ok_or_else(|| SolError::SigningError(format!("no signature slot {position}")))?;
        *slot = signer.try_sign_message(&message_bytes)?;
    }
    Ok(())
}

/// Sign a pre-built wire transaction (from a dApp or aggregator) in place.
///
/// The message bytes are signed as-is, so versioned messages are accepted
/// here even though they cannot be compiled locally. The signer must own one
/// of the message's signature slots.
pub fn sign_raw_transaction(signer: &dyn Signer, raw_tx: &[u8]) -> Result<Vec<u8>, SolError> {
    let mut reader = Reader::new(raw_tx);
    let num_sigs = reader.read_len()?;
    if num_sigs == 0 {
        return Err(SolError::SigningError("transaction has zero signatures".into()));
    }
    let sigs_start = reader.position();
    reader.read_bytes(num_sigs * SIGNATURE_LENGTH)?;
    let message_bytes = reader.remaining();

    let mut message_reader = Reader::new(message_bytes);
    let mut num_required_sigs = message_reader.read_u8()?;
    if num_required_sigs & 0x80 != 0 {
        // Versioned message: the prefix byte precedes the header.
        num_required_sigs = message_reader.read_u8()?;
    }
    message_reader.read_bytes(2)?;
    let num_accounts = message_reader.read_len()?;

    let our_pubkey = signer.pubkey();
    let signer_count = (num_required_sigs as usize).min(num_accounts).min(num_sigs);
    let mut signer_index = None;
    for i in 0..num_accounts {
        let key: [u8; 32] = message_reader.read_array()?;
        if i < signer_count && key == our_pubkey.to_bytes() {
            signer_index = Some(i);
            break;
        }
    }
    let signer_index = signer_index.ok_or_else(|| {
        SolError::SigningError(format!("{our_pubkey} not found in transaction signers"))
    })?;

    let signature = signer.try_sign_message(message_bytes)?;

    let mut signed_tx = raw_tx.to_vec();
    let offset = sigs_start + signer_index * SIGNATURE_LENGTH;
    signed_tx[offset..offset + SIGNATURE_LENGTH].copy_from_slice(signature.as_ref());
    Ok(signed_tx)
}
