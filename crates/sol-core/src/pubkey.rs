//! Public keys, addresses, and program-derived addresses.
//!
//! A Solana address is simply the Base58 encoding of a 32-byte Ed25519
//! public key. There is no hashing step (unlike Bitcoin or Ethereum).
//! Program-derived addresses (PDAs) are SHA-256 outputs that deliberately
//! fall OFF the Ed25519 curve so no private key can exist for them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::SolError;

/// Number of bytes in a public key.
pub const PUBKEY_BYTES: usize = 32;

/// Maximum length of a single PDA seed.
pub const MAX_SEED_LEN: usize = 32;

/// Maximum number of seeds (including the bump) for a PDA.
pub const MAX_SEEDS: usize = 16;

/// Longest Base58 string that can decode to 32 bytes.
const MAX_BASE58_LEN: usize = 44;

/// The string appended to PDA derivation: "ProgramDerivedAddress".
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// A 32-byte account address.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pubkey([u8; PUBKEY_BYTES]);

impl Pubkey {
    pub const fn new_from_array(bytes: [u8; PUBKEY_BYTES]) -> Self {
        Self(bytes)
    }

    /// Build a pubkey from a byte slice that must be exactly 32 bytes long.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, SolError> {
        let arr: [u8; PUBKEY_BYTES] = bytes.try_into().map_err(|_| {
            SolError::InvalidPublicKey(format!(
                "expected {PUBKEY_BYTES} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    pub const fn to_bytes(self) -> [u8; PUBKEY_BYTES] {
        self.0
    }

    pub fn as_array(&self) -> &[u8; PUBKEY_BYTES] {
        &self.0
    }

    /// Whether these bytes decompress to a point on the Ed25519 curve.
    ///
    /// Wallet addresses are on the curve; program-derived addresses are not.
    pub fn is_on_curve(&self) -> bool {
        curve25519_dalek::edwards::CompressedEdwardsY(self.0)
            .decompress()
            .is_some()
    }

    /// Derive an address from a base key, a string seed, and an owner program.
    ///
    /// `address = SHA-256(base || seed || owner)`
    pub fn create_with_seed(base: &Pubkey, seed: &str, owner: &Pubkey) -> Result<Pubkey, SolError> {
        if seed.len() > MAX_SEED_LEN {
            return Err(SolError::InvalidSeeds(format!(
                "seed is {} bytes, max {MAX_SEED_LEN}",
                seed.len()
            )));
        }
        if owner.0.ends_with(PDA_MARKER) {
            return Err(SolError::InvalidSeeds(
                "owner ends with the program-derived address marker".into(),
            ));
        }

        let mut hasher = Sha256::new();
        hasher.update(base.0);
        hasher.update(seed.as_bytes());
        hasher.update(owner.0);
        Ok(Pubkey(hasher.finalize().into()))
    }

    /// Create a program-derived address from explicit seeds (bump included).
    ///
    /// Fails when the seeds are out of bounds or the derived point happens to
    /// land on the curve.
    pub fn create_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<Pubkey, SolError> {
        if seeds.len() > MAX_SEEDS {
            return Err(SolError::InvalidSeeds(format!(
                "{} seeds given, max {MAX_SEEDS}",
                seeds.len()
            )));
        }
        check_seed_lengths(seeds)?;
        derive_off_curve(seeds, program_id).ok_or_else(|| {
            SolError::InvalidSeeds("derived address lies on the ed25519 curve".into())
        })
    }

    /// Find a valid program-derived address and its bump seed.
    ///
    /// Iterates bump seeds from 255 down to 0 and returns the first one whose
    /// derived address is off the curve.
    pub fn find_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8), SolError> {
        if seeds.len() >= MAX_SEEDS {
            return Err(SolError::InvalidSeeds(format!(
                "{} seeds given, max {} before the bump",
                seeds.len(),
                MAX_SEEDS - 1
            )));
        }
        check_seed_lengths(seeds)?;

        for bump in (0u8..=255).rev() {
            let bump_seed = [bump];
            let mut with_bump: Vec<&[u8]> = seeds.to_vec();
            with_bump.push(&bump_seed);
            if let Some(address) = derive_off_curve(&with_bump, program_id) {
                return Ok((address, bump));
            }
        }

        Err(SolError::InvalidSeeds(
            "could not find valid PDA bump seed".into(),
        ))
    }
}

fn check_seed_lengths(seeds: &[&[u8]]) -> Result<(), SolError> {
    match seeds.iter().find(|s| s.len() > MAX_SEED_LEN) {
        Some(seed) => Err(SolError::InvalidSeeds(format!(
            "seed is {} bytes, max {MAX_SEED_LEN}",
            seed.len()
        ))),
        None => Ok(()),
    }
}

/// `SHA-256(seeds || program_id || marker)`, or `None` when that lands on
/// the curve.
fn derive_off_curve(seeds: &[&[u8]], program_id: &Pubkey) -> Option<Pubkey> {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(program_id.0);
    hasher.update(PDA_MARKER);

    let address = Pubkey(hasher.finalize().into());
    (!address.is_on_curve()).then_some(address)
}

impl AsRef<[u8]> for Pubkey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; PUBKEY_BYTES]> for Pubkey {
    fn from(bytes: [u8; PUBKEY_BYTES]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({self})")
    }
}

impl FromStr for Pubkey {
    type Err = SolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() > MAX_BASE58_LEN {
            return Err(SolError::InvalidAddress(format!(
                "address string is {} chars, max {MAX_BASE58_LEN}",
                s.len()
            )));
        }
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| SolError::InvalidAddress(format!("base58 decode failed: {e}")))?;

        let arr: [u8; PUBKEY_BYTES] = bytes.try_into().map_err(|v: Vec<u8>| {
            SolError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
        })?;

        Ok(Self(arr))
    }
}

impl Serialize for Pubkey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pubkey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Validate a Solana address string.
///
/// Returns `Ok(true)` for a Base58 string that decodes to exactly 32 bytes.
pub fn validate_address(address: &str) -> Result<bool, SolError> {
    address.parse::<Pubkey>().map(|_| true)
}
