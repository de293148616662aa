//! Ed25519 keypairs and the `Signer` abstraction.
//!
//! Keypairs can be generated, restored from a 32-byte seed, from the 64-byte
//! `secret || public` layout used by the Solana CLI keypair files, or from a
//! BIP-39 seed phrase.

use std::fmt;
use std::path::Path;

use bip39::{Language, Mnemonic};
use ed25519_dalek::Signer as _;
use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::Zeroize;

use crate::error::SolError;
use crate::pubkey::Pubkey;
use crate::signature::Signature;

type HmacSha512 = Hmac<Sha512>;

/// Length of the `secret || public` keypair encoding.
pub const KEYPAIR_LENGTH: usize = 64;

/// BIP-44 coin type registered for Solana.
const SOLANA_COIN_TYPE: u32 = 501;

/// Anything that can produce a signature for a transaction message.
pub trait Signer {
    fn pubkey(&self) -> Pubkey;

    fn try_sign_message(&self, message: &[u8]) -> Result<Signature, SolError>;
}

/// An Ed25519 keypair. The secret half is zeroized on drop.
pub struct Keypair(ed25519_dalek::SigningKey);

impl Keypair {
    /// Generate a new random keypair from the OS RNG.
    pub fn generate() -> Self {
        Self(ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng))
    }

    /// Restore a keypair from its 32-byte secret seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(seed))
    }

    /// Restore a keypair from the 64-byte `secret || public` layout.
    ///
    /// The public half must match the key derived from the secret half.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SolError> {
        let mut arr: [u8; KEYPAIR_LENGTH] = bytes.try_into().map_err(|_| {
            SolError::InvalidPrivateKey(format!(
                "expected {KEYPAIR_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        let result = ed25519_dalek::SigningKey::from_keypair_bytes(&arr)
            .map(Self)
            .map_err(|_| SolError::InvalidPrivateKey("public key does not match secret key".into()));
        arr.zeroize();
        result
    }

    /// The 64-byte `secret || public` encoding.
    pub fn to_bytes(&self) -> [u8; KEYPAIR_LENGTH] {
        self.0.to_keypair_bytes()
    }

    /// The 32-byte secret seed.
    pub fn secret(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    pub fn from_base58_string(s: &str) -> Result<Self, SolError> {
        let mut bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| SolError::InvalidPrivateKey(format!("base58 decode failed: {e}")))?;
        let result = Self::from_bytes(&bytes);
        bytes.zeroize();
        result
    }

    pub fn to_base58_string(&self) -> String {
        let mut bytes = self.to_bytes();
        let s = bs58::encode(bytes).into_string();
        bytes.zeroize();
        s
    }

    /// Parse the JSON byte-array format written by `solana-keygen`.
    pub fn from_json(json: &str) -> Result<Self, SolError> {
        let mut bytes: Vec<u8> = serde_json::from_str(json)?;
        let result = Self::from_bytes(&bytes);
        bytes.zeroize();
        result
    }

    pub fn to_json(&self) -> String {
        let mut bytes = self.to_bytes();
        let parts: Vec<String> = bytes.iter().map(|b| b.to_string()).collect();
        bytes.zeroize();
        format!("[{}]", parts.join(","))
    }

    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, SolError> {
        let mut contents = std::fs::read_to_string(path)?;
        let result = Self::from_json(contents.trim());
        contents.zeroize();
        result
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), SolError> {
        let mut contents = self.to_json();
        let result = std::fs::write(path, contents.as_bytes()).map_err(SolError::from);
        contents.zeroize();
        result
    }

    /// Keypair from a BIP-39 phrase, using the first 32 bytes of the seed.
    ///
    /// Matches `solana-keygen recover` without a derivation path.
    pub fn from_seed_phrase_and_passphrase(phrase: &str, passphrase: &str) -> Result<Self, SolError> {
        let mut seed = mnemonic_to_seed(phrase, passphrase)?;
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&seed[..32]);
        let keypair = Self::from_seed(&secret);
        secret.zeroize();
        seed.zeroize();
        Ok(keypair)
    }

    /// Keypair from a BIP-39 phrase derived at `m/44'/501'/{account}'/0'`.
    ///
    /// This is the path used by browser and mobile wallets.
    pub fn from_seed_phrase_with_derivation(
        phrase: &str,
        passphrase: &str,
        account: u32,
    ) -> Result<Self, SolError> {
        let mut seed = mnemonic_to_seed(phrase, passphrase)?;
        let path = [44, SOLANA_COIN_TYPE, account, 0];
        let result = derive_ed25519_secret(&seed, &path).map(|mut secret| {
            let keypair = Self::from_seed(&secret);
            secret.zeroize();
            keypair
        });
        seed.zeroize();
        result
    }

    pub fn pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.0.verifying_key().to_bytes())
    }

    pub fn sign_message(&self, message: &[u8]) -> Signature {
        self.0.sign(message).into()
    }
}

impl Signer for Keypair {
    fn pubkey(&self) -> Pubkey {
        Keypair::pubkey(self)
    }

    fn try_sign_message(&self, message: &[u8]) -> Result<Signature, SolError> {
        Ok(self.sign_message(message))
    }
}

impl PartialEq for Keypair {
    fn eq(&self, other: &Self) -> bool {
        self.pubkey() == other.pubkey()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("pubkey", &self.pubkey())
            .finish_non_exhaustive()
    }
}

fn mnemonic_to_seed(phrase: &str, passphrase: &str) -> Result<[u8; 64], SolError> {
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
        .map_err(|e| SolError::InvalidPrivateKey(format!("invalid mnemonic: {e}")))?;
    Ok(mnemonic.to_seed(passphrase))
}

/// SLIP-0010 Ed25519 derivation. Every path component is hardened.
fn derive_ed25519_secret(seed: &[u8], path: &[u32]) -> Result<[u8; 32], SolError> {
    // Master key: HMAC-SHA512(key="ed25519 seed", data=seed)
    let mut mac = HmacSha512::new_from_slice(b"ed25519 seed")
        .map_err(|e| SolError::InvalidPrivateKey(e.to_string()))?;
    mac.update(seed);
    let result = mac.finalize().into_bytes();

    let mut key = [0u8; 32];
    let mut chain_code = [0u8; 32];
    key.copy_from_slice(&result[..32]);
    chain_code.copy_from_slice(&result[32..]);

    for child_index in path {
        let mut mac = HmacSha512::new_from_slice(&chain_code)
            .map_err(|e| SolError::InvalidPrivateKey(e.to_string()))?;
        // Hardened child: 0x00 || key || index (with hardened bit set)
        mac.update(&[0x00]);
        mac.update(&key);
        mac.update(&(child_index | 0x8000_0000).to_be_bytes());
        let result = mac.finalize().into_bytes();

        key.copy_from_slice(&result[..32]);
        chain_code.copy_from_slice(&result[32..]);
    }

    chain_code.zeroize();
    Ok(key)
}
