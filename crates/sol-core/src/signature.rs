//! Ed25519 transaction signatures.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SolError;
use crate::pubkey::Pubkey;

pub const SIGNATURE_BYTES: usize = 64;

/// A 64-byte Ed25519 signature. The all-zero value marks an unsigned slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_BYTES]);

impl Default for Signature {
    fn default() -> Self {
        Self([0u8; SIGNATURE_BYTES])
    }
}

impl Signature {
    pub const fn new_from_array(bytes: [u8; SIGNATURE_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, SolError> {
        let arr: [u8; SIGNATURE_BYTES] = bytes.try_into().map_err(|_| {
            SolError::SerializationError(format!(
                "signature must be {SIGNATURE_BYTES} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    pub const fn to_bytes(self) -> [u8; SIGNATURE_BYTES] {
        self.0
    }

    pub fn as_array(&self) -> &[u8; SIGNATURE_BYTES] {
        &self.0
    }

    /// Whether this is the zero placeholder rather than a real signature.
    pub fn is_default(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Verify this signature over `message` against `pubkey`.
    pub fn verify(&self, pubkey: &Pubkey, message: &[u8]) -> bool {
        let Ok(vk) = ed25519_dalek::VerifyingKey::from_bytes(pubkey.as_array()) else {
            return false;
        };
        let sig = ed25519_dalek::Signature::from_bytes(&self.0);
        vk.verify_strict(message, &sig).is_ok()
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<ed25519_dalek::Signature> for Signature {
    fn from(sig: ed25519_dalek::Signature) -> Self {
        Self(sig.to_bytes())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

impl FromStr for Signature {
    type Err = SolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| SolError::SerializationError(format!("invalid signature: {e}")))?;
        Self::try_from_slice(&bytes)
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::Signer;

    #[test]
    fn default_is_all_zero() {
        let sig = Signature::default();
        assert!(sig.is_default());
        assert_eq!(sig.to_string(), "1".repeat(64));
    }

    #[test]
    fn base58_display_and_parse_agree() {
        let sig = Signature::new_from_array([7u8; 64]);
        let parsed: Signature = sig.to_string().parse().unwrap();
        assert_eq!(parsed, sig);
    }

    #[test]
    fn parse_wrong_length_fails() {
        assert!("1111".parse::<Signature>().is_err());
    }

    #[test]
    fn verify_accepts_matching_key_and_rejects_others() {
        let key = ed25519_dalek::SigningKey::from_bytes(&[0x42u8; 32]);
        let pubkey = Pubkey::new_from_array(key.verifying_key().to_bytes());
        let sig: Signature = key.sign(b"hello").into();

        assert!(sig.verify(&pubkey, b"hello"));
        assert!(!sig.verify(&pubkey, b"hullo"));
        assert!(!sig.verify(&Pubkey::new_from_array([0x02; 32]), b"hello"));
    }
}
