//! Account / token addresses and canonical pair keys.
//!
//! An [`Address`] is 20 bytes, rendered as `0x`-prefixed lowercase hex.
//! Ordering is byte-lexicographic, which is what "lower address first"
//! means for pair canonicalization.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Deterministic address from a label: last 20 bytes of keccak256(label).
    /// Used by the devnet to mint token and account addresses.
    pub fn derive(label: &str) -> Self {
        let digest = Keccak256::digest(label.as_bytes());
        let mut out = [0u8; 20];
        out.copy_from_slice(&digest[12..]);
        Address(out)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(body).map_err(|e| format!("invalid address hex: {}", e))?;
        if bytes.len() != 20 {
            return Err(format!("address must be 20 bytes, got {}", bytes.len()));
        }
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Ok(Address(out))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ─────────────────────────────────────────────────────────────
// PAIR KEY
// ─────────────────────────────────────────────────────────────

/// Order-independent pair identity: keccak256(token_a ‖ token_b) with
/// `token_a < token_b`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey(pub [u8; 32]);

impl PairKey {
    /// Sorts the two tokens and hashes them. Symmetric by construction.
    pub fn of(token_x: &Address, token_y: &Address) -> Self {
        let (a, b) = sort_tokens(token_x, token_y);
        let mut hasher = Keccak256::new();
        hasher.update(a.0);
        hasher.update(b.0);
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        PairKey(out)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

/// Canonical order: lower address first.
pub fn sort_tokens(token_x: &Address, token_y: &Address) -> (Address, Address) {
    if token_x <= token_y {
        (*token_x, *token_y)
    } else {
        (*token_y, *token_x)
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PairKey({})", self.to_hex())
    }
}

impl FromStr for PairKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(body).map_err(|e| format!("invalid pair key hex: {}", e))?;
        if bytes.len() != 32 {
            return Err(format!("pair key must be 32 bytes, got {}", bytes.len()));
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(PairKey(out))
    }
}

impl Serialize for PairKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PairKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
