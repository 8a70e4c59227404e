//! Wallet and instrument identities.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use super::error::LedgerError;

/// Seed prefix shared with the on-chain instrument address derivation.
const INSTRUMENT_SEED: &[u8] = b"stock";

/// Public key of a connected wallet, kept in its textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletId(pub(crate) String);

impl WalletId {
    pub fn new(key: &str) -> Result<Self, LedgerError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(LedgerError::invalid("wallet", "no wallet connected"));
        }
        Ok(WalletId(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for log lines.
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for WalletId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WalletId::new(s)
    }
}

impl TryFrom<String> for WalletId {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        WalletId::new(&value)
    }
}

impl From<WalletId> for String {
    fn from(value: WalletId) -> Self {
        value.0
    }
}

/// 32-byte instrument address derived from (symbol, creator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstrumentId([u8; 32]);

impl InstrumentId {
    /// Derive the id for `symbol` created by `authority`.
    ///
    /// The symbol is uppercased first so that `sol` and `SOL` from the same
    /// creator resolve to one instrument. Each seed component is
    /// length-prefixed, so no two (symbol, creator) pairs share an input.
    pub fn derive(symbol: &str, authority: &WalletId) -> Self {
        let symbol = symbol.trim().to_uppercase();
        let mut hasher = Sha256::new();
        hasher.update(INSTRUMENT_SEED);
        for part in [authority.as_str().as_bytes(), symbol.as_bytes()] {
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part);
        }
        InstrumentId(hasher.finalize().into())
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for InstrumentId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s.trim(), &mut bytes)
            .map_err(|e| LedgerError::invalid("instrument id", e.to_string()))?;
        Ok(InstrumentId(bytes))
    }
}

impl Serialize for InstrumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for InstrumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
