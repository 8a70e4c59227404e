//! Ledger configuration and its validation.
//!
//! Values come from a [`ConfigPort`]; anything missing falls back to the
//! defaults below.

use std::fmt;
use std::str::FromStr;

use super::error::LedgerError;
use super::market::{DEFAULT_MIN_PRICE, DEFAULT_VOLATILITY_PCT};
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    Memory,
    #[default]
    Sqlite,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "sqlite" => Ok(StorageBackend::Sqlite),
            other => Err(format!("unknown backend '{other}' (expected memory or sqlite)")),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    pub backend: StorageBackend,
    pub volatility_pct: f64,
    pub min_price: f64,
    pub seed: Option<u64>,
    pub default_wallet: Option<String>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            backend: StorageBackend::default(),
            volatility_pct: DEFAULT_VOLATILITY_PCT,
            min_price: DEFAULT_MIN_PRICE,
            seed: None,
            default_wallet: None,
        }
    }
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), LedgerError> {
    validate_backend(config)?;
    validate_pool_size(config)?;
    validate_volatility(config)?;
    validate_min_price(config)?;
    validate_seed(config)?;
    Ok(())
}

fn validate_backend(config: &dyn ConfigPort) -> Result<(), LedgerError> {
    if let Some(value) = config.get_string("storage", "backend") {
        value
            .parse::<StorageBackend>()
            .map_err(|reason| LedgerError::ConfigInvalid {
                section: "storage".to_string(),
                key: "backend".to_string(),
                reason,
            })?;
    }
    Ok(())
}

fn validate_pool_size(config: &dyn ConfigPort) -> Result<(), LedgerError> {
    let value = config.get_int("storage", "pool_size", 4);
    if value < 1 || value > i64::from(u32::MAX) {
        return Err(LedgerError::ConfigInvalid {
            section: "storage".to_string(),
            key: "pool_size".to_string(),
            reason: "pool_size must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn validate_volatility(config: &dyn ConfigPort) -> Result<(), LedgerError> {
    let value = config.get_double("market", "volatility_pct", DEFAULT_VOLATILITY_PCT);
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(LedgerError::ConfigInvalid {
            section: "market".to_string(),
            key: "volatility_pct".to_string(),
            reason: "volatility_pct must be between 0 and 100".to_string(),
        });
    }
    Ok(())
}

fn validate_min_price(config: &dyn ConfigPort) -> Result<(), LedgerError> {
    let value = config.get_double("market", "min_price", DEFAULT_MIN_PRICE);
    if !value.is_finite() || value <= 0.0 {
        return Err(LedgerError::ConfigInvalid {
            section: "market".to_string(),
            key: "min_price".to_string(),
            reason: "min_price must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_seed(config: &dyn ConfigPort) -> Result<(), LedgerError> {
    if let Some(raw) = config.get_string("market", "seed") {
        raw.trim()
            .parse::<u64>()
            .map_err(|_| LedgerError::ConfigInvalid {
                section: "market".to_string(),
                key: "seed".to_string(),
                reason: "seed must be a non-negative integer".to_string(),
            })?;
    }
    Ok(())
}

/// Build a [`LedgerConfig`] from a validated config source.
pub fn build_ledger_config(config: &dyn ConfigPort) -> Result<LedgerConfig, LedgerError> {
    validate_config(config)?;

    let backend = match config.get_string("storage", "backend") {
        Some(value) => value
            .parse()
            .map_err(|reason| LedgerError::ConfigInvalid {
                section: "storage".into(),
                key: "backend".into(),
                reason,
            })?,
        None => StorageBackend::default(),
    };

    Ok(LedgerConfig {
        backend,
        volatility_pct: config.get_double("market", "volatility_pct", DEFAULT_VOLATILITY_PCT),
        min_price: config.get_double("market", "min_price", DEFAULT_MIN_PRICE),
        seed: config
            .get_string("market", "seed")
            .and_then(|s| s.trim().parse().ok()),
        default_wallet: config
            .get_string("wallet", "default")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn adapter(ini: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(ini).unwrap()
    }

    fn expect_invalid(ini: &str, expected_key: &str) {
        match validate_config(&adapter(ini)) {
            Err(LedgerError::ConfigInvalid { key, .. }) => assert_eq!(key, expected_key),
            Err(other) => panic!("expected ConfigInvalid, got: {other}"),
            Ok(()) => panic!("expected error for {expected_key}"),
        }
    }

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = build_ledger_config(&FileConfigAdapter::empty()).unwrap();
        assert_eq!(cfg, LedgerConfig::default());
    }

    #[test]
    fn full_config() {
        let cfg = build_ledger_config(&adapter(
            "[storage]\nbackend = Memory\n[market]\nvolatility_pct = 5\nmin_price = 1\nseed = 9\n[wallet]\ndefault = alice\n",
        ))
        .unwrap();
        assert_eq!(cfg.backend, StorageBackend::Memory);
        assert_eq!(cfg.volatility_pct, 5.0);
        assert_eq!(cfg.min_price, 1.0);
        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.default_wallet.as_deref(), Some("alice"));
    }

    #[test]
    fn rejects_unknown_backend() {
        expect_invalid("[storage]\nbackend = postgres\n", "backend");
    }

    #[test]
    fn rejects_zero_pool_size() {
        expect_invalid("[storage]\npool_size = 0\n", "pool_size");
    }

    #[test]
    fn rejects_negative_volatility() {
        expect_invalid("[market]\nvolatility_pct = -1\n", "volatility_pct");
    }

    #[test]
    fn rejects_non_positive_min_price() {
        expect_invalid("[market]\nmin_price = 0\n", "min_price");
    }

    #[test]
    fn rejects_bad_seed() {
        expect_invalid("[market]\nseed = -3\n", "seed");
    }

    #[test]
    fn blank_default_wallet_is_none() {
        let cfg = build_ledger_config(&adapter("[wallet]\ndefault =\n")).unwrap();
        assert_eq!(cfg.default_wallet, None);
    }

    #[test]
    fn backend_display_parses_back() {
        for backend in [StorageBackend::Memory, StorageBackend::Sqlite] {
            assert_eq!(backend.to_string().parse::<StorageBackend>().unwrap(), backend);
        }
    }
}
