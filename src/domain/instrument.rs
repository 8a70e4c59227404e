//! Tradable instrument records.

use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::keys::{InstrumentId, WalletId};

pub const MAX_NAME_LEN: usize = 32;
pub const MAX_SYMBOL_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    #[serde(rename = "publicKey")]
    pub id: InstrumentId,
    pub name: String,
    pub symbol: String,
    pub total_supply: u64,
    pub available_supply: u64,
    pub current_price: f64,
    pub authority: WalletId,
}

impl Instrument {
    /// Build a freshly issued instrument with its whole supply available.
    pub fn new(
        name: &str,
        symbol: &str,
        total_supply: u64,
        current_price: f64,
        authority: WalletId,
    ) -> Result<Self, LedgerError> {
        let name = name.trim();
        let symbol = symbol.trim();
        validate_name(name)?;
        validate_symbol(symbol)?;
        if total_supply == 0 {
            return Err(LedgerError::invalid(
                "total_supply",
                "total supply must be greater than 0",
            ));
        }
        validate_price("current_price", current_price)?;

        Ok(Instrument {
            id: InstrumentId::derive(symbol, &authority),
            name: name.to_string(),
            symbol: symbol.to_string(),
            total_supply,
            available_supply: total_supply,
            current_price,
            authority,
        })
    }

    pub fn market_cap(&self) -> f64 {
        self.current_price * self.total_supply as f64
    }

    /// Quantity currently held by wallets.
    pub fn circulating(&self) -> u64 {
        self.total_supply.saturating_sub(self.available_supply)
    }

    /// Take `quantity` out of the available supply.
    pub fn reserve(&mut self, quantity: u64) -> Result<(), LedgerError> {
        if quantity > self.available_supply {
            return Err(LedgerError::InsufficientSupply {
                symbol: self.symbol.clone(),
                available: self.available_supply,
                requested: quantity,
            });
        }
        self.available_supply -= quantity;
        Ok(())
    }

    /// Return `quantity` to the available supply, never beyond total supply.
    pub fn release(&mut self, quantity: u64) {
        self.available_supply = self
            .available_supply
            .saturating_add(quantity)
            .min(self.total_supply);
    }
}

fn validate_name(name: &str) -> Result<(), LedgerError> {
    if name.is_empty() {
        return Err(LedgerError::invalid("name", "name must not be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(LedgerError::invalid(
            "name",
            format!("name must be at most {MAX_NAME_LEN} bytes"),
        ));
    }
    Ok(())
}

fn validate_symbol(symbol: &str) -> Result<(), LedgerError> {
    if symbol.is_empty() {
        return Err(LedgerError::invalid("symbol", "symbol must not be empty"));
    }
    if symbol.len() > MAX_SYMBOL_LEN {
        return Err(LedgerError::invalid(
            "symbol",
            format!("symbol must be at most {MAX_SYMBOL_LEN} bytes"),
        ));
    }
    Ok(())
}

pub fn validate_price(field: &str, price: f64) -> Result<(), LedgerError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(LedgerError::invalid(field, "price must be greater than 0"));
    }
    Ok(())
}
