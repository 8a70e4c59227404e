//! Wallet positions with weighted-average cost basis.

use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::instrument::Instrument;
use super::keys::{InstrumentId, WalletId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub owner: WalletId,
    #[serde(rename = "stockPublicKey")]
    pub instrument: InstrumentId,
    pub symbol: String,
    pub name: String,
    pub quantity: u64,
    pub average_price: f64,
    pub current_price: f64,
}

impl Position {
    /// Position created by a first buy of `instrument`.
    pub fn open(owner: WalletId, instrument: &Instrument, quantity: u64, price: f64) -> Self {
        Position {
            owner,
            instrument: instrument.id,
            symbol: instrument.symbol.clone(),
            name: instrument.name.clone(),
            quantity,
            average_price: price,
            current_price: instrument.current_price,
        }
    }

    /// Quantity held after adding `quantity`, if it fits in a `u64`.
    pub fn quantity_after_buy(&self, quantity: u64) -> Result<u64, LedgerError> {
        self.quantity.checked_add(quantity).ok_or_else(|| {
            LedgerError::invalid(
                "quantity",
                format!(
                    "holding {} more {} would exceed the largest position ({})",
                    quantity,
                    self.symbol,
                    u64::MAX
                ),
            )
        })
    }

    /// Add `quantity` bought at `price`, recomputing the weighted average.
    pub fn accumulate(&mut self, quantity: u64, price: f64, mark: f64) -> Result<(), LedgerError> {
        let new_quantity = self.quantity_after_buy(quantity)?;
        if new_quantity > 0 {
            self.average_price = (self.average_price * self.quantity as f64
                + price * quantity as f64)
                / new_quantity as f64;
        }
        self.quantity = new_quantity;
        self.current_price = mark;
        Ok(())
    }

    /// Remove `quantity` sold at `price`. Returns the quantity left.
    pub fn reduce(&mut self, quantity: u64, price: f64) -> Result<u64, LedgerError> {
        if quantity > self.quantity {
            return Err(LedgerError::InsufficientHoldings {
                symbol: self.symbol.clone(),
                held: self.quantity,
                requested: quantity,
            });
        }
        self.quantity -= quantity;
        self.current_price = price;
        Ok(self.quantity)
    }

    pub fn cost_basis(&self) -> f64 {
        self.average_price * self.quantity as f64
    }

    pub fn market_value(&self) -> f64 {
        self.current_price * self.quantity as f64
    }

    pub fn unrealized_pnl(&self) -> f64 {
        self.market_value() - self.cost_basis()
    }

    pub fn unrealized_pnl_pct(&self) -> f64 {
        let basis = self.cost_basis();
        if basis == 0.0 {
            return 0.0;
        }
        self.unrealized_pnl() / basis * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn instrument() -> Instrument {
        Instrument::new("Solana", "SOL", 1000, 100.0, WalletId::new("creator").unwrap()).unwrap()
    }

    fn opened(quantity: u64, price: f64) -> Position {
        Position::open(WalletId::new("buyer").unwrap(), &instrument(), quantity, price)
    }

    #[test]
    fn open_uses_trade_price_as_average() {
        let pos = opened(10, 95.0);
        assert_eq!(pos.quantity, 10);
        assert_relative_eq!(pos.average_price, 95.0);
        assert_relative_eq!(pos.current_price, 100.0);
        assert_eq!(pos.symbol, "SOL");
    }

    #[test]
    fn accumulate_weights_by_quantity() {
        let mut pos = opened(10, 100.0);
        pos.accumulate(30, 120.0, 120.0).unwrap();
        assert_eq!(pos.quantity, 40);
        assert_relative_eq!(pos.average_price, 115.0);
        assert_relative_eq!(pos.current_price, 120.0);
    }

    #[test]
    fn accumulate_past_u64_max_fails_without_change() {
        let mut pos = opened(u64::MAX, 100.0);
        let err = pos.accumulate(1, 100.0, 120.0).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput { .. }));
        assert_eq!(pos.quantity, u64::MAX);
        assert_relative_eq!(pos.current_price, 100.0);
    }

    #[test]
    fn reduce_keeps_average() {
        let mut pos = opened(10, 100.0);
        let left = pos.reduce(4, 110.0).unwrap();
        assert_eq!(left, 6);
        assert_relative_eq!(pos.average_price, 100.0);
        assert_relative_eq!(pos.current_price, 110.0);
    }

    #[test]
    fn reduce_to_zero() {
        let mut pos = opened(10, 100.0);
        assert_eq!(pos.reduce(10, 100.0).unwrap(), 0);
    }

    #[test]
    fn reduce_beyond_holdings_fails_without_change() {
        let mut pos = opened(10, 100.0);
        let err = pos.reduce(11, 100.0).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientHoldings { held: 10, requested: 11, .. }));
        assert_eq!(pos.quantity, 10);
    }

    #[test]
    fn pnl_figures() {
        let mut pos = opened(10, 100.0);
        pos.current_price = 110.0;
        assert_relative_eq!(pos.cost_basis(), 1000.0);
        assert_relative_eq!(pos.market_value(), 1100.0);
        assert_relative_eq!(pos.unrealized_pnl(), 100.0);
        assert_relative_eq!(pos.unrealized_pnl_pct(), 10.0);
    }

    #[test]
    fn pnl_pct_zero_basis() {
        let mut pos = opened(10, 0.0);
        pos.current_price = 5.0;
        assert_relative_eq!(pos.unrealized_pnl_pct(), 0.0);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(opened(3, 100.0)).unwrap();
        assert_eq!(json["quantity"], 3);
        assert!(json.get("stockPublicKey").is_some());
        assert!(json.get("averagePrice").is_some());
        assert!(json.get("currentPrice").is_some());
    }
}
