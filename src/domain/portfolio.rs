//! Per-wallet position set and valuation.

use super::error::LedgerError;
use super::instrument::Instrument;
use super::keys::{InstrumentId, WalletId};
use super::position::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSummary {
    pub total_investment: f64,
    pub total_value: f64,
    pub profit_loss: f64,
    pub profit_loss_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub owner: WalletId,
    pub positions: Vec<Position>,
}

impl Portfolio {
    pub fn new(owner: WalletId) -> Self {
        Portfolio {
            owner,
            positions: Vec::new(),
        }
    }

    pub fn with_positions(owner: WalletId, positions: Vec<Position>) -> Self {
        Portfolio { owner, positions }
    }

    pub fn get(&self, id: &InstrumentId) -> Option<&Position> {
        self.positions.iter().find(|p| &p.instrument == id)
    }

    fn index_of(&self, id: &InstrumentId) -> Option<usize> {
        self.positions.iter().position(|p| &p.instrument == id)
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Check that a buy of `quantity` can be added to any existing position.
    pub fn check_buy(&self, id: &InstrumentId, quantity: u64) -> Result<(), LedgerError> {
        if let Some(pos) = self.get(id) {
            pos.quantity_after_buy(quantity)?;
        }
        Ok(())
    }

    /// Record a buy of `quantity` at `price`, opening a position if needed.
    pub fn upsert_buy(
        &mut self,
        instrument: &Instrument,
        quantity: u64,
        price: f64,
    ) -> Result<&Position, LedgerError> {
        match self.index_of(&instrument.id) {
            Some(idx) => {
                self.positions[idx].accumulate(quantity, price, instrument.current_price)?;
                Ok(&self.positions[idx])
            }
            None => {
                self.positions
                    .push(Position::open(self.owner.clone(), instrument, quantity, price));
                Ok(&self.positions[self.positions.len() - 1])
            }
        }
    }

    /// Check that a sell of `quantity` can be applied.
    pub fn check_sell(&self, id: &InstrumentId, quantity: u64) -> Result<&Position, LedgerError> {
        let pos = self.get(id).ok_or_else(|| LedgerError::NoPosition {
            wallet: self.owner.to_string(),
            id: id.to_string(),
        })?;
        if quantity > pos.quantity {
            return Err(LedgerError::InsufficientHoldings {
                symbol: pos.symbol.clone(),
                held: pos.quantity,
                requested: quantity,
            });
        }
        Ok(pos)
    }

    /// Apply a sell. The position is dropped once its quantity reaches zero.
    /// Returns the quantity still held.
    pub fn apply_sell(
        &mut self,
        id: &InstrumentId,
        quantity: u64,
        price: f64,
    ) -> Result<u64, LedgerError> {
        self.check_sell(id, quantity)?;
        let idx = self.index_of(id).ok_or_else(|| LedgerError::NoPosition {
            wallet: self.owner.to_string(),
            id: id.to_string(),
        })?;
        let left = self.positions[idx].reduce(quantity, price)?;
        if left == 0 {
            self.positions.remove(idx);
        }
        Ok(left)
    }

    /// Refresh current prices from instrument records. Positions whose
    /// instrument is gone keep their last observed price.
    pub fn mark_to_market(&mut self, instruments: &[Instrument]) {
        for pos in &mut self.positions {
            if let Some(inst) = instruments.iter().find(|i| i.id == pos.instrument) {
                pos.current_price = inst.current_price;
            }
        }
    }

    pub fn total_value(&self) -> f64 {
        self.positions.iter().map(Position::market_value).sum()
    }

    pub fn total_investment(&self) -> f64 {
        self.positions.iter().map(Position::cost_basis).sum()
    }

    pub fn summary(&self) -> PortfolioSummary {
        let total_investment = self.total_investment();
        let total_value = self.total_value();
        let profit_loss = total_value - total_investment;
        let profit_loss_pct = if total_investment > 0.0 {
            profit_loss / total_investment * 100.0
        } else {
            0.0
        };
        PortfolioSummary {
            total_investment,
            total_value,
            profit_loss,
            profit_loss_pct,
        }
    }
}
