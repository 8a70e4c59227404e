//! The mock ledger: instrument supply and wallet positions over a
//! key-value store.
//!
//! Every operation is a read-modify-write against the [`StoragePort`]. There
//! is one writer; nothing here is atomic across keys. Trade pre-checks all
//! run before the first write, so a rejected trade leaves the store as it was.

use rand::Rng;
use serde_json::Value;

use super::config::LedgerConfig;
use super::error::LedgerError;
use super::instrument::{validate_price, Instrument};
use super::keys::{InstrumentId, WalletId};
use super::market::{self, filter_and_sort, MarketQuery, MarketStats, PriceChange};
use super::portfolio::{Portfolio, PortfolioSummary};
use super::position::Position;
use super::seed::initial_instruments;
use crate::ports::storage_port::StoragePort;

pub const STOCKS_KEY: &str = "solana_trade_mock_stocks";
pub const PORTFOLIO_PREFIX: &str = "solana_trade_portfolio";
pub const RESET_MARKER_KEY: &str = "force_reset_stocks";

pub fn portfolio_key(wallet: &WalletId) -> String {
    format!("{PORTFOLIO_PREFIX}_{wallet}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

/// Outcome of an accepted trade.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeReceipt {
    pub side: Side,
    pub wallet: WalletId,
    pub instrument: InstrumentId,
    pub symbol: String,
    pub quantity: u64,
    pub price: f64,
    /// Instrument supply left for sale after the trade.
    pub available_supply: u64,
    /// Quantity the wallet holds after the trade.
    pub position_quantity: u64,
}

impl TradeReceipt {
    pub fn total(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

pub struct Ledger<S: StoragePort> {
    store: S,
    config: LedgerConfig,
}

impl<S: StoragePort> Ledger<S> {
    pub fn new(store: S, config: LedgerConfig) -> Self {
        Ledger { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn seed_instruments(&self, current: &WalletId) -> Result<Vec<Instrument>, LedgerError> {
        let seeded = initial_instruments(current);
        self.save_instruments(&seeded)?;
        tracing::info!(count = seeded.len(), "seeded default instruments");
        Ok(seeded)
    }

    /// All instruments. The first call on a fresh store, or any call that
    /// finds the list missing, empty or unreadable, replaces it with the
    /// default set.
    pub fn load_instruments(&self, current: &WalletId) -> Result<Vec<Instrument>, LedgerError> {
        if self.store.get(RESET_MARKER_KEY)?.is_none() {
            self.store.set(RESET_MARKER_KEY, "true")?;
            tracing::info!("first load, forcing initial instruments");
            return self.seed_instruments(current);
        }

        let Some(raw) = self.store.get(STOCKS_KEY)? else {
            return self.seed_instruments(current);
        };

        match serde_json::from_str::<Vec<Instrument>>(&raw) {
            Ok(list) if list.is_empty() => {
                tracing::info!("no instruments stored, loading defaults");
                self.seed_instruments(current)
            }
            Ok(list) => Ok(list),
            Err(e) => {
                tracing::warn!(key = STOCKS_KEY, error = %e, "discarding unreadable instruments");
                self.seed_instruments(current)
            }
        }
    }

    pub fn save_instruments(&self, instruments: &[Instrument]) -> Result<(), LedgerError> {
        let json = serde_json::to_string(instruments)?;
        tracing::debug!(count = instruments.len(), bytes = json.len(), "saving instruments");
        self.store.set(STOCKS_KEY, &json)
    }

    pub fn find_instrument(
        &self,
        current: &WalletId,
        id: &InstrumentId,
    ) -> Result<Instrument, LedgerError> {
        self.load_instruments(current)?
            .into_iter()
            .find(|inst| &inst.id == id)
            .ok_or_else(|| LedgerError::UnknownInstrument { id: id.to_string() })
    }

    /// Issue a new instrument, replacing any earlier one with the same
    /// symbol from the same creator.
    pub fn create_instrument(
        &self,
        name: &str,
        symbol: &str,
        total_supply: u64,
        current_price: f64,
        authority: &WalletId,
    ) -> Result<Instrument, LedgerError> {
        let instrument = Instrument::new(name, symbol, total_supply, current_price, authority.clone())?;
        let mut instruments = self.load_instruments(authority)?;

        match instruments
            .iter()
            .position(|inst| inst.id == instrument.id)
        {
            Some(idx) => {
                tracing::info!(symbol = %instrument.symbol, "replacing existing instrument");
                instruments[idx] = instrument.clone();
            }
            None => instruments.push(instrument.clone()),
        }

        self.save_instruments(&instruments)?;
        tracing::info!(
            symbol = %instrument.symbol,
            id = %instrument.id,
            supply = total_supply,
            "created instrument"
        );
        Ok(instrument)
    }

    /// Positions held by `wallet`. A missing or unreadable record is an
    /// empty portfolio; unreadable entries inside it are skipped.
    pub fn load_portfolio(&self, wallet: &WalletId) -> Result<Portfolio, LedgerError> {
        let key = portfolio_key(wallet);
        let Some(raw) = self.store.get(&key)? else {
            tracing::debug!(wallet = wallet.short(), "no portfolio stored");
            return Ok(Portfolio::new(wallet.clone()));
        };

        let entries = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(entries)) => entries,
            Ok(_) => {
                tracing::warn!(key = %key, "portfolio record is not an array, ignoring");
                return Ok(Portfolio::new(wallet.clone()));
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "discarding unreadable portfolio");
                return Ok(Portfolio::new(wallet.clone()));
            }
        };

        let positions: Vec<Position> = entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<Position>(entry) {
                Ok(pos) if &pos.owner == wallet => Some(pos),
                Ok(pos) => {
                    tracing::warn!(key = %key, owner = %pos.owner, "skipping position of another wallet");
                    None
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "skipping unreadable position");
                    None
                }
            })
            .collect();

        Ok(Portfolio::with_positions(wallet.clone(), positions))
    }

    pub fn save_portfolio(&self, portfolio: &Portfolio) -> Result<(), LedgerError> {
        let json = serde_json::to_string(&portfolio.positions)?;
        tracing::debug!(
            wallet = portfolio.owner.short(),
            positions = portfolio.position_count(),
            "saving portfolio"
        );
        self.store.set(&portfolio_key(&portfolio.owner), &json)
    }

    pub fn buy(
        &self,
        wallet: &WalletId,
        id: &InstrumentId,
        quantity: u64,
        price: f64,
    ) -> Result<TradeReceipt, LedgerError> {
        check_trade_input(quantity, price)?;

        let mut instruments = self.load_instruments(wallet)?;
        let idx = instruments
            .iter()
            .position(|inst| &inst.id == id)
            .ok_or_else(|| LedgerError::UnknownInstrument { id: id.to_string() })?;
        instruments[idx].reserve(quantity)?;
        let mut portfolio = self.load_portfolio(wallet)?;
        portfolio.check_buy(id, quantity)?;

        let instrument = &instruments[idx];
        let position_quantity = portfolio.upsert_buy(instrument, quantity, price)?.quantity;
        self.save_instruments(&instruments)?;
        self.save_portfolio(&portfolio)?;

        tracing::info!(
            wallet = wallet.short(),
            symbol = %instrument.symbol,
            quantity,
            price,
            "buy executed"
        );

        Ok(TradeReceipt {
            side: Side::Buy,
            wallet: wallet.clone(),
            instrument: *id,
            symbol: instrument.symbol.clone(),
            quantity,
            price,
            available_supply: instrument.available_supply,
            position_quantity,
        })
    }

    pub fn sell(
        &self,
        wallet: &WalletId,
        id: &InstrumentId,
        quantity: u64,
        price: f64,
    ) -> Result<TradeReceipt, LedgerError> {
        check_trade_input(quantity, price)?;

        let mut portfolio = self.load_portfolio(wallet)?;
        portfolio.check_sell(id, quantity)?;

        let mut instruments = self.load_instruments(wallet)?;
        let idx = instruments
            .iter()
            .position(|inst| &inst.id == id)
            .ok_or_else(|| LedgerError::UnknownInstrument { id: id.to_string() })?;

        instruments[idx].release(quantity);
        self.save_instruments(&instruments)?;
        let position_quantity = portfolio.apply_sell(id, quantity, price)?;
        self.save_portfolio(&portfolio)?;

        let instrument = &instruments[idx];
        tracing::info!(
            wallet = wallet.short(),
            symbol = %instrument.symbol,
            quantity,
            price,
            "sell executed"
        );

        Ok(TradeReceipt {
            side: Side::Sell,
            wallet: wallet.clone(),
            instrument: *id,
            symbol: instrument.symbol.clone(),
            quantity,
            price,
            available_supply: instrument.available_supply,
            position_quantity,
        })
    }

    /// Mark the wallet's positions to current instrument prices and persist.
    pub fn refresh_portfolio(&self, wallet: &WalletId) -> Result<Portfolio, LedgerError> {
        let mut portfolio = self.load_portfolio(wallet)?;
        let instruments = self.load_instruments(wallet)?;
        portfolio.mark_to_market(&instruments);
        self.save_portfolio(&portfolio)?;
        Ok(portfolio)
    }

    pub fn portfolio_value(&self, wallet: &WalletId) -> Result<f64, LedgerError> {
        Ok(self.refresh_portfolio(wallet)?.total_value())
    }

    pub fn portfolio_summary(&self, wallet: &WalletId) -> Result<PortfolioSummary, LedgerError> {
        Ok(self.refresh_portfolio(wallet)?.summary())
    }

    pub fn list_instruments(
        &self,
        current: &WalletId,
        query: &MarketQuery,
    ) -> Result<Vec<Instrument>, LedgerError> {
        let instruments = self.load_instruments(current)?;
        Ok(filter_and_sort(&instruments, query)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn market_stats(&self, current: &WalletId) -> Result<MarketStats, LedgerError> {
        Ok(MarketStats::compute(&self.load_instruments(current)?))
    }

    /// Move every instrument's price one random step and persist.
    pub fn fluctuate_prices<R: Rng + ?Sized>(
        &self,
        current: &WalletId,
        rng: &mut R,
    ) -> Result<Vec<PriceChange>, LedgerError> {
        let mut instruments = self.load_instruments(current)?;
        let mut changes = Vec::with_capacity(instruments.len());

        for inst in &mut instruments {
            let old_price = inst.current_price;
            inst.current_price =
                market::fluctuate(old_price, self.config.volatility_pct, self.config.min_price, rng);
            changes.push(PriceChange {
                id: inst.id,
                symbol: inst.symbol.clone(),
                old_price,
                new_price: inst.current_price,
            });
        }

        self.save_instruments(&instruments)?;
        tracing::debug!(count = changes.len(), "prices updated");
        Ok(changes)
    }

    /// Remove instruments, the first-load marker and every portfolio.
    /// Returns the number of portfolios removed.
    pub fn clear_all(&self) -> Result<usize, LedgerError> {
        self.store.remove(STOCKS_KEY)?;
        self.store.remove(RESET_MARKER_KEY)?;

        let keys = self.store.keys_with_prefix(PORTFOLIO_PREFIX)?;
        for key in &keys {
            self.store.remove(key)?;
        }
        tracing::info!(portfolios = keys.len(), "cleared all ledger data");
        Ok(keys.len())
    }
}

fn check_trade_input(quantity: u64, price: f64) -> Result<(), LedgerError> {
    if quantity == 0 {
        return Err(LedgerError::invalid("quantity", "quantity must be greater than 0"));
    }
    validate_price("price", price)
}
