//! Market listing, statistics and simulated price movement.

use rand::Rng;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::error::LedgerError;
use super::instrument::Instrument;
use super::keys::InstrumentId;

pub const DEFAULT_VOLATILITY_PCT: f64 = 2.0;
pub const DEFAULT_MIN_PRICE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Name,
    Price,
    #[default]
    MarketCap,
}

impl FromStr for SortKey {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "price" => Ok(SortKey::Price),
            "market-cap" | "marketcap" | "market_cap" => Ok(SortKey::MarketCap),
            other => Err(LedgerError::invalid(
                "sort",
                format!("unknown sort key '{other}' (expected name, price or market-cap)"),
            )),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Name => write!(f, "name"),
            SortKey::Price => write!(f, "price"),
            SortKey::MarketCap => write!(f, "market-cap"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketQuery {
    pub search: Option<String>,
    pub sort: SortKey,
    pub order: SortOrder,
}

/// Instruments matching the query's search term, in the requested order.
pub fn filter_and_sort<'a>(instruments: &'a [Instrument], query: &MarketQuery) -> Vec<&'a Instrument> {
    let term = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut selected: Vec<&Instrument> = instruments
        .iter()
        .filter(|inst| match &term {
            Some(t) => {
                inst.symbol.to_lowercase().contains(t.as_str())
                    || inst.name.to_lowercase().contains(t.as_str())
            }
            None => true,
        })
        .collect();

    selected.sort_by(|a, b| {
        let ordering = match query.sort {
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortKey::Price => a.current_price.total_cmp(&b.current_price),
            SortKey::MarketCap => a.market_cap().total_cmp(&b.market_cap()),
        };
        match query.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    selected
}

/// Percentage move from `old` to `new`; zero when there is no prior price.
pub fn price_change_pct(old: f64, new: f64) -> f64 {
    if old == 0.0 {
        return 0.0;
    }
    (new - old) / old * 100.0
}

/// Random walk step: uniform move within +/- `volatility_pct` percent,
/// floored at `min_price`.
pub fn fluctuate<R: Rng + ?Sized>(
    price: f64,
    volatility_pct: f64,
    min_price: f64,
    rng: &mut R,
) -> f64 {
    let change_pct = if volatility_pct > 0.0 {
        rng.gen_range(-volatility_pct..=volatility_pct)
    } else {
        0.0
    };
    (price + price * change_pct / 100.0).max(min_price)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceChange {
    pub id: InstrumentId,
    pub symbol: String,
    pub old_price: f64,
    pub new_price: f64,
}

impl PriceChange {
    pub fn pct(&self) -> f64 {
        price_change_pct(self.old_price, self.new_price)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketStats {
    pub instrument_count: usize,
    pub total_market_cap: f64,
    pub total_circulating: u64,
    pub highest_valued: Option<String>,
}

impl MarketStats {
    pub fn compute(instruments: &[Instrument]) -> Self {
        let highest_valued = instruments
            .iter()
            .max_by(|a, b| a.market_cap().partial_cmp(&b.market_cap()).unwrap_or(Ordering::Equal))
            .map(|inst| inst.symbol.clone());

        MarketStats {
            instrument_count: instruments.len(),
            total_market_cap: instruments.iter().map(Instrument::market_cap).sum(),
            total_circulating: instruments
                .iter()
                .map(Instrument::circulating)
                .fold(0u64, u64::saturating_add),
            highest_valued,
        }
    }
}
