//! Default instruments used when the store is empty or unreadable.

use super::instrument::Instrument;
use super::keys::{InstrumentId, WalletId};

pub const DEMO_AUTHORITY: &str = "C1EuT9VokAKLiW7i2ingX3AAKdCXRyFep7pvKQCyTukJ";

struct SeedRow {
    name: &'static str,
    symbol: &'static str,
    total_supply: u64,
    available_supply: u64,
    price: f64,
}

const MARKET_ROWS: [SeedRow; 3] = [
    SeedRow { name: "Solana", symbol: "SOL", total_supply: 10_000, available_supply: 8_000, price: 100.0 },
    SeedRow { name: "Ethereum", symbol: "ETH", total_supply: 5_000, available_supply: 3_000, price: 300.0 },
    SeedRow { name: "Bitcoin", symbol: "BTC", total_supply: 2_100, available_supply: 1_800, price: 5_000.0 },
];

const DEMO_ROW: SeedRow = SeedRow {
    name: "Demo Stock",
    symbol: "DEMO",
    total_supply: 1_000,
    available_supply: 1_000,
    price: 50.0,
};

fn build(row: &SeedRow, authority: &WalletId) -> Instrument {
    Instrument {
        id: InstrumentId::derive(row.symbol, authority),
        name: row.name.to_string(),
        symbol: row.symbol.to_string(),
        total_supply: row.total_supply,
        available_supply: row.available_supply,
        current_price: row.price,
        authority: authority.clone(),
    }
}

pub fn demo_authority() -> WalletId {
    WalletId(DEMO_AUTHORITY.to_string())
}

/// Three market instruments from the demo creator plus one owned by `current`.
pub fn initial_instruments(current: &WalletId) -> Vec<Instrument> {
    let demo = demo_authority();
    let mut out: Vec<Instrument> = MARKET_ROWS.iter().map(|row| build(row, &demo)).collect();
    out.push(build(&DEMO_ROW, current));
    out
}
