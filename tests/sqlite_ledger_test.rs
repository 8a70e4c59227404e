//! Ledger behavior over the SQLite store.

#![cfg(feature = "sqlite")]

mod common;

use common::*;
use stockledger::adapters::file_config_adapter::FileConfigAdapter;
use stockledger::adapters::sqlite_store::SqliteStore;
use stockledger::domain::config::LedgerConfig;
use stockledger::domain::ledger::{portfolio_key, Ledger, STOCKS_KEY};
use stockledger::ports::storage_port::StoragePort;

fn file_config(dir: &tempfile::TempDir) -> FileConfigAdapter {
    let path = dir.path().join("ledger.db");
    FileConfigAdapter::from_string(&format!("[storage]\npath = {}\n", path.display())).unwrap()
}

#[test]
fn trades_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let me = wallet("alice");

    {
        let store = SqliteStore::from_config(&file_config(&dir)).unwrap();
        let ledger = Ledger::new(store, LedgerConfig::default());
        ledger.buy(&me, &seeded_id("BTC"), 100, 5_000.0).unwrap();
    }

    let store = SqliteStore::from_config(&file_config(&dir)).unwrap();
    let ledger = Ledger::new(store, LedgerConfig::default());
    let btc = ledger.find_instrument(&me, &seeded_id("BTC")).unwrap();
    assert_eq!(btc.available_supply, 1_700);
    let portfolio = ledger.load_portfolio(&me).unwrap();
    assert_eq!(portfolio.get(&seeded_id("BTC")).unwrap().quantity, 100);
}

#[test]
fn corrupt_rows_are_recovered() {
    let ledger = Ledger::new(SqliteStore::in_memory().unwrap(), LedgerConfig::default());
    let me = wallet("alice");
    ledger.buy(&me, &seeded_id("SOL"), 5, 100.0).unwrap();

    ledger.store().set(STOCKS_KEY, "not json").unwrap();
    ledger.store().set(&portfolio_key(&me), "[1, 2, 3]").unwrap();

    assert_eq!(ledger.load_instruments(&me).unwrap().len(), 4);
    assert!(ledger.load_portfolio(&me).unwrap().is_empty());
}

#[test]
fn clear_all_empties_table() {
    let ledger = Ledger::new(SqliteStore::in_memory().unwrap(), LedgerConfig::default());
    ledger.buy(&wallet("alice"), &seeded_id("SOL"), 1, 100.0).unwrap();
    ledger.buy(&wallet("bob"), &seeded_id("ETH"), 1, 300.0).unwrap();
    assert_eq!(ledger.clear_all().unwrap(), 2);
    assert!(ledger.store().keys().unwrap().is_empty());
}
