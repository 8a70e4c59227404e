#![allow(dead_code)]

use std::io::Write;

use stockledger::adapters::memory_store::MemoryStore;
use stockledger::cli::{self, Command};
use stockledger::domain::config::LedgerConfig;
use stockledger::domain::error::LedgerError;
use stockledger::domain::keys::{InstrumentId, WalletId};
use stockledger::domain::ledger::Ledger;
use stockledger::domain::seed::demo_authority;
use stockledger::ports::storage_port::StoragePort;

pub fn wallet(key: &str) -> WalletId {
    WalletId::new(key).unwrap()
}

pub fn memory_ledger() -> Ledger<MemoryStore> {
    Ledger::new(MemoryStore::new(), LedgerConfig::default())
}

pub fn seeded_id(symbol: &str) -> InstrumentId {
    InstrumentId::derive(symbol, &demo_authority())
}

/// Run `command` and capture what it prints.
pub fn run_command<S: StoragePort>(
    ledger: &Ledger<S>,
    wallet: Option<&WalletId>,
    command: Command,
) -> Result<String, LedgerError> {
    let mut buf: Vec<u8> = Vec::new();
    cli::execute(ledger, wallet, &command, &mut buf)?;
    Ok(String::from_utf8(buf).unwrap())
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
