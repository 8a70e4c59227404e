//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::memory_store::MemoryStore;
use crate::domain::config::{build_ledger_config, LedgerConfig, StorageBackend};
use crate::domain::error::LedgerError;
use crate::domain::keys::{InstrumentId, WalletId};
use crate::domain::ledger::{Ledger, TradeReceipt};
use crate::domain::market::{MarketQuery, SortKey, SortOrder};
use crate::ports::config_port::ConfigPort;
use crate::ports::storage_port::StoragePort;

#[derive(Parser, Debug)]
#[command(name = "stockledger", about = "Mock stock ledger for a Solana-style marketplace")]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Public key of the connected wallet
    #[arg(short, long, global = true)]
    pub wallet: Option<String>,
    /// Log ledger activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List instruments
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "market-cap")]
        sort: SortKey,
        #[arg(long)]
        asc: bool,
    },
    /// Show market totals
    Stats,
    /// Issue a new instrument owned by the wallet
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        supply: u64,
        #[arg(long)]
        price: f64,
    },
    /// Buy from an instrument's available supply
    Buy {
        #[arg(long)]
        id: InstrumentId,
        #[arg(short, long)]
        quantity: u64,
        /// Trade price; defaults to the instrument's current price
        #[arg(long)]
        price: Option<f64>,
    },
    /// Sell part or all of a position
    Sell {
        #[arg(long)]
        id: InstrumentId,
        #[arg(short, long)]
        quantity: u64,
        #[arg(long)]
        price: Option<f64>,
    },
    /// Show the wallet's positions marked to current prices
    Portfolio,
    /// Apply random price moves
    Tick {
        #[arg(long, default_value_t = 1)]
        rounds: u32,
    },
    /// Remove all instruments and portfolios
    Reset,
}

impl Command {
    fn needs_wallet(&self) -> bool {
        !matches!(self, Command::Reset)
    }
}

pub fn init_tracing(verbose: bool) {
    let fallback = if verbose { "stockledger=info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    init_tracing(cli.verbose);

    let (config, ledger_config) = match load_config(cli.config.as_ref()) {
        Ok(c) => c,
        Err(e) => return report(&e),
    };

    let store = match open_store(&config, &ledger_config) {
        Ok(s) => s,
        Err(e) => return report(&e),
    };
    let ledger = Ledger::new(store, ledger_config);

    let wallet = if cli.command.needs_wallet() {
        match resolve_wallet(cli.wallet.as_deref(), ledger.config()) {
            Ok(w) => Some(w),
            Err(e) => return report(&e),
        }
    } else {
        None
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match execute(&ledger, wallet.as_ref(), &cli.command, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

fn report(err: &LedgerError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(
    path: Option<&PathBuf>,
) -> Result<(FileConfigAdapter, LedgerConfig), LedgerError> {
    let adapter = match path {
        Some(p) => {
            tracing::debug!(path = %p.display(), "loading config");
            FileConfigAdapter::load(p)?
        }
        None => FileConfigAdapter::empty(),
    };
    let ledger_config = build_ledger_config(&adapter)?;
    Ok((adapter, ledger_config))
}

pub fn open_store(
    config: &dyn ConfigPort,
    ledger_config: &LedgerConfig,
) -> Result<Box<dyn StoragePort>, LedgerError> {
    match ledger_config.backend {
        StorageBackend::Memory => Ok(Box::new(MemoryStore::new())),
        StorageBackend::Sqlite => {
            #[cfg(feature = "sqlite")]
            {
                use crate::adapters::sqlite_store::SqliteStore;
                Ok(Box::new(SqliteStore::from_config(config)?))
            }

            #[cfg(not(feature = "sqlite"))]
            {
                let _ = config;
                Err(LedgerError::ConfigInvalid {
                    section: "storage".into(),
                    key: "backend".into(),
                    reason: "sqlite feature is required for the sqlite backend".into(),
                })
            }
        }
    }
}

/// The `--wallet` flag wins over `[wallet] default`; with neither there is
/// no connected wallet.
pub fn resolve_wallet(
    flag: Option<&str>,
    config: &LedgerConfig,
) -> Result<WalletId, LedgerError> {
    match flag.or(config.default_wallet.as_deref()) {
        Some(key) => WalletId::new(key),
        None => Err(LedgerError::invalid(
            "wallet",
            "no wallet connected (use --wallet or set [wallet] default)",
        )),
    }
}

fn require_wallet(wallet: Option<&WalletId>) -> Result<&WalletId, LedgerError> {
    wallet.ok_or_else(|| LedgerError::invalid("wallet", "no wallet connected"))
}

/// Run one command against `ledger`, writing human-readable output to `out`.
pub fn execute<S: StoragePort>(
    ledger: &Ledger<S>,
    wallet: Option<&WalletId>,
    command: &Command,
    out: &mut dyn Write,
) -> Result<(), LedgerError> {
    match command {
        Command::List { search, sort, asc } => {
            let query = MarketQuery {
                search: search.clone(),
                sort: *sort,
                order: if *asc { SortOrder::Asc } else { SortOrder::Desc },
            };
            let instruments = ledger.list_instruments(require_wallet(wallet)?, &query)?;
            writeln!(
                out,
                "{:<8} {:<20} {:>12} {:>10} {:>10} {:>14}  ID",
                "SYMBOL", "NAME", "PRICE", "AVAILABLE", "TOTAL", "MARKET CAP"
            )?;
            for inst in &instruments {
                writeln!(
                    out,
                    "{:<8} {:<20} {:>12.2} {:>10} {:>10} {:>14.2}  {}",
                    inst.symbol,
                    inst.name,
                    inst.current_price,
                    inst.available_supply,
                    inst.total_supply,
                    inst.market_cap(),
                    inst.id
                )?;
            }
            writeln!(out, "Total instruments: {}", instruments.len())?;
        }
        Command::Stats => {
            let stats = ledger.market_stats(require_wallet(wallet)?)?;
            writeln!(out, "Instruments:      {}", stats.instrument_count)?;
            writeln!(out, "Total Market Cap: {:.2}", stats.total_market_cap)?;
            writeln!(out, "Circulating:      {}", stats.total_circulating)?;
            writeln!(
                out,
                "Highest Valued:   {}",
                stats.highest_valued.as_deref().unwrap_or("-")
            )?;
        }
        Command::Create {
            name,
            symbol,
            supply,
            price,
        } => {
            let inst =
                ledger.create_instrument(name, symbol, *supply, *price, require_wallet(wallet)?)?;
            writeln!(
                out,
                "Created {} ({}): {} at {:.2}",
                inst.symbol, inst.name, inst.total_supply, inst.current_price
            )?;
            writeln!(out, "ID: {}", inst.id)?;
        }
        Command::Buy {
            id,
            quantity,
            price,
        } => {
            let wallet = require_wallet(wallet)?;
            let price = match price {
                Some(p) => *p,
                None => ledger.find_instrument(wallet, id)?.current_price,
            };
            let receipt = ledger.buy(wallet, id, *quantity, price)?;
            write_receipt(out, "Bought", &receipt)?;
        }
        Command::Sell {
            id,
            quantity,
            price,
        } => {
            let wallet = require_wallet(wallet)?;
            let price = match price {
                Some(p) => *p,
                None => ledger.find_instrument(wallet, id)?.current_price,
            };
            let receipt = ledger.sell(wallet, id, *quantity, price)?;
            write_receipt(out, "Sold", &receipt)?;
        }
        Command::Portfolio => {
            let portfolio = ledger.refresh_portfolio(require_wallet(wallet)?)?;
            if portfolio.is_empty() {
                writeln!(out, "No positions")?;
                return Ok(());
            }
            writeln!(
                out,
                "{:<8} {:>10} {:>12} {:>12} {:>14} {:>14} {:>9}",
                "SYMBOL", "QUANTITY", "AVG PRICE", "PRICE", "VALUE", "P/L", "P/L %"
            )?;
            for pos in &portfolio.positions {
                writeln!(
                    out,
                    "{:<8} {:>10} {:>12.4} {:>12.4} {:>14.4} {:>+14.4} {:>+8.2}%",
                    pos.symbol,
                    pos.quantity,
                    pos.average_price,
                    pos.current_price,
                    pos.market_value(),
                    pos.unrealized_pnl(),
                    pos.unrealized_pnl_pct()
                )?;
            }
            let summary = portfolio.summary();
            writeln!(out)?;
            writeln!(out, "Total Investment: {:.4}", summary.total_investment)?;
            writeln!(out, "Total Value:      {:.4}", summary.total_value)?;
            writeln!(
                out,
                "Profit/Loss:      {:+.4} ({:+.2}%)",
                summary.profit_loss, summary.profit_loss_pct
            )?;
        }
        Command::Tick { rounds } => {
            let wallet = require_wallet(wallet)?;
            let mut rng = match ledger.config().seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            for round in 1..=*rounds {
                let changes = ledger.fluctuate_prices(wallet, &mut rng)?;
                writeln!(out, "Round {round}:")?;
                for change in &changes {
                    writeln!(
                        out,
                        "  {:<8} {:>12.4} -> {:>12.4} ({:+.2}%)",
                        change.symbol,
                        change.old_price,
                        change.new_price,
                        change.pct()
                    )?;
                }
            }
        }
        Command::Reset => {
            let removed = ledger.clear_all()?;
            writeln!(out, "Cleared all ledger data ({removed} portfolios)")?;
        }
    }
    Ok(())
}

fn write_receipt(out: &mut dyn Write, verb: &str, receipt: &TradeReceipt) -> io::Result<()> {
    writeln!(
        out,
        "{verb} {} {} at {:.4} (total {:.4})",
        receipt.quantity,
        receipt.symbol,
        receipt.price,
        receipt.total()
    )?;
    writeln!(
        out,
        "Position: {}  Available supply: {}",
        receipt.position_quantity, receipt.available_supply
    )
}
