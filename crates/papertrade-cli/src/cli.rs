//! CLI argument definitions for papertrade.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `status` | Show cash, holdings and lookup history |
//! | `lookup` | Resolve a company name or symbol |
//! | `history` | Closing prices and daily changes |
//! | `buy` / `sell` | Trade shares at the source's current price |
//! | `shell` | Interactive session over the same commands |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--save-file` | `$PAPERTRADE_HOME/game_progress.csv` | Save file path |
//! | `--starting-cash` | `1000` | Cash written on first run |
//! | `--source` | `yahoo` | Quote source (yahoo, simulated) |
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `-v` | warn | Raise log verbosity (repeatable) |

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

#[derive(Debug, Parser)]
#[command(
    name = "papertrade",
    author,
    version,
    about = "Paper-trading stock game with a CSV save file"
)]
pub struct Cli {
    /// Save file to load and update.
    #[arg(long, global = true, env = "PAPERTRADE_SAVE_FILE")]
    pub save_file: Option<PathBuf>,

    /// Cash balance written when no save file exists yet.
    #[arg(long, global = true)]
    pub starting_cash: Option<Decimal>,

    /// Where prices, history and symbol lookups come from.
    #[arg(
        long,
        global = true,
        value_enum,
        env = "PAPERTRADE_SOURCE",
        default_value_t = SourceSelector::Yahoo
    )]
    pub source: SourceSelector,

    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Log more detail to stderr (-v info, -vv debug). `RUST_LOG` wins.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text for terminal display.
    Table,
    /// Single JSON object output.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceSelector {
    /// Live quotes from Yahoo Finance.
    Yahoo,
    /// Deterministic offline prices for a small catalog.
    Simulated,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show cash, holdings and lookup history.
    Status,
    /// Resolve a company name or symbol and record the lookup.
    Lookup(LookupArgs),
    /// Show closing prices and daily changes.
    History(HistoryArgs),
    /// Buy shares.
    Buy(TradeArgs),
    /// Sell held shares.
    Sell(TradeArgs),
    /// Run an interactive session; state is saved on `quit` or end of input.
    Shell,
}

#[derive(Debug, Clone, Args)]
pub struct LookupArgs {
    /// Company name or symbol.
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,
}

impl LookupArgs {
    pub fn joined(&self) -> String {
        self.query.join(" ")
    }
}

#[derive(Debug, Clone, Args)]
pub struct HistoryArgs {
    pub symbol: String,

    /// Lookback unit: days, months or years.
    #[arg(long, default_value = "days")]
    pub period: String,

    /// Number of units to look back.
    #[arg(long, default_value_t = 5)]
    pub count: u32,
}

#[derive(Debug, Clone, Args)]
pub struct TradeArgs {
    pub symbol: String,

    pub quantity: u64,
}

/// One line typed into `papertrade shell`.
#[derive(Debug, Parser)]
#[command(name = "shell", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Debug, Subcommand)]
pub enum ShellCommand {
    Status,
    Lookup(LookupArgs),
    History(HistoryArgs),
    Buy(TradeArgs),
    Sell(TradeArgs),
    /// Write the ledger to the save file now.
    Save,
    /// Save and leave the shell.
    #[command(alias = "exit")]
    Quit,
}
