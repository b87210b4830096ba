mod history;
mod lookup;
mod shell;
mod status;
mod trade;

use std::path::Path;

use papertrade_core::{
    QuoteSource, SaveFile, Session, SimulatedSource, StoreConfig, TradeAction, TradeRejection,
    YahooSource,
};
use serde_json::Value;

use crate::cli::{Cli, Command, SourceSelector};
use crate::error::CliError;

pub struct CommandResult {
    pub data: Value,
    /// Set when the command ran but its trade was refused.
    pub rejection: Option<TradeRejection>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            rejection: None,
        }
    }

    pub fn rejected(data: Value, rejection: TradeRejection) -> Self {
        Self {
            data,
            rejection: Some(rejection),
        }
    }

    /// Nothing left to render.
    pub fn empty() -> Self {
        Self::ok(Value::Null)
    }
}

/// Load the save file, run one command and save if the ledger changed.
///
/// The save happens even when the command fails, so a failed lookup is
/// still recorded.
pub fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    let config = store_config(cli);
    let home = config.papertrade_home.clone();
    let source = quote_source(cli.source);
    let mut session = Session::open(SaveFile::open(config)?)?;

    let outcome = dispatch(cli, &home, &mut session, source.as_ref());
    session.save_if_dirty()?;
    outcome
}

fn dispatch(
    cli: &Cli,
    home: &Path,
    session: &mut Session,
    source: &dyn QuoteSource,
) -> Result<CommandResult, CliError> {
    match &cli.command {
        Command::Status => status::run(session, home),
        Command::Lookup(args) => lookup::run(session.ledger_mut(), source, args),
        Command::History(args) => history::run(source, args),
        Command::Buy(args) => trade::run(session.ledger_mut(), source, TradeAction::Buy, args),
        Command::Sell(args) => trade::run(session.ledger_mut(), source, TradeAction::Sell, args),
        Command::Shell => shell::run(session, source, home, cli.format, cli.pretty),
    }
}

fn quote_source(selector: SourceSelector) -> Box<dyn QuoteSource> {
    match selector {
        SourceSelector::Yahoo => Box::new(YahooSource::new()),
        SourceSelector::Simulated => Box::new(SimulatedSource::default()),
    }
}

fn store_config(cli: &Cli) -> StoreConfig {
    let mut config = StoreConfig::default();
    if let Some(path) = &cli.save_file {
        config.save_path = path.clone();
    }
    if let Some(cash) = cli.starting_cash {
        config.starting_cash = cash;
    }
    config
}
