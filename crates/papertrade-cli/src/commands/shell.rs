use std::io::{self, BufRead, Write};
use std::path::Path;

use clap::Parser;
use papertrade_core::{QuoteSource, Session, TradeAction};
use tracing::debug;

use crate::cli::{OutputFormat, ShellCommand, ShellLine};
use crate::error::CliError;
use crate::output;

use super::{history, lookup, status, trade, CommandResult};

const PROMPT: &str = "papertrade> ";

pub fn run(
    session: &mut Session,
    source: &dyn QuoteSource,
    home: &Path,
    format: OutputFormat,
    pretty: bool,
) -> Result<CommandResult, CliError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    drive(session, source, home, stdin.lock(), stdout.lock(), format, pretty)?;
    Ok(CommandResult::empty())
}

/// Run shell lines from `input` until `quit` or end of input, then save.
///
/// Command failures are printed and the loop continues; save-file and output
/// failures end the shell.
pub fn drive<R: BufRead, W: Write>(
    session: &mut Session,
    source: &dyn QuoteSource,
    home: &Path,
    input: R,
    mut out: W,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    write!(out, "{PROMPT}")?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            write!(out, "{PROMPT}")?;
            out.flush()?;
            continue;
        }

        match ShellLine::try_parse_from(words) {
            Ok(ShellLine {
                command: ShellCommand::Quit,
            }) => break,
            Ok(ShellLine {
                command: ShellCommand::Save,
            }) => {
                session.save()?;
                writeln!(out, "saved {}", session.save_file().path().display())?;
            }
            Ok(ShellLine { command }) => match dispatch(session, source, home, command) {
                Ok(result) => output::write_result(&mut out, &result, format, pretty)?,
                Err(error) if recoverable(&error) => {
                    debug!(%error, "shell command failed");
                    writeln!(out, "error: {error}")?;
                }
                Err(error) => return Err(error),
            },
            Err(error) => write!(out, "{}", error.render())?,
        }

        write!(out, "{PROMPT}")?;
        out.flush()?;
    }

    writeln!(out)?;
    session.save_if_dirty()?;
    Ok(())
}

fn dispatch(
    session: &mut Session,
    source: &dyn QuoteSource,
    home: &Path,
    command: ShellCommand,
) -> Result<CommandResult, CliError> {
    match command {
        ShellCommand::Status => status::run(session, home),
        ShellCommand::Lookup(args) => lookup::run(session.ledger_mut(), source, &args),
        ShellCommand::History(args) => history::run(source, &args),
        ShellCommand::Buy(args) => {
            trade::run(session.ledger_mut(), source, TradeAction::Buy, &args)
        }
        ShellCommand::Sell(args) => {
            trade::run(session.ledger_mut(), source, TradeAction::Sell, &args)
        }
        ShellCommand::Save | ShellCommand::Quit => Ok(CommandResult::empty()),
    }
}

fn recoverable(error: &CliError) -> bool {
    matches!(
        error,
        CliError::Validation(_) | CliError::TradeRejected(_) | CliError::Source(_)
    )
}
