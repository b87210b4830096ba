use std::path::Path;

use papertrade_core::{Session, Snapshot};
use serde::Serialize;

use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct StatusResponseData {
    papertrade_home: String,
    save_file: String,
    #[serde(flatten)]
    snapshot: Snapshot,
}

pub fn run(session: &Session, home: &Path) -> Result<CommandResult, CliError> {
    let data = serde_json::to_value(StatusResponseData {
        papertrade_home: home.display().to_string(),
        save_file: session.save_file().path().display().to_string(),
        snapshot: session.ledger().snapshot(),
    })?;

    Ok(CommandResult::ok(data))
}
