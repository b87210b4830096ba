//! Save-file codec: one CSV header row and one data row per ledger snapshot.
//!
//! ```text
//! TotalDollars,Stocks,Lookups
//! 740,{'AAPL': 3},"['apple', 'msft']"
//! ```
//!
//! Writes go to a temporary file in the target directory that is renamed over
//! the save file, so a crash leaves either the old or the new snapshot.

use std::collections::BTreeMap;
use std::env;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ledger::STARTING_CASH;
use crate::literal::{self, LiteralError};
use crate::{Snapshot, Symbol, ValidationError};

/// Header row of every save file.
pub const SAVE_HEADER: [&str; 3] = ["TotalDollars", "Stocks", "Lookups"];

pub const DEFAULT_SAVE_FILE_NAME: &str = "game_progress.csv";

/// Errors raised while reading or writing a save file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The save file exists but does not hold a valid snapshot.
    #[error("save file '{}' is corrupt: {reason}", .path.display())]
    CorruptSave { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("failed to encode save file: {0}")]
    Csv(#[from] csv::Error),
}

impl StoreError {
    pub const fn is_corrupt(&self) -> bool {
        matches!(self, Self::CorruptSave { .. })
    }
}

/// Location and defaults for the save file.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Root directory for papertrade data.
    pub papertrade_home: PathBuf,
    pub save_path: PathBuf,
    /// Cash written on first run.
    pub starting_cash: Decimal,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let papertrade_home = resolve_papertrade_home();
        let save_path = papertrade_home.join(DEFAULT_SAVE_FILE_NAME);
        Self {
            papertrade_home,
            save_path,
            starting_cash: STARTING_CASH,
        }
    }
}

/// Reads and writes ledger snapshots at one path.
#[derive(Debug, Clone)]
pub struct SaveFile {
    path: PathBuf,
    initial: Snapshot,
}

impl SaveFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            initial: Snapshot::default(),
        }
    }

    pub fn open(config: StoreConfig) -> Result<Self, ValidationError> {
        Self::new(config.save_path).with_starting_cash(config.starting_cash)
    }

    pub fn with_starting_cash(mut self, cash: Decimal) -> Result<Self, ValidationError> {
        self.initial = Snapshot::starting(cash)?;
        Ok(self)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the stored snapshot. A missing file is initialized with the
    /// starting snapshot; a corrupt one is reported and left untouched.
    pub fn load(&self) -> Result<Snapshot, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                let snapshot = self.initial.clone();
                self.save(&snapshot)?;
                info!(path = %self.path.display(), cash = %snapshot.cash(), "created new save file");
                return Ok(snapshot);
            }
            Err(error) => return Err(error.into()),
        };

        match decode(file) {
            Ok(snapshot) => {
                debug!(
                    path = %self.path.display(),
                    cash = %snapshot.cash(),
                    holdings = snapshot.holdings().len(),
                    lookups = snapshot.lookups().len(),
                    "loaded save file"
                );
                Ok(snapshot)
            }
            Err(DecodeError::Io(error)) => Err(error.into()),
            Err(DecodeError::Invalid(reason)) => {
                warn!(path = %self.path.display(), %reason, "save file is corrupt");
                Err(self.corrupt(reason))
            }
        }
    }

    /// Replace the save file with exactly one header and one data row.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let mut staged = NamedTempFile::new_in(parent)?;
        {
            let mut writer = csv::Writer::from_writer(staged.as_file_mut());
            writer.write_record(SAVE_HEADER)?;
            writer.write_record(encode(snapshot))?;
            writer.flush()?;
        }
        staged.as_file().sync_all()?;
        staged.persist(&self.path).map_err(|error| error.error)?;

        debug!(
            path = %self.path.display(),
            cash = %snapshot.cash(),
            holdings = snapshot.holdings().len(),
            lookups = snapshot.lookups().len(),
            "saved snapshot"
        );
        Ok(())
    }

    fn corrupt(&self, reason: String) -> StoreError {
        StoreError::CorruptSave {
            path: self.path.clone(),
            reason,
        }
    }
}

fn encode(snapshot: &Snapshot) -> [String; 3] {
    [
        snapshot.cash().normalize().to_string(),
        literal::write_mapping(
            snapshot
                .holdings()
                .iter()
                .map(|(symbol, count)| (symbol.as_str(), *count)),
        ),
        literal::write_sequence(snapshot.lookups().iter().map(String::as_str)),
    ]
}

enum DecodeError {
    Io(io::Error),
    Invalid(String),
}

impl From<csv::Error> for DecodeError {
    fn from(error: csv::Error) -> Self {
        if error.is_io_error() {
            if let csv::ErrorKind::Io(io_error) = error.into_kind() {
                return Self::Io(io_error);
            }
            return Self::Invalid(String::from("unreadable record"));
        }
        Self::Invalid(error.to_string())
    }
}

fn invalid(reason: impl Into<String>) -> DecodeError {
    DecodeError::Invalid(reason.into())
}

fn decode(source: impl Read) -> Result<Snapshot, DecodeError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(source);
    let mut records = reader.records();

    let header = records
        .next()
        .transpose()?
        .ok_or_else(|| invalid("file is empty"))?;
    if !header.iter().eq(SAVE_HEADER.iter().copied()) {
        return Err(invalid(format!(
            "expected header '{}', found '{}'",
            SAVE_HEADER.join(","),
            header.iter().collect::<Vec<_>>().join(",")
        )));
    }

    let row = records
        .next()
        .transpose()?
        .ok_or_else(|| invalid("missing data row"))?;
    if row.len() != SAVE_HEADER.len() {
        return Err(invalid(format!(
            "data row has {} fields, expected {}",
            row.len(),
            SAVE_HEADER.len()
        )));
    }
    if records.next().is_some() {
        return Err(invalid("expected exactly one data row"));
    }

    let cash = decode_cash(&row[0])?;
    let holdings = decode_holdings(&row[1])?;
    let lookups = decode_lookups(&row[2])?;

    Snapshot::new(cash, holdings, lookups).map_err(|error| invalid(error.to_string()))
}

fn decode_cash(field: &str) -> Result<Decimal, DecodeError> {
    let text = field.trim();
    let cash = Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| invalid(format!("TotalDollars '{field}' is not a decimal number")))?;
    if cash < Decimal::ZERO {
        return Err(invalid(format!("TotalDollars '{field}' is negative")));
    }
    Ok(cash)
}

fn decode_holdings(field: &str) -> Result<BTreeMap<Symbol, u64>, DecodeError> {
    if field.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let entries = literal::parse_mapping(field).map_err(|error| literal_error("Stocks", error))?;
    let mut holdings = BTreeMap::new();
    for (key, count) in entries {
        let symbol = Symbol::parse(&key)
            .map_err(|error| invalid(format!("Stocks key '{key}' is not a symbol: {error}")))?;
        if count == 0 {
            return Err(invalid(format!("Stocks entry '{symbol}' has zero shares")));
        }
        if holdings.insert(symbol.clone(), count).is_some() {
            return Err(invalid(format!("Stocks lists '{symbol}' more than once")));
        }
    }
    Ok(holdings)
}

fn decode_lookups(field: &str) -> Result<Vec<String>, DecodeError> {
    if field.trim().is_empty() {
        return Ok(Vec::new());
    }
    literal::parse_sequence(field).map_err(|error| literal_error("Lookups", error))
}

fn literal_error(column: &str, error: LiteralError) -> DecodeError {
    invalid(format!("{column} is not a valid literal: {error}"))
}

fn resolve_papertrade_home() -> PathBuf {
    if let Some(path) = env::var_os("PAPERTRADE_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".papertrade");
    }

    PathBuf::from(".papertrade")
}
