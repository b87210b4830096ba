use papertrade_core::{SourceError, StoreError, TradeError, TradeRejection, ValidationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("trade rejected: {0}")]
    TradeRejected(TradeRejection),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::TradeRejected(_) => 3,
            Self::Serialization(_) => 4,
            Self::Source(_) => 6,
            Self::Store(error) if error.is_corrupt() => 7,
            Self::Store(_) | Self::Io(_) => 10,
        }
    }
}

impl From<TradeError> for CliError {
    fn from(error: TradeError) -> Self {
        match error {
            TradeError::PriceUnavailable { source, .. } => Self::Source(source),
            TradeError::Rejected(rejection) => Self::TradeRejected(rejection),
        }
    }
}
