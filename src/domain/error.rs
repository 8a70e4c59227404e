//! Domain error types.

/// Top-level error type for stockledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("storage error: {reason}")]
    Storage { reason: String },

    #[error("storage query error: {reason}")]
    StorageQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("unknown instrument {id}")]
    UnknownInstrument { id: String },

    #[error("not enough available supply of {symbol}: have {available}, need {requested}")]
    InsufficientSupply {
        symbol: String,
        available: u64,
        requested: u64,
    },

    #[error("not enough {symbol} to sell: hold {held}, need {requested}")]
    InsufficientHoldings {
        symbol: String,
        held: u64,
        requested: u64,
    },

    #[error("wallet {wallet} holds no position in {id}")]
    NoPosition { wallet: String, id: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LedgerError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors that reject a trade without touching stored state.
    pub fn is_trade_rejection(&self) -> bool {
        matches!(
            self,
            LedgerError::UnknownInstrument { .. }
                | LedgerError::InsufficientSupply { .. }
                | LedgerError::InsufficientHoldings { .. }
                | LedgerError::NoPosition { .. }
        )
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Storage {
            reason: format!("serialization failed: {err}"),
        }
    }
}

impl From<&LedgerError> for std::process::ExitCode {
    fn from(err: &LedgerError) -> Self {
        let code: u8 = match err {
            LedgerError::Io(_) => 1,
            LedgerError::ConfigParse { .. }
            | LedgerError::ConfigInvalid { .. } => 2,
            LedgerError::Storage { .. } | LedgerError::StorageQuery { .. } => 3,
            LedgerError::InvalidInput { .. } => 4,
            LedgerError::UnknownInstrument { .. }
            | LedgerError::InsufficientSupply { .. }
            | LedgerError::InsufficientHoldings { .. }
            | LedgerError::NoPosition { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
