//! Domain error types.
//!
//! Insufficient history inside the numeric kernels is not an error: it is an
//! undefined (`None`) value in the series output, plus an explicit flag on the
//! scores built from it. The variants here cover collaborator and configuration
//! failures that abort a per-symbol pipeline.

/// Top-level error type for marketstage.
#[derive(Debug, thiserror::Error)]
pub enum MarketstageError {
    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("unknown symbol {symbol}")]
    UnknownSymbol { symbol: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&MarketstageError> for std::process::ExitCode {
    fn from(err: &MarketstageError) -> Self {
        let code: u8 = match err {
            MarketstageError::Io(_) => 1,
            MarketstageError::ConfigParse { .. }
            | MarketstageError::ConfigMissing { .. }
            | MarketstageError::ConfigInvalid { .. } => 2,
            MarketstageError::DataSource { .. } => 3,
            MarketstageError::NoData { .. }
            | MarketstageError::InsufficientData { .. }
            | MarketstageError::UnknownSymbol { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
