//! Domain error types.

/// Top-level error type for coinfolio.
#[derive(Debug, thiserror::Error)]
pub enum CoinfolioError {
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

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no price data in {source_name}")]
    NoData { source_name: String },

    #[error("intent with name {0} not supported")]
    UnsupportedIntent(String),

    #[error("invalid dialog request: {reason}")]
    InvalidRequest { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoinfolioError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        CoinfolioError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&CoinfolioError> for std::process::ExitCode {
    fn from(err: &CoinfolioError) -> Self {
        let code: u8 = match err {
            CoinfolioError::Io(_) => 1,
            CoinfolioError::ConfigParse { .. }
            | CoinfolioError::ConfigMissing { .. }
            | CoinfolioError::ConfigInvalid { .. } => 2,
            CoinfolioError::Data { .. } => 3,
            CoinfolioError::UnsupportedIntent(_) | CoinfolioError::InvalidRequest { .. } => 4,
            CoinfolioError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
