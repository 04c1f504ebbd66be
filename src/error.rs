//! Error types for rule loading and log conversion

use std::path::PathBuf;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Problems with the rule table
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Rule table file does not exist
    #[error("rule table not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Rule table exists but could not be opened
    #[error("failed to open rule table {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rule table is not valid delimited text
    #[error("failed to read rule table")]
    Parse(#[from] csv::Error),

    /// Header row lacks one or more required columns
    #[error("rule table header must include title, match, src, dst (missing: {})", missing.join(", "))]
    MissingColumns { missing: Vec<&'static str> },

    /// `match` cell is not a valid regular expression
    #[error("invalid regex in match: {pattern}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Delimiter must be a single ASCII character
    #[error("invalid rule table delimiter: {0:?}")]
    InvalidDelimiter(char),
}

/// Top-level error for a conversion run
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Wrong command-line usage
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Log file does not exist
    #[error("log file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Log file exists but could not be read
    #[error("failed to read log file {}", path.display())]
    LogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Process exit status for this error (1 = usage, 2 = data)
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Usage(_) => 1,
            Error::Config(_) | Error::NotFound(_) | Error::LogRead { .. } => 2,
        }
    }
}
