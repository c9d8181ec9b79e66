use thiserror::Error;

/// Top-level error type used across the entire application.
#[derive(Debug, Error)]
pub enum BarError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("module error: {0}")]
    Module(#[from] ModuleError),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Failures while reading or interpreting configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read '{path}': {reason}")]
    Io { path: String, reason: String },

    #[error("TOML parse error: {0}")]
    Parse(String),

    #[error("missing key '{key}' in section [{section}]")]
    MissingKey { section: String, key: String },

    #[error("invalid value for '{key}' in section [{section}]: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        reason: String,
    },
}

/// Errors tied to a single module.
///
/// `UndefinedFormat` and `UndefinedFormatTag` are the two specialised kinds;
/// everything else a widget can fail with is carried by `Failed`.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("undefined format \"{0}\"")]
    UndefinedFormat(String),

    #[error("<{tag}> is not a valid format tag for \"{format}\"")]
    UndefinedFormatTag { tag: String, format: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Failed(String),

    #[error("panicked: {0}")]
    Panicked(String),
}

impl ModuleError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

pub type Result<T, E = BarError> = std::result::Result<T, E>;
