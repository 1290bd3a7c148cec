//! Error types for presence

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("config error: {0}")]
    ConfigError(String),

    #[error("trace error at line {line}: {message}")]
    TraceError { line: usize, message: String },

    #[error("channel closed: {0}")]
    ChannelClosed(String),

    #[error("task failed: {0}")]
    TaskError(String),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("toml error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    pub fn trace(line: usize, message: impl Into<String>) -> Self {
        Self::TraceError {
            line,
            message: message.into(),
        }
    }

    pub fn channel_closed(what: impl Into<String>) -> Self {
        Self::ChannelClosed(what.into())
    }
}
