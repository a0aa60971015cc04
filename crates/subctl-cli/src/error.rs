//! Error types for the CLI

/// CLI Result type
pub type Result<T> = std::result::Result<T, Error>;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Common(#[from] subctl_common::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("unknown verification: {name}")]
    UnknownVerification { name: String },

    #[error("no verification to be performed, try --enable-disruptive")]
    NothingToRun,

    #[error("E2E failed")]
    E2eFailed,

    #[error("command failed: {message}")]
    CommandFailed { message: String },
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    pub fn command_failed(message: impl Into<String>) -> Self {
        Error::CommandFailed {
            message: message.into(),
        }
    }
}

/// Operator-facing text for an error that ends the process
pub fn render_error(err: &Error) -> String {
    format!("Error: {}", err)
}
