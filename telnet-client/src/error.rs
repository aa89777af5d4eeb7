use std::io;

use thiserror::Error;

/// An error produced by this crate.
///
/// Wraps an [`ErrorKind`] the way a caller is expected to match on: by kind,
/// not by string.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    pub(crate) kind: ErrorKind,
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self { kind }
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("name resolution failed for {host:?}: {source}")]
    NameResolution { host: String, source: io::Error },

    #[error("connection error: {0}")]
    Connection(#[from] io::Error),

    #[error("connection timed out after no data was received for {0:?}")]
    ConnectionTimeout(std::time::Duration),

    #[error("login failed: {source}")]
    Login {
        #[source]
        source: Box<Error>,
    },

    #[error("internal error (unreachable state): {0}")]
    Unimplemented(&'static str),

    #[error("unlikely error: {0}")]
    Unlikely(String),

    #[error("invalid prompt regular expression: {0}")]
    Regex(#[from] regex::Error),
}

impl ErrorKind {
    pub(crate) fn login(source: Error) -> Self {
        ErrorKind::Login {
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
