use std::error::Error;
use std::io;
use thiserror::Error;

/// Boxed error type accepted at the handler boundary.
pub type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum BodyError {
    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl BodyError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[derive(Error, Debug)]
pub enum ShimBuildError {
    #[error("handler must be set")]
    MissingHandler,
}
