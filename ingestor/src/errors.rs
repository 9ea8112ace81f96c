use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Storage initialization error: {0}")]
    StorageInit(#[source] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database write error: {0}")]
    Write(#[source] sqlx::Error),

    #[error("Database read error: {0}")]
    Read(#[source] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Underlying cause as reported to HTTP callers in the `details` field.
    pub fn details(&self) -> String {
        match self {
            Error::StorageInit(e) | Error::Write(e) | Error::Read(e) => e.to_string(),
            Error::Validation(msg) | Error::Config(msg) => msg.clone(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
