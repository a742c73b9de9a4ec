use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid profile state: {0}")]
    InvalidState(String),

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Profile already running: {0}")]
    AlreadyRunning(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse stored JSON: {0}")]
    Store(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Archive(String),
}

pub type Result<T> = std::result::Result<T, Error>;
