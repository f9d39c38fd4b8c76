use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShortcutsError>;

#[derive(Debug, Error)]
pub enum ShortcutsError {
    #[error("shortcuts backend is not initialized")]
    NotReady,

    #[error("shortcuts backend initialization already started")]
    AlreadyInitialized,

    #[error("persistence worker is unavailable")]
    WorkerUnavailable,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ShortcutsError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotReady => "NOT_READY",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::WorkerUnavailable => "WORKER_UNAVAILABLE",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Sqlite(_) => "SQLITE_ERROR",
            Self::Url(_) => "URL_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Errors that clear once the backend finishes loading.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::NotReady)
    }
}
