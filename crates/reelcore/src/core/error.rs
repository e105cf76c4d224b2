use thiserror::Error;

/// Centralized error types for the library
///
/// Settings storage and reply sinks report through this enum. Fetch and
/// conversion keep their own error types (`DownloadError`, `ConversionError`),
/// and upload and poll failures are not errors at all: they are reported as
/// `UploadResult::Failure` and `ProcessingStatus` variants.
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Anyhow errors (transport failures from reply sinks)
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
