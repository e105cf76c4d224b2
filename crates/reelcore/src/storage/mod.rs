//! Persisted settings: per-guild uploader flag and bot-wide hosting credentials

pub mod db;
pub mod settings;

// Re-exports for convenience
pub use db::{create_pool, get_connection, DbConnection, DbPool};
pub use settings::{DeploymentConfig, SettingsStore, SqliteSettings};
