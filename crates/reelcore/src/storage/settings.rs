//! Per-guild uploader flag and bot-wide Streamable credentials.
//!
//! Nothing here is cached: the workflow reads the flag on every message and the
//! credentials before every upload, so admin changes apply immediately.

use super::db::{get_connection, DbPool};
use crate::core::error::AppResult;
use crate::hosting::HostingCredentials;
use async_trait::async_trait;
use rusqlite::OptionalExtension;
use secrecy::{ExposeSecret, SecretString};

/// Settings of one deployment (guild) as seen by the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeploymentConfig {
    pub guild_id: u64,
    pub uploader_enabled: bool,
}

/// Storage seam for settings; the admin commands are the only writers.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Current settings for a guild. Unknown guilds have the uploader disabled.
    async fn deployment(&self, guild_id: u64) -> AppResult<DeploymentConfig>;

    /// Flips the uploader flag and returns the new value.
    async fn toggle_uploader(&self, guild_id: u64) -> AppResult<bool>;

    async fn hosting_credentials(&self) -> AppResult<Option<HostingCredentials>>;

    async fn set_hosting_credentials(&self, email: &str, password: &SecretString) -> AppResult<()>;
}

/// SQLite-backed settings store.
#[derive(Clone)]
pub struct SqliteSettings {
    pool: DbPool,
}

impl SqliteSettings {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for SqliteSettings {
    async fn deployment(&self, guild_id: u64) -> AppResult<DeploymentConfig> {
        let conn = get_connection(&self.pool)?;
        let enabled: Option<bool> = conn
            .query_row(
                "SELECT uploader_enabled FROM guild_settings WHERE guild_id = ?1",
                [guild_id as i64],
                |row| row.get(0),
            )
            .optional()?;

        Ok(DeploymentConfig {
            guild_id,
            uploader_enabled: enabled.unwrap_or(false),
        })
    }

    async fn toggle_uploader(&self, guild_id: u64) -> AppResult<bool> {
        let conn = get_connection(&self.pool)?;
        // Single statement so two concurrent toggles cannot read the same old value
        let enabled: bool = conn.query_row(
            "INSERT INTO guild_settings (guild_id, uploader_enabled) VALUES (?1, 1)
             ON CONFLICT(guild_id) DO UPDATE SET
                uploader_enabled = NOT uploader_enabled,
                updated_at = CURRENT_TIMESTAMP
             RETURNING uploader_enabled",
            [guild_id as i64],
            |row| row.get(0),
        )?;

        log::info!(
            "Video uploader {} for guild {}",
            if enabled { "enabled" } else { "disabled" },
            guild_id
        );
        Ok(enabled)
    }

    async fn hosting_credentials(&self) -> AppResult<Option<HostingCredentials>> {
        let conn = get_connection(&self.pool)?;
        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT email, password FROM hosting_credentials WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        Ok(row.map(|(email, password)| HostingCredentials::new(email, password)))
    }

    async fn set_hosting_credentials(&self, email: &str, password: &SecretString) -> AppResult<()> {
        let conn = get_connection(&self.pool)?;
        conn.execute(
            "INSERT INTO hosting_credentials (id, email, password) VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET
                email = excluded.email,
                password = excluded.password,
                updated_at = CURRENT_TIMESTAMP",
            rusqlite::params![email, password.expose_secret()],
        )?;

        log::info!("Streamable credentials updated for {}", email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::create_pool;

    fn store() -> (tempfile::TempDir, SqliteSettings) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.sqlite");
        let pool = create_pool(path.to_str().unwrap()).unwrap();
        (dir, SqliteSettings::new(pool))
    }

    #[tokio::test]
    async fn test_unknown_guild_is_disabled() {
        let (_dir, store) = store();
        let config = store.deployment(42).await.unwrap();

        assert_eq!(
            config,
            DeploymentConfig {
                guild_id: 42,
                uploader_enabled: false
            }
        );
    }

    #[tokio::test]
    async fn test_toggle_flips_per_guild() {
        let (_dir, store) = store();

        assert!(store.toggle_uploader(1).await.unwrap());
        assert!(store.deployment(1).await.unwrap().uploader_enabled);
        assert!(!store.deployment(2).await.unwrap().uploader_enabled);

        assert!(!store.toggle_uploader(1).await.unwrap());
        assert!(!store.deployment(1).await.unwrap().uploader_enabled);
    }

    #[tokio::test]
    async fn test_credentials_round_trip_and_overwrite() {
        let (_dir, store) = store();
        assert!(store.hosting_credentials().await.unwrap().is_none());

        store
            .set_hosting_credentials("a@example.com", &SecretString::from("one".to_string()))
            .await
            .unwrap();
        store
            .set_hosting_credentials("b@example.com", &SecretString::from("two".to_string()))
            .await
            .unwrap();

        let creds = store.hosting_credentials().await.unwrap().unwrap();
        assert_eq!(creds.email, "b@example.com");
        assert_eq!(creds.password().expose_secret(), "two");
    }
}
