//! # SQLite Key-Value Storage
//!
//! Durable per-device storage. Every persisted slice is a JSON document stored
//! under a string key (`<slice>_<patientId>`, or an unscoped key such as `theme`).
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Implement StorageBackend, add updated_at column
//! - 1.0.0: Initial release

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use sqlite::{Connection, State};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::features::store::StorageBackend;

#[derive(Clone)]
pub struct Database {
    connection: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file and run migrations
    pub async fn new(database_path: &str) -> Result<Self> {
        let connection = sqlite::open(database_path)?;
        let database = Database {
            connection: Arc::new(Mutex::new(connection)),
        };
        database.init_tables().await?;
        info!("Database ready at {database_path}");
        Ok(database)
    }

    /// In-memory database, discarded when the last clone is dropped
    pub async fn in_memory() -> Result<Self> {
        Self::new(":memory:").await
    }

    async fn init_tables(&self) -> Result<()> {
        let conn = self.connection.lock().await;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
        )?;
        Ok(())
    }

    pub async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let conn = self.connection.lock().await;
        let mut statement = conn.prepare("SELECT value FROM kv_store WHERE key = ?")?;
        statement.bind((1, key))?;

        if let State::Row = statement.next()? {
            Ok(Some(statement.read::<String, _>(0)?))
        } else {
            Ok(None)
        }
    }

    pub async fn set_value(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.connection.lock().await;
        let mut statement = conn.prepare(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
        )?;
        statement.bind((1, key))?;
        statement.bind((2, value))?;
        while statement.next()? != State::Done {}
        debug!("Stored {} bytes under {key}", value.len());
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for Database {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.get_value(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_value(key, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let db = Database::in_memory().await.unwrap();
        assert_eq!(db.get_value("medicines_MEDIMATE-A").await.unwrap(), None);

        db.set_value("medicines_MEDIMATE-A", "[]").await.unwrap();
        assert_eq!(
            db.get_value("medicines_MEDIMATE-A").await.unwrap().as_deref(),
            Some("[]")
        );
    }

    #[tokio::test]
    async fn test_upsert_overwrites() {
        let db = Database::in_memory().await.unwrap();
        db.set_value("theme", "\"light\"").await.unwrap();
        db.set_value("theme", "\"dark\"").await.unwrap();
        assert_eq!(db.get_value("theme").await.unwrap().as_deref(), Some("\"dark\""));
    }

    #[tokio::test]
    async fn test_values_with_quotes_survive() {
        let db = Database::in_memory().await.unwrap();
        let value = r#"[{"text":"She said \"hi\" -- it's fine"}]"#;
        db.set_value("messages_X", value).await.unwrap();
        assert_eq!(db.get_value("messages_X").await.unwrap().as_deref(), Some(value));
    }
}
