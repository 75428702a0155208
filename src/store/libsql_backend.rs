//! libSQL backend — async `ProfileStore` implementation.
//!
//! Supports local file and in-memory databases. `libsql::Connection` is
//! `Send + Sync` and safe for concurrent async use.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::info;

use crate::error::StoreError;
use crate::onboarding::model::MarketingProfile;
use crate::onboarding::state::Journey;
use crate::store::migrations;
use crate::store::traits::ProfileStore;

/// libSQL store backend.
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Connection(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to open database: {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        info!(path = %path.display(), "Database opened");
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                StoreError::Connection(format!("Failed to create in-memory database: {e}"))
            })?;
        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }
}

#[async_trait]
impl ProfileStore for LibSqlStore {
    async fn get_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<MarketingProfile>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT key, value FROM profile_fields WHERE user_id = ?1",
                params![user_id],
            )
            .await
            .map_err(|e| StoreError::Query(format!("Failed to read profile fields: {e}")))?;

        let mut map = serde_json::Map::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::Query(format!("Failed to read row: {e}")))?
        {
            let key: String = row
                .get(0)
                .map_err(|e| StoreError::Query(format!("Bad key column: {e}")))?;
            let raw: String = row
                .get(1)
                .map_err(|e| StoreError::Query(format!("Bad value column: {e}")))?;
            let value: serde_json::Value = serde_json::from_str(&raw)?;
            map.insert(key, value);
        }

        if map.is_empty() {
            return Ok(None);
        }
        let profile = serde_json::from_value(serde_json::Value::Object(map))?;
        Ok(Some(profile))
    }

    async fn save_field(
        &self,
        user_id: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.conn
            .execute(
                "INSERT INTO profile_fields (user_id, key, value, updated_at)
                 VALUES (?1, ?2, ?3, datetime('now'))
                 ON CONFLICT (user_id, key)
                 DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![user_id, key, raw],
            )
            .await
            .map_err(|e| StoreError::Query(format!("Failed to save field {key}: {e}")))?;
        Ok(())
    }

    async fn load_journey(&self, user_id: &str) -> Result<Option<Journey>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT journey FROM journeys WHERE user_id = ?1",
                params![user_id],
            )
            .await
            .map_err(|e| StoreError::Query(format!("Failed to read journey: {e}")))?;

        let row = rows
            .next()
            .await
            .map_err(|e| StoreError::Query(format!("Failed to read journey row: {e}")))?;
        match row {
            Some(row) => {
                let raw: String = row
                    .get(0)
                    .map_err(|e| StoreError::Query(format!("Bad journey column: {e}")))?;
                Ok(Some(serde_json::from_str(&raw)?))
            }
            None => Ok(None),
        }
    }

    async fn save_journey(&self, journey: &Journey) -> Result<(), StoreError> {
        let raw = serde_json::to_string(journey)?;
        self.conn
            .execute(
                "INSERT INTO journeys (user_id, journey, updated_at)
                 VALUES (?1, ?2, datetime('now'))
                 ON CONFLICT (user_id)
                 DO UPDATE SET journey = excluded.journey, updated_at = excluded.updated_at",
                params![journey.user_id.as_str(), raw],
            )
            .await
            .map_err(|e| StoreError::Query(format!("Failed to save journey: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::state::OnboardingPhase;

    #[tokio::test]
    async fn field_save_assemble_and_overwrite() {
        let store = LibSqlStore::new_memory().await.unwrap();
        store
            .save_field("u1", "company_name", &serde_json::json!("Acme"))
            .await
            .unwrap();
        store
            .save_field("u1", "marketing_budget", &serde_json::json!("5000 SAR"))
            .await
            .unwrap();

        let profile = store.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(profile.company_name.as_deref(), Some("Acme"));
        assert_eq!(profile.marketing_budget.as_deref(), Some("5000 SAR"));

        store
            .save_field("u1", "company_name", &serde_json::json!("Acme Ltd"))
            .await
            .unwrap();
        let profile = store.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(profile.company_name.as_deref(), Some("Acme Ltd"));
    }

    #[tokio::test]
    async fn profile_none_for_unknown_user() {
        let store = LibSqlStore::new_memory().await.unwrap();
        assert!(store.get_profile("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn journey_upsert_roundtrip() {
        let store = LibSqlStore::new_memory().await.unwrap();
        let mut journey = Journey::new("u2");
        store.save_journey(&journey).await.unwrap();

        journey.advance_to(OnboardingPhase::WebsiteAnalysis);
        store.save_journey(&journey).await.unwrap();

        let loaded = store.load_journey("u2").await.unwrap().unwrap();
        assert_eq!(loaded.id, journey.id);
        assert_eq!(loaded.phase, OnboardingPhase::WebsiteAnalysis);
        assert_eq!(loaded.completed_phases, vec![OnboardingPhase::Welcome]);
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let store = LibSqlStore::new_memory().await.unwrap();
        migrations::run_migrations(&store.conn).await.unwrap();
        migrations::run_migrations(&store.conn).await.unwrap();
    }
}
