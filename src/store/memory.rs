//! In-memory store backend, used by tests and local development.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::onboarding::model::MarketingProfile;
use crate::onboarding::state::Journey;
use crate::store::traits::ProfileStore;

/// HashMap-backed `ProfileStore`.
#[derive(Default)]
pub struct MemoryStore {
    fields: RwLock<HashMap<String, BTreeMap<String, serde_json::Value>>>,
    journeys: RwLock<HashMap<String, Journey>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw field value, for test assertions.
    pub async fn raw_field(&self, user_id: &str, key: &str) -> Option<serde_json::Value> {
        self.fields
            .read()
            .await
            .get(user_id)
            .and_then(|m| m.get(key).cloned())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<MarketingProfile>, StoreError> {
        let fields = self.fields.read().await;
        let Some(user_fields) = fields.get(user_id) else {
            return Ok(None);
        };
        let map: serde_json::Map<String, serde_json::Value> = user_fields
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let profile = serde_json::from_value(serde_json::Value::Object(map))?;
        Ok(Some(profile))
    }

    async fn save_field(
        &self,
        user_id: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), StoreError> {
        self.fields
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn load_journey(&self, user_id: &str) -> Result<Option<Journey>, StoreError> {
        Ok(self.journeys.read().await.get(user_id).cloned())
    }

    async fn save_journey(&self, journey: &Journey) -> Result<(), StoreError> {
        self.journeys
            .write()
            .await
            .insert(journey.user_id.clone(), journey.clone());
        Ok(())
    }
}
