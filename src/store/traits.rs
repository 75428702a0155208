//! The `ProfileStore` trait — single async interface for all persistence.
//!
//! The engine treats the store as an injected black box: saves may fail,
//! and a failed save must leave the journey exactly where it was.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::onboarding::model::MarketingProfile;
use crate::onboarding::state::Journey;

/// Backend-agnostic store for profile fields and journeys.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Assemble the profile for a user from its saved fields.
    /// Returns `None` when nothing has been saved yet.
    async fn get_profile(&self, user_id: &str)
    -> Result<Option<MarketingProfile>, StoreError>;

    /// Persist one profile field. Overwrites any previous value for the
    /// same key; never called with absent fields (no null overwrite).
    async fn save_field(
        &self,
        user_id: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), StoreError>;

    /// Load the persisted journey for a user, if any.
    async fn load_journey(&self, user_id: &str) -> Result<Option<Journey>, StoreError>;

    /// Persist the full journey record.
    async fn save_journey(&self, journey: &Journey) -> Result<(), StoreError>;
}
