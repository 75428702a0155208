//! Marketing profile data collected during onboarding.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Field keys used for per-field persistence.
pub mod field_keys {
    pub const GREETING_PREFERENCE: &str = "greeting_preference";
    pub const WEBSITE_URL: &str = "website_url";
    pub const PRIMARY_GOAL: &str = "primary_goal";
    pub const MARKETING_BUDGET: &str = "marketing_budget";
    pub const ONBOARDING_COMPLETED: &str = "onboarding_completed";
}

/// The accumulated marketing profile for one user.
///
/// Every field is optional: phases fill them in as the conversation
/// progresses, and absent fields are never written to the store (no null
/// overwrite). Unknown keys arriving from the boundary are ignored by
/// serde rather than threaded through as an open map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketingProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting_preference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketing_budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offerings: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_products: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_focus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_descriptions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub team_members: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub social_media: BTreeMap<String, String>,
    #[serde(default)]
    pub onboarding_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_completed_at: Option<DateTime<Utc>>,
}

/// The profile-completion payload from the UI layer.
///
/// Deserialized with serde's default unknown-key behavior, so anything
/// the client sends beyond the recognized fields is dropped at the
/// boundary.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub company_size: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub offerings: Option<String>,
    #[serde(default)]
    pub technical_products: Option<String>,
    #[serde(default)]
    pub business_focus: Option<String>,
    #[serde(default)]
    pub product_descriptions: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub team_members: Option<Vec<String>>,
    #[serde(default)]
    pub social_media: Option<BTreeMap<String, String>>,
}

impl ProfileUpdate {
    /// The present fields as (key, value) pairs, ready for per-field
    /// persistence. Absent fields are omitted entirely.
    pub fn fields(&self) -> Vec<(&'static str, serde_json::Value)> {
        let mut out = Vec::new();
        let mut push_str = |key: &'static str, value: &Option<String>| {
            if let Some(v) = value {
                out.push((key, serde_json::Value::String(v.clone())));
            }
        };
        push_str("company_name", &self.company_name);
        push_str("industry", &self.industry);
        push_str("company_size", &self.company_size);
        push_str("overview", &self.overview);
        push_str("offerings", &self.offerings);
        push_str("technical_products", &self.technical_products);
        push_str("business_focus", &self.business_focus);
        push_str("product_descriptions", &self.product_descriptions);
        push_str("contact_email", &self.contact_email);
        push_str("contact_phone", &self.contact_phone);
        if let Some(members) = &self.team_members {
            out.push((
                "team_members",
                serde_json::to_value(members).unwrap_or_default(),
            ));
        }
        if let Some(social) = &self.social_media {
            out.push((
                "social_media",
                serde_json::to_value(social).unwrap_or_default(),
            ));
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}

impl MarketingProfile {
    /// Merge an update into the profile, touching only present fields.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        macro_rules! merge {
            ($field:ident) => {
                if let Some(v) = &update.$field {
                    self.$field = Some(v.clone());
                }
            };
        }
        merge!(company_name);
        merge!(industry);
        merge!(company_size);
        merge!(overview);
        merge!(offerings);
        merge!(technical_products);
        merge!(business_focus);
        merge!(product_descriptions);
        merge!(contact_email);
        merge!(contact_phone);
        if let Some(members) = &update.team_members {
            self.team_members = members.clone();
        }
        if let Some(social) = &update.social_media {
            self.social_media = social.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_empty() {
        let p = MarketingProfile::default();
        assert!(p.company_name.is_none());
        assert!(p.team_members.is_empty());
        assert!(!p.onboarding_completed);
    }

    #[test]
    fn profile_serde_roundtrip() {
        let profile = MarketingProfile {
            greeting_preference: Some("Mr. Salem".to_string()),
            company_name: Some("Acme".to_string()),
            marketing_budget: Some("5000 SAR".to_string()),
            team_members: vec!["Sara".to_string(), "Omar".to_string()],
            onboarding_completed: true,
            ..Default::default()
        };
        let json = serde_json::to_string(&profile).unwrap();
        let parsed: MarketingProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.company_name.as_deref(), Some("Acme"));
        assert_eq!(parsed.team_members.len(), 2);
        assert!(parsed.onboarding_completed);
    }

    #[test]
    fn absent_fields_not_serialized() {
        let profile = MarketingProfile {
            company_name: Some("Acme".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("industry"));
        assert!(!json.contains("null"));
    }

    #[test]
    fn update_unknown_keys_ignored() {
        let update: ProfileUpdate = serde_json::from_str(
            r#"{"company_name":"Acme","favorite_color":"blue","admin":true}"#,
        )
        .unwrap();
        assert_eq!(update.company_name.as_deref(), Some("Acme"));
        assert_eq!(update.fields().len(), 1);
    }

    #[test]
    fn update_fields_only_present() {
        let update = ProfileUpdate {
            industry: Some("retail".to_string()),
            contact_email: Some("hi@acme.io".to_string()),
            ..Default::default()
        };
        let fields = update.fields();
        assert_eq!(fields.len(), 2);
        let keys: Vec<_> = fields.iter().map(|(k, _)| *k).collect();
        assert!(keys.contains(&"industry"));
        assert!(keys.contains(&"contact_email"));
        assert!(!keys.contains(&"company_name"));
    }

    #[test]
    fn apply_does_not_clear_existing_values() {
        let mut profile = MarketingProfile {
            company_name: Some("Acme".to_string()),
            industry: Some("retail".to_string()),
            ..Default::default()
        };
        let update = ProfileUpdate {
            industry: Some("ecommerce".to_string()),
            ..Default::default()
        };
        profile.apply(&update);
        // Present field updated, absent field untouched
        assert_eq!(profile.industry.as_deref(), Some("ecommerce"));
        assert_eq!(profile.company_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn empty_update() {
        assert!(ProfileUpdate::default().is_empty());
    }
}
