//! Website analysis and strategy generation ports.
//!
//! Both are remote black boxes to the engine; they may fail, and the
//! engine degrades to locally synthesized placeholder data after the
//! retry policy is exhausted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::onboarding::model::MarketingProfile;

/// Result of analyzing a company website.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub url: String,
    pub title: String,
    pub description: String,
    pub industry: Option<String>,
    pub keywords: Vec<String>,
    pub analyzed_at: DateTime<Utc>,
    /// True when this result was synthesized locally after the remote
    /// service kept failing.
    pub fallback: bool,
}

/// A generated marketing strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    pub summary: String,
    pub recommended_channels: Vec<String>,
    pub content_pillars: Vec<String>,
    pub generated_at: DateTime<Utc>,
    pub fallback: bool,
}

/// Remote website-analysis service.
#[async_trait]
pub trait WebsiteAnalyzer: Send + Sync {
    async fn analyze(&self, url: &str) -> Result<AnalysisResult, AnalysisError>;
}

/// Remote strategy-generation service.
#[async_trait]
pub trait StrategyGenerator: Send + Sync {
    async fn generate(&self, profile: &MarketingProfile) -> Result<Strategy, AnalysisError>;
}

/// Synthesize a placeholder analysis when the remote service is down.
pub fn fallback_analysis(url: &str) -> AnalysisResult {
    let domain = url
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.")
        .split('/')
        .next()
        .unwrap_or(url)
        .to_string();
    AnalysisResult {
        url: url.to_string(),
        title: domain.clone(),
        description: format!("Business website at {domain}"),
        industry: None,
        keywords: Vec::new(),
        analyzed_at: Utc::now(),
        fallback: true,
    }
}

/// Synthesize a placeholder strategy from whatever profile fields exist.
pub fn fallback_strategy(profile: &MarketingProfile) -> Strategy {
    let subject = profile
        .company_name
        .clone()
        .unwrap_or_else(|| "your business".to_string());
    Strategy {
        summary: format!(
            "A starter plan for {subject}: build consistent social presence, \
             publish weekly content, and run one focused campaign per month."
        ),
        recommended_channels: vec![
            "instagram".to_string(),
            "linkedin".to_string(),
            "email".to_string(),
        ],
        content_pillars: vec![
            "brand story".to_string(),
            "product education".to_string(),
            "customer proof".to_string(),
        ],
        generated_at: Utc::now(),
        fallback: true,
    }
}
