//! HTTP client for the Railway-hosted backend.
//!
//! One service exposes chat completion, website analysis, and strategy
//! generation; this client implements all three ports.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisResult, Strategy, StrategyGenerator, WebsiteAnalyzer};
use crate::chat::{ChatReply, ChatService};
use crate::error::{AnalysisError, ChatError};
use crate::onboarding::model::MarketingProfile;
use crate::session::SessionContext;

/// Request body for the chat endpoint.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    client_id: String,
    conversation_id: String,
    language: String,
}

/// reqwest-backed `ChatService`.
pub struct RailwayChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    timeout: Duration,
}

impl RailwayChatClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::RequestFailed {
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        tracing::info!("Using chat service at {base_url}");
        Ok(Self {
            http,
            base_url,
            api_key,
            timeout,
        })
    }
}

#[async_trait]
impl ChatService for RailwayChatClient {
    async fn send(
        &self,
        ctx: &SessionContext,
        message: &str,
    ) -> Result<ChatReply, ChatError> {
        let body = ChatRequest {
            message,
            client_id: ctx.client_id.to_string(),
            conversation_id: ctx.conversation_id.to_string(),
            language: ctx.language.to_string(),
        };

        let mut request = self
            .http
            .post(format!("{}/chat", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ChatError::RequestFailed {
                    reason: "request timed out".to_string(),
                }
            } else {
                ChatError::RequestFailed {
                    reason: e.to_string(),
                }
            }
        })?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ChatError::AuthFailed),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(Duration::from_secs);
                Err(ChatError::RateLimited { retry_after })
            }
            status if !status.is_success() => Err(ChatError::RequestFailed {
                reason: format!("chat service returned {status}"),
            }),
            _ => response
                .json::<ChatReply>()
                .await
                .map_err(|e| ChatError::InvalidResponse {
                    reason: e.to_string(),
                }),
        }
    }
}

/// Wire shape of the analysis endpoint; timestamps and the fallback
/// marker are assigned locally.
#[derive(Debug, Deserialize)]
struct WireAnalysis {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    industry: Option<String>,
    #[serde(default)]
    keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WireStrategy {
    summary: String,
    #[serde(default)]
    recommended_channels: Vec<String>,
    #[serde(default)]
    content_pillars: Vec<String>,
}

impl RailwayChatClient {
    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key.expose_secret()),
            None => request,
        }
    }
}

#[async_trait]
impl WebsiteAnalyzer for RailwayChatClient {
    async fn analyze(&self, url: &str) -> Result<AnalysisResult, AnalysisError> {
        let request = self
            .authorized(self.http.post(format!("{}/website/analyze", self.base_url)))
            .json(&serde_json::json!({ "url": url }));

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AnalysisError::Timeout { timeout: self.timeout }
            } else {
                AnalysisError::WebsiteFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;
        if !response.status().is_success() {
            return Err(AnalysisError::WebsiteFailed {
                url: url.to_string(),
                reason: format!("analysis service returned {}", response.status()),
            });
        }

        let wire: WireAnalysis =
            response
                .json()
                .await
                .map_err(|e| AnalysisError::WebsiteFailed {
                    url: url.to_string(),
                    reason: format!("bad analysis payload: {e}"),
                })?;
        Ok(AnalysisResult {
            url: url.to_string(),
            title: wire.title,
            description: wire.description,
            industry: wire.industry,
            keywords: wire.keywords,
            analyzed_at: Utc::now(),
            fallback: false,
        })
    }
}

#[async_trait]
impl StrategyGenerator for RailwayChatClient {
    async fn generate(&self, profile: &MarketingProfile) -> Result<Strategy, AnalysisError> {
        let request = self
            .authorized(self.http.post(format!("{}/strategy/generate", self.base_url)))
            .json(profile);

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AnalysisError::Timeout { timeout: self.timeout }
            } else {
                AnalysisError::StrategyFailed {
                    reason: e.to_string(),
                }
            }
        })?;
        if !response.status().is_success() {
            return Err(AnalysisError::StrategyFailed {
                reason: format!("strategy service returned {}", response.status()),
            });
        }

        let wire: WireStrategy =
            response
                .json()
                .await
                .map_err(|e| AnalysisError::StrategyFailed {
                    reason: format!("bad strategy payload: {e}"),
                })?;
        Ok(Strategy {
            summary: wire.summary,
            recommended_channels: wire.recommended_channels,
            content_pillars: wire.content_pillars,
            generated_at: Utc::now(),
            fallback: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::Language;

    #[test]
    fn request_body_shape() {
        let ctx = SessionContext::new(Language::En);
        let body = ChatRequest {
            message: "hello",
            client_id: ctx.client_id.to_string(),
            conversation_id: ctx.conversation_id.to_string(),
            language: ctx.language.to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["message"], "hello");
        assert_eq!(json["language"], "en");
        assert_eq!(
            json["conversation_id"],
            ctx.conversation_id.to_string()
        );
    }

    #[test]
    fn trailing_slash_trimmed_from_base_url() {
        let client = RailwayChatClient::new(
            "https://chat.example.com/",
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.base_url, "https://chat.example.com");
    }

    // Mirrors the binary wiring: one client coerced into each of the
    // three port types the assistant takes.
    #[test]
    fn one_client_serves_all_three_ports() {
        use std::sync::Arc;

        use crate::assistant::Assistant;
        use crate::config::AssistantConfig;
        use crate::store::MemoryStore;

        let backend = Arc::new(
            RailwayChatClient::new("http://localhost:8000", None, Duration::from_secs(5))
                .unwrap(),
        );
        let analyzer: Arc<dyn WebsiteAnalyzer> = backend.clone();
        let strategist: Arc<dyn StrategyGenerator> = backend.clone();
        let chat: Arc<dyn ChatService> = backend;

        let assistant = Assistant::new(
            Arc::new(MemoryStore::new()),
            analyzer,
            strategist,
            chat,
            AssistantConfig::default(),
        );
        assert_eq!(assistant.name(), "morvo");
    }
}
