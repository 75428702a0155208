//! The assistant coordinator.
//!
//! Routes every user action either into the onboarding engine (while the
//! user's journey is still running) or to the remote chat service, and
//! passes all outgoing text through the directive parser so embedded
//! tags surface as UI commands.

use std::sync::Arc;

use crate::analysis::{StrategyGenerator, WebsiteAnalyzer};
use crate::chat::{ChatReply, ChatService};
use crate::config::AssistantConfig;
use crate::directive::{self, Command};
use crate::error::Result;
use crate::onboarding::engine::{OnboardingEngine, PhaseAction};
use crate::onboarding::state::OnboardingPhase;
use crate::session::SessionContext;
use crate::store::ProfileStore;

/// One assistant turn, ready for the rendering layer.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AssistantReply {
    /// Display text with all directive tags stripped.
    pub message: String,
    /// UI commands extracted from the raw text, in order of appearance.
    pub commands: Vec<Command>,
    /// Current onboarding phase, while the journey is running.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<OnboardingPhase>,
    pub onboarding_active: bool,
    /// True when a remote call degraded to locally synthesized content.
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_percent: Option<u8>,
}

/// Bundles the engine, the chat service, and the session policy.
pub struct Assistant {
    engine: OnboardingEngine,
    chat: Arc<dyn ChatService>,
    config: AssistantConfig,
}

impl Assistant {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        analyzer: Arc<dyn WebsiteAnalyzer>,
        strategist: Arc<dyn StrategyGenerator>,
        chat: Arc<dyn ChatService>,
        config: AssistantConfig,
    ) -> Self {
        let engine = OnboardingEngine::new(store, analyzer, strategist, config.retry);
        Self {
            engine,
            chat,
            config,
        }
    }

    /// Handle one user action for the session's user.
    ///
    /// While the journey is incomplete, every action goes through the
    /// onboarding engine. Afterwards free text goes to the chat service;
    /// a chat outage degrades to a local fallback reply instead of an
    /// error.
    pub async fn handle(
        &self,
        ctx: &SessionContext,
        action: PhaseAction,
    ) -> Result<AssistantReply> {
        let user_id = ctx.client_id.to_string();
        let mut journey = self.engine.load_or_create_journey(&user_id).await?;

        if !journey.is_complete() {
            let outcome = self.engine.handle(&mut journey, action, ctx.language).await;
            let parsed = directive::parse(&outcome.reply, ctx.language);
            return Ok(AssistantReply {
                message: parsed.message,
                commands: parsed.commands,
                phase: Some(outcome.phase),
                onboarding_active: !journey.is_complete(),
                degraded: outcome.degraded,
                progress_percent: Some(outcome.progress_percent),
            });
        }

        let text = match action {
            PhaseAction::Message(text) => text,
            // Buttons and forms have no meaning outside onboarding.
            PhaseAction::Skip | PhaseAction::CompleteProfile(_) => {
                return Ok(self.plain_reply(ctx, ctx.language.chat_fallback_reply()));
            }
        };

        let chat = Arc::clone(&self.chat);
        let lang = ctx.language;
        let retried = self
            .config
            .retry
            .run_with_fallback(
                "chat completion",
                || {
                    let chat = Arc::clone(&chat);
                    let text = text.clone();
                    let ctx = ctx.clone();
                    async move { chat.send(&ctx, &text).await }
                },
                move || ChatReply {
                    response: lang.chat_fallback_reply().to_string(),
                    tokens_used: 0,
                    conversation_id: None,
                },
            )
            .await;

        let parsed = directive::parse(&retried.value.response, ctx.language);
        Ok(AssistantReply {
            message: parsed.message,
            commands: parsed.commands,
            phase: None,
            onboarding_active: false,
            degraded: retried.degraded,
            progress_percent: None,
        })
    }

    fn plain_reply(&self, ctx: &SessionContext, text: &str) -> AssistantReply {
        let parsed = directive::parse(text, ctx.language);
        AssistantReply {
            message: parsed.message,
            commands: parsed.commands,
            phase: None,
            onboarding_active: false,
            degraded: false,
            progress_percent: None,
        }
    }

    /// Display name for banners and logs.
    pub fn name(&self) -> &str {
        &self.config.name
    }
}
