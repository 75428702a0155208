//! The onboarding phase engine.
//!
//! Given the current journey and one user action, decide the next phase,
//! run the phase's persistence side effect, and produce the assistant's
//! next prompt. Transitions are persistence-gated: a failed save leaves
//! the phase untouched and asks the user to retry, so re-invoking a
//! handler with the same input is always safe.

use std::sync::Arc;

use chrono::Utc;

use crate::analysis::{
    AnalysisResult, Strategy, StrategyGenerator, WebsiteAnalyzer, fallback_analysis,
    fallback_strategy,
};
use crate::lang::Language;
use crate::onboarding::model::{ProfileUpdate, field_keys};
use crate::onboarding::prompts;
use crate::onboarding::state::{Journey, OnboardingPhase};
use crate::retry::RetryPolicy;
use crate::store::ProfileStore;

/// One user action against the current phase.
#[derive(Debug, Clone)]
pub enum PhaseAction {
    /// Free text typed by the user.
    Message(String),
    /// The skip affordance (only honored on phases that declare a skip
    /// path).
    Skip,
    /// The profile-completion form was submitted.
    CompleteProfile(ProfileUpdate),
}

/// What the engine decided for one action.
#[derive(Debug, Clone)]
pub struct PhaseOutcome {
    /// The assistant's next message (may contain directive tags).
    pub reply: String,
    /// Phase after handling the action.
    pub phase: OnboardingPhase,
    /// Whether a phase transition committed.
    pub transitioned: bool,
    /// Website analysis produced during this action, if any.
    pub analysis: Option<AnalysisResult>,
    /// Strategy produced during this action, if any.
    pub strategy: Option<Strategy>,
    /// True when a remote call degraded to locally synthesized data.
    pub degraded: bool,
    /// Phase-flow progress after handling.
    pub progress_percent: u8,
}

impl PhaseOutcome {
    fn stay(reply: impl Into<String>, journey: &Journey) -> Self {
        Self {
            reply: reply.into(),
            phase: journey.phase,
            transitioned: false,
            analysis: None,
            strategy: None,
            degraded: false,
            progress_percent: journey.progress_percent(),
        }
    }

    fn advanced(reply: impl Into<String>, journey: &Journey) -> Self {
        Self {
            reply: reply.into(),
            phase: journey.phase,
            transitioned: true,
            analysis: None,
            strategy: None,
            degraded: false,
            progress_percent: journey.progress_percent(),
        }
    }
}

/// Coordinates phase transitions, persistence, and the analysis/strategy
/// side effects.
pub struct OnboardingEngine {
    store: Arc<dyn ProfileStore>,
    analyzer: Arc<dyn WebsiteAnalyzer>,
    strategist: Arc<dyn StrategyGenerator>,
    retry: RetryPolicy,
}

impl OnboardingEngine {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        analyzer: Arc<dyn WebsiteAnalyzer>,
        strategist: Arc<dyn StrategyGenerator>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            analyzer,
            strategist,
            retry,
        }
    }

    /// Load the journey for a user, creating and persisting a fresh one
    /// when none exists.
    pub async fn load_or_create_journey(
        &self,
        user_id: &str,
    ) -> Result<Journey, crate::error::StoreError> {
        if let Some(journey) = self.store.load_journey(user_id).await? {
            return Ok(journey);
        }
        let journey = Journey::new(user_id);
        self.store.save_journey(&journey).await?;
        Ok(journey)
    }

    /// Handle one user action. Never fails: every error path degrades to
    /// a retry prompt or fallback content.
    pub async fn handle(
        &self,
        journey: &mut Journey,
        action: PhaseAction,
        lang: Language,
    ) -> PhaseOutcome {
        if journey.is_complete() {
            return PhaseOutcome::stay(
                prompts::phase_prompt(OnboardingPhase::Completed, lang),
                journey,
            );
        }

        match (journey.phase, action) {
            (
                OnboardingPhase::Welcome | OnboardingPhase::GreetingPreference,
                PhaseAction::Message(text),
            ) => self.handle_greeting(journey, &text, lang).await,

            (OnboardingPhase::WebsiteAnalysis, PhaseAction::Message(text)) => {
                self.handle_website(journey, &text, lang).await
            }

            (OnboardingPhase::AnalysisReview, PhaseAction::Message(text)) => {
                self.handle_answer(
                    journey,
                    &text,
                    field_keys::PRIMARY_GOAL,
                    OnboardingPhase::ProfessionalAnalysis,
                    lang,
                )
                .await
            }

            (OnboardingPhase::ProfileCompletion, PhaseAction::CompleteProfile(update)) => {
                self.handle_profile_completion(journey, &update, lang).await
            }

            (OnboardingPhase::ProfessionalAnalysis, PhaseAction::Message(text)) => {
                self.handle_answer(
                    journey,
                    &text,
                    field_keys::MARKETING_BUDGET,
                    OnboardingPhase::StrategyGeneration,
                    lang,
                )
                .await
            }

            (OnboardingPhase::StrategyGeneration, PhaseAction::Message(text)) => {
                self.handle_strategy(journey, &text, lang).await
            }

            (OnboardingPhase::CommitmentActivation, PhaseAction::Message(text)) => {
                self.handle_commitment(journey, &text, lang).await
            }

            (phase, PhaseAction::Skip) => {
                match phase.skip_target() {
                    Some(target) => {
                        self.commit_transition(journey, target).await;
                        PhaseOutcome::advanced(prompts::phase_prompt(target, lang), journey)
                    }
                    // Skip without a declared path is a no-op.
                    None => PhaseOutcome::stay(prompts::phase_prompt(phase, lang), journey),
                }
            }

            // A free-text message in the form phase, or a form payload in
            // a text phase: re-surface the current phase's prompt.
            (phase, _) => PhaseOutcome::stay(prompts::phase_prompt(phase, lang), journey),
        }
    }

    async fn handle_greeting(
        &self,
        journey: &mut Journey,
        text: &str,
        lang: Language,
    ) -> PhaseOutcome {
        let text = text.trim();
        if text.is_empty() {
            return PhaseOutcome::stay(prompts::phase_prompt(journey.phase, lang), journey);
        }
        if !self
            .save_field(journey, field_keys::GREETING_PREFERENCE, text)
            .await
        {
            return PhaseOutcome::stay(lang.retry_save_prompt(), journey);
        }
        journey.profile.greeting_preference = Some(text.to_string());
        self.commit_transition(journey, OnboardingPhase::WebsiteAnalysis).await;
        PhaseOutcome::advanced(
            prompts::phase_prompt(OnboardingPhase::WebsiteAnalysis, lang),
            journey,
        )
    }

    async fn handle_website(
        &self,
        journey: &mut Journey,
        text: &str,
        lang: Language,
    ) -> PhaseOutcome {
        let Some(url) = extract_url(text) else {
            return PhaseOutcome::stay(prompts::need_url_prompt(lang), journey);
        };

        if !self
            .save_field(journey, field_keys::WEBSITE_URL, &url)
            .await
        {
            return PhaseOutcome::stay(lang.retry_save_prompt(), journey);
        }
        journey.profile.website_url = Some(url.clone());

        let analyzer = Arc::clone(&self.analyzer);
        let retried = self
            .retry
            .run_with_fallback(
                "website analysis",
                || {
                    let analyzer = Arc::clone(&analyzer);
                    let url = url.clone();
                    async move { analyzer.analyze(&url).await }
                },
                || fallback_analysis(&url),
            )
            .await;

        self.commit_transition(journey, OnboardingPhase::AnalysisReview).await;

        let mut reply = prompts::analysis_review_prompt(&retried.value, lang);
        if retried.degraded {
            reply.push_str("\n\n");
            reply.push_str(lang.degraded_notice());
        }
        let mut outcome = PhaseOutcome::advanced(reply, journey);
        outcome.degraded = retried.degraded;
        outcome.analysis = Some(retried.value);
        outcome
    }

    /// Shared handler for the single-answer phases (primary goal,
    /// marketing budget): persist the answer under `key` and advance.
    async fn handle_answer(
        &self,
        journey: &mut Journey,
        text: &str,
        key: &str,
        next: OnboardingPhase,
        lang: Language,
    ) -> PhaseOutcome {
        let text = text.trim();
        if text.is_empty() {
            return PhaseOutcome::stay(prompts::phase_prompt(journey.phase, lang), journey);
        }
        if !self.save_field(journey, key, text).await {
            return PhaseOutcome::stay(lang.retry_save_prompt(), journey);
        }
        match key {
            field_keys::PRIMARY_GOAL => journey.profile.primary_goal = Some(text.to_string()),
            field_keys::MARKETING_BUDGET => {
                journey.profile.marketing_budget = Some(text.to_string())
            }
            _ => {}
        }
        self.commit_transition(journey, next).await;
        PhaseOutcome::advanced(prompts::phase_prompt(next, lang), journey)
    }

    async fn handle_profile_completion(
        &self,
        journey: &mut Journey,
        update: &ProfileUpdate,
        lang: Language,
    ) -> PhaseOutcome {
        // Only present fields are written; an absent field never
        // overwrites a stored value.
        for (key, value) in update.fields() {
            if let Err(e) = self.store.save_field(&journey.user_id, key, &value).await {
                tracing::warn!("Failed to save profile field {key}: {e}");
                return PhaseOutcome::stay(lang.retry_save_prompt(), journey);
            }
        }
        journey.profile.apply(update);
        self.commit_transition(journey, OnboardingPhase::ProfessionalAnalysis).await;
        PhaseOutcome::advanced(
            prompts::phase_prompt(OnboardingPhase::ProfessionalAnalysis, lang),
            journey,
        )
    }

    async fn handle_strategy(
        &self,
        journey: &mut Journey,
        text: &str,
        lang: Language,
    ) -> PhaseOutcome {
        if !is_affirmative(text) {
            return PhaseOutcome::stay(
                prompts::phase_prompt(OnboardingPhase::StrategyGeneration, lang),
                journey,
            );
        }

        let strategist = Arc::clone(&self.strategist);
        let profile = journey.profile.clone();
        let retried = self
            .retry
            .run_with_fallback(
                "strategy generation",
                || {
                    let strategist = Arc::clone(&strategist);
                    let profile = profile.clone();
                    async move { strategist.generate(&profile).await }
                },
                || fallback_strategy(&profile),
            )
            .await;

        self.commit_transition(journey, OnboardingPhase::CommitmentActivation).await;

        let mut reply = prompts::commitment_prompt(&retried.value, lang);
        if retried.degraded {
            reply.push_str("\n\n");
            reply.push_str(lang.degraded_notice());
        }
        let mut outcome = PhaseOutcome::advanced(reply, journey);
        outcome.degraded = retried.degraded;
        outcome.strategy = Some(retried.value);
        outcome
    }

    async fn handle_commitment(
        &self,
        journey: &mut Journey,
        text: &str,
        lang: Language,
    ) -> PhaseOutcome {
        if text.trim().is_empty() {
            return PhaseOutcome::stay(
                prompts::phase_prompt(OnboardingPhase::CommitmentActivation, lang),
                journey,
            );
        }
        if let Err(e) = self
            .store
            .save_field(
                &journey.user_id,
                field_keys::ONBOARDING_COMPLETED,
                &serde_json::Value::Bool(true),
            )
            .await
        {
            tracing::warn!("Failed to persist onboarding completion: {e}");
            return PhaseOutcome::stay(lang.retry_save_prompt(), journey);
        }
        journey.profile.onboarding_completed = true;
        journey.profile.onboarding_completed_at = Some(Utc::now());
        self.commit_transition(journey, OnboardingPhase::Completed).await;
        PhaseOutcome::advanced(
            prompts::phase_prompt(OnboardingPhase::Completed, lang),
            journey,
        )
    }

    /// Persist one string field; returns false (and logs) on failure so
    /// the caller can hold the phase.
    async fn save_field(&self, journey: &Journey, key: &str, value: &str) -> bool {
        let value = serde_json::Value::String(value.to_string());
        match self.store.save_field(&journey.user_id, key, &value).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to save field {key}: {e}");
                false
            }
        }
    }

    /// Advance the journey and persist it. A failed journey save is
    /// logged but does not roll back: the field side effect already
    /// committed, and the next successful save re-persists the journey.
    async fn commit_transition(&self, journey: &mut Journey, target: OnboardingPhase) {
        journey.advance_to(target);
        if let Err(e) = self.store.save_journey(journey).await {
            tracing::warn!("Failed to persist journey {}: {e}", journey.id);
        }
    }
}

/// Extract the first URL-like token from a message.
///
/// Accepts `http(s)://...`, `www....`, or a bare `token.tld` shape; when
/// no scheme is present, `https://` is prepended.
pub fn extract_url(text: &str) -> Option<String> {
    for token in text.split_whitespace() {
        let token = token.trim_matches(|c: char| {
            matches!(c, '.' | ',' | '!' | '?' | ';' | '(' | ')' | '"' | '\'')
        });
        if token.is_empty() {
            continue;
        }
        if token.starts_with("http://") || token.starts_with("https://") {
            return Some(token.to_string());
        }
        if token.starts_with("www.") {
            return Some(format!("https://{token}"));
        }
        if looks_like_domain(token) {
            return Some(format!("https://{token}"));
        }
    }
    None
}

/// Bare-domain shape: at least one dot, non-empty labels, an alphabetic
/// TLD of two or more characters, and no mail-address `@`.
fn looks_like_domain(token: &str) -> bool {
    if token.contains('@') || !token.contains('.') {
        return false;
    }
    let host = token.split('/').next().unwrap_or(token);
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return false;
    }
    let tld = labels[labels.len() - 1];
    tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

/// Affirmative detection for the strategy phase, with Arabic synonyms.
pub fn is_affirmative(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    const AFFIRMATIVE: &[&str] = &[
        "yes", "start", "agree", "sure", "ok", "نعم", "ابدأ", "ابدا", "موافق", "أجل",
    ];
    AFFIRMATIVE.iter().any(|word| lower.contains(word))
}
