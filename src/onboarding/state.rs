//! Onboarding phases and the per-user journey record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::onboarding::model::MarketingProfile;

/// The phases of the onboarding conversation, in their fixed order.
///
/// Transitions are monotonic along this order. Most phases have a single
/// forward edge; `website_analysis` additionally declares a skip path
/// straight to `profile_completion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingPhase {
    Welcome,
    GreetingPreference,
    WebsiteAnalysis,
    AnalysisReview,
    ProfileCompletion,
    ProfessionalAnalysis,
    StrategyGeneration,
    CommitmentActivation,
    Completed,
}

impl OnboardingPhase {
    /// All phases in order, including the terminal one.
    pub const ALL: [OnboardingPhase; 9] = [
        Self::Welcome,
        Self::GreetingPreference,
        Self::WebsiteAnalysis,
        Self::AnalysisReview,
        Self::ProfileCompletion,
        Self::ProfessionalAnalysis,
        Self::StrategyGeneration,
        Self::CommitmentActivation,
        Self::Completed,
    ];

    /// Number of non-terminal phases (the denominator for progress).
    pub const TOTAL_STEPS: usize = Self::ALL.len() - 1;

    /// Position in the fixed ordering.
    pub fn ordinal(&self) -> usize {
        Self::ALL
            .iter()
            .position(|p| p == self)
            .expect("phase is in ALL")
    }

    /// Check if a transition from `self` to `target` is valid.
    ///
    /// These are the policy edges, not the raw ordering: `welcome` and
    /// `greeting_preference` both feed `website_analysis`, and
    /// `analysis_review` jumps over `profile_completion`.
    pub fn can_transition_to(&self, target: OnboardingPhase) -> bool {
        use OnboardingPhase::*;
        matches!(
            (self, target),
            (Welcome, WebsiteAnalysis)
                | (GreetingPreference, WebsiteAnalysis)
                | (WebsiteAnalysis, AnalysisReview)
                | (WebsiteAnalysis, ProfileCompletion)
                | (AnalysisReview, ProfessionalAnalysis)
                | (ProfileCompletion, ProfessionalAnalysis)
                | (ProfessionalAnalysis, StrategyGeneration)
                | (StrategyGeneration, CommitmentActivation)
                | (CommitmentActivation, Completed)
        )
    }

    /// Skip is phase-defined metadata: only phases that declare a skip
    /// target accept a skip action.
    pub fn skip_target(&self) -> Option<OnboardingPhase> {
        match self {
            Self::WebsiteAnalysis => Some(Self::ProfileCompletion),
            _ => None,
        }
    }

    /// Whether this phase is terminal (onboarding is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl Default for OnboardingPhase {
    fn default() -> Self {
        Self::Welcome
    }
}

impl std::fmt::Display for OnboardingPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Welcome => "welcome",
            Self::GreetingPreference => "greeting_preference",
            Self::WebsiteAnalysis => "website_analysis",
            Self::AnalysisReview => "analysis_review",
            Self::ProfileCompletion => "profile_completion",
            Self::ProfessionalAnalysis => "professional_analysis",
            Self::StrategyGeneration => "strategy_generation",
            Self::CommitmentActivation => "commitment_activation",
            Self::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

/// One user's onboarding progress, persisted via the profile store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journey {
    pub id: Uuid,
    pub user_id: String,
    pub phase: OnboardingPhase,
    pub profile: MarketingProfile,
    /// Phases whose completion side effect has committed, in order.
    pub completed_phases: Vec<OnboardingPhase>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    /// When the current phase was entered.
    pub phase_started_at: DateTime<Utc>,
    /// Milliseconds spent in each completed phase.
    pub phase_durations_ms: BTreeMap<String, i64>,
}

impl Journey {
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            phase: OnboardingPhase::default(),
            profile: MarketingProfile::default(),
            completed_phases: Vec::new(),
            created_at: now,
            last_updated: now,
            phase_started_at: now,
            phase_durations_ms: BTreeMap::new(),
        }
    }

    /// Commit a transition to `target`. The caller has already run and
    /// persisted the phase's side effect; this records completion of the
    /// current phase, its duration, and moves the journey forward.
    pub fn advance_to(&mut self, target: OnboardingPhase) {
        debug_assert!(self.phase.can_transition_to(target));
        let now = Utc::now();
        let elapsed = (now - self.phase_started_at).num_milliseconds();
        self.phase_durations_ms
            .insert(self.phase.to_string(), elapsed.max(0));
        if !self.completed_phases.contains(&self.phase) {
            self.completed_phases.push(self.phase);
        }
        self.phase = target;
        self.phase_started_at = now;
        self.last_updated = now;
    }

    /// Whether the journey reached the terminal phase.
    pub fn is_complete(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Progress through the phase flow, as a rounded percentage of
    /// completed phases over the total step count. A terminal journey is
    /// always 100, since both branch paths leave some phases unvisited.
    pub fn progress_percent(&self) -> u8 {
        if self.is_complete() {
            return 100;
        }
        let pct = self.completed_phases.len() as f64
            / OnboardingPhase::TOTAL_STEPS as f64
            * 100.0;
        pct.round().min(100.0) as u8
    }
}

/// Progress for the flat Q&A sub-flow: `index / total * 100`, rounded.
pub fn flat_progress(current_question_index: usize, total_questions: usize) -> u8 {
    if total_questions == 0 {
        return 0;
    }
    let pct = current_question_index as f64 / total_questions as f64 * 100.0;
    pct.round().min(100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        use OnboardingPhase::*;
        let edges = [
            (Welcome, WebsiteAnalysis),
            (GreetingPreference, WebsiteAnalysis),
            (WebsiteAnalysis, AnalysisReview),
            (WebsiteAnalysis, ProfileCompletion),
            (AnalysisReview, ProfessionalAnalysis),
            (ProfileCompletion, ProfessionalAnalysis),
            (ProfessionalAnalysis, StrategyGeneration),
            (StrategyGeneration, CommitmentActivation),
            (CommitmentActivation, Completed),
        ];
        for (from, to) in edges {
            assert!(from.can_transition_to(to), "{from} should reach {to}");
        }
    }

    #[test]
    fn invalid_transitions() {
        use OnboardingPhase::*;
        // Backward
        assert!(!AnalysisReview.can_transition_to(WebsiteAnalysis));
        assert!(!Completed.can_transition_to(Welcome));
        // Self
        assert!(!WebsiteAnalysis.can_transition_to(WebsiteAnalysis));
        // Jumps without a declared edge
        assert!(!Welcome.can_transition_to(StrategyGeneration));
        assert!(!GreetingPreference.can_transition_to(AnalysisReview));
    }

    #[test]
    fn all_edges_are_monotonic() {
        for from in OnboardingPhase::ALL {
            for to in OnboardingPhase::ALL {
                if from.can_transition_to(to) {
                    assert!(
                        to.ordinal() > from.ordinal(),
                        "{from} -> {to} goes backward"
                    );
                }
            }
        }
    }

    #[test]
    fn skip_only_on_website_analysis() {
        use OnboardingPhase::*;
        assert_eq!(WebsiteAnalysis.skip_target(), Some(ProfileCompletion));
        for phase in OnboardingPhase::ALL {
            if phase != WebsiteAnalysis {
                assert!(phase.skip_target().is_none(), "{phase} should not skip");
            }
        }
    }

    #[test]
    fn display_matches_serde() {
        for phase in OnboardingPhase::ALL {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{phase}\""));
        }
    }

    #[test]
    fn journey_happy_path_walk() {
        use OnboardingPhase::*;
        let mut journey = Journey::new("user-1");
        assert_eq!(journey.phase, Welcome);
        for target in [
            WebsiteAnalysis,
            AnalysisReview,
            ProfessionalAnalysis,
            StrategyGeneration,
            CommitmentActivation,
            Completed,
        ] {
            journey.advance_to(target);
        }
        assert!(journey.is_complete());
        assert_eq!(journey.completed_phases.len(), 6);
        assert!(journey.phase_durations_ms.contains_key("welcome"));
    }

    #[test]
    fn journey_skip_path() {
        use OnboardingPhase::*;
        let mut journey = Journey::new("user-2");
        journey.advance_to(WebsiteAnalysis);
        journey.advance_to(ProfileCompletion);
        assert_eq!(journey.phase, ProfileCompletion);
        assert!(!journey.completed_phases.contains(&AnalysisReview));
    }

    #[test]
    fn progress_percent() {
        use OnboardingPhase::*;
        let mut journey = Journey::new("user-3");
        assert_eq!(journey.progress_percent(), 0);
        journey.advance_to(WebsiteAnalysis);
        // 1/8 = 12.5 -> 13
        assert_eq!(journey.progress_percent(), 13);
        journey.advance_to(AnalysisReview);
        assert_eq!(journey.progress_percent(), 25);
        for target in [ProfessionalAnalysis, StrategyGeneration, CommitmentActivation, Completed] {
            journey.advance_to(target);
        }
        assert_eq!(journey.progress_percent(), 100);
    }

    #[test]
    fn flat_progress_rounds() {
        assert_eq!(flat_progress(0, 7), 0);
        assert_eq!(flat_progress(3, 7), 43);
        assert_eq!(flat_progress(7, 7), 100);
        assert_eq!(flat_progress(1, 0), 0);
    }

    #[test]
    fn journey_serde_roundtrip() {
        let mut journey = Journey::new("user-4");
        journey.advance_to(OnboardingPhase::WebsiteAnalysis);
        let json = serde_json::to_string(&journey).unwrap();
        let parsed: Journey = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, journey.id);
        assert_eq!(parsed.phase, OnboardingPhase::WebsiteAnalysis);
        assert_eq!(parsed.completed_phases, vec![OnboardingPhase::Welcome]);
    }
}
