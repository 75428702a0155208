//! Guided onboarding: phase state machine, profile model, prompts, and
//! the engine that drives one journey per user.

pub mod engine;
pub mod model;
pub mod prompts;
pub mod routes;
pub mod state;

pub use engine::{OnboardingEngine, PhaseAction, PhaseOutcome};
pub use model::{MarketingProfile, ProfileUpdate, field_keys};
pub use state::{Journey, OnboardingPhase};
