//! Morvo — a chat-based marketing assistant.
//!
//! The core is a directive parser that turns `[BUTTON:...]`, `[FORM:...]`,
//! `[SAVE_DATA:...]`, and `[INFO:...]` tags embedded in agent text into
//! structured UI commands, and a guided onboarding flow driven by a phase
//! state machine with persistence-gated transitions.

pub mod analysis;
pub mod assistant;
pub mod chat;
pub mod config;
pub mod directive;
pub mod error;
pub mod lang;
pub mod onboarding;
pub mod retry;
pub mod routes;
pub mod session;
pub mod store;

pub use error::{Error, Result};
