//! Session context — explicit identifiers passed into every call.
//!
//! The web client used module-level singletons for client/conversation
//! IDs; here the context is an owned value created at session start and
//! cleared at explicit reset.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::lang::Language;

/// Per-session identity and settings, injected into chat and engine calls.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Stable identifier for this client installation.
    pub client_id: Uuid,
    /// Identifier for the current conversation thread.
    pub conversation_id: Uuid,
    /// Active conversation language.
    pub language: Language,
    /// When the session was created.
    pub started_at: DateTime<Utc>,
}

impl SessionContext {
    /// Create a fresh session with generated identifiers.
    pub fn new(language: Language) -> Self {
        Self {
            client_id: Uuid::new_v4(),
            conversation_id: Uuid::new_v4(),
            language,
            started_at: Utc::now(),
        }
    }

    /// Resume a session from a stored conversation identifier.
    ///
    /// Malformed or legacy identifiers (underscore-delimited non-UUID
    /// text such as `conv_1699999999_abc`) are treated as invalid and a
    /// fresh UUID is generated instead.
    pub fn resume(existing_conversation_id: Option<&str>, language: Language) -> Self {
        let conversation_id = existing_conversation_id
            .and_then(validate_conversation_id)
            .unwrap_or_else(Uuid::new_v4);
        Self {
            client_id: Uuid::new_v4(),
            conversation_id,
            language,
            started_at: Utc::now(),
        }
    }

    /// Start a new conversation within the same session.
    pub fn reset_conversation(&mut self) {
        self.conversation_id = Uuid::new_v4();
    }
}

/// Accept only well-formed UUIDs as conversation identifiers.
fn validate_conversation_id(raw: &str) -> Option<Uuid> {
    let trimmed = raw.trim();
    if trimmed.contains('_') {
        return None;
    }
    Uuid::parse_str(trimmed).ok()
}
