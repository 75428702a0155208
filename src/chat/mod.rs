//! The remote chat-completion service boundary.

mod railway;

pub use railway::RailwayChatClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChatError;
use crate::session::SessionContext;

/// One reply from the chat-completion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    /// Raw agent text, possibly containing directive tags.
    pub response: String,
    #[serde(default)]
    pub tokens_used: u64,
    /// Conversation id echoed (or assigned) by the service.
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// Remote chat-completion service.
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn send(
        &self,
        ctx: &SessionContext,
        message: &str,
    ) -> Result<ChatReply, ChatError>;
}
