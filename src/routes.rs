//! REST surface: the chat endpoint plus the onboarding routes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::assistant::{Assistant, AssistantReply};
use crate::lang::Language;
use crate::onboarding::engine::PhaseAction;
use crate::onboarding::model::ProfileUpdate;
use crate::onboarding::routes::{OnboardingRouteState, onboarding_routes};
use crate::session::SessionContext;
use crate::store::ProfileStore;

#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
}

/// POST /api/chat request body.
///
/// Exactly one of `message`, `action`, or `profile` drives the turn.
#[derive(Debug, Deserialize)]
struct ChatRequestBody {
    message: Option<String>,
    /// Button action identifier echoed from an emitted command.
    action: Option<String>,
    /// Submitted profile-completion form.
    profile: Option<ProfileUpdate>,
    client_id: Option<Uuid>,
    conversation_id: Option<String>,
    language: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatResponseBody {
    #[serde(flatten)]
    reply: AssistantReply,
    client_id: Uuid,
    conversation_id: Uuid,
}

/// Map a request body to a phase action.
///
/// Button action ids are the ones the onboarding prompts emit, so a
/// client can echo a command's `action` back verbatim.
fn action_from(body: &ChatRequestBody) -> Option<PhaseAction> {
    if let Some(profile) = &body.profile {
        return Some(PhaseAction::CompleteProfile(profile.clone()));
    }
    match body.action.as_deref() {
        Some("skip") | Some("skip_website") => return Some(PhaseAction::Skip),
        // The strategy prompt's button; equivalent to an affirmative
        // reply in the strategy phase.
        Some("generate_strategy") => {
            return Some(PhaseAction::Message("start".to_string()));
        }
        _ => {}
    }
    body.message.clone().map(PhaseAction::Message)
}

/// POST /api/chat
async fn post_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequestBody>,
) -> impl IntoResponse {
    let language = body
        .language
        .as_deref()
        .map(Language::from_code)
        .unwrap_or_default();
    let mut ctx = SessionContext::resume(body.conversation_id.as_deref(), language);
    if let Some(client_id) = body.client_id {
        ctx.client_id = client_id;
    }

    let Some(action) = action_from(&body) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "Request needs a message, an action, or a profile"
            })),
        )
            .into_response();
    };

    match state.assistant.handle(&ctx, action).await {
        Ok(reply) => Json(ChatResponseBody {
            reply,
            client_id: ctx.client_id,
            conversation_id: ctx.conversation_id,
        })
        .into_response(),
        Err(e) => {
            tracing::warn!("Chat turn failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to handle message"})),
            )
                .into_response()
        }
    }
}

/// Assemble the full application router.
pub fn app_router(assistant: Arc<Assistant>, store: Arc<dyn ProfileStore>) -> Router {
    let chat = Router::new()
        .route("/api/chat", post(post_chat))
        .with_state(AppState { assistant });
    chat.merge(onboarding_routes(OnboardingRouteState { store }))
        .layer(CorsLayer::permissive())
}
