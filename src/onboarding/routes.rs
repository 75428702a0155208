//! REST endpoints for onboarding status and profile.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::onboarding::model::MarketingProfile;
use crate::store::ProfileStore;

/// Shared state for onboarding routes.
#[derive(Clone)]
pub struct OnboardingRouteState {
    pub store: Arc<dyn ProfileStore>,
}

#[derive(Debug, Deserialize)]
struct UserQuery {
    user_id: String,
}

#[derive(Debug, Serialize)]
struct OnboardingStatus {
    completed: bool,
    phase: Option<String>,
    progress_percent: u8,
    profile: Option<MarketingProfile>,
}

/// GET /api/onboarding/status?user_id=...
///
/// Returns the current onboarding status: whether it's completed, the
/// current phase, flow progress, and the profile (if any).
async fn get_status(
    State(state): State<OnboardingRouteState>,
    Query(query): Query<UserQuery>,
) -> impl IntoResponse {
    let journey = match state.store.load_journey(&query.user_id).await {
        Ok(journey) => journey,
        Err(e) => {
            tracing::warn!("Failed to load journey for status: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to load journey"})),
            )
                .into_response();
        }
    };
    let profile = state
        .store
        .get_profile(&query.user_id)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to load profile for status: {e}");
            None
        });

    let status = match journey {
        Some(journey) => OnboardingStatus {
            completed: journey.is_complete(),
            phase: Some(journey.phase.to_string()),
            progress_percent: journey.progress_percent(),
            profile,
        },
        None => OnboardingStatus {
            completed: false,
            phase: None,
            progress_percent: 0,
            profile,
        },
    };
    Json(status).into_response()
}

/// GET /api/onboarding/profile?user_id=...
///
/// Returns the full marketing profile, or 404 if none exists.
async fn get_profile(
    State(state): State<OnboardingRouteState>,
    Query(query): Query<UserQuery>,
) -> impl IntoResponse {
    match state.store.get_profile(&query.user_id).await {
        Ok(Some(profile)) => Json(profile).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "No profile exists yet"})),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("Failed to load profile: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to load profile"})),
            )
                .into_response()
        }
    }
}

/// Build the onboarding REST routes.
pub fn onboarding_routes(state: OnboardingRouteState) -> Router {
    Router::new()
        .route("/api/onboarding/status", get(get_status))
        .route("/api/onboarding/profile", get(get_profile))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::store::MemoryStore;

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn status_for_unknown_user_is_fresh() {
        let store = Arc::new(MemoryStore::new());
        let app = onboarding_routes(OnboardingRouteState { store });

        let response = app
            .oneshot(
                Request::get("/api/onboarding/status?user_id=nobody")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["completed"], false);
        assert_eq!(json["phase"], serde_json::Value::Null);
        assert_eq!(json["progress_percent"], 0);
    }

    #[tokio::test]
    async fn profile_missing_is_404() {
        let store = Arc::new(MemoryStore::new());
        let app = onboarding_routes(OnboardingRouteState { store });

        let response = app
            .oneshot(
                Request::get("/api/onboarding/profile?user_id=nobody")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn status_reflects_saved_journey() {
        let store = Arc::new(MemoryStore::new());
        let mut journey = crate::onboarding::state::Journey::new("u1");
        journey.advance_to(crate::onboarding::state::OnboardingPhase::WebsiteAnalysis);
        store.save_journey(&journey).await.unwrap();
        store
            .save_field("u1", "company_name", &serde_json::json!("Acme"))
            .await
            .unwrap();

        let app = onboarding_routes(OnboardingRouteState { store });
        let response = app
            .oneshot(
                Request::get("/api/onboarding/status?user_id=u1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["phase"], "website_analysis");
        assert_eq!(json["completed"], false);
        assert_eq!(json["profile"]["company_name"], "Acme");
    }
}
