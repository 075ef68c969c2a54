//! Messenger platform webhook: subscription handshake and inbound events.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiError, ApiErrorBody};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/webhook", get(verify).post(receive))
}

// ---------------------------------------------------------------------------
// GET /webhook
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

#[utoipa::path(
    get,
    path = "/webhook",
    tag = "Webhook",
    params(VerifyQuery),
    responses(
        (status = 200, description = "Subscription confirmed; body is the challenge", body = String),
        (status = 400, description = "Mode or token missing", body = ApiErrorBody),
        (status = 403, description = "Token mismatch", body = ApiErrorBody),
    ),
)]
pub async fn verify(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<String, ApiError> {
    let (Some(mode), Some(token)) = (query.mode, query.verify_token) else {
        return Err(ApiError::bad_request("hub.mode and hub.verify_token are required"));
    };

    if mode != "subscribe" || token != state.config.verify_token {
        tracing::error!(%mode, "webhook verification failed");
        return Err(ApiError::forbidden("Verification token mismatch"));
    }

    tracing::info!("webhook verified");
    Ok(query.challenge.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// POST /webhook
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct WebhookEvent {
    pub object: String,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct WebhookEntry {
    #[serde(default)]
    pub messaging: Vec<MessagingEvent>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MessagingEvent {
    pub sender: Participant,
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct Participant {
    pub id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct IncomingMessage {
    pub text: Option<String>,
}

#[utoipa::path(
    post,
    path = "/webhook",
    tag = "Webhook",
    request_body = WebhookEvent,
    responses(
        (status = 200, description = "Events accepted", body = String),
        (status = 404, description = "Not a page subscription", body = ApiErrorBody),
    ),
)]
pub async fn receive(
    State(state): State<AppState>,
    Json(event): Json<WebhookEvent>,
) -> Result<(StatusCode, &'static str), ApiError> {
    if event.object != "page" {
        return Err(ApiError::not_found(format!(
            "Unsupported webhook object `{}`",
            event.object
        )));
    }

    for entry in event.entry {
        // Only the first event of each entry is handled.
        let Some(messaging) = entry.messaging.into_iter().next() else {
            continue;
        };
        let Some(text) = messaging.message.and_then(|m| m.text) else {
            continue;
        };

        let state = state.clone();
        let sender_id = messaging.sender.id;
        tokio::spawn(async move {
            crate::commands::handle_message(&state, &sender_id, &text).await;
        });
    }

    Ok((StatusCode::OK, "EVENT_RECEIVED"))
}
