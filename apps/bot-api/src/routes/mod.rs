pub mod health;
pub mod webhook;

use axum::Router;
use utoipa::OpenApi;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(webhook::router())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health,
        // Webhook
        webhook::verify,
        webhook::receive,
    ),
    components(
        schemas(
            // Error types
            crate::error::ApiErrorBody,
            crate::error::ApiErrorDetail,
            // Route request/response types
            health::HealthResponse,
            webhook::WebhookEvent,
            webhook::WebhookEntry,
            webhook::MessagingEvent,
            webhook::Participant,
            webhook::IncomingMessage,
        )
    ),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Webhook", description = "Messenger platform webhook"),
    )
)]
pub struct ApiDoc;
