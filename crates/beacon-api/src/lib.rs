pub mod error;
pub mod messages;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use beacon_db::Database;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
}

/// Assemble the API router. The server binary layers CORS and request
/// tracing on top of this; tests mount it directly on an ephemeral port.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/messages", post(messages::create_message))
        .route("/api/messages", get(messages::list_messages))
        .route("/api/messages/{id}/unread", get(messages::unread_messages))
        .route("/api/messages/{id}/read", put(messages::mark_read))
        .route("/api/messages/{id}", get(messages::get_message))
        .route("/api/messages/{id}", delete(messages::delete_message))
        .route("/health", get(messages::health))
        .with_state(state)
}
