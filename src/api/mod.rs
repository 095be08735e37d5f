//! Adapter-neutral HTTP surface: any chat platform bridge can POST events
//! here and render the returned actions.

mod handlers;
mod middleware;

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::bot::NoteBot;

pub use handlers::{ConversationResponse, EventRequest, EventResponse};
pub use middleware::ApiAuth;

pub fn create_router(bot: Arc<NoteBot>, auth: ApiAuth) -> Router {
    let api = Router::new()
        .route("/events", post(handlers::handle_event))
        .route("/users/{user_id}/notes", get(handlers::list_notes))
        .route(
            "/users/{user_id}/conversation",
            get(handlers::get_conversation),
        )
        .route_layer(from_fn_with_state(auth, middleware::auth_middleware))
        // Health stays reachable without a token.
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .with_state(bot)
}
