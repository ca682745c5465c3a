use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, CorrelationIdLayer};
use crate::handlers::events::{create_event, delete_event, get_event, list_events, update_event};
use crate::handlers::health_check;
use crate::handlers::organizers::{
    create_organizer, delete_organizer, get_organizer, list_organizers, update_organizer,
};
use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/organizers", get(list_organizers).post(create_organizer))
        .route(
            "/organizers/:id",
            get(get_organizer)
                .put(update_organizer)
                .delete(delete_organizer),
        )
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
}

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer())
        .layer(CorrelationIdLayer)
        .layer(create_cors_layer())
}
