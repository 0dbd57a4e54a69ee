use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    create_url_handler, delete_url_handler, health_handler, redirect_handler,
    shorturl_delete_handler, shorturl_redirect_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route(
                "/shorturl",
                post(create_url_handler)
                    .get(shorturl_redirect_handler)
                    .delete(shorturl_delete_handler),
            )
            .route(
                "/shorturl/{key}",
                get(redirect_handler).delete(delete_url_handler),
            )
            .route("/{key}", get(redirect_handler).delete(delete_url_handler))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }
}
