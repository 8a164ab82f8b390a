use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use crate::edge::edge_resolver;
use crate::error::AppError;
use crate::handlers::{
    create_short_url_handler, delete_short_url_handler, get_short_url_handler, health_handler,
    list_short_urls_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/shorten", get(list_short_urls_handler))
            .route("/shorten/", get(list_short_urls_handler))
            .route("/shorten/public", post(create_short_url_handler))
            .route("/shorten/public/", post(create_short_url_handler))
            .route(
                "/shorten/{id}",
                get(get_short_url_handler).delete(delete_short_url_handler),
            )
            // the resolver answers most unrouted paths; the rest end up here
            .fallback(|| async { AppError::RouteNotFound })
            .layer(middleware::from_fn_with_state(state.clone(), edge_resolver))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
