use crate::config::AppState;
use crate::handlers::health_check_handler;
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod car_route;
pub mod picture_route;

/// Eleven category images per request.
const BODY_LIMIT: usize = 64 * 1024 * 1024;

pub fn create_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/car", car_route::car_routes())
        .nest("/picture", picture_route::picture_routes())
        .route("/api/health", axum::routing::get(health_check_handler))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
