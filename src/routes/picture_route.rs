use axum::{routing::get, Router};
use crate::config::AppState;
use crate::handlers::picture_handler::*;

pub fn picture_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pictures_handler))
        .route("/{id}", get(get_picture_handler).put(update_picture_handler))
        .route("/{id}/url", get(picture_url_handler))
}
