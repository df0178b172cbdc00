use axum::{routing::get, Router};
use crate::config::AppState;
use crate::handlers::car_handler::*;

pub fn car_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cars_handler).post(create_car_handler))
        .route("/{id}", get(get_car_handler).put(update_car_handler).delete(delete_car_handler))
}
