use axum::{extract::State, response::IntoResponse};

use crate::config::AppState;
use crate::models::car_model::{CreateCarRequest, DeletedCar, UpdateCarRequest};
use crate::models::common_model::PaginationParams;
use crate::models::messages::{self, car as msg};
use crate::utils::api_response::ResponseBuilder;
use crate::utils::validated_wrapper::{CarForm, ValidatedPath, ValidatedQuery};

pub async fn create_car_handler(
    State(state): State<AppState>,
    form: CarForm<CreateCarRequest>,
) -> impl IntoResponse {
    let (car, documentation) = form.payload.into_parts();
    match state.car_service.create(car, form.files, documentation).await {
        // Cars created with pictures come back from the linking update.
        Ok(car) if !car.pictures.is_empty() => ResponseBuilder::success(msg::CREATE_SUCCESS, car).into_response(),
        Ok(car) => {
            let message = format!("{}: {} {}", msg::CREATE_SUCCESS, messages::WITH_ID, car.id);
            ResponseBuilder::created(message, car).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn list_cars_handler(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
) -> impl IntoResponse {
    match state.car_service.find_all(params.into()).await {
        Ok(res) => ResponseBuilder::success(messages::found(msg::FIND_SUCCESS, res.items.len()), res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_car_handler(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i32>,
) -> impl IntoResponse {
    match state.car_service.find_by_id(id).await {
        Ok(car) => ResponseBuilder::success(messages::with_id(msg::FIND_SUCCESS, id), car).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_car_handler(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i32>,
    form: CarForm<UpdateCarRequest>,
) -> impl IntoResponse {
    let (changes, documentation) = form.payload.into_parts();
    match state.car_service.update(id, changes, form.files, documentation).await {
        Ok(res) => ResponseBuilder::success(messages::with_id(msg::UPDATE_SUCCESS, id), res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_car_handler(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i32>,
) -> impl IntoResponse {
    match state.car_service.delete(id).await {
        Ok(car) => ResponseBuilder::success(messages::with_id(msg::DELETE_SUCCESS, id), DeletedCar { deleted_car: car }).into_response(),
        Err(e) => e.into_response(),
    }
}
