use axum::{extract::State, response::IntoResponse};

use crate::config::AppState;
use crate::models::common_model::PaginationParams;
use crate::models::messages::{self, picture as msg};
use crate::models::picture_model::UpdatePictureRequest;
use crate::utils::api_response::ResponseBuilder;
use crate::utils::validated_wrapper::{ValidatedJson, ValidatedPath, ValidatedQuery};

pub async fn list_pictures_handler(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
) -> impl IntoResponse {
    match state.picture_service.find_all(params.into()).await {
        Ok(res) => ResponseBuilder::success(messages::found(msg::FIND_SUCCESS, res.items.len()), res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_picture_handler(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i32>,
) -> impl IntoResponse {
    match state.picture_service.find_by_id(id).await {
        Ok(picture) => ResponseBuilder::success(messages::with_id(msg::FIND_SUCCESS, id), picture).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn picture_url_handler(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i32>,
) -> impl IntoResponse {
    match state.picture_service.image_url(id).await {
        Ok(res) => ResponseBuilder::success(msg::URL_SUCCESS, res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_picture_handler(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i32>,
    ValidatedJson(payload): ValidatedJson<UpdatePictureRequest>,
) -> impl IntoResponse {
    match state.picture_service.update_metadata(id, payload.into()).await {
        Ok(res) => ResponseBuilder::success(messages::with_id(msg::UPDATE_SUCCESS, id), res).into_response(),
        Err(e) => e.into_response(),
    }
}
