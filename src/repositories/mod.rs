pub mod car_repository;
pub mod mock;
pub mod picture_repository;

pub use car_repository::{CarRepository, SeaOrmCarRepository};
pub use picture_repository::{PictureRepository, SeaOrmPictureRepository};

use crate::models::common_model::Pagination;
use crate::utils::api_response::AppError;

/// Rejects windows the SQL driver cannot bind.
pub(crate) fn check_window(pagination: &Pagination) -> Result<(), AppError> {
    if pagination.fits_sql() {
        Ok(())
    } else {
        tracing::warn!(skip = pagination.skip, take = pagination.take, "pagination window out of range");
        Err(AppError::bad_request(format!(
            "skip and take must not be greater than {}",
            crate::models::common_model::MAX_WINDOW
        )))
    }
}
