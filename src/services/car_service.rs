use std::sync::Arc;

use crate::models::car_model::{Car, CarChanges, NewCar, UpdatedCar};
use crate::models::common_model::{FindAllResponse, Pagination};
use crate::models::picture_model::{Picture, PictureDocumentationSet, UploadedFile};
use crate::repositories::CarRepository;
use crate::services::picture_service::PictureService;
use crate::utils::api_response::AppError;

pub struct CarService {
    repository: Arc<dyn CarRepository>,
    picture_service: Arc<PictureService>,
}

fn has_pictures(files: &[UploadedFile], documentation: Option<&PictureDocumentationSet>) -> bool {
    !files.is_empty() || documentation.map(|d| !d.is_empty()).unwrap_or(false)
}

impl CarService {
    pub fn new(repository: Arc<dyn CarRepository>, picture_service: Arc<PictureService>) -> Self {
        Self {
            repository,
            picture_service,
        }
    }

    /// Creates the car and, when files or documentation are sent, its pictures.
    ///
    /// The bare row is inserted first so pictures can point at its id; it is
    /// removed again if the pictures cannot be created.
    pub async fn create(
        &self,
        car: NewCar,
        files: Vec<UploadedFile>,
        documentation: Option<PictureDocumentationSet>,
    ) -> Result<Car, AppError> {
        if !has_pictures(&files, documentation.as_ref()) {
            return self.repository.create(car).await;
        }

        PictureService::validate_documentation(&files, documentation.as_ref())?;
        let documentation = documentation.unwrap_or_default();

        let car = self.repository.create(car).await?;

        let pictures = match self.picture_service.create(&files, &documentation, Some(car.id)).await {
            Ok(pictures) => pictures,
            Err(err) => {
                self.discard(car.id, &[]).await;
                return Err(err);
            }
        };

        let changes = CarChanges {
            pictures: Some(pictures.clone()),
            ..Default::default()
        };
        match self.repository.internal_update(car.id, changes).await {
            Ok(car) => Ok(car),
            Err(err) => {
                self.discard(car.id, &pictures).await;
                Err(err)
            }
        }
    }

    /// Merges `changes` into the car. With files or documentation, pictures in the
    /// documented categories are replaced.
    pub async fn update(
        &self,
        id: i32,
        mut changes: CarChanges,
        files: Vec<UploadedFile>,
        documentation: Option<PictureDocumentationSet>,
    ) -> Result<UpdatedCar, AppError> {
        if !has_pictures(&files, documentation.as_ref()) {
            return self.repository.update(id, changes, None).await;
        }

        let old_car = self.repository.find_by_id(id).await?;
        let documentation = documentation.unwrap_or_default();
        let pictures = self
            .picture_service
            .update(&old_car.pictures, &files, &documentation, Some(id))
            .await?;
        changes.pictures = Some(pictures);

        self.repository.update(id, changes, Some(old_car)).await
    }

    /// Removes the car's pictures (blobs and rows), then the car. Returns the car as it was.
    pub async fn delete(&self, id: i32) -> Result<Car, AppError> {
        let car = self.repository.find_by_id(id).await?;
        self.picture_service.delete(&car.pictures).await?;
        self.repository.delete(id).await?;
        tracing::info!(car_id = id, pictures = car.pictures.len(), "car deleted");
        Ok(car)
    }

    pub async fn find_all(&self, pagination: Pagination) -> Result<FindAllResponse<Car>, AppError> {
        self.repository.find_all(pagination).await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Car, AppError> {
        self.repository.find_by_id(id).await
    }

    /// Compensation for a failed create. Failures are logged, never returned.
    async fn discard(&self, car_id: i32, pictures: &[Picture]) {
        if let Err(e) = self.picture_service.delete(pictures).await {
            tracing::error!(car_id, "could not remove pictures of discarded car: {}", e);
        }
        match self.repository.delete(car_id).await {
            Ok(_) => tracing::warn!(car_id, "car creation rolled back"),
            Err(e) => tracing::error!(car_id, "could not remove discarded car: {}", e),
        }
    }
}
