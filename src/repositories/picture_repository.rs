use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::*;

use crate::entities::{picture, picture::Entity as PictureEntity};
use crate::models::common_model::{FindAllResponse, Pagination};
use crate::models::messages::{self, picture as msg};
use crate::models::picture_model::{NewPicture, Picture, PictureChanges, UpdatedPicture};
use crate::utils::api_response::AppError;

#[async_trait]
pub trait PictureRepository: Send + Sync {
    async fn create(&self, picture: NewPicture) -> Result<Picture, AppError>;

    /// Merges `changes` into an existing picture; `NotFound` when `id` does not resolve.
    async fn update(&self, id: i32, changes: PictureChanges) -> Result<UpdatedPicture, AppError>;

    /// Writes `changes` without looking the row up first.
    async fn internal_update(&self, id: i32, changes: PictureChanges) -> Result<Picture, AppError>;

    async fn delete(&self, id: i32) -> Result<Picture, AppError>;
    async fn find_all(&self, pagination: Pagination) -> Result<FindAllResponse<Picture>, AppError>;
    async fn find_by_id(&self, id: i32) -> Result<Picture, AppError>;
}

impl From<picture::Model> for Picture {
    fn from(model: picture::Model) -> Self {
        Self {
            id: model.id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            title: model.title,
            description: model.description,
            category: model.category,
            url: model.url,
            key: model.key,
            format: model.format,
            size: model.size,
            car_id: model.car_id,
        }
    }
}

pub(crate) fn not_found(id: i32) -> AppError {
    tracing::warn!(picture_id = id, "picture not found");
    AppError::not_found(messages::with_id(msg::NOT_FOUND, id))
}

/// Active model carrying only the changed columns plus `updated_at`.
fn changes_to_active(id: i32, changes: PictureChanges) -> picture::ActiveModel {
    let mut active = picture::ActiveModel {
        id: Unchanged(id),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };
    if let Some(title) = changes.title {
        active.title = Set(title);
    }
    if let Some(description) = changes.description {
        active.description = Set(Some(description));
    }
    if let Some(car_id) = changes.car_id {
        active.car_id = Set(Some(car_id));
    }
    active
}

#[derive(Clone)]
pub struct SeaOrmPictureRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmPictureRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: i32) -> Result<Option<picture::Model>, AppError> {
        PictureEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::internal(msg::FIND_ERROR, e))
    }

    async fn write_changes(&self, id: i32, changes: PictureChanges, error: &str) -> Result<(), AppError> {
        match changes_to_active(id, changes).update(self.db.as_ref()).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => Err(not_found(id)),
            Err(e) => Err(AppError::internal(error, e)),
        }
    }
}

#[async_trait]
impl PictureRepository for SeaOrmPictureRepository {
    async fn create(&self, picture: NewPicture) -> Result<Picture, AppError> {
        let now = Utc::now();
        let new_picture = picture::ActiveModel {
            id: NotSet,
            created_at: Set(now),
            updated_at: Set(now),
            title: Set(picture.title),
            description: Set(picture.description),
            category: Set(picture.category),
            url: Set(picture.url),
            key: Set(picture.key),
            format: Set(picture.format),
            size: Set(picture.size),
            car_id: Set(picture.car_id),
        };

        let model = new_picture
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::internal(msg::CREATE_ERROR, e))?;
        tracing::debug!(picture_id = model.id, key = %model.key, "picture row created");
        Ok(model.into())
    }

    async fn update(&self, id: i32, changes: PictureChanges) -> Result<UpdatedPicture, AppError> {
        let old_picture: Picture = self.find_model(id).await?.ok_or_else(|| not_found(id))?.into();
        self.write_changes(id, changes, msg::UPDATE_ERROR).await?;
        let new_picture = self.find_by_id(id).await?;
        Ok(UpdatedPicture { old_picture, new_picture })
    }

    async fn internal_update(&self, id: i32, changes: PictureChanges) -> Result<Picture, AppError> {
        self.write_changes(id, changes, msg::UPDATE_ERROR).await?;
        self.find_by_id(id).await
    }

    async fn delete(&self, id: i32) -> Result<Picture, AppError> {
        let existing: Picture = self.find_model(id).await?.ok_or_else(|| not_found(id))?.into();
        PictureEntity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::internal(msg::DELETE_ERROR, e))?;
        Ok(existing)
    }

    async fn find_all(&self, pagination: Pagination) -> Result<FindAllResponse<Picture>, AppError> {
        super::check_window(&pagination)?;

        let items = PictureEntity::find()
            .order_by_asc(picture::Column::Id)
            .offset(pagination.skip)
            .limit(pagination.take)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::internal(msg::FIND_ERROR, e))?;

        let total = PictureEntity::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::internal(msg::FIND_ERROR, e))?;

        Ok(FindAllResponse {
            items: items.into_iter().map(Picture::from).collect(),
            total,
            take: pagination.take,
            skip: pagination.skip,
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Picture, AppError> {
        self.find_model(id).await?.map(Picture::from).ok_or_else(|| not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::picture_model::Category;
    use std::collections::BTreeMap;

    fn model(id: i32) -> picture::Model {
        picture::Model {
            id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            title: "titulo".into(),
            description: Some("description".into()),
            category: Category::Front,
            url: "http://localhost:9000/pictures/key".into(),
            key: "key".into(),
            format: "image/jpeg".into(),
            size: 128,
            car_id: Some(1),
        }
    }

    #[tokio::test]
    async fn find_by_id_maps_row_to_domain() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(7)]])
            .into_connection();
        let repo = SeaOrmPictureRepository::new(Arc::new(db));

        let picture = repo.find_by_id(7).await.unwrap();
        assert_eq!(picture.id, 7);
        assert_eq!(picture.category, Category::Front);
        assert_eq!(picture.car_id, Some(1));
    }

    #[tokio::test]
    async fn missing_picture_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<picture::Model>::new()])
            .into_connection();
        let repo = SeaOrmPictureRepository::new(Arc::new(db));

        let err = repo.delete(42).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Picture not found with ID 42");
    }

    #[tokio::test]
    async fn find_all_reports_total_and_window() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(1), model(2)]])
            .append_query_results([[BTreeMap::from([("num_items", Into::<Value>::into(5i64))])]])
            .into_connection();
        let repo = SeaOrmPictureRepository::new(Arc::new(db));

        let page = repo.find_all(Pagination { skip: 0, take: 2 }).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.take, 2);
    }

    #[tokio::test]
    async fn driver_failures_become_internal_errors() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".into())])
            .into_connection();
        let repo = SeaOrmPictureRepository::new(Arc::new(db));

        let err = repo.find_by_id(1).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), msg::FIND_ERROR);
    }
}
