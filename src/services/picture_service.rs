use std::collections::BTreeSet;
use std::sync::Arc;

use crate::models::common_model::{FindAllResponse, Pagination};
use crate::models::messages::picture as msg;
use crate::models::picture_model::{
    Category, NewPicture, Picture, PictureChanges, PictureDocumentationSet, PictureUrlResponse, UpdatedPicture,
    UploadedFile,
};
use crate::repositories::PictureRepository;
use crate::services::s3_service::ObjectStorage;
use crate::utils::api_response::AppError;

pub struct PictureService {
    repository: Arc<dyn PictureRepository>,
    storage: Arc<dyn ObjectStorage>,
}

fn join(categories: &BTreeSet<Category>) -> String {
    categories.iter().map(Category::as_str).collect::<Vec<_>>().join(", ")
}

impl PictureService {
    pub fn new(repository: Arc<dyn PictureRepository>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { repository, storage }
    }

    /// Checks that every uploaded file has documentation and vice versa.
    ///
    /// All mismatches are collected before failing; empty collections count as absent.
    pub fn validate_documentation(
        files: &[UploadedFile],
        documentation: Option<&PictureDocumentationSet>,
    ) -> Result<(), AppError> {
        let file_keys: BTreeSet<Category> = files.iter().map(|f| f.category).collect();
        let doc_keys: BTreeSet<Category> = documentation
            .map(|docs| docs.keys().copied().collect())
            .unwrap_or_default();

        let mut errors = Vec::new();
        match (file_keys.is_empty(), doc_keys.is_empty()) {
            (true, true) => {
                errors.push(msg::FILES_REQUIRED_FOR_DOCUMENTATION.to_string());
                errors.push(msg::DOCUMENTATION_REQUIRED_FOR_FILES.to_string());
            }
            (true, false) => {
                errors.push(format!("{}: {}", msg::FILES_REQUIRED_FOR_DOCUMENTATION, join(&doc_keys)));
            }
            (false, true) => {
                errors.push(format!("{}: {}", msg::DOCUMENTATION_REQUIRED_FOR_FILES, join(&file_keys)));
            }
            (false, false) => {
                let missing_files: BTreeSet<Category> = doc_keys.difference(&file_keys).copied().collect();
                let missing_docs: BTreeSet<Category> = file_keys.difference(&doc_keys).copied().collect();
                if !missing_files.is_empty() {
                    errors.push(format!("{}: {}", msg::FILES_REQUIRED_FOR_DOCUMENTATION, join(&missing_files)));
                }
                if !missing_docs.is_empty() {
                    errors.push(format!("{}: {}", msg::DOCUMENTATION_REQUIRED_FOR_FILES, join(&missing_docs)));
                }
            }
        }

        if errors.is_empty() {
            return Ok(());
        }
        for error in &errors {
            tracing::error!("{}", error);
        }
        Err(AppError::bad_request(errors).with_detail(msg::BAD_REQUEST).public())
    }

    /// Uploads each file and persists its picture row, in upload order.
    ///
    /// On failure the pictures created so far are removed again.
    pub async fn create(
        &self,
        files: &[UploadedFile],
        documentation: &PictureDocumentationSet,
        car_id: Option<i32>,
    ) -> Result<Vec<Picture>, AppError> {
        Self::validate_documentation(files, Some(documentation))?;
        self.create_batch(files, documentation, car_id).await
    }

    /// Replaces the pictures whose category appears in `documentation`, then creates the new set.
    /// Categories absent from `documentation` are left alone.
    pub async fn update(
        &self,
        old_pictures: &[Picture],
        files: &[UploadedFile],
        documentation: &PictureDocumentationSet,
        car_id: Option<i32>,
    ) -> Result<Vec<Picture>, AppError> {
        Self::validate_documentation(files, Some(documentation))?;

        let replaced: Vec<Picture> = old_pictures
            .iter()
            .filter(|p| documentation.contains_key(&p.category))
            .cloned()
            .collect();
        // old blobs cannot be restored once deleted
        self.delete(&replaced).await?;

        self.create_batch(files, documentation, car_id).await
    }

    /// Deletes each picture's blob, then its row, one at a time.
    pub async fn delete(&self, pictures: &[Picture]) -> Result<(), AppError> {
        for picture in pictures {
            self.storage.delete_image(&picture.key).await?;
            self.repository.delete(picture.id).await?;
            tracing::debug!(picture_id = picture.id, key = %picture.key, "picture removed");
        }
        Ok(())
    }

    pub async fn find_all(&self, pagination: Pagination) -> Result<FindAllResponse<Picture>, AppError> {
        self.repository.find_all(pagination).await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Picture, AppError> {
        self.repository.find_by_id(id).await
    }

    pub async fn image_url(&self, id: i32) -> Result<PictureUrlResponse, AppError> {
        let picture = self.repository.find_by_id(id).await?;
        let url = self.storage.image_url(&picture.key).await?;
        Ok(PictureUrlResponse { key: picture.key, url })
    }

    pub async fn update_metadata(&self, id: i32, changes: PictureChanges) -> Result<UpdatedPicture, AppError> {
        self.repository.update(id, changes).await
    }

    async fn create_batch(
        &self,
        files: &[UploadedFile],
        documentation: &PictureDocumentationSet,
        car_id: Option<i32>,
    ) -> Result<Vec<Picture>, AppError> {
        let mut created: Vec<Picture> = Vec::with_capacity(files.len());

        for file in files {
            let doc = match documentation.get(&file.category) {
                Some(doc) => doc,
                None => {
                    self.rollback(&created).await;
                    return Err(AppError::internal(msg::CREATE_ERROR, file.category));
                }
            };

            let object = match self.storage.upload_image(file.data.clone(), &file.content_type).await {
                Ok(object) => object,
                Err(err) => {
                    self.rollback(&created).await;
                    return Err(err);
                }
            };

            let new_picture = NewPicture {
                title: doc.title.clone(),
                description: doc.description.clone(),
                category: file.category,
                url: object.location,
                key: object.key.clone(),
                format: file.content_type.clone(),
                size: file.size(),
                car_id,
            };

            match self.repository.create(new_picture).await {
                Ok(picture) => created.push(picture),
                Err(err) => {
                    if let Err(e) = self.storage.delete_image(&object.key).await {
                        tracing::error!(key = %object.key, "orphaned upload left in storage: {}", e);
                    }
                    self.rollback(&created).await;
                    return Err(err);
                }
            }
        }

        Ok(created)
    }

    /// Best-effort removal of a partially created batch. Failures are logged only.
    async fn rollback(&self, created: &[Picture]) {
        for picture in created.iter().rev() {
            if let Err(e) = self.repository.delete(picture.id).await {
                tracing::error!(picture_id = picture.id, "rollback could not delete picture row: {}", e);
            }
            if let Err(e) = self.storage.delete_image(&picture.key).await {
                tracing::error!(key = %picture.key, "rollback could not delete image: {}", e);
            }
        }
        if !created.is_empty() {
            tracing::warn!(count = created.len(), "picture batch rolled back");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::picture_model::PictureDocumentation;
    use crate::repositories::mock::{InMemoryPictureRepository, SharedStore};
    use crate::services::s3_service::memory::MemoryStorage;
    use crate::utils::api_response::{ErrorKind, Message};
    use bytes::Bytes;

    struct Fixture {
        store: SharedStore,
        storage: Arc<MemoryStorage>,
        service: PictureService,
    }

    fn fixture() -> Fixture {
        let store = SharedStore::new();
        let storage = Arc::new(MemoryStorage::default());
        let service = PictureService::new(Arc::new(InMemoryPictureRepository::new(store.clone())), storage.clone());
        Fixture { store, storage, service }
    }

    fn file(category: Category) -> UploadedFile {
        UploadedFile {
            category,
            content_type: "image/jpeg".into(),
            data: Bytes::from_static(b"\xff\xd8\xff\xe0"),
        }
    }

    fn docs(categories: &[Category]) -> PictureDocumentationSet {
        categories
            .iter()
            .map(|c| {
                (
                    *c,
                    PictureDocumentation {
                        title: format!("{} view", c),
                        description: Some("description".into()),
                    },
                )
            })
            .collect()
    }

    fn messages(err: AppError) -> Vec<String> {
        assert_eq!(err.kind, ErrorKind::BadRequest);
        match err.message {
            Message::List(list) => list,
            Message::Single(single) => vec![single],
        }
    }

    #[test]
    fn matching_keys_pass_validation() {
        let files = vec![file(Category::Front), file(Category::Back)];
        assert!(PictureService::validate_documentation(&files, Some(&docs(&[Category::Front, Category::Back]))).is_ok());
    }

    #[test]
    fn every_mismatched_key_is_reported() {
        let files = vec![file(Category::Front), file(Category::Engine)];
        let documentation = docs(&[Category::Front, Category::Back, Category::Seat]);

        let err = PictureService::validate_documentation(&files, Some(&documentation)).unwrap_err();
        assert_eq!(err.detail.as_deref(), Some(msg::BAD_REQUEST));
        assert!(err.public);
        assert_eq!(
            messages(err),
            vec![
                "File is required for the following documentation pictures: BACK, SEAT".to_string(),
                "Documentation is required for the following files: ENGINE".to_string(),
            ]
        );
    }

    #[test]
    fn one_sided_input_names_the_present_keys() {
        let err = PictureService::validate_documentation(&[], Some(&docs(&[Category::Left]))).unwrap_err();
        assert_eq!(
            messages(err),
            vec!["File is required for the following documentation pictures: LEFT".to_string()]
        );

        let err = PictureService::validate_documentation(&[file(Category::Right)], None).unwrap_err();
        assert_eq!(
            messages(err),
            vec!["Documentation is required for the following files: RIGHT".to_string()]
        );
    }

    #[test]
    fn nothing_at_all_is_a_bad_request() {
        let err = PictureService::validate_documentation(&[], Some(&PictureDocumentationSet::new())).unwrap_err();
        assert_eq!(messages(err).len(), 2);
    }

    #[tokio::test]
    async fn create_uploads_and_persists_in_file_order() {
        let f = fixture();
        let files = vec![file(Category::Back), file(Category::Front)];

        let pictures = f
            .service
            .create(&files, &docs(&[Category::Front, Category::Back]), Some(3))
            .await
            .unwrap();

        let categories: Vec<Category> = pictures.iter().map(|p| p.category).collect();
        assert_eq!(categories, vec![Category::Back, Category::Front]);
        for picture in &pictures {
            assert!(f.storage.contains(&picture.key));
            assert_eq!(picture.car_id, Some(3));
            assert_eq!(picture.format, "image/jpeg");
            assert_eq!(picture.size, 4);
            assert!(picture.url.ends_with(&picture.key));
        }
        assert_eq!(f.store.picture_count(), 2);
    }

    #[tokio::test]
    async fn failed_upload_rolls_back_the_batch() {
        let f = fixture();
        f.storage.fail_uploads_after(1);
        let files = vec![file(Category::Front), file(Category::Back)];

        let err = f
            .service
            .create(&files, &docs(&[Category::Front, Category::Back]), Some(1))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::InternalServerError);
        assert_eq!(f.store.picture_count(), 0);
        assert!(f.storage.keys().is_empty());
        assert_eq!(f.storage.deleted_keys().len(), 1);
    }

    #[tokio::test]
    async fn failed_insert_removes_its_own_upload() {
        let f = fixture();
        f.store.fail_picture_inserts_after(1);
        let files = vec![file(Category::Front), file(Category::Back)];

        let err = f
            .service
            .create(&files, &docs(&[Category::Front, Category::Back]), None)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), msg::CREATE_ERROR);
        assert_eq!(f.store.picture_count(), 0);
        assert!(f.storage.keys().is_empty());
        assert_eq!(f.storage.deleted_keys().len(), 2);
    }

    #[tokio::test]
    async fn update_replaces_only_documented_categories() {
        let f = fixture();
        let originals = f
            .service
            .create(
                &[file(Category::Front), file(Category::Back)],
                &docs(&[Category::Front, Category::Back]),
                Some(1),
            )
            .await
            .unwrap();
        let old_front = originals.iter().find(|p| p.category == Category::Front).unwrap().clone();
        let old_back = originals.iter().find(|p| p.category == Category::Back).unwrap().clone();

        let replacements = f
            .service
            .update(&originals, &[file(Category::Front)], &docs(&[Category::Front]), Some(1))
            .await
            .unwrap();

        assert_eq!(replacements.len(), 1);
        let new_front = &replacements[0];
        assert_ne!(new_front.id, old_front.id);
        assert_ne!(new_front.key, old_front.key);
        assert!(!f.storage.contains(&old_front.key));
        assert!(f.storage.deleted_keys().contains(&old_front.key));
        assert!(f.storage.contains(&old_back.key));

        let ids: Vec<i32> = f.store.pictures().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![old_back.id, new_front.id]);
    }

    #[tokio::test]
    async fn update_validates_before_deleting_anything() {
        let f = fixture();
        let originals = f
            .service
            .create(&[file(Category::Front)], &docs(&[Category::Front]), Some(1))
            .await
            .unwrap();

        let err = f
            .service
            .update(&originals, &[], &docs(&[Category::Front]), Some(1))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::BadRequest);
        assert!(f.storage.contains(&originals[0].key));
        assert_eq!(f.store.picture_count(), 1);
    }

    #[tokio::test]
    async fn delete_removes_blob_then_row() {
        let f = fixture();
        let pictures = f
            .service
            .create(
                &[file(Category::Front), file(Category::Wheel)],
                &docs(&[Category::Front, Category::Wheel]),
                Some(2),
            )
            .await
            .unwrap();

        f.service.delete(&pictures).await.unwrap();

        assert_eq!(f.store.picture_count(), 0);
        let keys: Vec<String> = pictures.iter().map(|p| p.key.clone()).collect();
        assert_eq!(f.storage.deleted_keys(), keys);
    }

    #[tokio::test]
    async fn storage_failure_stops_deletion_before_the_row() {
        let f = fixture();
        let pictures = f
            .service
            .create(&[file(Category::Front)], &docs(&[Category::Front]), None)
            .await
            .unwrap();
        f.storage.fail_deletes(true);

        assert!(f.service.delete(&pictures).await.is_err());
        assert_eq!(f.store.picture_count(), 1);
    }

    #[tokio::test]
    async fn image_url_signs_the_stored_key() {
        let f = fixture();
        let pictures = f
            .service
            .create(&[file(Category::Trunk)], &docs(&[Category::Trunk]), None)
            .await
            .unwrap();

        let response = f.service.image_url(pictures[0].id).await.unwrap();
        assert_eq!(response.key, pictures[0].key);
        assert!(response.url.contains(&pictures[0].key));

        let missing = f.service.image_url(999).await.unwrap_err();
        assert_eq!(missing.to_string(), "Picture not found with ID 999");
    }

    #[tokio::test]
    async fn metadata_update_keeps_unspecified_fields() {
        let f = fixture();
        let pictures = f
            .service
            .create(&[file(Category::Seat)], &docs(&[Category::Seat]), Some(4))
            .await
            .unwrap();

        let updated = f
            .service
            .update_metadata(
                pictures[0].id,
                PictureChanges {
                    title: Some("new title".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.old_picture.title, "SEAT view");
        assert_eq!(updated.new_picture.title, "new title");
        assert_eq!(updated.new_picture.description.as_deref(), Some("description"));
        assert_eq!(updated.new_picture.car_id, Some(4));
    }
}
