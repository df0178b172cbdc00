use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub use crate::entities::picture::Category;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Picture {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: Category,
    pub url: String,
    pub key: String,
    pub format: String,
    pub size: i64,
    pub car_id: Option<i32>,
}

/// Picture row about to be inserted; every storage-derived field is already known.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPicture {
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub url: String,
    pub key: String,
    pub format: String,
    pub size: i64,
    pub car_id: Option<i32>,
}

/// Partial picture; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PictureChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub car_id: Option<i32>,
}

/// Caller-supplied metadata paired with an uploaded file through its category key.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct PictureDocumentation {
    #[serde(default)]
    #[validate(custom(function = "crate::utils::validator_utils::validate_required"))]
    #[validate(length(min = 3, max = 100, message = "must be between 3 and 100 characters"))]
    pub title: String,

    #[validate(length(max = 500, message = "must be shorter than or equal to 500 characters"))]
    pub description: Option<String>,
}

pub type PictureDocumentationSet = BTreeMap<Category, PictureDocumentation>;

/// One file taken from a multipart category field.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub category: Category,
    pub content_type: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn size(&self) -> i64 {
        self.data.len() as i64
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePictureRequest {
    #[validate(length(min = 3, max = 100, message = "must be between 3 and 100 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 500, message = "must be shorter than or equal to 500 characters"))]
    pub description: Option<String>,
}

impl From<UpdatePictureRequest> for PictureChanges {
    fn from(request: UpdatePictureRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            car_id: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedPicture {
    pub old_picture: Picture,
    pub new_picture: Picture,
}

#[derive(Debug, Serialize)]
pub struct PictureUrlResponse {
    pub key: String,
    pub url: String,
}
