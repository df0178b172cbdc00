use axum::{
    extract::{FromRequest, FromRequestParts, Multipart, Path, Query, Request},
    http::{header, request::Parts},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::str::FromStr;
use validator::Validate;

use crate::models::car_model::{CreateCarRequest, UpdateCarRequest};
use crate::models::messages::upload;
use crate::models::picture_model::{Category, PictureDocumentationSet, UploadedFile};
use crate::utils::api_response::AppError;
use crate::utils::validator_utils::flatten_validation_errors;

const VALID_FILE_TYPES: [&str; 4] = ["jpg", "jpeg", "png", "webp"];
const INTEGER_FIELDS: [&str; 4] = ["year", "mileage", "seats", "pricePerDay"];
const BOOLEAN_FIELDS: [&str; 1] = ["available"];

pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|err| AppError::bad_request(format!("Invalid JSON format: {}", err.body_text())))?;

        validate_payload(&payload, None)?;

        Ok(ValidatedJson(payload))
    }
}

pub struct ValidatedPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|err| AppError::bad_request(err.body_text()))?;
        Ok(ValidatedPath(value))
    }
}

pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|err| AppError::bad_request(err.body_text()))?;

        validate_payload(&value, None)?;

        Ok(ValidatedQuery(value))
    }
}

/// Car payloads carry picture documentation that is validated alongside the car fields.
pub trait Documented: DeserializeOwned + Validate + Send {
    fn documentation(&self) -> Option<&PictureDocumentationSet>;
}

impl Documented for CreateCarRequest {
    fn documentation(&self) -> Option<&PictureDocumentationSet> {
        self.pictures()
    }
}

impl Documented for UpdateCarRequest {
    fn documentation(&self) -> Option<&PictureDocumentationSet> {
        self.pictures()
    }
}

/// Car fields plus per-category files.
///
/// Accepts `multipart/form-data` (files and text fields) or a plain JSON body
/// when no files are sent.
pub struct CarForm<T> {
    pub payload: T,
    pub files: Vec<UploadedFile>,
}

impl<T, S> FromRequest<S> for CarForm<T>
where
    T: Documented,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.starts_with("multipart/form-data"))
            .unwrap_or(false);

        let (fields, files) = if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|err| AppError::bad_request(err.body_text()))?;
            read_multipart(multipart).await?
        } else {
            let Json(fields) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|err| AppError::bad_request(format!("Invalid JSON format: {}", err.body_text())))?;
            (fields, Vec::new())
        };

        let payload: T = serde_json::from_value(fields)
            .map_err(|err| AppError::bad_request(format!("{}: {}", upload::INVALID_FORM, err)))?;

        validate_payload(&payload, payload.documentation())?;

        Ok(CarForm { payload, files })
    }
}

/// Runs derive validation on the payload and every documentation entry,
/// collecting all violations into one `BadRequest`.
fn validate_payload<T: Validate>(
    payload: &T,
    documentation: Option<&PictureDocumentationSet>,
) -> Result<(), AppError> {
    let mut messages = match payload.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => flatten_validation_errors(&errors, ""),
    };

    for (category, doc) in documentation.into_iter().flatten() {
        if let Err(errors) = doc.validate() {
            messages.extend(flatten_validation_errors(&errors, &format!("pictures.{}", category)));
        }
    }

    if messages.is_empty() {
        Ok(())
    } else {
        Err(AppError::bad_request(messages).with_detail("Bad Request").public())
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<(Value, Vec<UploadedFile>), AppError> {
    let mut fields = Map::new();
    let mut pictures = Map::new();
    let mut files: Vec<UploadedFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(err.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if field.file_name().is_some() {
            let content_type = field.content_type().map(str::to_string);
            let category = check_file(&name, content_type.as_deref())?;
            if files.iter().any(|f| f.category == category) {
                return Err(AppError::bad_request(format!("{}: {}", upload::DUPLICATE_CATEGORY, name)));
            }
            let data = field
                .bytes()
                .await
                .map_err(|err| AppError::bad_request(err.body_text()))?;
            files.push(UploadedFile {
                category,
                content_type: content_type.unwrap_or_default(),
                data,
            });
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|err| AppError::bad_request(err.body_text()))?;

        if name == "pictures" {
            let parsed: Value = serde_json::from_str(&text)
                .map_err(|err| AppError::bad_request(format!("{}: pictures {}", upload::INVALID_FORM, err)))?;
            if let Value::Object(entries) = parsed {
                pictures.extend(entries);
            }
        } else if let Some((category, key)) = documentation_key(&name) {
            let entry = pictures
                .entry(category.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(entry) = entry {
                entry.insert(key.to_string(), Value::String(text));
            }
        } else {
            fields.insert(name.clone(), coerce(&name, text));
        }
    }

    if !pictures.is_empty() {
        fields.insert("pictures".to_string(), Value::Object(pictures));
    }

    Ok((Value::Object(fields), files))
}

/// Checks MIME type then field name, in that order.
fn check_file(field_name: &str, content_type: Option<&str>) -> Result<Category, AppError> {
    let mime = match content_type {
        Some(mime) if !mime.is_empty() => mime,
        _ => return Err(AppError::internal(upload::NO_MIME_TYPE, field_name)),
    };

    if !VALID_FILE_TYPES.iter().any(|ext| mime.ends_with(ext)) {
        return Err(AppError::bad_request(format!("{}: {}", upload::INVALID_FILE_TYPE, mime))
            .with_detail(format!("{} {}", upload::VALID_FILE_TYPES, VALID_FILE_TYPES.join(", ")))
            .public());
    }

    Category::from_str(field_name).map_err(|_| {
        AppError::bad_request(format!("{}: {}", upload::INVALID_FIELD_NAME, field_name))
            .with_detail(format!("{} {}", upload::VALID_FIELD_NAMES, Category::names().join(", ")))
            .public()
    })
}

/// `pictures[FRONT][title]` -> `("FRONT", "title")`
fn documentation_key(name: &str) -> Option<(&str, &str)> {
    let rest = name.strip_prefix("pictures[")?.strip_suffix(']')?;
    let (category, key) = rest.split_once("][")?;
    Some((category, key))
}

fn coerce(name: &str, text: String) -> Value {
    if INTEGER_FIELDS.contains(&name) {
        if let Ok(number) = text.trim().parse::<i64>() {
            return Value::from(number);
        }
    } else if BOOLEAN_FIELDS.contains(&name) {
        return Value::Bool(text == "true");
    }
    Value::String(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::picture_model::PictureDocumentation;
    use axum::http::StatusCode;

    #[test]
    fn documentation_keys_are_split() {
        assert_eq!(documentation_key("pictures[FRONT][title]"), Some(("FRONT", "title")));
        assert_eq!(documentation_key("pictures[BACK][description]"), Some(("BACK", "description")));
        assert_eq!(documentation_key("make"), None);
        assert_eq!(documentation_key("pictures[FRONT]"), None);
    }

    #[test]
    fn form_values_are_coerced() {
        assert_eq!(coerce("year", "2018".into()), Value::from(2018));
        assert_eq!(coerce("pricePerDay", " 50 ".into()), Value::from(50));
        assert_eq!(coerce("available", "true".into()), Value::Bool(true));
        assert_eq!(coerce("available", "yes".into()), Value::Bool(false));
        assert_eq!(coerce("seats", "many".into()), Value::String("many".into()));
        assert_eq!(coerce("make", "Toyota".into()), Value::String("Toyota".into()));
    }

    #[test]
    fn file_checks_follow_mime_then_field_name() {
        assert_eq!(check_file("FRONT", Some("image/jpeg")).unwrap(), Category::Front);

        let missing = check_file("FRONT", None).unwrap_err();
        assert_eq!(missing.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(missing.to_string(), "No mime type found");

        let bad_type = check_file("ROOF", Some("application/pdf")).unwrap_err();
        assert_eq!(bad_type.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(bad_type.to_string(), "Invalid file type: application/pdf");

        let bad_name = check_file("ROOF", Some("image/png")).unwrap_err();
        assert_eq!(bad_name.to_string(), "Invalid field name: ROOF");
        assert!(bad_name.detail.unwrap().contains("FRONT, BACK"));
    }

    #[test]
    fn documentation_violations_are_prefixed_by_category() {
        let mut docs = PictureDocumentationSet::new();
        docs.insert(
            Category::Front,
            PictureDocumentation {
                title: "ab".into(),
                description: None,
            },
        );
        let request: UpdateCarRequest = serde_json::from_value(serde_json::json!({"seats": 0})).unwrap();

        let err = validate_payload(&request, Some(&docs)).unwrap_err();
        let messages = match err.message {
            crate::utils::api_response::Message::List(list) => list,
            other => panic!("unexpected message {:?}", other),
        };
        assert_eq!(
            messages,
            vec![
                "seats must be at least 1".to_string(),
                "pictures.FRONT.title must be between 3 and 100 characters".to_string(),
            ]
        );
    }
}
