use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Uniform envelope for every outcome: `{success, statusCode, message, payload?}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub status_code: u16,
    pub message: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A message is usually one sentence, but validation failures carry every violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Message {
    Single(String),
    List(Vec<String>),
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::Single(msg) => f.write_str(msg),
            Message::List(msgs) => f.write_str(&msgs.join("; ")),
        }
    }
}

impl From<String> for Message {
    fn from(value: String) -> Self {
        Message::Single(value)
    }
}

impl From<&str> for Message {
    fn from(value: &str) -> Self {
        Message::Single(value.to_string())
    }
}

impl From<Vec<String>> for Message {
    fn from(value: Vec<String>) -> Self {
        Message::List(value)
    }
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn new(status: StatusCode, message: impl Into<Message>, payload: Option<T>) -> Self {
        Self {
            success: status.is_success(),
            status_code: status.as_u16(),
            message: message.into(),
            payload,
            error: None,
        }
    }
}

// Wrapper to combine StatusCode and the Body
pub struct ApiResponseResult<T>(pub StatusCode, pub ApiResponse<T>);

impl<T> IntoResponse for ApiResponseResult<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        (self.0, Json(self.1)).into_response()
    }
}

pub struct ResponseBuilder;

impl ResponseBuilder {
    pub fn success<T: Serialize>(message: impl Into<Message>, payload: T) -> ApiResponseResult<T> {
        Self::create_response(StatusCode::OK, message, payload)
    }

    pub fn created<T: Serialize>(message: impl Into<Message>, payload: T) -> ApiResponseResult<T> {
        Self::create_response(StatusCode::CREATED, message, payload)
    }

    pub fn create_response<T: Serialize>(
        status_code: StatusCode,
        message: impl Into<Message>,
        payload: T,
    ) -> ApiResponseResult<T> {
        let message = message.into();
        tracing::debug!("Message: {}", message);
        ApiResponseResult(status_code, ApiResponse::new(status_code, message, Some(payload)))
    }
}

/// Semantic failure kinds, each bound to one HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InternalServerError,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
}

impl ErrorKind {
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

/// The one error type flowing out of repositories, services and extractors.
///
/// `detail` is the underlying cause (driver error, SDK error, short label). It
/// is only rendered to the client when the error is marked `public`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: Message,
    pub detail: Option<String>,
    pub public: bool,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<Message>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
            public: false,
        }
    }

    pub fn bad_request(message: impl Into<Message>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn not_found(message: impl Into<Message>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn unauthorized(message: impl Into<Message>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<Message>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    pub fn internal(message: impl Into<Message>, detail: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::InternalServerError, message).with_detail(detail)
    }

    pub fn with_detail(mut self, detail: impl std::fmt::Display) -> Self {
        self.detail = Some(detail.to_string());
        self
    }

    /// Expose `detail` as the envelope's `error` field.
    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind.status_code()
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(detail = ?self.detail, "Message: {}", self.message);
        } else {
            tracing::warn!(detail = ?self.detail, "Message: {}", self.message);
        }

        let body = ApiResponse::<()> {
            success: false,
            status_code: status.as_u16(),
            message: self.message,
            payload: None,
            error: if self.public { self.detail } else { None },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kinds_map_to_http_status() {
        assert_eq!(ErrorKind::InternalServerError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ErrorKind::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorKind::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorKind::NotFound.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn success_flag_follows_status() {
        let ok = ApiResponse::new(StatusCode::CREATED, "created", Some(1));
        assert!(ok.success);
        let failed = ApiResponse::<()>::new(StatusCode::NOT_FOUND, "missing", None);
        assert!(!failed.success);
    }

    #[test]
    fn envelope_omits_empty_payload() {
        let body = serde_json::to_value(ApiResponse::<()>::new(StatusCode::OK, "done", None)).unwrap();
        assert_eq!(body, json!({"success": true, "statusCode": 200, "message": "done"}));
    }

    #[test]
    fn validation_messages_serialize_as_list() {
        let body = serde_json::to_value(ApiResponse::new(
            StatusCode::BAD_REQUEST,
            vec!["a".to_string(), "b".to_string()],
            None::<()>,
        ))
        .unwrap();
        assert_eq!(body["message"], json!(["a", "b"]));
    }

    #[test]
    fn detail_is_hidden_unless_public() {
        let err = AppError::internal("Error creating car", "connection reset");
        assert_eq!(err.detail.as_deref(), Some("connection reset"));
        assert!(!err.public);
        assert!(err.clone().public().public);
        assert_eq!(err.to_string(), "Error creating car");
    }
}
