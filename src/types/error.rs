use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Errors surfaced by the storage layer and the preview engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrowseError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("access denied: {0}")]
    AccessDenied(String),
    #[error("object store unavailable: {0}")]
    Unavailable(String),
    #[error("object is {size} bytes, above the preview limit of {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
    #[error("cannot preview: {0}")]
    DecodeError(String),
    #[error("page {page} is outside 1..={max_page}")]
    InvalidPage { page: u64, max_page: u64 },
    #[error("page size {page_size} is outside {min}..={max}")]
    InvalidPageSize { page_size: u64, min: u64, max: u64 },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response format
#[derive(Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
    request_id: String,
    retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_page: Option<u64>,
}

impl BrowseError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BrowseError::NotFound(_) => StatusCode::NOT_FOUND,
            BrowseError::AccessDenied(_) => StatusCode::FORBIDDEN,
            BrowseError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            BrowseError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            BrowseError::DecodeError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BrowseError::InvalidPage { .. } => StatusCode::BAD_REQUEST,
            BrowseError::InvalidPageSize { .. } => StatusCode::BAD_REQUEST,
            BrowseError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            BrowseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            BrowseError::NotFound(_) => "NotFound",
            BrowseError::AccessDenied(_) => "AccessDenied",
            BrowseError::Unavailable(_) => "Unavailable",
            BrowseError::TooLarge { .. } => "TooLarge",
            BrowseError::DecodeError(_) => "DecodeError",
            BrowseError::InvalidPage { .. } => "InvalidPage",
            BrowseError::InvalidPageSize { .. } => "InvalidPageSize",
            BrowseError::InvalidRequest(_) => "InvalidRequest",
            BrowseError::Internal(_) => "InternalError",
        }
    }

    /// Whether retrying the whole operation later may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, BrowseError::Unavailable(_))
    }
}

impl IntoResponse for BrowseError {
    fn into_response(self) -> Response {
        let (size, limit) = match &self {
            BrowseError::TooLarge { size, limit } => (Some(*size), Some(*limit)),
            _ => (None, None),
        };
        let max_page = match &self {
            BrowseError::InvalidPage { max_page, .. } => Some(*max_page),
            _ => None,
        };

        let body = ErrorResponse {
            code: self.error_code(),
            message: self.to_string(),
            request_id: uuid::Uuid::new_v4().to_string(),
            retryable: self.is_transient(),
            size,
            limit,
            max_page,
        };

        (self.status_code(), Json(body)).into_response()
    }
}
