use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

use crate::grid::GridError;
use crate::importer::ImportError;
use crate::store::StoreError;

/// Error returned by request handlers. The display text is what the client
/// sees in `{"message": ...}`.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{}", _0)]
    BadRequest(String),
    #[display(fmt = "{} not found", _0)]
    NotFound(&'static str),
    #[display(fmt = "{}", _0)]
    Import(ImportError),
    #[display(fmt = "{}", _0)]
    Grid(GridError),
    #[display(fmt = "Internal Server Error")]
    Store(StoreError),
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Import(ImportError::NoValidData) => StatusCode::BAD_REQUEST,
            ApiError::Import(ImportError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Grid(GridError::UnknownStudent(_)) => StatusCode::NOT_FOUND,
            ApiError::Grid(GridError::OutsideWindow(_) | GridError::WindowBounds) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Grid(GridError::Load(_) | GridError::Save(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl From<ImportError> for ApiError {
    fn from(e: ImportError) -> Self {
        ApiError::Import(e)
    }
}

impl From<GridError> for ApiError {
    fn from(e: GridError) -> Self {
        ApiError::Grid(e)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
