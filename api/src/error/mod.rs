use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::db::DbError;
use crate::kv::KvError;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed `filters` parameter. The message is load-
    /// bearing for existing clients.
    #[error("Filter param is nil.")]
    FilterNil,
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Cache error: {0}")]
    Cache(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    fn code(&self) -> StatusCode {
        match self {
            ApiError::FilterNil | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Cache(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code();
        let body = Json(json!({
            "code": status.as_u16(),
            "msg": self.to_string(),
            "result": null,
        }));
        (status, body).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        ApiError::Database(err.to_string())
    }
}

impl From<KvError> for ApiError {
    fn from(err: KvError) -> Self {
        ApiError::Cache(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_nil_message_is_stable() {
        assert_eq!(ApiError::FilterNil.to_string(), "Filter param is nil.");
    }
}
