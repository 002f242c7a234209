use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::models::ApiResponse;

/// Raised by the ingestion layer when a history row cannot be turned into a
/// `MatchRecord`. Rows are numbered from 1, excluding the header.
#[derive(Debug, Error)]
pub enum DataFormatError {
    #[error("failed to read match history: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("row {row}: missing value for `{column}`")]
    MissingField { row: usize, column: &'static str },

    #[error("row {row}: unparseable date `{value}`")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: `{column}` must be a non-negative integer, got `{value}`")]
    InvalidGoals {
        row: usize,
        column: &'static str,
        value: String,
    },
}

#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("cannot fit a classifier on an empty training set")]
    EmptyTrainingSet,

    #[error("feature/label length mismatch: {features} features, {labels} labels")]
    LengthMismatch { features: usize, labels: usize },

    #[error("sampling failed: {0}")]
    Sampling(String),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(msg) = &self {
            tracing::error!("Request failed: {}", msg);
        }
        let body = Json(ApiResponse::<()>::error(self.to_string()));
        (self.status_code(), body).into_response()
    }
}
