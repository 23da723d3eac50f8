use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::store::StoreError;

/// Outcome returned to HTTP clients. Variants carry only client-safe text;
/// driver and crypto details are logged and dropped here.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("Service temporarily unavailable")]
    StorageUnavailable(#[source] sqlx::Error),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    /// Generic rejection for single-resource routes; also used when the
    /// resource exists but belongs to someone else.
    pub fn resource_not_found() -> Self {
        AppError::NotFound("Resource not found")
    }

    pub fn user_not_found() -> Self {
        AppError::NotFound("User not found")
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(field) => AppError::Conflict(format!("{field} already exists")),
            StoreError::Unavailable(e) => AppError::StorageUnavailable(e),
            StoreError::Backend(e) => AppError::Internal(e.into()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::from(e).into()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            AppError::StorageUnavailable(e) => warn!(error = %e, "storage unavailable"),
            AppError::Internal(e) => error!(error = %e, "internal error"),
            _ => {}
        }

        let mut response = (status, Json(json!({ "detail": self.to_string() }))).into_response();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            response
                .headers_mut()
                .insert(axum::http::header::RETRY_AFTER, axum::http::HeaderValue::from_static("1"));
        }
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                axum::http::header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::UniqueField;

    #[test]
    fn internal_errors_hide_driver_text() {
        let err = AppError::from(StoreError::Backend(sqlx::Error::Protocol(
            "relation \"users\" does not exist".into(),
        )));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn pool_timeout_maps_to_unavailable() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        let response = err.into_response();
        assert!(response.headers().contains_key(axum::http::header::RETRY_AFTER));
    }

    #[test]
    fn conflict_names_the_field() {
        let err = AppError::from(StoreError::Conflict(UniqueField::Email));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "email already exists");
    }
}
