//! Error types and error handling for the application
//!
//! Handler failures are represented by [`AppError`], which converts into a
//! plain text HTTP response. Store failures are logged with the user and the
//! operation that failed; the response body stays generic.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::store::StoreError;

/// Store operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    /// Listing the favorites set
    Fetch,
    /// Removing a movie from the set
    Remove,
    /// Adding a movie to the set
    Add,
}

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body is not a JSON object with an integer `id`
    #[error("Failed to decode request body")]
    BadRequest {
        /// User the request was made for
        user_id: String,
        /// Decoder error
        #[source]
        source: serde_json::Error,
    },

    /// The set store failed
    #[error("{}", .operation.failure_message())]
    Store {
        /// Operation that failed
        operation: StoreOperation,
        /// User the request was made for
        user_id: String,
        /// Underlying store error
        #[source]
        source: StoreError,
    },
}

impl StoreOperation {
    /// Response body sent when this operation fails
    pub fn failure_message(&self) -> &'static str {
        match self {
            StoreOperation::Fetch => "Failed to get favorites",
            StoreOperation::Remove => "Failed to remove movie from favorites",
            StoreOperation::Add => "Failed to add movie to favorites",
        }
    }

    /// Name used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreOperation::Fetch => "members",
            StoreOperation::Remove => "remove",
            StoreOperation::Add => "add",
        }
    }
}

impl AppError {
    /// Build a store error for `user_id`
    pub fn store(operation: StoreOperation, user_id: &str, source: StoreError) -> Self {
        AppError::Store {
            operation,
            user_id: user_id.to_string(),
            source,
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::BadRequest { user_id, source } => {
                warn!(user = %user_id, error = %source, "{}", self);
            }
            AppError::Store {
                operation,
                user_id,
                source,
            } => {
                error!(
                    user = %user_id,
                    operation = operation.as_str(),
                    error = %source,
                    "{}",
                    self
                );
            }
        }

        (self.status(), self.to_string()).into_response()
    }
}
