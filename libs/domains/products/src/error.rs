use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::envelope::Envelope;

/// Failure raised by a product store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Which operation was talking to the store when it failed
///
/// Selects the generic message returned to the client; the underlying
/// diagnostic detail is logged and never leaves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreAction {
    List,
    Retrieve,
    Create,
    Delete,
}

impl StoreAction {
    pub fn failure_message(&self) -> &'static str {
        match self {
            StoreAction::List => "list retrieval failed",
            StoreAction::Retrieve => "retrieval failed",
            StoreAction::Create => "creation failed",
            StoreAction::Delete => "deletion failed",
        }
    }
}

#[derive(Debug, Error)]
pub enum ProductError {
    /// Batch lookup called with an empty identifier list
    #[error("invalid identifier list")]
    EmptyIdentifierList,

    /// Batch lookup where no candidate survived the format check
    #[error("no valid identifiers")]
    NoValidIdentifiers,

    /// Create payload failed field validation; the detail is logged only
    #[error("missing or invalid fields")]
    InvalidFields(String),

    /// Deletion target is not a structurally valid identifier
    #[error("invalid identifier")]
    InvalidIdentifier(String),

    #[error("not found")]
    NotFound,

    /// Store call failed; the message depends on the running operation
    #[error("{}", .action.failure_message())]
    Store {
        action: StoreAction,
        #[source]
        source: StoreError,
    },
}

pub type ProductResult<T> = Result<T, ProductError>;

impl ProductError {
    /// Attach the operation context to a store failure
    pub fn store(action: StoreAction, source: StoreError) -> Self {
        ProductError::Store { action, source }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ProductError::EmptyIdentifierList
            | ProductError::NoValidIdentifiers
            | ProductError::InvalidFields(_)
            | ProductError::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
            ProductError::NotFound => StatusCode::NOT_FOUND,
            ProductError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        match &self {
            ProductError::Store { action, source } => {
                tracing::error!(error = %source, "{}", action.failure_message());
            }
            ProductError::InvalidFields(details) => {
                tracing::warn!("Create payload rejected: {}", details);
            }
            ProductError::InvalidIdentifier(id) => {
                tracing::warn!("Malformed product identifier: {}", id);
            }
            ProductError::EmptyIdentifierList | ProductError::NoValidIdentifiers => {
                tracing::info!("{}", self);
            }
            ProductError::NotFound => {
                tracing::info!("Product not found");
            }
        }

        Envelope::<()>::error(self.status_code(), self.to_string()).into_response()
    }
}
