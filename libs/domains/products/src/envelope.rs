//! Response envelope shared by every product endpoint
//!
//! Each request, successful or not, terminates in exactly one envelope whose
//! `code` doubles as the HTTP status code of the response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// Outcome marker carried in every envelope
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Uniform response body: status, HTTP-style code, message, optional payload
///
/// The `status` field is derived from `code`: it is [`ResponseStatus::Error`]
/// exactly when `code` is 400 or above. `data` is always present on the wire
/// and serializes as `null` when there is no payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Envelope<T> {
    /// "success" or "error", consistent with `code`
    pub status: ResponseStatus,
    /// HTTP status code of the response
    pub code: u16,
    /// Human-readable outcome description
    pub message: String,
    /// Payload, or `null` when the operation produced none
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    fn new(code: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        let status = if code.as_u16() >= 400 {
            ResponseStatus::Error
        } else {
            ResponseStatus::Success
        };

        Self {
            status,
            code: code.as_u16(),
            message: message.into(),
            data,
        }
    }

    /// Build a success envelope carrying a payload
    pub fn success(code: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self::new(code, message, Some(data))
    }

    /// Build an error envelope with no payload
    pub fn error(code: StatusCode, message: impl Into<String>) -> Self {
        Self::new(code, message, None)
    }

    /// The envelope's code as an HTTP status
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}
