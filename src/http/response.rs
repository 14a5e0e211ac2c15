//! JSON envelopes returned by the log API.
//!
//! # Design Decisions
//! - Every API reply carries `code` and `msg`; payload goes in `data`
//!   (or `files` for the listing)
//! - Business failures keep a `300x` code; the HTTP status is 200 unless
//!   the request itself was malformed (400) or the disk failed (500)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::viewer::store::StoreError;

pub const SUCCESS_CODE: u16 = 200;
pub const SUCCESS_MSG: &str = "success";

/// Standard reply body.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: u16,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            msg: SUCCESS_MSG.to_string(),
            files: None,
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn files(files: Vec<String>) -> Self {
        Self {
            code: SUCCESS_CODE,
            msg: SUCCESS_MSG.to_string(),
            files: Some(files),
            data: None,
        }
    }

    pub fn empty() -> Self {
        Self {
            code: SUCCESS_CODE,
            msg: SUCCESS_MSG.to_string(),
            files: None,
            data: None,
        }
    }

    pub fn error(code: u16, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            files: None,
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Body of a `403` returned by the access gate.
#[derive(Debug, Serialize)]
pub struct AccessDenied {
    pub code: u16,
    pub message: String,
    pub your_ip: String,
}

impl AccessDenied {
    pub fn new(client_ip: &str) -> Self {
        Self {
            code: StatusCode::FORBIDDEN.as_u16(),
            message: format!("Access denied for IP: {}", client_ip),
            your_ip: client_ip.to_string(),
        }
    }
}

impl IntoResponse for AccessDenied {
    fn into_response(self) -> Response {
        (StatusCode::FORBIDDEN, Json(self)).into_response()
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            StoreError::MissingName | StoreError::InvalidName => StatusCode::BAD_REQUEST,
            StoreError::Io(e) => {
                tracing::error!(error = %e, "Log store I/O failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            StoreError::Disabled(_) | StoreError::NotFound => StatusCode::OK,
        };
        (status, Json(ApiResponse::error(self.code(), self.to_string()))).into_response()
    }
}
