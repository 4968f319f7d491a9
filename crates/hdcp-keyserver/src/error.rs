//! Server and request error types.

use std::io;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hdcp_keys::HdcpError;
use thiserror::Error;

/// Errors that prevent the server from starting or keep it from serving.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Master key could not be loaded.
    ///
    /// Fatal at startup. Fix the key file and restart.
    #[error("key material error: {0}")]
    KeyMaterial(#[from] HdcpError),

    /// Bind or accept failure.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),
}

/// A failed key request.
///
/// Unknown roles map to 404 since only `source` and `sink` routes exist.
/// Malformed or non-conforming KSVs map to 400.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct ApiError(#[from] HdcpError);

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            HdcpError::UnknownRole(_) => StatusCode::NOT_FOUND,
            err if err.is_input_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Key request failed: {}", self.0);
        } else {
            tracing::debug!("Rejected key request: {}", self.0);
        }

        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::from(HdcpError::UnknownRole("repeater".to_string())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(HdcpError::InvalidKsvFormat { input: "zz".to_string(), reason: "x" })
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(HdcpError::InvalidKsvWeight { ksv: 3, weight: 2 }).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(HdcpError::AgreementMismatch { sink_secret: 0, source_secret: 1 })
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn server_error_display() {
        let err = ServerError::from(io::Error::other("address in use"));
        assert_eq!(err.to_string(), "transport error: address in use");
    }
}
