use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::models::response::ApiResponse;

/// Everything the intake pipeline can fail with, tagged by stage so the
/// caller can tell infrastructure problems from bad submissions.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("server is not configured: {missing} is unset")]
    ServerMisconfigured { missing: &'static str },

    #[error("missing verification token")]
    MissingVerificationToken,

    #[error("verification service unreachable: {detail}")]
    VerificationNetworkError { detail: String },

    #[error("verification rejected")]
    VerificationRejected { codes: Vec<String> },

    #[error("submission failed validation")]
    ValidationFailed { problems: Vec<String> },

    #[error("delivery failed with upstream status {status}")]
    DeliveryFailed { status: u16, body: String },

    #[error("delivery failed: {detail}")]
    DeliveryNetworkError { detail: String },

    #[error("unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),
}

impl IntakeError {
    pub fn stage(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "method",
            Self::ServerMisconfigured { .. } => "config",
            Self::MissingVerificationToken | Self::ValidationFailed { .. } => "validation",
            Self::VerificationNetworkError { .. } | Self::VerificationRejected { .. } => {
                "turnstile"
            }
            Self::DeliveryFailed { .. } | Self::DeliveryNetworkError { .. } => "discord",
            Self::Unexpected(_) => "unexpected",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::ServerMisconfigured { .. } | Self::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::MissingVerificationToken
            | Self::VerificationRejected { .. }
            | Self::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            Self::VerificationNetworkError { .. }
            | Self::DeliveryFailed { .. }
            | Self::DeliveryNetworkError { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::VerificationNetworkError { detail } => {
                Some(json!({ "network_error": detail }))
            }
            Self::VerificationRejected { codes } if !codes.is_empty() => {
                Some(json!({ "error_codes": codes }))
            }
            Self::ValidationFailed { problems } => Some(json!({ "problems": problems })),
            Self::DeliveryFailed { status, body } => {
                Some(json!({ "upstream_status": status, "upstream_body": body }))
            }
            Self::DeliveryNetworkError { detail } => Some(json!({ "network_error": detail })),
            _ => None,
        }
    }
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        let body = ApiResponse::error(self.stage(), self.to_string(), self.details());
        (self.status_code(), Json(body)).into_response()
    }
}
