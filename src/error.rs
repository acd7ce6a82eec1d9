//! Typed errors and HTTP mapping.

use crate::service::ValidationErrors;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Prefix of every "device not found" message.
pub const DEVICE_ID_NOT_FOUND: &str = "E00001";
/// Prefix of every message rejecting a change to a locked device.
pub const DEVICE_NOT_MODIFIABLE: &str = "E00101";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}' ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("schema migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{code}: Device with provided id {0} wasn't found", code = DEVICE_ID_NOT_FOUND)]
    NotFound(String),
    #[error(
        "{code}: name or brand fields cannot be updated due to IN_USE state of device with id {0}",
        code = DEVICE_NOT_MODIFIABLE
    )]
    InUseModification(Uuid),
    #[error(
        "{code}: device cannot be deleted due to IN_USE state, device id {0}",
        code = DEVICE_NOT_MODIFIABLE
    )]
    InUseDeletion(Uuid),
    #[error("{code}: device creation date update error, device id {0}", code = DEVICE_NOT_MODIFIABLE)]
    CreationTimeImmutable(Uuid),
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
    /// Body extraction failure that keeps the status chosen by axum (413, 415).
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

impl AppError {
    pub fn not_found(id: impl ToString) -> Self {
        AppError::NotFound(id.to_string())
    }

    /// PUT-create on an id that belonged to a deleted device.
    pub fn deleted_id(id: Uuid) -> Self {
        AppError::Conflict(format!("device id {} belonged to a deleted device and cannot be reused", id))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InUseModification(_)
            | AppError::InUseDeletion(_)
            | AppError::CreationTimeImmutable(_)
            | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Rejected { status, .. } => *status,
            AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::InUseModification(_)
            | AppError::InUseDeletion(_)
            | AppError::CreationTimeImmutable(_) => "device_not_modifiable",
            AppError::Validation(_) => "validation_error",
            AppError::Conflict(_) => "conflict",
            AppError::BadRequest(_) => "bad_request",
            AppError::Rejected { status, .. } => match *status {
                StatusCode::PAYLOAD_TOO_LARGE => "payload_too_large",
                StatusCode::UNSUPPORTED_MEDIA_TYPE => "unsupported_media_type",
                _ => "bad_request",
            },
            AppError::Db(_) => "storage_error",
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    /// Field name to violation message, present for validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let (message, details) = match &self {
            AppError::Db(e) => {
                tracing::error!(error = %e, "storage error");
                ("an unexpected error occurred".to_string(), None)
            }
            AppError::Validation(errors) => {
                tracing::warn!(code, error = %self, "request rejected");
                let fields = errors.fields();
                let details = (!fields.is_empty()).then(|| fields.clone());
                (self.to_string(), details)
            }
            _ => {
                tracing::warn!(code, error = %self, "request rejected");
                (self.to_string(), None)
            }
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_carries_error_code() {
        let err = AppError::not_found("9999");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "E00001: Device with provided id 9999 wasn't found");
    }

    #[test]
    fn in_use_errors_map_to_conflict() {
        let id = Uuid::nil();
        for err in [
            AppError::InUseModification(id),
            AppError::InUseDeletion(id),
            AppError::CreationTimeImmutable(id),
        ] {
            assert_eq!(err.status(), StatusCode::CONFLICT);
            assert_eq!(err.code(), "device_not_modifiable");
            assert!(err.to_string().starts_with(DEVICE_NOT_MODIFIABLE));
        }
    }

    #[test]
    fn storage_errors_are_opaque() {
        let err = AppError::Db(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn deleted_id_is_a_conflict() {
        let err = AppError::deleted_id(Uuid::nil());
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "conflict");
        assert!(err.to_string().contains("cannot be reused"));
    }

    #[test]
    fn rejected_keeps_status() {
        let err = AppError::Rejected {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "length limit exceeded".into(),
        };
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.code(), "payload_too_large");
    }
}
