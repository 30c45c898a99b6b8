//! Application error type and its JSON rendering.
//!
//! Every handler returns `Result<_, AppError>`. Errors render as the
//! `{ "status": ..., "message": ... }` envelope:
//!
//! - `status` is `"fail"` for client errors (4xx) and `"error"` for server errors (5xx)
//! - in development mode the body additionally carries `error` (a stable code)
//!   and `details`
//! - in production mode internal errors are logged and replaced by a generic message

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;
use std::sync::OnceLock;

const GENERIC_INTERNAL_MESSAGE: &str = "Something went wrong, please try again later.";

const DUPLICATE_MESSAGE: &str = "Duplicate field value entered";
const INVALID_INPUT_MESSAGE: &str = "Invalid input data";

static EXPOSE_DETAILS: OnceLock<bool> = OnceLock::new();

/// Enables diagnostic detail in error responses.
///
/// Called once at startup from the configured environment. Later calls are ignored.
pub fn expose_details(enabled: bool) {
    let _ = EXPOSE_DETAILS.set(enabled);
}

fn details_exposed() -> bool {
    EXPOSE_DETAILS.get().copied().unwrap_or(false)
}

#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

#[derive(Debug)]
pub enum AppError {
    Validation { message: String, details: Value },
    Unauthorized { message: String, details: Value },
    Forbidden { message: String, details: Value },
    NotFound { message: String, details: Value },
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }
    pub fn forbidden(message: impl Into<String>, details: Value) -> Self {
        Self::Forbidden {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// A unique-constraint violation (`400 Duplicate field value entered`).
    pub fn duplicate(details: Value) -> Self {
        Self::bad_request(DUPLICATE_MESSAGE, details)
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::Unauthorized { .. } => "unauthorized",
            AppError::Forbidden { .. } => "forbidden",
            AppError::NotFound { .. } => "not_found",
            AppError::Internal { .. } => "internal_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Validation { message, .. }
            | AppError::Unauthorized { message, .. }
            | AppError::Forbidden { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Internal { message, .. } => message,
        }
    }

    /// Operational errors are expected, user-facing failures (everything but `Internal`).
    pub fn is_operational(&self) -> bool {
        !matches!(self, AppError::Internal { .. })
    }

    fn into_parts(self) -> (String, Value) {
        match self {
            AppError::Validation { message, details }
            | AppError::Unauthorized { message, details }
            | AppError::Forbidden { message, details }
            | AppError::NotFound { message, details }
            | AppError::Internal { message, details } => (message, details),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let operational = self.is_operational();
        let (message, details) = self.into_parts();

        if !operational {
            tracing::error!(%message, %details, "Internal error");
        }

        let body = if details_exposed() {
            ErrorBody {
                status: envelope_status(status),
                message,
                error: Some(code),
                details: Some(details),
            }
        } else {
            ErrorBody {
                status: envelope_status(status),
                message: if operational {
                    message
                } else {
                    GENERIC_INTERNAL_MESSAGE.to_string()
                },
                error: None,
                details: None,
            }
        };

        (status, Json(body)).into_response()
    }
}

fn envelope_status(status: StatusCode) -> &'static str {
    if status.is_server_error() {
        "error"
    } else {
        "fail"
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
            })
            .collect();
        messages.sort();

        AppError::bad_request(messages.join(", "), json!({ "fields": errors }))
    }
}

/// Maps database errors onto the HTTP taxonomy.
///
/// Unique violations become `400 Duplicate field value entered` and check
/// violations `400 Invalid input data`; everything else is an internal error.
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return AppError::duplicate(json!({ "constraint": db.constraint() }));
        }
        if db.is_check_violation() {
            return AppError::bad_request(
                INVALID_INPUT_MESSAGE,
                json!({ "constraint": db.constraint(), "reason": db.message() }),
            );
        }
    }

    if matches!(e, sqlx::Error::RowNotFound) {
        return AppError::not_found("Document not found", json!({}));
    }

    AppError::internal("Database error", json!({ "reason": e.to_string() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_client_error_envelope() {
        let (status, body) =
            body_json(AppError::not_found("No tour found with that ID", json!({}))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], "No tour found with that ID");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::bad_request("x", json!({})).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::unauthorized("x", json!({})).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::forbidden("x", json!({})).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::internal("x", json!({})).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_operational_classification() {
        assert!(AppError::bad_request("x", json!({})).is_operational());
        assert!(!AppError::internal("x", json!({})).is_operational());
    }

    #[test]
    fn test_row_not_found_maps_to_404() {
        let err = map_sqlx_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[derive(Debug)]
    struct ConstraintViolation(sqlx::error::ErrorKind);

    impl std::fmt::Display for ConstraintViolation {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("constraint violated")
        }
    }

    impl std::error::Error for ConstraintViolation {}

    impl sqlx::error::DatabaseError for ConstraintViolation {
        fn message(&self) -> &str {
            "new row violates check constraint \"tours_check\""
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            match self.0 {
                sqlx::error::ErrorKind::UniqueViolation => sqlx::error::ErrorKind::UniqueViolation,
                sqlx::error::ErrorKind::CheckViolation => sqlx::error::ErrorKind::CheckViolation,
                _ => sqlx::error::ErrorKind::Other,
            }
        }
    }

    fn database_error(kind: sqlx::error::ErrorKind) -> sqlx::Error {
        sqlx::Error::Database(Box::new(ConstraintViolation(kind)))
    }

    #[test]
    fn test_constraint_violations_map_to_400() {
        let err = map_sqlx_error(database_error(sqlx::error::ErrorKind::UniqueViolation));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), DUPLICATE_MESSAGE);

        let err = map_sqlx_error(database_error(sqlx::error::ErrorKind::CheckViolation));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), INVALID_INPUT_MESSAGE);

        let err = map_sqlx_error(database_error(sqlx::error::ErrorKind::Other));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_envelope_status() {
        assert_eq!(envelope_status(StatusCode::BAD_REQUEST), "fail");
        assert_eq!(envelope_status(StatusCode::INTERNAL_SERVER_ERROR), "error");
    }
}
