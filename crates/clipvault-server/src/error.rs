use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use clipvault_error::{Error, ErrorKind};
use serde::Serialize;
use serde_json::json;

/// Wire shape for every failure:
/// `{timestamp, status, error, message, details?}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Edge-side error wrapper: a status plus the serialized body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            body: ErrorBody {
                timestamp: Utc::now(),
                status: 401,
                error: "Unauthorized",
                message: "missing or invalid bearer credential".to_string(),
                details: None,
            },
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        let kind: ErrorKind = e.kind();
        let status_code = kind.http_status();
        let details = match &e {
            Error::QuotaExceeded { current, max } => {
                Some(json!({ "current": current, "max": max }))
            }
            _ => None,
        };
        // Server-side failures keep their diagnostics in the log, not the
        // response body.
        let message = if status_code >= 500 {
            tracing::error!(error = %e, "request failed");
            "internal error".to_string()
        } else {
            e.to_string()
        };
        Self {
            status: StatusCode::from_u16(status_code)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: ErrorBody {
                timestamp: Utc::now(),
                status: status_code,
                error: kind.as_str(),
                message,
                details,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipvault_error::ValidationError;

    #[test]
    fn quota_errors_carry_current_and_max() {
        let api: ApiError = Error::QuotaExceeded { current: 3, max: 3 }.into();
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.body.details.unwrap();
        assert_eq!(details["current"], 3);
        assert_eq!(details["max"], 3);
    }

    #[test]
    fn duplicate_maps_to_conflict() {
        let api: ApiError = Error::Duplicate.into();
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert_eq!(api.body.error, "Duplicate");
    }

    #[test]
    fn not_ready_is_hidden_behind_not_found() {
        let api: ApiError = Error::NotReady.into();
        assert_eq!(api.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_messages_are_not_leaked() {
        let api: ApiError =
            Error::Internal(clipvault_error::InternalError::store("connection refused")).into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.body.message, "internal error");
    }

    #[test]
    fn validation_messages_are_forwarded() {
        let api: ApiError = Error::Validation(ValidationError::EmptyContent).into();
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert!(api.body.message.contains("empty"));
    }

    #[test]
    fn error_kind_statuses_round_trip() {
        for kind in [
            ErrorKind::BadRequest,
            ErrorKind::Duplicate,
            ErrorKind::NotFound,
            ErrorKind::Busy,
        ] {
            assert!(StatusCode::from_u16(kind.http_status()).is_ok());
        }
    }
}
