//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while letting Actix
//! handlers turn domain failures into the standard response envelope with
//! consistent status codes.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::domain::{Error, ErrorCode};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Error body in the standard response envelope.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorEnvelope {
    pub success: bool,
    #[schema(example = "invalid_request")]
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn envelope_for(error: &Error) -> ErrorEnvelope {
    // Internal messages may carry adapter detail; redact them.
    if matches!(error.code(), ErrorCode::InternalError) {
        ErrorEnvelope {
            success: false,
            code: ErrorCode::InternalError,
            message: "Internal server error".to_owned(),
            details: None,
        }
    } else {
        ErrorEnvelope {
            success: false,
            code: error.code(),
            message: error.message().to_owned(),
            details: error.details().cloned(),
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self.code(), ErrorCode::InternalError) {
            error!(message = %self.message(), "internal error surfaced to client");
        }
        HttpResponse::build(self.status_code()).json(envelope_for(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;
    use serde_json::{json, Value};

    use super::*;

    #[rstest]
    #[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthorized("who"), StatusCode::UNAUTHORIZED)]
    #[case(Error::forbidden("no"), StatusCode::FORBIDDEN)]
    #[case(Error::not_found("gone"), StatusCode::NOT_FOUND)]
    #[case(Error::conflict("busy"), StatusCode::CONFLICT)]
    #[case(Error::rate_limited("slow down"), StatusCode::TOO_MANY_REQUESTS)]
    #[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn codes_map_to_statuses(#[case] error: Error, #[case] expected: StatusCode) {
        assert_eq!(error.status_code(), expected);
    }

    #[test]
    fn internal_messages_are_redacted() {
        let envelope = envelope_for(&Error::internal("connection string leaked"));
        assert_eq!(envelope.message, "Internal server error");
        assert!(envelope.details.is_none());
    }

    #[test]
    fn envelope_carries_code_message_and_details() {
        let error = Error::conflict("already assigned").with_details(json!({ "agentId": "x" }));
        let body = serde_json::to_value(envelope_for(&error)).expect("serializable");
        assert_eq!(
            body,
            json!({
                "success": false,
                "code": "conflict",
                "message": "already assigned",
                "details": { "agentId": "x" },
            })
        );
        assert_eq!(body.get("success"), Some(&Value::Bool(false)));
    }
}
