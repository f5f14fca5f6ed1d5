//! Standard success envelope wrapping API payloads.
//!
//! Every endpoint responds with `{ "success": …, "data": …, "message": … }`;
//! errors use the same shape via the [`crate::inbound::http::error`] mapping,
//! so clients can branch on `success` without inspecting status codes.

use actix_web::HttpResponse;
use serde::Serialize;
use utoipa::ToSchema;

/// Success payload wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    /// Wrap a payload.
    pub fn of(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Wrap a payload with a human-readable message.
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

/// `200 OK` with the enveloped payload.
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(Envelope::of(data))
}

/// `201 Created` with the enveloped payload.
pub fn created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(Envelope::of(data))
}

/// `202 Accepted` with a message and no payload.
pub fn accepted(message: impl Into<String>) -> HttpResponse {
    HttpResponse::Accepted().json(Envelope {
        success: true,
        data: None::<()>,
        message: Some(message.into()),
    })
}
