//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct which generates the OpenAPI specification
//! for the REST API: every HTTP endpoint from the inbound layer, the request
//! and response schemas those endpoints declare, and the session cookie
//! security scheme. The generated specification backs Swagger UI in debug
//! builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::activity::ActivityEntry;
use crate::domain::assignment::{BulkAssignOutcome, TransferRecord};
use crate::domain::case::Case;
use crate::domain::invite::InviteCode;
use crate::domain::legal::LegalDocument;
use crate::domain::message::CaseMessage;
use crate::domain::notification::Notification;
use crate::domain::payment::Payment;
use crate::domain::template::DocumentTemplate;
use crate::domain::user::User;
use crate::inbound::http::assignment::{AssignRequest, BulkAssignRequest, TransferRequest};
use crate::inbound::http::auth::{LoginRequest, RegisterRequest};
use crate::inbound::http::avatar::FinalizeAvatarRequest;
use crate::inbound::http::cases::{ChangeStatusRequest, CreateCaseRequest};
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::invites::CreateInviteRequest;
use crate::inbound::http::legal::PublishRequest;
use crate::inbound::http::messages::PostMessageRequest;
use crate::inbound::http::payments::{CreatePaymentRequest, CreatePaymentResponse};
use crate::inbound::http::templates::{RenderRequest, TemplateRequest};
use crate::inbound::http::users::UpdateStatusRequest;
use crate::inbound::http::webhooks::{InboundEmail, PaymentEvent};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Visaflow backend API",
        description = "HTTP interface for immigration case management: cases, \
                       messaging, assignment, billing, and notifications."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::users::me,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::update_status,
        crate::inbound::http::avatar::finalize_avatar,
        crate::inbound::http::cases::create_case,
        crate::inbound::http::cases::list_cases,
        crate::inbound::http::cases::get_case,
        crate::inbound::http::cases::change_status,
        crate::inbound::http::assignment::assign,
        crate::inbound::http::assignment::transfer,
        crate::inbound::http::assignment::unassign,
        crate::inbound::http::assignment::bulk_assign,
        crate::inbound::http::assignment::list_transfers,
        crate::inbound::http::messages::post_message,
        crate::inbound::http::messages::list_messages,
        crate::inbound::http::messages::mark_read,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::mark_read,
        crate::inbound::http::notifications::mark_all_read,
        crate::inbound::http::payments::create_payment,
        crate::inbound::http::payments::list_payments,
        crate::inbound::http::invites::create_invite,
        crate::inbound::http::invites::list_invites,
        crate::inbound::http::invites::revoke_invite,
        crate::inbound::http::templates::create_template,
        crate::inbound::http::templates::list_templates,
        crate::inbound::http::templates::get_template,
        crate::inbound::http::templates::update_template,
        crate::inbound::http::templates::delete_template,
        crate::inbound::http::templates::render_template,
        crate::inbound::http::legal::get_document,
        crate::inbound::http::legal::publish_document,
        crate::inbound::http::legal::list_versions,
        crate::inbound::http::activity::list_activity,
        crate::inbound::http::activity::run_seed,
        crate::inbound::http::webhooks::payment_webhook,
        crate::inbound::http::webhooks::email_webhook,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        User,
        Case,
        CaseMessage,
        Notification,
        Payment,
        InviteCode,
        DocumentTemplate,
        LegalDocument,
        ActivityEntry,
        TransferRecord,
        BulkAssignOutcome,
        ErrorEnvelope,
        RegisterRequest,
        LoginRequest,
        UpdateStatusRequest,
        FinalizeAvatarRequest,
        CreateCaseRequest,
        ChangeStatusRequest,
        AssignRequest,
        TransferRequest,
        BulkAssignRequest,
        PostMessageRequest,
        CreatePaymentRequest,
        CreatePaymentResponse,
        CreateInviteRequest,
        TemplateRequest,
        RenderRequest,
        PublishRequest,
        PaymentEvent,
        InboundEmail,
    )),
    tags(
        (name = "auth", description = "Registration, login, and logout"),
        (name = "users", description = "Account listing and administration"),
        (name = "cases", description = "Case lifecycle and assignment"),
        (name = "messages", description = "Per-case message threads"),
        (name = "notifications", description = "In-app notification inbox"),
        (name = "payments", description = "Case payments and billing"),
        (name = "invites", description = "Invite code administration"),
        (name = "templates", description = "Document templates"),
        (name = "legal", description = "Versioned legal documents"),
        (name = "activity", description = "Audit trail and seeding"),
        (name = "webhooks", description = "Provider callback endpoints"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated OpenAPI document structure.

    use super::*;

    #[test]
    fn document_registers_all_endpoint_groups() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for expected in [
            "/api/v1/auth/register",
            "/api/v1/auth/login",
            "/api/v1/users/me",
            "/api/v1/cases",
            "/api/v1/cases/{id}/assign",
            "/api/v1/cases/{id}/payments",
            "/api/v1/notifications",
            "/api/v1/invites",
            "/api/v1/templates/{id}/render",
            "/api/v1/legal/{slug}",
            "/webhooks/payments",
            "/health/ready",
        ] {
            assert!(paths.contains_key(expected), "missing path {expected}");
        }
    }

    #[test]
    fn document_carries_the_session_security_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components should exist");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
