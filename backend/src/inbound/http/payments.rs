//! Payment endpoints for case clients.
//!
//! ```text
//! POST /api/v1/cases/{id}/payments {"amountCents":15000,"currency":"EUR"}
//! GET /api/v1/cases/{id}/payments
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::case::CaseId;
use crate::domain::payment::Payment;
use crate::inbound::http::auth::current_user;
use crate::inbound::http::envelope;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub amount_cents: i64,
    pub currency: String,
}

/// Payment creation response: the stored record plus the browser secret.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentResponse {
    pub payment: Payment,
    pub client_secret: String,
}

/// Create a provider intent for a case payment.
#[utoipa::path(
    post,
    path = "/api/v1/cases/{id}/payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Pending payment with client secret", body = CreatePaymentResponse),
        (status = 400, description = "Closed case, bad amount, or bad currency"),
        (status = 404, description = "Unknown case, or not the case's client"),
        (status = 503, description = "Payment provider unavailable"),
    ),
    tags = ["payments"],
    operation_id = "createPayment"
)]
#[post("/cases/{id}/payments")]
pub async fn create_payment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<CreatePaymentRequest>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    let created = state
        .payments
        .create(
            &actor,
            CaseId::from_uuid(path.into_inner()),
            payload.amount_cents,
            &payload.currency,
        )
        .await?;
    Ok(envelope::created(CreatePaymentResponse {
        payment: created.payment,
        client_secret: created.client_secret,
    }))
}

/// A case's payments, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/cases/{id}/payments",
    responses(
        (status = 200, description = "Payments", body = [Payment]),
        (status = 404, description = "Unknown case, or the caller may not see it"),
    ),
    tags = ["payments"],
    operation_id = "listCasePayments"
)]
#[get("/cases/{id}/payments")]
pub async fn list_payments(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    let payments = state
        .payments
        .list_for_case(&actor, CaseId::from_uuid(path.into_inner()))
        .await?;
    Ok(envelope::ok(payments))
}
