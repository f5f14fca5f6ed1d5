//! Payment creation plus the signed provider webhooks.

mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::json;
use sha2::{Digest, Sha256};

use backend::domain::case::CaseStatus;
use backend::domain::payment::PaymentStatus;
use backend::domain::ports::MessageRepository;
use backend::domain::user::Role;
use backend::inbound::http::webhooks::{EMAIL_SECRET_HEADER, SIGNATURE_HEADER};
use backend::inbound::http::{auth, payments, webhooks};

use support::{
    app_data, body_json, login, session_middleware, test_backend, EMAIL_WEBHOOK_SECRET,
    PAYMENT_WEBHOOK_SECRET,
};

macro_rules! payments_app {
    ($backend:expr) => {
        test::init_service(
            actix_web::App::new()
                .app_data(app_data(&$backend.state))
                .wrap(session_middleware())
                .service(auth::login)
                .service(payments::create_payment)
                .service(payments::list_payments)
                .service(webhooks::payment_webhook)
                .service(webhooks::email_webhook),
        )
        .await
    };
}

fn sign(secret: &str, body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(body.as_bytes());
    hex::encode(hasher.finalize())
}

fn signed_event(provider_ref: &str, status: &str) -> test::TestRequest {
    let body = json!({ "providerRef": provider_ref, "status": status }).to_string();
    test::TestRequest::post()
        .uri("/webhooks/payments")
        .insert_header(("content-type", "application/json"))
        .insert_header((SIGNATURE_HEADER, sign(PAYMENT_WEBHOOK_SECRET, &body)))
        .set_payload(body)
}

#[actix_web::test]
async fn client_creates_a_pending_payment_with_a_client_secret() {
    let backend = test_backend();
    let client = backend.seed_user("client@example.com", Role::Client);
    let case = backend.seed_case(&client);
    let app = payments_app!(backend);
    let cookie = login(&app, "client@example.com").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/cases/{}/payments", case.id))
            .cookie(cookie)
            .set_json(json!({ "amountCents": 15000, "currency": "eur" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = body_json(res).await;
    assert_eq!(body["data"]["payment"]["status"], "pending");
    assert_eq!(body["data"]["payment"]["currency"], "EUR");
    assert_eq!(body["data"]["payment"]["amountCents"], 15000);
    assert!(body["data"]["clientSecret"].as_str().expect("secret").starts_with("cs_test_"));
}

#[actix_web::test]
async fn only_the_cases_client_may_pay() {
    let backend = test_backend();
    let client = backend.seed_user("client@example.com", Role::Client);
    backend.seed_user("other@example.com", Role::Client);
    let case = backend.seed_case(&client);
    let app = payments_app!(backend);
    let cookie = login(&app, "other@example.com").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/cases/{}/payments", case.id))
            .cookie(cookie)
            .set_json(json!({ "amountCents": 5000, "currency": "EUR" }))
            .to_request(),
    )
    .await;
    // Non-participants cannot tell the case exists.
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn closed_cases_reject_new_payments() {
    let backend = test_backend();
    let client = backend.seed_user("client@example.com", Role::Client);
    let case = backend.seed_case_with_status(&client, CaseStatus::Closed);
    let app = payments_app!(backend);
    let cookie = login(&app, "client@example.com").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/cases/{}/payments", case.id))
            .cookie(cookie)
            .set_json(json!({ "amountCents": 5000, "currency": "EUR" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn webhook_applies_a_signed_status_change_and_replays_idempotently() {
    let backend = test_backend();
    let client = backend.seed_user("client@example.com", Role::Client);
    let case = backend.seed_case(&client);
    let app = payments_app!(backend);
    let cookie = login(&app, "client@example.com").await;

    let created = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/cases/{}/payments", case.id))
            .cookie(cookie)
            .set_json(json!({ "amountCents": 9000, "currency": "EUR" }))
            .to_request(),
    )
    .await;
    let created = body_json(created).await;
    let provider_ref = created["data"]["payment"]["providerRef"]
        .as_str()
        .expect("provider ref")
        .to_owned();

    let res = test::call_service(&app, signed_event(&provider_ref, "succeeded").to_request())
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["data"]["applied"], true);
    let stored = backend
        .payments
        .get_by_provider_ref(&provider_ref)
        .expect("payment kept");
    assert_eq!(stored.status, PaymentStatus::Succeeded);

    // Provider retries deliver the same event again.
    let replay = test::call_service(&app, signed_event(&provider_ref, "succeeded").to_request())
        .await;
    assert_eq!(replay.status(), StatusCode::OK);
    let replay = body_json(replay).await;
    assert_eq!(replay["data"]["applied"], false);

    // Succeeded never regresses to failed.
    let illegal = test::call_service(&app, signed_event(&provider_ref, "failed").to_request())
        .await;
    assert_eq!(illegal.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn webhook_rejects_missing_and_invalid_signatures() {
    let backend = test_backend();
    let app = payments_app!(backend);
    let body = json!({ "providerRef": "pi_test_0", "status": "succeeded" }).to_string();

    let missing = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/webhooks/payments")
            .insert_header(("content-type", "application/json"))
            .set_payload(body.clone())
            .to_request(),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let forged = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/webhooks/payments")
            .insert_header(("content-type", "application/json"))
            .insert_header((SIGNATURE_HEADER, sign("wrong-secret", &body)))
            .set_payload(body.clone())
            .to_request(),
    )
    .await;
    assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);

    // A valid signature over a tampered body also fails.
    let tampered = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/webhooks/payments")
            .insert_header(("content-type", "application/json"))
            .insert_header((SIGNATURE_HEADER, sign(PAYMENT_WEBHOOK_SECRET, &body)))
            .set_payload(body.replace("succeeded", "refunded"))
            .to_request(),
    )
    .await;
    assert_eq!(tampered.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn webhook_rejects_unknown_provider_references() {
    let backend = test_backend();
    let app = payments_app!(backend);

    let res = test::call_service(&app, signed_event("pi_nobody", "succeeded").to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn email_webhook_requires_the_shared_secret() {
    let backend = test_backend();
    let app = payments_app!(backend);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/webhooks/email")
            .insert_header((EMAIL_SECRET_HEADER, "wrong"))
            .set_json(json!({ "from": "anyone@example.com", "subject": "hi", "text": "hello" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn email_from_unknown_senders_is_accepted_and_dropped() {
    let backend = test_backend();
    let app = payments_app!(backend);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/webhooks/email")
            .insert_header((EMAIL_SECRET_HEADER, EMAIL_WEBHOOK_SECRET))
            .set_json(json!({ "from": "stranger@example.com", "subject": "hi", "text": "hello" }))
            .to_request(),
    )
    .await;
    // 202 and no hint that the address has no account.
    assert_eq!(res.status(), StatusCode::ACCEPTED);
}

#[actix_web::test]
async fn email_replies_land_on_the_senders_open_case() {
    let backend = test_backend();
    let client = backend.seed_user("client@example.com", Role::Client);
    let case = backend.seed_case(&client);
    let app = payments_app!(backend);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/webhooks/email")
            .insert_header((EMAIL_SECRET_HEADER, EMAIL_WEBHOOK_SECRET))
            .set_json(json!({
                "from": "client@example.com",
                "subject": "Additional documents",
                "text": "Attached are the payslips you asked for.",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["data"]["routed"], "case");

    let thread = backend
        .messages
        .list_for_case(&case.id)
        .await
        .expect("thread");
    assert_eq!(thread.len(), 1);
    assert!(thread[0].body.starts_with("Additional documents"));
    assert_eq!(thread[0].sender_id, client.id);
}
