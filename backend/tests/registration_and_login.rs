//! End-to-end coverage for invite-gated registration and session login.

mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

use backend::domain::invite::InviteCode;
use backend::domain::ports::UserRepository;
use backend::domain::user::{Role, UserId, UserStatus};
use backend::inbound::http::{auth, users};

use support::{app_data, body_json, session_middleware, test_backend, PASSWORD};

macro_rules! auth_app {
    ($backend:expr) => {
        test::init_service(
            actix_web::App::new()
                .app_data(app_data(&$backend.state))
                .wrap(session_middleware())
                .service(auth::register)
                .service(auth::login)
                .service(auth::logout)
                .service(users::me),
        )
        .await
    };
}

fn seeded_invite(backend: &support::TestBackend, role: Role, max_uses: u32) -> InviteCode {
    let mut rng = StdRng::seed_from_u64(7);
    let invite = InviteCode::generate(&mut rng, role, max_uses, None, UserId::random())
        .expect("valid invite");
    backend.invites.seed(invite.clone());
    invite
}

#[actix_web::test]
async fn registration_redeems_the_invite_and_opens_a_session() {
    let backend = test_backend();
    let invite = seeded_invite(&backend, Role::Client, 2);
    let app = auth_app!(backend);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "inviteCode": invite.code,
                "email": "newbie@example.com",
                "displayName": "New Client",
                "password": PASSWORD,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let cookie = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie issued")
        .into_owned();
    let body = body_json(res).await;
    assert_eq!(body["data"]["email"], "newbie@example.com");
    assert_eq!(body["data"]["role"], "client");

    // The session from registration works immediately.
    let me = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/users/me")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(me.status(), StatusCode::OK);

    let consumed = backend.invites.get(invite.id).expect("invite kept");
    assert_eq!(consumed.used_count, 1);
}

#[actix_web::test]
async fn unknown_invite_code_is_not_found() {
    let backend = test_backend();
    let app = auth_app!(backend);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "inviteCode": "NOSUCHCODE42",
                "email": "newbie@example.com",
                "displayName": "New Client",
                "password": PASSWORD,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = body_json(res).await;
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn exhausted_invite_conflicts() {
    let backend = test_backend();
    let mut rng = StdRng::seed_from_u64(7);
    let mut invite = InviteCode::generate(&mut rng, Role::Agent, 1, None, UserId::random())
        .expect("valid invite");
    invite.used_count = 1;
    backend.invites.seed(invite.clone());
    let app = auth_app!(backend);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "inviteCode": invite.code,
                "email": "late@example.com",
                "displayName": "Late Agent",
                "password": PASSWORD,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn duplicate_email_conflicts() {
    let backend = test_backend();
    let invite = seeded_invite(&backend, Role::Client, 5);
    backend.seed_user("taken@example.com", Role::Client);
    let app = auth_app!(backend);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "inviteCode": invite.code,
                "email": "taken@example.com",
                "displayName": "Second Account",
                "password": PASSWORD,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // The failed attempt must not burn an invite use.
    assert_eq!(backend.invites.get(invite.id).expect("invite").used_count, 0);
}

#[actix_web::test]
async fn short_passwords_are_rejected() {
    let backend = test_backend();
    let invite = seeded_invite(&backend, Role::Client, 1);
    let app = auth_app!(backend);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "inviteCode": invite.code,
                "email": "short@example.com",
                "displayName": "Short Password",
                "password": "short",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn login_rejects_wrong_password_and_unknown_email_alike() {
    let backend = test_backend();
    backend.seed_user("ada@example.com", Role::Client);
    let app = auth_app!(backend);

    for (email, password) in [
        ("ada@example.com", "not-the-password"),
        ("ghost@example.com", PASSWORD),
    ] {
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/auth/login")
                .set_json(json!({ "email": email, "password": password }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "invalid email or password");
    }
}

#[actix_web::test]
async fn suspended_accounts_cannot_log_in() {
    let backend = test_backend();
    let user = backend.seed_user("frozen@example.com", Role::Agent);
    backend
        .users
        .update_status(&user.id, UserStatus::Suspended)
        .await
        .expect("status update");
    let app = auth_app!(backend);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": "frozen@example.com", "password": PASSWORD }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn logout_invalidates_the_session() {
    let backend = test_backend();
    backend.seed_user("ada@example.com", Role::Client);
    let app = auth_app!(backend);
    let cookie = support::login(&app, "ada@example.com").await;

    let logout = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/logout")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(logout.status(), StatusCode::OK);
    // The purge response rewrites the cookie; the original value is dead.
    let cleared = logout
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("cleared cookie");
    let me = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/users/me")
            .cookie(cleared.into_owned())
            .to_request(),
    )
    .await;
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn me_requires_a_session() {
    let backend = test_backend();
    let app = auth_app!(backend);

    let res = test::call_service(&app, test::TestRequest::get().uri("/users/me").to_request())
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
