//! Assignment, transfer, and unassignment flows across roles.

mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::json;

use backend::domain::case::CaseStatus;
use backend::domain::ports::{CaseRepository, UserRepository};
use backend::domain::user::{Role, UserStatus};
use backend::inbound::http::{assignment, auth};

use support::{app_data, body_json, login, session_middleware, test_backend};

macro_rules! assignment_app {
    ($backend:expr) => {
        test::init_service(
            actix_web::App::new()
                .app_data(app_data(&$backend.state))
                .wrap(session_middleware())
                .service(auth::login)
                .service(assignment::assign)
                .service(assignment::transfer)
                .service(assignment::unassign)
                .service(assignment::bulk_assign)
                .service(assignment::list_transfers),
        )
        .await
    };
}

#[actix_web::test]
async fn first_assignment_moves_the_case_into_review() {
    let backend = test_backend();
    backend.seed_user("admin@example.com", Role::Admin);
    let agent = backend.seed_user("agent@example.com", Role::Agent);
    let client = backend.seed_user("client@example.com", Role::Client);
    let case = backend.seed_case(&client);
    let app = assignment_app!(backend);
    let cookie = login(&app, "admin@example.com").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/cases/{}/assign", case.id))
            .cookie(cookie)
            .set_json(json!({ "agentId": agent.id }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["data"]["status"], "under_review");
    assert_eq!(body["data"]["assignedAgentId"], agent.id.to_string());
    assert!(backend.activity.actions().contains(&"case_assigned".to_owned()));
}

#[actix_web::test]
async fn agents_cannot_assign_cases() {
    let backend = test_backend();
    let agent = backend.seed_user("agent@example.com", Role::Agent);
    let client = backend.seed_user("client@example.com", Role::Client);
    let case = backend.seed_case(&client);
    let app = assignment_app!(backend);
    let cookie = login(&app, "agent@example.com").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/cases/{}/assign", case.id))
            .cookie(cookie)
            .set_json(json!({ "agentId": agent.id }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn assignment_preconditions_fail_in_order() {
    let backend = test_backend();
    backend.seed_user("admin@example.com", Role::Admin);
    let agent = backend.seed_user("agent@example.com", Role::Agent);
    let suspended = backend.seed_user("gone@example.com", Role::Agent);
    backend
        .users
        .update_status(&suspended.id, UserStatus::Suspended)
        .await
        .expect("status update");
    let client = backend.seed_user("client@example.com", Role::Client);
    let open_case = backend.seed_case(&client);
    let closed_case = backend.seed_case_with_status(&client, CaseStatus::Closed);
    let app = assignment_app!(backend);
    let cookie = login(&app, "admin@example.com").await;

    // Unknown case.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/cases/{}/assign", uuid::Uuid::new_v4()))
            .cookie(cookie.clone())
            .set_json(json!({ "agentId": agent.id }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Terminal case.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/cases/{}/assign", closed_case.id))
            .cookie(cookie.clone())
            .set_json(json!({ "agentId": agent.id }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Target is not an agent.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/cases/{}/assign", open_case.id))
            .cookie(cookie.clone())
            .set_json(json!({ "agentId": client.id }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Target agent is suspended.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/cases/{}/assign", open_case.id))
            .cookie(cookie.clone())
            .set_json(json!({ "agentId": suspended.id }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // A repeated assignment to the same agent conflicts.
    for expected in [StatusCode::OK, StatusCode::CONFLICT] {
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/cases/{}/assign", open_case.id))
                .cookie(cookie.clone())
                .set_json(json!({ "agentId": agent.id }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), expected);
    }
}

#[actix_web::test]
async fn transfer_records_history_and_notifies() {
    let backend = test_backend();
    let admin = backend.seed_user("admin@example.com", Role::Admin);
    let first = backend.seed_user("first@example.com", Role::Agent);
    let second = backend.seed_user("second@example.com", Role::Agent);
    let client = backend.seed_user("client@example.com", Role::Client);
    let mut case = backend.seed_case_with_status(&client, CaseStatus::UnderReview);
    case.assigned_agent_id = Some(first.id);
    backend
        .cases
        .update(&case)
        .await
        .expect("seed assignment");
    let app = assignment_app!(backend);
    let cookie = login(&app, "admin@example.com").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/cases/{}/transfer", case.id))
            .cookie(cookie.clone())
            .set_json(json!({ "agentId": second.id, "reason": "workload balancing" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["data"]["assignedAgentId"], second.id.to_string());

    let history = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/cases/{}/transfers", case.id))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(history.status(), StatusCode::OK);
    let history = body_json(history).await;
    let records = history["data"].as_array().expect("transfer array");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["fromAgentId"], first.id.to_string());
    assert_eq!(records[0]["toAgentId"], second.id.to_string());
    assert_eq!(records[0]["reason"], "workload balancing");
    assert_eq!(records[0]["transferredBy"], admin.id.to_string());
}

#[actix_web::test]
async fn transfer_requires_an_existing_assignment_and_a_reason() {
    let backend = test_backend();
    backend.seed_user("admin@example.com", Role::Admin);
    let agent = backend.seed_user("agent@example.com", Role::Agent);
    let client = backend.seed_user("client@example.com", Role::Client);
    let unassigned = backend.seed_case(&client);
    let app = assignment_app!(backend);
    let cookie = login(&app, "admin@example.com").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/cases/{}/transfer", unassigned.id))
            .cookie(cookie.clone())
            .set_json(json!({ "agentId": agent.id, "reason": "" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/cases/{}/transfer", unassigned.id))
            .cookie(cookie)
            .set_json(json!({ "agentId": agent.id, "reason": "still unassigned" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn unassign_clears_the_agent_and_conflicts_when_already_clear() {
    let backend = test_backend();
    backend.seed_user("admin@example.com", Role::Admin);
    let agent = backend.seed_user("agent@example.com", Role::Agent);
    let client = backend.seed_user("client@example.com", Role::Client);
    let mut case = backend.seed_case_with_status(&client, CaseStatus::UnderReview);
    case.assigned_agent_id = Some(agent.id);
    backend.cases.update(&case).await.expect("seed assignment");
    let app = assignment_app!(backend);
    let cookie = login(&app, "admin@example.com").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/cases/{}/unassign", case.id))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let stored = backend.cases.get(&case.id).expect("case kept");
    assert_eq!(stored.assigned_agent_id, None);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/cases/{}/unassign", case.id))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn bulk_assign_reports_per_item_outcomes() {
    let backend = test_backend();
    backend.seed_user("admin@example.com", Role::Admin);
    let agent = backend.seed_user("agent@example.com", Role::Agent);
    let client = backend.seed_user("client@example.com", Role::Client);
    let good = backend.seed_case(&client);
    let closed = backend.seed_case_with_status(&client, CaseStatus::Closed);
    let missing = uuid::Uuid::new_v4();
    let app = assignment_app!(backend);
    let cookie = login(&app, "admin@example.com").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/cases/bulk-assign")
            .cookie(cookie)
            .set_json(json!({
                "caseIds": [good.id, closed.id, missing],
                "agentId": agent.id,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    let outcomes = body["data"].as_array().expect("outcome array");
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0]["success"], true);
    assert_eq!(outcomes[1]["success"], false);
    assert_eq!(outcomes[2]["success"], false);
    assert!(outcomes[1]["message"].is_string());

    let stored = backend.cases.get(&good.id).expect("case kept");
    assert_eq!(stored.assigned_agent_id, Some(agent.id));
}

#[actix_web::test]
async fn clients_cannot_read_transfer_history() {
    let backend = test_backend();
    let client = backend.seed_user("client@example.com", Role::Client);
    let case = backend.seed_case(&client);
    let app = assignment_app!(backend);
    let cookie = login(&app, "client@example.com").await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/cases/{}/transfers", case.id))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}
