use serde_json::json;
use uuid::Uuid;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn follow_request_lifecycle() {
    let app = TestApp::spawn().await;
    let (alice_token, alice_id) = app.create_authenticated_user("alice").await;
    let (bob_token, bob_id) = app.create_authenticated_user("bob").await;

    let res = app
        .post_with_token(&routes::follow_request(bob_id), &json!({}), &alice_token)
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["status"], "pending");

    // Requester sees the pending status; target sees the incoming request.
    let res = app
        .get_with_token(&routes::follow_request(bob_id), &alice_token)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["status"], "pending");

    let res = app.get_with_token(routes::FOLLOW_PENDING, &bob_token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    let requests = res.body["requests"].as_array().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["from_user"], alice_id.to_string());

    let res = app
        .post_with_token(&routes::follow_approve(alice_id), &json!({}), &bob_token)
        .await;
    assert_eq!(res.status, 204, "{}", res.text);

    let res = app
        .get_with_token(&routes::follow_request(bob_id), &alice_token)
        .await;
    assert_eq!(res.body["status"], "approved");

    // The approved edge no longer shows up as pending.
    let res = app.get_with_token(routes::FOLLOW_PENDING, &bob_token).await;
    assert!(res.body["requests"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn cannot_follow_self() {
    let app = TestApp::spawn().await;
    let (token, user_id) = app.create_authenticated_user("alice").await;

    let res = app
        .post_with_token(&routes::follow_request(user_id), &json!({}), &token)
        .await;
    assert_eq!(res.status, 400, "{}", res.text);
    assert_eq!(res.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn cannot_follow_unknown_user() {
    let app = TestApp::spawn().await;
    let (token, _) = app.create_authenticated_user("alice").await;

    let res = app
        .post_with_token(&routes::follow_request(Uuid::new_v4()), &json!({}), &token)
        .await;
    assert_eq!(res.status, 404, "{}", res.text);
}

#[tokio::test]
async fn duplicate_request_conflicts_in_every_state() {
    let app = TestApp::spawn().await;
    let (alice_token, alice_id) = app.create_authenticated_user("alice").await;
    let (bob_token, bob_id) = app.create_authenticated_user("bob").await;

    let res = app
        .post_with_token(&routes::follow_request(bob_id), &json!({}), &alice_token)
        .await;
    assert_eq!(res.status, 201, "{}", res.text);

    // Duplicate while pending.
    let res = app
        .post_with_token(&routes::follow_request(bob_id), &json!({}), &alice_token)
        .await;
    assert_eq!(res.status, 409, "{}", res.text);

    // Re-requesting after rejection stays blocked.
    let res = app
        .post_with_token(&routes::follow_reject(alice_id), &json!({}), &bob_token)
        .await;
    assert_eq!(res.status, 204, "{}", res.text);

    let res = app
        .post_with_token(&routes::follow_request(bob_id), &json!({}), &alice_token)
        .await;
    assert_eq!(res.status, 409, "{}", res.text);
}

#[tokio::test]
async fn transitions_require_a_pending_edge() {
    let app = TestApp::spawn().await;
    let (alice_token, alice_id) = app.create_authenticated_user("alice").await;
    let (bob_token, bob_id) = app.create_authenticated_user("bob").await;

    // No edge at all.
    let res = app
        .post_with_token(&routes::follow_approve(alice_id), &json!({}), &bob_token)
        .await;
    assert_eq!(res.status, 404, "{}", res.text);

    let res = app
        .post_with_token(&routes::follow_request(bob_id), &json!({}), &alice_token)
        .await;
    assert_eq!(res.status, 201, "{}", res.text);

    let res = app
        .post_with_token(&routes::follow_approve(alice_id), &json!({}), &bob_token)
        .await;
    assert_eq!(res.status, 204, "{}", res.text);

    // Approving or rejecting a settled edge conflicts.
    let res = app
        .post_with_token(&routes::follow_approve(alice_id), &json!({}), &bob_token)
        .await;
    assert_eq!(res.status, 409, "{}", res.text);

    let res = app
        .post_with_token(&routes::follow_reject(alice_id), &json!({}), &bob_token)
        .await;
    assert_eq!(res.status, 409, "{}", res.text);
}

#[tokio::test]
async fn approval_is_directional() {
    let app = TestApp::spawn().await;
    let (alice_token, alice_id) = app.create_authenticated_user("alice").await;
    let (bob_token, bob_id) = app.create_authenticated_user("bob").await;

    app.approve_follow(&alice_token, alice_id, &bob_token, bob_id)
        .await;

    // Bob never requested to follow Alice.
    let res = app
        .get_with_token(&routes::follow_request(alice_id), &bob_token)
        .await;
    assert_eq!(res.status, 404, "{}", res.text);
}
