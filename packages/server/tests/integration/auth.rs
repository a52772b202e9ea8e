use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn register_login_me_flow() {
    let app = TestApp::spawn().await;

    let body = json!({
        "username": "alice",
        "email": "alice@example.com",
        "password": "correct-horse-battery",
    });

    let res = app.post_without_token(routes::REGISTER, &body).await;
    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["username"], "alice");

    let res = app.post_without_token(routes::LOGIN, &body).await;
    assert_eq!(res.status, 200, "{}", res.text);
    let token = res.body["token"].as_str().unwrap().to_string();

    let res = app.get_with_token(routes::ME, &token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["username"], "alice");
    assert_eq!(res.body["email"], "alice@example.com");
    assert!(res.body["avatar_asset_id"].is_null());
}

#[tokio::test]
async fn register_rejects_duplicate_username() {
    let app = TestApp::spawn().await;

    let body = json!({
        "username": "bob",
        "email": "bob@example.com",
        "password": "correct-horse-battery",
    });
    let res = app.post_without_token(routes::REGISTER, &body).await;
    assert_eq!(res.status, 201, "{}", res.text);

    let body = json!({
        "username": "bob",
        "email": "other@example.com",
        "password": "correct-horse-battery",
    });
    let res = app.post_without_token(routes::REGISTER, &body).await;
    assert_eq!(res.status, 409, "{}", res.text);
    assert_eq!(res.error_code(), "USERNAME_TAKEN");
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let app = TestApp::spawn().await;

    let body = json!({
        "username": "carol",
        "email": "carol@example.com",
        "password": "correct-horse-battery",
    });
    let res = app.post_without_token(routes::REGISTER, &body).await;
    assert_eq!(res.status, 201, "{}", res.text);

    let body = json!({
        "username": "carol2",
        "email": "carol@example.com",
        "password": "correct-horse-battery",
    });
    let res = app.post_without_token(routes::REGISTER, &body).await;
    assert_eq!(res.status, 409, "{}", res.text);
    assert_eq!(res.error_code(), "EMAIL_TAKEN");
}

#[tokio::test]
async fn register_validates_input() {
    let app = TestApp::spawn().await;

    for (username, email, password) in [
        ("", "a@example.com", "correct-horse-battery"),
        ("spaces in name", "a@example.com", "correct-horse-battery"),
        ("dave", "not-an-email", "correct-horse-battery"),
        ("dave", "a@example.com", "short"),
    ] {
        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({ "username": username, "email": email, "password": password }),
            )
            .await;
        assert_eq!(res.status, 400, "{username}: {}", res.text);
        assert_eq!(res.error_code(), "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = TestApp::spawn().await;
    app.create_authenticated_user("erin").await;

    let res = app
        .post_without_token(
            routes::LOGIN,
            &json!({ "username": "erin", "password": "wrong-password-here" }),
        )
        .await;
    assert_eq!(res.status, 401, "{}", res.text);
    assert_eq!(res.error_code(), "INVALID_CREDENTIALS");

    let res = app
        .post_without_token(
            routes::LOGIN,
            &json!({ "username": "nobody", "password": "wrong-password-here" }),
        )
        .await;
    assert_eq!(res.status, 401, "{}", res.text);
}

#[tokio::test]
async fn protected_routes_require_token() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(routes::ME).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.error_code(), "TOKEN_MISSING");

    let res = app.get_with_token(routes::USAGE, "not-a-jwt").await;
    assert_eq!(res.status, 401);
    assert_eq!(res.error_code(), "TOKEN_INVALID");
}
