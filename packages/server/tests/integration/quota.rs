use reqwest::Method;

use crate::common::{TestApp, Upload, normalized_size, routes, tiny_png};

#[tokio::test]
async fn usage_starts_empty_and_tracks_uploads() {
    let app = TestApp::spawn().await;
    let (token, _) = app.create_authenticated_user("alice").await;

    let res = app.get_with_token(routes::USAGE, &token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["used_bytes"], 0);
    assert_eq!(res.body["limit_bytes"], 100 * 1024 * 1024);

    let png = tiny_png(8, 8);
    let expected = normalized_size(&png);
    app.post_story(&token, "private").await;

    let res = app.get_with_token(routes::USAGE, &token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["used_bytes"], expected);
}

#[tokio::test]
async fn usage_is_reclaimed_on_delete() {
    let app = TestApp::spawn().await;
    let (token, _) = app.create_authenticated_user("bob").await;

    let (story_id, _) = app.post_story(&token, "private").await;
    let res = app.get_with_token(routes::USAGE, &token).await;
    assert!(res.body["used_bytes"].as_u64().unwrap() > 0);

    let res = app
        .delete_with_token(&routes::story(&story_id), &token)
        .await;
    assert_eq!(res.status, 204, "{}", res.text);

    let res = app.get_with_token(routes::USAGE, &token).await;
    assert_eq!(res.body["used_bytes"], 0);
}

#[tokio::test]
async fn upload_rejected_when_quota_would_be_exceeded() {
    let png = tiny_png(8, 8);
    let raw = png.len() as u64;
    let stored = normalized_size(&png);

    // One upload fits; a second pushes the projected usage past the ceiling.
    let limit = stored + raw / 2;
    let app = TestApp::spawn_with(|cfg| cfg.storage.max_total_storage = limit).await;
    let (token, _) = app.create_authenticated_user("carol").await;

    let res = app
        .upload(
            Method::POST,
            routes::STORIES,
            &token,
            Upload::png(&png),
            &[],
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);

    let res = app
        .upload(
            Method::POST,
            routes::STORIES,
            &token,
            Upload::png(&png),
            &[],
        )
        .await;
    assert_eq!(res.status, 413, "{}", res.text);
    assert_eq!(res.error_code(), "QUOTA_EXCEEDED");

    // Usage unchanged by the failed upload.
    let res = app.get_with_token(routes::USAGE, &token).await;
    assert_eq!(res.body["used_bytes"], stored);
}

#[tokio::test]
async fn upload_requires_declared_size() {
    let app = TestApp::spawn().await;
    let (token, _) = app.create_authenticated_user("dave").await;

    let png = tiny_png(8, 8);
    let mut upload = Upload::png(&png);
    upload.declared_size = None;

    let res = app
        .upload(Method::POST, routes::STORIES, &token, upload, &[])
        .await;
    assert_eq!(res.status, 400, "{}", res.text);
    assert_eq!(res.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn upload_rejects_oversized_declared_size() {
    let app = TestApp::spawn().await;
    let (token, _) = app.create_authenticated_user("erin").await;

    let png = tiny_png(8, 8);
    let mut upload = Upload::png(&png);
    upload.declared_size = Some(5 * 1024 * 1024 + 1);

    let res = app
        .upload(Method::POST, routes::STORIES, &token, upload, &[])
        .await;
    assert_eq!(res.status, 413, "{}", res.text);
    assert_eq!(res.error_code(), "IMAGE_TOO_LARGE");
}

#[tokio::test]
async fn upload_rejects_unaccepted_content_type() {
    let app = TestApp::spawn().await;
    let (token, _) = app.create_authenticated_user("frank").await;

    let png = tiny_png(8, 8);
    let mut upload = Upload::png(&png);
    upload.content_type = "text/plain";

    let res = app
        .upload(Method::POST, routes::STORIES, &token, upload, &[])
        .await;
    assert_eq!(res.status, 415, "{}", res.text);
    assert_eq!(res.error_code(), "UNSUPPORTED_MEDIA_TYPE");
}

#[tokio::test]
async fn upload_rejects_undecodable_bytes() {
    let app = TestApp::spawn().await;
    let (token, _) = app.create_authenticated_user("grace").await;

    let garbage = b"definitely not a png".to_vec();
    let upload = Upload {
        declared_size: Some(garbage.len() as u64),
        content_type: "image/png",
        bytes: garbage,
    };

    let res = app
        .upload(Method::POST, routes::STORIES, &token, upload, &[])
        .await;
    assert_eq!(res.status, 422, "{}", res.text);
    assert_eq!(res.error_code(), "UNSUPPORTED_FORMAT");
}

#[tokio::test]
async fn body_limit_follows_a_raised_image_cap() {
    // The multipart body limit scales with the configured image cap, so a
    // body this large still reaches the validation pipeline and gets a
    // structured rejection instead of a connection-level body error.
    let app = TestApp::spawn_with(|cfg| cfg.storage.max_image_size = 24 * 1024 * 1024).await;
    let (token, _) = app.create_authenticated_user("judy").await;

    let garbage = vec![0u8; 17 * 1024 * 1024];
    let upload = Upload {
        declared_size: Some(garbage.len() as u64),
        content_type: "image/png",
        bytes: garbage,
    };

    let res = app
        .upload(Method::POST, routes::STORIES, &token, upload, &[])
        .await;
    assert_eq!(res.status, 422, "{}", res.text);
    assert_eq!(res.error_code(), "UNSUPPORTED_FORMAT");
}

#[tokio::test]
async fn quotas_are_per_user() {
    let png = tiny_png(8, 8);
    let raw = png.len() as u64;
    let stored = normalized_size(&png);

    let limit = stored + raw / 2;
    let app = TestApp::spawn_with(move |cfg| cfg.storage.max_total_storage = limit).await;
    let (token_a, _) = app.create_authenticated_user("heidi").await;
    let (token_b, _) = app.create_authenticated_user("ivan").await;

    app.post_story(&token_a, "private").await;

    // A is near the ceiling; B is unaffected.
    let res = app
        .upload(
            Method::POST,
            routes::STORIES,
            &token_b,
            Upload::png(&png),
            &[],
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
}
