use uuid::Uuid;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn post_and_list_own_stories() {
    let app = TestApp::spawn().await;
    let (token, user_id) = app.create_authenticated_user("alice").await;

    let (first, _) = app.post_story(&token, "private").await;
    let (second, _) = app.post_story(&token, "public").await;

    let res = app.get_with_token(routes::STORIES, &token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    let stories = res.body["stories"].as_array().unwrap();
    assert_eq!(stories.len(), 2);
    // Newest first.
    assert_eq!(stories[0]["id"], second.as_str());
    assert_eq!(stories[1]["id"], first.as_str());
    assert_eq!(stories[0]["author"], user_id.to_string());
}

#[tokio::test]
async fn story_listing_is_private_to_the_author() {
    let app = TestApp::spawn().await;
    let (alice_token, _) = app.create_authenticated_user("alice").await;
    let (bob_token, _) = app.create_authenticated_user("bob").await;

    app.post_story(&alice_token, "public").await;

    let res = app.get_with_token(routes::STORIES, &bob_token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert!(res.body["stories"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_story_is_not_found() {
    let app = TestApp::spawn().await;
    let (token, _) = app.create_authenticated_user("alice").await;

    let res = app
        .get_with_token(&routes::story(&Uuid::new_v4().to_string()), &token)
        .await;
    assert_eq!(res.status, 404, "{}", res.text);
}

#[tokio::test]
async fn only_the_author_may_delete_a_story() {
    let app = TestApp::spawn().await;
    let (alice_token, _) = app.create_authenticated_user("alice").await;
    let (bob_token, _) = app.create_authenticated_user("bob").await;

    let (story_id, _) = app.post_story(&alice_token, "public").await;

    let res = app
        .delete_with_token(&routes::story(&story_id), &bob_token)
        .await;
    assert_eq!(res.status, 403, "{}", res.text);

    let res = app
        .delete_with_token(&routes::story(&story_id), &alice_token)
        .await;
    assert_eq!(res.status, 204, "{}", res.text);

    let res = app
        .get_with_token(&routes::story(&story_id), &alice_token)
        .await;
    assert_eq!(res.status, 404, "{}", res.text);
}

#[tokio::test]
async fn deleting_a_story_removes_its_image() {
    let app = TestApp::spawn().await;
    let (token, _) = app.create_authenticated_user("alice").await;

    let (story_id, asset_id) = app.post_story(&token, "private").await;
    assert!(app.blob_on_disk(&asset_id));

    let res = app
        .delete_with_token(&routes::story(&story_id), &token)
        .await;
    assert_eq!(res.status, 204, "{}", res.text);

    let res = app.get_with_token(&routes::asset(&asset_id), &token).await;
    assert_eq!(res.status, 404, "{}", res.text);
    assert!(!app.blob_on_disk(&asset_id));
}
