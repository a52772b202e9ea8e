use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    routing::{get, post, put},
};

use crate::config::AppConfig;
use crate::handlers;
use crate::handlers::upload::upload_body_limit;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> Router<AppState> {
    let body_limit = upload_body_limit(config.storage.max_image_size);

    Router::new()
        .nest("/auth", auth_routes())
        .nest("/usage", usage_routes())
        .nest("/assets", asset_routes())
        .nest("/avatars", avatar_routes(body_limit.clone()))
        .nest("/plants", plant_routes(body_limit.clone()))
        .nest("/stories", story_routes(body_limit))
        .nest("/feed", feed_routes())
        .nest("/follows", follow_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/me", get(handlers::auth::me))
}

fn usage_routes() -> Router<AppState> {
    Router::new().route("/", get(handlers::usage::get_usage))
}

fn asset_routes() -> Router<AppState> {
    Router::new().route("/{id}", get(handlers::asset::get_asset))
}

fn avatar_routes(body_limit: DefaultBodyLimit) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            put(handlers::avatar::set_avatar).delete(handlers::avatar::delete_avatar),
        )
        .route("/{user_id}", get(handlers::avatar::get_avatar))
        .layer(body_limit)
}

fn plant_routes(body_limit: DefaultBodyLimit) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::plant::list_plants).post(handlers::plant::create_plant),
        )
        .route(
            "/{id}",
            get(handlers::plant::get_plant).delete(handlers::plant::delete_plant),
        )
        .nest("/{id}/updates", update_routes())
        .nest("/{id}/cuttings", cutting_routes())
        .layer(body_limit)
}

fn update_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::update::list_updates).post(handlers::update::post_update),
        )
        .route("/{update_id}", axum::routing::delete(handlers::update::delete_update))
}

fn cutting_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(handlers::cutting::list_cuttings).post(handlers::cutting::take_cutting),
    )
}

fn story_routes(body_limit: DefaultBodyLimit) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::story::list_stories).post(handlers::story::post_story),
        )
        .route(
            "/{id}",
            get(handlers::story::get_story).delete(handlers::story::delete_story),
        )
        .layer(body_limit)
}

fn feed_routes() -> Router<AppState> {
    Router::new().route("/", get(handlers::feed::get_feed))
}

fn follow_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/requests/{to_user}",
            post(handlers::follow::request_follow).get(handlers::follow::follow_status),
        )
        .route("/pending", get(handlers::follow::list_pending))
        .route(
            "/pending/{from_user}/approve",
            post(handlers::follow::approve_follow),
        )
        .route(
            "/pending/{from_user}/reject",
            post(handlers::follow::reject_follow),
        )
}
