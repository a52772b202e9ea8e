pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(
    handlers::auth::register,
    handlers::auth::login,
    handlers::auth::me,
))]
struct AuthApi;

#[derive(OpenApi)]
#[openapi(paths(handlers::usage::get_usage))]
struct UsageApi;

#[derive(OpenApi)]
#[openapi(paths(handlers::asset::get_asset))]
struct AssetApi;

#[derive(OpenApi)]
#[openapi(paths(
    handlers::avatar::set_avatar,
    handlers::avatar::delete_avatar,
    handlers::avatar::get_avatar,
))]
struct AvatarApi;

#[derive(OpenApi)]
#[openapi(paths(
    handlers::plant::list_plants,
    handlers::plant::create_plant,
    handlers::plant::get_plant,
    handlers::plant::delete_plant,
))]
struct PlantApi;

#[derive(OpenApi)]
#[openapi(paths(
    handlers::update::post_update,
    handlers::update::list_updates,
    handlers::update::delete_update,
))]
struct UpdateApi;

#[derive(OpenApi)]
#[openapi(paths(
    handlers::cutting::take_cutting,
    handlers::cutting::list_cuttings,
))]
struct CuttingApi;

#[derive(OpenApi)]
#[openapi(paths(
    handlers::story::post_story,
    handlers::story::list_stories,
    handlers::story::get_story,
    handlers::story::delete_story,
))]
struct StoryApi;

#[derive(OpenApi)]
#[openapi(paths(handlers::feed::get_feed))]
struct FeedApi;

#[derive(OpenApi)]
#[openapi(paths(
    handlers::follow::request_follow,
    handlers::follow::follow_status,
    handlers::follow::list_pending,
    handlers::follow::approve_follow,
    handlers::follow::reject_follow,
))]
struct FollowApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Frond API",
        version = "1.0.0",
        description = "API for the Frond plant-sharing service"
    ),
    nest(
        (path = "/api/v1/auth", api = AuthApi),
        (path = "/api/v1/usage", api = UsageApi),
        (path = "/api/v1/assets", api = AssetApi),
        (path = "/api/v1/avatars", api = AvatarApi),
        (path = "/api/v1/plants", api = PlantApi),
        (path = "/api/v1/plants/{id}/updates", api = UpdateApi),
        (path = "/api/v1/plants/{id}/cuttings", api = CuttingApi),
        (path = "/api/v1/stories", api = StoryApi),
        (path = "/api/v1/feed", api = FeedApi),
        (path = "/api/v1/follows", api = FollowApi),
    ),
    components(schemas(
        error::ErrorBody,
        models::auth::RegisterRequest,
        models::auth::RegisterResponse,
        models::auth::LoginRequest,
        models::auth::LoginResponse,
        models::auth::MeResponse,
        models::usage::UsageResponse,
        models::shared::CreatedAsset,
        models::plant::PlantResponse,
        models::plant::PlantListResponse,
        models::plant::PlantUpdateResponse,
        models::plant::UpdateListResponse,
        models::plant::CuttingListResponse,
        models::story::StoryResponse,
        models::story::StoryListResponse,
        models::follow::FollowResponse,
        models::follow::PendingListResponse,
        models::feed::FeedItem,
        models::feed::FeedResponse,
        handlers::cutting::TakeCuttingRequest,
        entity::asset::AssetVisibility,
        entity::follower::FollowStatus,
    )),
    tags(
        (name = "Auth", description = "Authentication and account management"),
        (name = "Usage", description = "Storage usage"),
        (name = "Assets", description = "Image downloads"),
        (name = "Avatars", description = "Profile pictures"),
        (name = "Plants", description = "Plant registration and lifecycle"),
        (name = "Plant Updates", description = "Photo updates on plants"),
        (name = "Cuttings", description = "Plant propagation"),
        (name = "Stories", description = "Ephemeral photo posts"),
        (name = "Feed", description = "Follower feed"),
        (name = "Follows", description = "Follow requests and approvals"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

fn cors_layer(config: &config::AppConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(config.server.cors.max_age));

    if config.server.cors.allow_origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .server
            .cors
            .allow_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config);
    let api = routes::api_routes(&state.config);

    axum::Router::new()
        .nest("/api", api)
        .with_state(state)
        .layer(cors)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
