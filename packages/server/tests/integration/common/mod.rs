use std::io::Cursor;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use reqwest::Client;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tempfile::TempDir;

use common::storage::filesystem::FilesystemBlobStore;
use server::config::{
    AppConfig, AuthConfig, CorsConfig, DatabaseConfig, ServerConfig, StorageBackend, StorageConfig,
};
use server::state::AppState;

pub mod routes {
    use uuid::Uuid;

    pub const REGISTER: &str = "/api/v1/auth/register";
    pub const LOGIN: &str = "/api/v1/auth/login";
    pub const ME: &str = "/api/v1/auth/me";
    pub const USAGE: &str = "/api/v1/usage";
    pub const AVATARS: &str = "/api/v1/avatars";
    pub const PLANTS: &str = "/api/v1/plants";
    pub const STORIES: &str = "/api/v1/stories";
    pub const FEED: &str = "/api/v1/feed";
    pub const FOLLOW_PENDING: &str = "/api/v1/follows/pending";

    pub fn asset(id: &str) -> String {
        format!("/api/v1/assets/{id}")
    }

    pub fn avatar(user_id: &str) -> String {
        format!("/api/v1/avatars/{user_id}")
    }

    pub fn plant(id: &str) -> String {
        format!("/api/v1/plants/{id}")
    }

    pub fn plant_updates(id: &str) -> String {
        format!("/api/v1/plants/{id}/updates")
    }

    pub fn plant_update(id: &str, update_id: &str) -> String {
        format!("/api/v1/plants/{id}/updates/{update_id}")
    }

    pub fn plant_cuttings(id: &str) -> String {
        format!("/api/v1/plants/{id}/cuttings")
    }

    pub fn story(id: &str) -> String {
        format!("/api/v1/stories/{id}")
    }

    pub fn follow_request(to_user: Uuid) -> String {
        format!("/api/v1/follows/requests/{to_user}")
    }

    pub fn follow_approve(from_user: Uuid) -> String {
        format!("/api/v1/follows/pending/{from_user}/approve")
    }

    pub fn follow_reject(from_user: Uuid) -> String {
        format!("/api/v1/follows/pending/{from_user}/reject")
    }
}

/// A running test server backed by a fresh SQLite database and a temporary
/// blob directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    blob_dir: PathBuf,
    _dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn with a config tweak, e.g. a tiny quota for limit tests.
    pub async fn spawn_with(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let db_url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("test.db").display()
        );
        let db = server::database::init_db(&db_url)
            .await
            .expect("Failed to initialize test database");

        let mut app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig { url: db_url },
            auth: AuthConfig {
                jwt_secret: "test-secret-for-integration-tests".to_string(),
                token_days: 1,
            },
            storage: StorageConfig {
                backend: StorageBackend::Filesystem,
                path: dir.path().join("blobs"),
                endpoint: None,
                region: None,
                bucket: None,
                access_key: None,
                secret_key: None,
                max_image_size: 5 * 1024 * 1024,
                max_total_storage: 100 * 1024 * 1024,
            },
        };
        tweak(&mut app_config);

        let blob_dir = app_config.storage.path.clone();
        let blob_store = FilesystemBlobStore::new(
            app_config.storage.path.clone(),
            app_config.storage.max_image_size,
        )
        .await
        .expect("Failed to create blob store");

        let state = AppState {
            db: db.clone(),
            blob_store: Arc::new(blob_store),
            config: Arc::new(app_config),
        };

        let app = server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            blob_dir,
            _dir: dir,
        }
    }

    /// Whether the blob for `asset_id` is present in the store directory.
    /// Blobs are sharded on the first two key characters.
    pub fn blob_on_disk(&self, asset_id: &str) -> bool {
        self.blob_dir
            .join(&asset_id[..2])
            .join(&asset_id[2..])
            .exists()
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_without_token(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn get_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_without_token(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn delete_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    /// Raw GET with extra headers, returning the reqwest response for
    /// header/byte-level assertions.
    pub async fn get_raw(
        &self,
        path: &str,
        token: &str,
        headers: &[(&str, &str)],
    ) -> reqwest::Response {
        let mut req = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {token}"));
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        req.send().await.expect("Failed to send GET request")
    }

    /// Send an image upload form. `size` is the declared size field; pass
    /// `None` to omit it. Extra fields go in as plain text parts.
    pub async fn upload(
        &self,
        method: reqwest::Method,
        path: &str,
        token: &str,
        image: Upload<'_>,
        extra_fields: &[(&str, &str)],
    ) -> TestResponse {
        let part = reqwest::multipart::Part::bytes(image.bytes)
            .file_name("photo")
            .mime_str(image.content_type)
            .expect("Failed to set MIME type");
        let mut form = reqwest::multipart::Form::new().part("file", part);
        if let Some(size) = image.declared_size {
            form = form.text("size", size.to_string());
        }
        for (name, value) in extra_fields {
            form = form.text(name.to_string(), value.to_string());
        }

        let res = self
            .client
            .request(method, self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart upload request");

        TestResponse::from_response(res).await
    }

    /// Register a user and log in, returning the auth token and user id.
    pub async fn create_authenticated_user(&self, username: &str) -> (String, uuid::Uuid) {
        let body = serde_json::json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "correct-horse-battery",
        });

        let reg = self.post_without_token(routes::REGISTER, &body).await;
        assert_eq!(reg.status, 201, "Registration failed: {}", reg.text);
        let user_id: uuid::Uuid = reg.body["id"]
            .as_str()
            .expect("Registration response should contain an id")
            .parse()
            .unwrap();

        let res = self.post_without_token(routes::LOGIN, &body).await;
        assert_eq!(res.status, 200, "Login failed: {}", res.text);

        let token = res.body["token"]
            .as_str()
            .expect("Login response should contain a token")
            .to_string();
        (token, user_id)
    }

    /// Create a plant with a photo via the API and return its `id`.
    pub async fn create_plant(&self, token: &str, name: &str, visibility: &str) -> String {
        let png = tiny_png(8, 8);
        let upload = Upload::png(&png);
        let res = self
            .upload(
                reqwest::Method::POST,
                routes::PLANTS,
                token,
                upload,
                &[("name", name), ("visibility", visibility)],
            )
            .await;
        assert_eq!(res.status, 201, "create_plant failed: {}", res.text);
        res.body["id"].as_str().unwrap().to_string()
    }

    /// Post a story via the API and return `(story_id, asset_id)`.
    pub async fn post_story(&self, token: &str, visibility: &str) -> (String, String) {
        let png = tiny_png(8, 8);
        let upload = Upload::png(&png);
        let res = self
            .upload(
                reqwest::Method::POST,
                routes::STORIES,
                token,
                upload,
                &[("visibility", visibility)],
            )
            .await;
        assert_eq!(res.status, 201, "post_story failed: {}", res.text);
        (
            res.body["id"].as_str().unwrap().to_string(),
            res.body["asset_id"].as_str().unwrap().to_string(),
        )
    }

    /// Create an approved follow edge from `from` (token) toward `to_user`
    /// (token + id) through the API.
    pub async fn approve_follow(
        &self,
        from_token: &str,
        from_id: uuid::Uuid,
        to_token: &str,
        to_id: uuid::Uuid,
    ) {
        let res = self
            .post_with_token(
                &routes::follow_request(to_id),
                &serde_json::json!({}),
                from_token,
            )
            .await;
        assert_eq!(res.status, 201, "follow request failed: {}", res.text);

        let res = self
            .post_with_token(
                &routes::follow_approve(from_id),
                &serde_json::json!({}),
                to_token,
            )
            .await;
        assert_eq!(res.status, 204, "follow approve failed: {}", res.text);
    }
}

/// An image upload as the transport sees it.
pub struct Upload<'a> {
    pub bytes: Vec<u8>,
    pub content_type: &'a str,
    pub declared_size: Option<u64>,
}

impl<'a> Upload<'a> {
    /// A well-formed PNG upload with a truthful declared size.
    pub fn png(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            content_type: "image/png",
            declared_size: Some(bytes.len() as u64),
        }
    }
}

/// Encode a small valid PNG of the given dimensions.
pub fn tiny_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x * 31) as u8, (y * 31) as u8, 128, 255])
    });
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), image::ImageOutputFormat::Png)
        .expect("PNG encode failed");
    out
}

/// The byte size `bytes` will occupy after server-side PNG normalization.
pub fn normalized_size(bytes: &[u8]) -> u64 {
    let decoded = image::load_from_memory(bytes).expect("valid image");
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(decoded.to_rgba8())
        .write_to(&mut Cursor::new(&mut out), image::ImageOutputFormat::Png)
        .expect("PNG encode failed");
    out.len() as u64
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    pub fn error_code(&self) -> &str {
        self.body["code"].as_str().unwrap_or("")
    }
}
