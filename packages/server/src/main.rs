use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use common::storage::filesystem::FilesystemBlobStore;
use common::storage::s3::S3BlobStore;
use common::storage::BlobStore;
use tracing::info;

use server::config::{AppConfig, StorageBackend};
use server::database::init_db;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = init_db(&config.database.url).await?;

    let blob_store = build_blob_store(&config).await?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server.host/server.port")?;

    let state = AppState {
        db,
        blob_store,
        config: Arc::new(config),
    };

    let app = server::build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_blob_store(config: &AppConfig) -> anyhow::Result<Arc<dyn BlobStore>> {
    let storage = &config.storage;
    match storage.backend {
        StorageBackend::Filesystem => {
            info!("Using filesystem blob store at {}", storage.path.display());
            let store = FilesystemBlobStore::new(storage.path.clone(), storage.max_image_size)
                .await
                .context("Failed to initialize filesystem blob store")?;
            Ok(Arc::new(store))
        }
        StorageBackend::S3 => {
            let endpoint = storage
                .endpoint
                .as_deref()
                .context("storage.endpoint is required for the s3 backend")?;
            let region = storage
                .region
                .as_deref()
                .context("storage.region is required for the s3 backend")?;
            let bucket = storage
                .bucket
                .as_deref()
                .context("storage.bucket is required for the s3 backend")?;
            let access_key = storage
                .access_key
                .as_deref()
                .context("storage.access_key is required for the s3 backend")?;
            let secret_key = storage
                .secret_key
                .as_deref()
                .context("storage.secret_key is required for the s3 backend")?;

            info!("Using S3 blob store at {} (bucket {})", endpoint, bucket);
            let store = S3BlobStore::new(endpoint, region, bucket, access_key, secret_key)
                .context("Failed to initialize S3 blob store")?;
            Ok(Arc::new(store))
        }
    }
}
