use std::net::SocketAddr;
use std::sync::Arc;

use car_rental_api::config::{AppState, Config, StorageBackend};
use car_rental_api::repositories::{SeaOrmCarRepository, SeaOrmPictureRepository};
use car_rental_api::routes;
use car_rental_api::services::s3_service::{memory::MemoryStorage, ObjectStorage, S3Service};
use dotenvy::dotenv;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = Config::init()?;
    println!("🚀 Starting Car Rental API...");

    // 1. Database Connection
    println!("📡 Connecting to Database...");
    let db = Arc::new(Database::connect(&cfg.database_url).await?);
    println!("✅ Database Connected!");

    // 2. Migrations
    if cfg.run_migrations {
        println!("🌱 Running Migrations...");
        Migrator::up(db.as_ref(), None).await?;
        println!("✅ Migrations Applied!");
    }

    // 3. Object Storage
    let storage: Arc<dyn ObjectStorage> = match (&cfg.storage_backend, &cfg.s3) {
        (StorageBackend::S3, Some(s3)) => {
            println!("🪣 Connecting to S3 bucket {}...", s3.bucket_name);
            Arc::new(S3Service::new(s3.clone()).await)
        }
        _ => {
            tracing::warn!("Using in-memory picture storage; uploads are lost on restart");
            Arc::new(MemoryStorage::new(
                format!("http://{}:{}/storage", cfg.server_host, cfg.server_port),
                cfg.presign_expires_secs,
            ))
        }
    };

    if cfg.is_development() {
        if let Err(e) = storage.ensure_bucket().await {
            tracing::error!(detail = ?e.detail, "⚠️  {}", e);
        }
    }

    if cfg.storage_reset_on_start {
        println!("🧹 Resetting picture storage...");
        storage.delete_all_images().await?;
    }

    // 4. Build App State
    let state = AppState::new(
        Arc::new(SeaOrmCarRepository::new(db.clone())),
        Arc::new(SeaOrmPictureRepository::new(db)),
        storage,
    );

    // 5. Initialize Router
    let app = routes::create_routes(state);

    // 6. Start Server
    let addr: SocketAddr = format!("{}:{}", cfg.server_host, cfg.server_port).parse()?;

    println!("🎯 Server ready! Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
