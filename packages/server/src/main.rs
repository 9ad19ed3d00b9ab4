use std::sync::Arc;

use common::storage::{FileStore, filesystem::FilesystemFileStore};
use tracing::{Level, info};

use server::config::AppConfig;
use server::state::AppState;
use server::{build_router, database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = database::init_db(&config.database.url).await?;
    seed::ensure_indexes(&db).await?;
    seed::bootstrap(&db, &config).await?;

    let files: Arc<dyn FileStore> = Arc::new(
        FilesystemFileStore::new(
            config.storage.root_dir.clone(),
            config.submission.max_video_bytes,
        )
        .await?,
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState { db, files, config };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("VoteNest API listening at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
