use std::net::SocketAddr;
use std::sync::Arc;

use common::storage::FsBlobStore;
use tracing::{Level, info};

use server::build_router;
use server::config::AppConfig;
use server::database::init_db;
use server::state::AppState;
use server::templates::Templates;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = init_db(&config.database.url).await?;
    let blob_store = FsBlobStore::open(
        config.storage.blob_dir.clone(),
        config.storage.max_blob_size,
    )
    .await?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = AppState {
        db,
        blob_store: Arc::new(blob_store),
        templates: Arc::new(Templates::new()),
        config,
    };
    let app = build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    // ConnectInfo feeds the client address into download tracking.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
