//! Process assembly: store selection, wiring and the serve loop.

use crate::{
    AppState, Broadcaster, FeedSettings, PipelineMetrics, PostPipeline, StorageBackend,
    StorageSettings, TokenfeedConfig, create_router,
};
use std::sync::Arc;
use std::time::Duration;
use tokenfeed_database::PostgresFeedStore;
use tokenfeed_error::{ConfigError, ServerError, ServerErrorKind, TokenfeedResult};
use tokenfeed_storage::{FeedStore, MemoryFeedStore};
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

/// Open the configured feed store.
///
/// A postgres store that cannot connect or migrate is an error. The memory
/// store is only used when configured or when no database URL is set.
#[instrument(skip(settings), fields(backend = %settings.effective_backend()))]
pub async fn open_feed_store(settings: &StorageSettings) -> TokenfeedResult<Arc<dyn FeedStore>> {
    let store: Arc<dyn FeedStore> = match settings.effective_backend() {
        StorageBackend::Memory => {
            if settings.has_database_url() {
                warn!(
                    "storage.backend is memory but a database URL is set; \
                     posts will not be persisted"
                );
            }
            Arc::new(MemoryFeedStore::new(settings.capacity)?)
        }
        StorageBackend::Postgres => {
            let url = settings.database_url.clone().ok_or_else(|| {
                ConfigError::new("storage.database_url is required for the postgres backend")
            })?;
            Arc::new(
                PostgresFeedStore::connect(
                    url,
                    settings.pool_size,
                    Duration::from_secs(settings.connect_timeout_secs),
                    settings.capacity,
                )
                .await?,
            )
        }
    };

    info!("storage mode: {}", store.backend_name());
    Ok(store)
}

/// Wire a store into a pipeline and its broadcaster.
pub fn build_state(settings: &FeedSettings, store: Arc<dyn FeedStore>) -> AppState {
    let broadcaster = Arc::new(Broadcaster::new(
        Arc::clone(&store),
        settings.broadcast_buffer,
    ));
    let pipeline = PostPipeline::new(
        store,
        broadcaster,
        PipelineMetrics::new(),
        settings.default_nickname.clone(),
    );
    AppState::new(Arc::new(pipeline))
}

/// Run the server until Ctrl-C.
pub async fn run(config: TokenfeedConfig) -> TokenfeedResult<()> {
    let store = open_feed_store(&config.storage).await?;
    let state = build_state(&config.feed, store);

    let bind = config.server.bind;
    let listener = TcpListener::bind(bind)
        .await
        .map_err(|e| ServerError::new(ServerErrorKind::Bind(bind.to_string(), e.to_string())))?;
    serve(listener, state).await
}

/// Serve the router on an already bound listener until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> TokenfeedResult<()> {
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::new(ServerErrorKind::Serve(e.to_string())))?;
    info!(%addr, "Listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::new(ServerErrorKind::Serve(e.to_string())))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
