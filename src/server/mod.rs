//! HTTP front end for the metadata store.
//!
//! Handlers translate query strings and JSON bodies into store calls and map
//! `StoreError`s onto status codes. A failing request only ever fails itself.

pub mod error;
pub mod handlers;
pub mod wire;

use std::future::Future;
use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::MetafsConfig;
use crate::error::Result;
use crate::store::MetadataStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MetadataStore>,
}

pub fn router(store: Arc<MetadataStore>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/resolve-inode/{ino}", get(handlers::resolve_inode))
        .route(
            "/metadata",
            get(handlers::get_metadata).patch(handlers::set_metadata),
        )
        .route("/list", get(handlers::list_directory))
        .route("/debug/files", get(handlers::debug_files))
        .route("/create", post(handlers::create))
        .route("/remove", delete(handlers::remove))
        .route("/open", post(handlers::open))
        .with_state(AppState { store })
}

/// Serve `store` on an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, store: Arc<MetadataStore>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(store))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Bind the configured address and serve until SIGINT or SIGTERM.
pub async fn run(config: MetafsConfig) -> Result<()> {
    let store = Arc::new(MetadataStore::from_config(&config));
    let listener = TcpListener::bind(config.listen_addr()).await?;
    let addr = listener.local_addr()?;

    info!("Metadata store loaded with {} entries", store.len());
    info!(
        "Endpoints: /health /resolve-inode/{{ino}} /metadata /list /debug/files /create /remove /open"
    );
    eprintln!("metafs: listening on http://{}", addr);

    serve(listener, store, shutdown_signal()).await?;
    eprintln!("metafs: stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, draining connections");
}
