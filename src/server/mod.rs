//! HTTP front end.
//!
//! Request paths are decomposed into a coordinate plus an optional path
//! into the archive. Missing trailing segments list the local cache at that
//! level. Failures of any kind answer `404` with a fixed body.

pub mod handlers;
pub mod listing;
pub mod route;

pub use route::DocRoute;

use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::service::DocService;

pub fn router(service: Arc<DocService>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/{*path}", get(handlers::browse))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Serve until Ctrl+C, then log the mirror traffic of the run
pub async fn serve(listener: TcpListener, service: Arc<DocService>) -> std::io::Result<()> {
    info!(addr = %listener.local_addr()?, cache = %service.store().root().display(), "serving javadocs");

    axum::serve(listener, router(Arc::clone(&service)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(metrics) = service.metrics() {
        info!(traffic = %metrics.summary(), "mirror traffic");
    }
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
