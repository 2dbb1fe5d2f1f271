use std::net::SocketAddr;

use axum::routing::get;
use axum::Router;
use snafu::ResultExt;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod args;
pub mod docs;
mod error;
mod state;
pub mod videos;

pub use error::*;
pub use state::*;

use crate::error::{ApplicationError, BindAddressSnafu, WebServerSnafu};

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

pub fn create_router(app: App) -> Router {
    Router::new()
        .route(
            "/video/:id",
            get(videos::get)
                .put(videos::put)
                .patch(videos::patch)
                .delete(videos::delete),
        )
        .route("/openapi.json", get(docs::openapi))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(app)
}

pub async fn serve(address: SocketAddr, app: App) -> Result<(), ApplicationError> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .context(BindAddressSnafu { address })?;

    tracing::info!(%address, "serving video api");

    axum::serve(listener, create_router(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context(WebServerSnafu)
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "could not listen for the shutdown signal");
        std::future::pending::<()>().await;
    }

    tracing::info!("shutting down");
}
