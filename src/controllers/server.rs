use std::sync::Arc;
use anyhow::Context;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;
use crate::config::AppConfig;
use crate::controllers::heartbeat;
use crate::controllers::router::{AxumRouter, RouteError};
use crate::controllers::serve_mux::{ServeMux, WrapServeMux};
use crate::enums::router_kind::RouterKind;

/// Builds the application on the requested router implementation.
pub fn app(kind: RouterKind) -> Result<Router, RouteError> {
    let heartbeat = heartbeat::Handler;

    let router = match kind {
        RouterKind::Axum => {
            let mut router = AxumRouter::new();
            heartbeat.register(&mut router)?;
            router.into_router()
        }
        RouterKind::ServeMux => {
            let mut mux = WrapServeMux::new(ServeMux::new());
            heartbeat.register(&mut mux)?;
            // Every request falls through to the mux, which owns 404/405
            Router::new().fallback_service(mux.into_inner())
        }
    };

    // No CORS layer: it would answer OPTIONS itself instead of the router
    Ok(router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http()),
    ))
}

pub async fn serve(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let app = app(config.router).context("Error registering routes")?;

    info!("Starting server at {} ({} router)", addr, config.router);

    axum::Server::try_bind(&addr)
        .with_context(|| format!("Error binding {}", addr))?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Error starting server")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Unable to listen for shutdown signal: {}", err);
        // Without a signal handler, keep serving
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
