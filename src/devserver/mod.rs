//! Development Server
//!
//! Serves the built frontend and forwards API calls to the backend, built
//! with Axum.
//!
//! # Routing
//!
//! - Paths under a proxy prefix (default `/api`) go to the proxy target with
//!   path and query unchanged.
//! - Everything else is served from the build output directory. Unknown
//!   paths get `index.html` so client-side routes survive a reload.
//!
//! # Example
//!
//! ```rust,ignore
//! use techplan::config::Config;
//! use techplan::devserver::serve;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default()?;
//!     serve(&config.dev_server, &config.build).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod proxy;
pub mod state;

pub use error::DevServerError;
pub use state::DevServerState;

use axum::{
    extract::{Request, State},
    response::{IntoResponse, Response},
    Router,
};
use std::sync::Arc;
use tower::util::ServiceExt;
use tower_http::trace::TraceLayer;

use crate::config::{BuildConfig, DevServerConfig};

/// Build the dev server router
pub fn build_router(state: DevServerState) -> Router {
    Router::new()
        .fallback(dispatch)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

async fn dispatch(State(state): State<Arc<DevServerState>>, request: Request) -> Response {
    match state.rule_for(request.uri().path()) {
        Some(rule) => proxy::forward(&state, rule, request).await.into_response(),
        None => state.static_files.clone().oneshot(request).await.into_response(),
    }
}

/// Start the dev server
pub async fn serve(config: &DevServerConfig, build: &BuildConfig) -> Result<(), DevServerError> {
    let state = DevServerState::new(config, build)?;
    let router = build_router(state.clone());

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Techplan dev server listening on http://{}", addr);
    tracing::info!(output_dir = %build.output_dir.display(), "Serving static files");
    for rule in &config.proxy {
        tracing::info!(
            prefix = %rule.prefix,
            target = %rule.target,
            change_origin = rule.change_origin,
            "Proxying"
        );
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| DevServerError::Internal(format!("Server error: {}", e)))?;

    tracing::info!(
        uptime_seconds = state.uptime_seconds(),
        "Techplan dev server shut down gracefully"
    );
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
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

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
