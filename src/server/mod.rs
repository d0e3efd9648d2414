//! HTTP service exposing the inference handler.
//!
//! - `POST /invocations` → `{"predictions": [...]}`
//! - `GET /ping` → `ping!` with 200 once the model is loaded, 404 before.

mod api;
mod error;
mod handlers;

pub use api::create_router;
pub use error::{ApiError, ApiResult};

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::ServeConfig;
use crate::error::{Result, ServeError};
use crate::handler::ModelHandler;
use crate::pipelines::classification::{ClassificationPipelineBuilder, PipelineLoader};

/// Initialize the model and bind the listener, retrying transient failures
/// under the configured startup policy.
pub async fn start<L: PipelineLoader>(
    handler: &Arc<ModelHandler<L>>,
    config: &ServeConfig,
) -> Result<TcpListener> {
    let addr = config.socket_addr()?;
    let policy = config.startup_retry_policy();

    policy
        .execute(|| {
            let handler = Arc::clone(handler);
            async move {
                if !handler.is_initialized() {
                    tokio::task::spawn_blocking(move || handler.initialize()).await??;
                }
                TcpListener::bind(addr)
                    .await
                    .map_err(|source| ServeError::Bind {
                        addr: addr.to_string(),
                        source,
                    })
            }
        })
        .await
}

/// Start up, then serve until a shutdown signal arrives.
pub async fn serve<L: PipelineLoader>(
    handler: Arc<ModelHandler<L>>,
    config: ServeConfig,
) -> Result<()> {
    let listener = start(&handler, &config).await?;
    let app = create_router(handler, &config);

    let addr = listener.local_addr()?;
    info!(
        address = %addr,
        pid = std::process::id(),
        max_body_bytes = config.max_body_bytes,
        "Server listening and ready to accept connections"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

/// Serve the model described by `config`.
pub async fn run_server(config: ServeConfig) -> Result<()> {
    let loader = ClassificationPipelineBuilder::new(config.source.clone())
        .device_request(config.device.clone());
    let handler = Arc::new(ModelHandler::new(loader));
    serve(handler, config).await
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl-C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, stopping server gracefully");
}
