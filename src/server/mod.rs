pub mod handlers;
pub mod safe_call;
pub mod status;
mod types;

pub use handlers::AppState;
pub use types::PredictRequest;

use crate::{Result, config::Config, model::HttpModelBackend};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::{net::SocketAddr, path::Path, sync::Arc};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

/// Guarded API routes plus the unauthenticated `/static` assets.
pub fn build_router(state: AppState) -> Router {
    let static_dir = Path::new(&state.config.server.ui_dir).join("static");
    safe_call::install_panic_hook();

    Router::new()
        .route("/", get(handlers::index))
        .route("/predict", post(handlers::predict))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            safe_call::safe_api_call,
        ))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    let backend = HttpModelBackend::new(&config)?;

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    let app_state = AppState {
        config: Arc::new(config),
        backend: Arc::new(backend),
    };
    let app = build_router(app_state);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
