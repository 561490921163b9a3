use anyhow::Result;
use axum::{Router, routing::get};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use super::{handlers, state::AppState};
use crate::store::VersionedStore;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Artifact CRUD operations
        .route("/artifacts", get(handlers::list_artifacts))
        .route(
            "/artifacts/:name",
            get(handlers::get_artifact)
                .put(handlers::put_artifact)
                .delete(handlers::delete_artifact),
        )
        // Version operations
        .route("/artifacts/:name/versions", get(handlers::list_versions))
        .route(
            "/artifacts/:name/versions/:version",
            get(handlers::get_artifact_version),
        )
        .with_state(state)
}

pub async fn start_server(store: Arc<VersionedStore>, bind_address: SocketAddr) -> Result<()> {
    let app_state = Arc::new(AppState { store });

    let app = router(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    info!("Server listening on {}", bind_address);

    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
