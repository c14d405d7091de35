// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::application::dashboard_store::DashboardStore;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::http_api_client::HttpApiClient;
use crate::infrastructure::storage::DashboardStorage;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    create_widget, delete_widget, get_dashboard, health_check, refresh_all, refresh_widget,
    test_connection, update_layout, update_widget, widget_view,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = load_app_config()?;

    // Wire the store (infrastructure -> application)
    let api_client = Arc::new(HttpApiClient::new());
    let storage = DashboardStorage::new(&config.storage.dir);
    let store = DashboardStore::load(api_client, storage).await?;

    let state = Arc::new(AppState { store });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/widgets", post(create_widget))
        .route("/widgets/refresh-all", post(refresh_all))
        .route(
            "/widgets/:id",
            axum::routing::patch(update_widget).delete(delete_widget),
        )
        .route("/widgets/:id/view", get(widget_view))
        .route("/widgets/:id/refresh", post(refresh_widget))
        .route("/layout", put(update_layout))
        .route("/connection/test", post(test_connection))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.listen_addr.parse()?;
    tracing::info!("starting finboard service on {addr}");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
