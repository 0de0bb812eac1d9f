mod config;
mod cookies;
mod error;
mod guard;
mod middleware;
mod routes;
mod services;
mod state;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = config::GatewayConfig::from_env().expect("invalid gateway configuration");
    let backend = services::backend::HttpBackend::from_config(&config).expect("backend client init failed");
    tracing::info!(api_url = %config.api_url, secure_cookies = config.cookie_secure, "backend configured");

    let port = config.port;
    let state = state::AppState::new(config, Arc::new(backend));

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "auth gateway listening");
    axum::serve(listener, app).await.expect("server failed");
}
