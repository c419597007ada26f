//! Edge gate in front of a tiny axum app.
//!
//! # Running
//!
//! ```bash
//! export APP_PASSWORD="secret123"
//! cargo run --example edge_server
//! curl -u anyuser:secret123 -A "Mozilla/5.0 (X11; Linux x86_64)" http://127.0.0.1:3000/api/data
//! ```

use axum::{routing::get, Router};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use worldgate::{integrations::axum::protect, EdgeGate, GateConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = GateConfig::from_env();
    tracing::info!(
        edge_auth = config.edge_auth_enabled(),
        realm = %config.auth_realm,
        "starting edge gate demo"
    );

    let gate = match EdgeGate::new(config) {
        Ok(gate) => Arc::new(gate),
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let app = protect(
        Router::new()
            .route("/", get(|| async { "home" }))
            .route("/api/data", get(|| async { r#"{"items":[]}"# }))
            .route("/api/og-story", get(|| async { "<meta property=\"og:title\">" })),
        gate,
    );

    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Bind error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
