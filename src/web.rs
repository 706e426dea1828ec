use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::config::ServerConfig;
use crate::recommendation::SeatRecommendationService;

/// Full application: API routes plus CORS, timeout and request tracing
pub fn app(service: Arc<SeatRecommendationService>, config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api::router(service)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_seconds.into(),
        )))
        .layer(cors)
}

pub async fn run(config: &ServerConfig, service: Arc<SeatRecommendationService>) -> Result<()> {
    let app = app(service, config);
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;

    #[cfg(feature = "tls")]
    if let (Some(cert), Some(key)) = (&config.tls_cert_path, &config.tls_key_path) {
        let tls = axum_server::tls_rustls::RustlsConfig::from_pem_file(cert, key)
            .await
            .with_context(|| "Failed to load TLS certificate/key")?;
        tracing::info!("Web server running at https://{}", addr);
        axum_server::bind_rustls(addr, tls)
            .serve(app.into_make_service())
            .await
            .with_context(|| "TLS server terminated")?;
        return Ok(());
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);
    axum::serve(listener, app)
        .await
        .with_context(|| "Server terminated")?;
    Ok(())
}
