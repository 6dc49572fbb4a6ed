use file_drop::{
    models::public_url::PublicUrl,
    services::{file_storage::FileStorageService, tunnel},
    utils::config::AppConfig,
    AppState,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "file_drop=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::from_env();
    tracing::info!("Configuration loaded: {:?}", config);

    // Initialize file storage
    let storage = FileStorageService::new(&config.upload_dir).map_err(|e| {
        tracing::error!("Failed to initialize file storage: {}", e);
        e
    })?;

    // The tunnel child is never stopped; it outlives the server
    let _tunnel = if config.tunnel_enabled {
        match tunnel::launch_tunnel(&config.tunnel_binary, config.port) {
            Ok(child) => Some(child),
            Err(e) => {
                tracing::warn!("{}", e);
                None
            }
        }
    } else {
        tracing::info!("Tunnel disabled, QR codes will use request host URLs");
        None
    };

    let public_url = Arc::new(PublicUrl::new());
    let app_state = AppState::new(config.clone(), storage, public_url.clone());

    let app = file_drop::router(app_state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    let addr: SocketAddr = config.bind_address().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Starting file drop server on http://localhost:{}", config.port);

    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    });

    if config.tunnel_enabled {
        tokio::time::sleep(config.server_ready_delay).await;
        tunnel::publish_public_url(&config, &public_url).await;
    }

    server.await??;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
