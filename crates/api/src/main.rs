use std::net::SocketAddr;
use std::sync::Arc;

use relay_comfyui::api::ComfyUIApi;
use relay_pipeline::orchestrator::JobOrchestrator;
use relay_storage::s3::S3ObjectStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use relay_api::config::ServerConfig;
use relay_api::router::build_app_router;
use relay_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "relay_api=debug,relay_pipeline=debug,relay_comfyui=debug,relay_storage=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        comfy_url = %config.comfy_url,
        aws_region = %config.aws_region,
        "Loaded server configuration",
    );

    // --- Object storage ---
    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_sdk_s3::config::Region::new(config.aws_region.clone()))
        .load()
        .await;
    let store = Arc::new(S3ObjectStore::new(aws_sdk_s3::Client::new(&sdk_config)));
    tracing::info!("S3 client initialized");

    // --- Generation engine ---
    let engine = Arc::new(ComfyUIApi::new(config.comfy_url.clone()));

    // --- Orchestrator ---
    let orchestrator = Arc::new(JobOrchestrator::new(
        engine,
        store,
        config.pipeline_config(),
    ));

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        orchestrator,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting relay inference service");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by the container
/// runtime. In-flight jobs finish before the process exits; their
/// submitted prompts are never cancelled on the engine.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
