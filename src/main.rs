//! Veriface HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use veriface::acquire::ImageAcquirer;
use veriface::align::FaceAligner;
use veriface::config::Config;
use veriface::detect::{DetectorBackend, ScrfdDetector};
use veriface::engine::{EmbeddingEngine, SimilarityEngine};
use veriface::gateway::{AppState, create_router};
use veriface::pipeline::RequestPipeline;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        model = %config.model,
        threshold = config.match_threshold,
        "Veriface starting"
    );

    if config.api_key.is_none() {
        tracing::warn!(
            "No VERIFACE_API_KEY configured; every compare request will be rejected"
        );
    }

    let mut detectors: Vec<Arc<dyn DetectorBackend>> = Vec::new();
    if let Some(path) = &config.detector_model_path {
        detectors.push(Arc::new(ScrfdDetector::load(path)?));
    } else {
        tracing::warn!(
            "No VERIFACE_DETECTOR_MODEL_PATH configured; faces will not be cropped before comparison"
        );
    }
    let aligner = FaceAligner::new(detectors);

    let engine = EmbeddingEngine::load(config.model, config.embedding_model_path.as_deref())?;
    let engine: Arc<dyn SimilarityEngine> = Arc::new(engine);

    let acquirer = ImageAcquirer::new(config.fetch_timeout(), config.max_file_bytes())?;

    let pipeline = RequestPipeline::new(acquirer, aligner, engine, config.match_threshold);
    let state = AppState::new(Arc::new(pipeline), config.api_key.clone());

    let app = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Veriface shutdown complete");
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
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
