//! Pomodoro daemon - a persistent work/break interval timer served over HTTP
//!
//! This is the main entry point for the pomodoro-daemon application.

use std::{future::IntoFuture, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use pomodoro_daemon::{
    api::create_router,
    config::Config,
    services::{CommandCueSink, CueSink, FileStore, LogCueSink, MemoryStore, StateStore, TracingDisplay},
    state::{AppState, Services, SystemTimeSource},
    tasks::phase_ticker_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("pomodoro_daemon={},tower_http=info", config.log_level()))
        .init();

    info!("Starting pomodoro-daemon v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, tick={}ms, resume_gap={}s",
        config.host, config.port, config.tick_ms, config.resume_gap_secs
    );

    let store: Arc<dyn StateStore> = if config.ephemeral {
        info!("Ephemeral mode, state will not survive a restart");
        Arc::new(MemoryStore::new())
    } else {
        let store = FileStore::new(config.state_dir());
        info!("Persisting state to {}", store.path().display());
        Arc::new(store)
    };

    let cue: Arc<dyn CueSink> = match &config.cue_player {
        Some(player) => Arc::new(CommandCueSink::new(
            player.clone(),
            config.work_cue_sound.clone(),
            config.break_cue_sound.clone(),
        )),
        None => Arc::new(LogCueSink),
    };

    // Create application state, restoring whatever was persisted
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.resume_gap(),
        Services {
            store,
            display: Arc::new(TracingDisplay),
            cue,
            time: Arc::new(SystemTimeSource),
        },
    ));

    // Start the phase ticker background task
    let ticker_state = Arc::clone(&state);
    let tick = config.tick();
    tokio::spawn(async move {
        phase_ticker_task(ticker_state, tick).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /start             - Start a cycle or resume");
    info!("  POST   /pause             - Pause the running period");
    info!("  POST   /stop              - Return to idle");
    info!("  POST   /cue/stop          - Silence the phase-change cue");
    info!("  GET    /status            - Current phase and remaining time");
    info!("  GET    /settings          - Durations and repetitions");
    info!("  PUT    /settings          - Edit durations and repetitions");
    info!("  GET    /theme             - Card opacity and background");
    info!("  PUT    /theme             - Edit card opacity and background");
    info!("  DELETE /theme/background  - Remove the background image");
    info!("  GET    /health            - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app).into_future();

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    if let Err(e) = state.persist_now() {
        tracing::warn!("Failed to persist state on shutdown: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
