use aqua_ticker::{
    clock::{ClockSource, SystemClock},
    scheduler::spawn_rollover_task,
    storage::JsonFileStore,
    AppState, Config, Engine,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::fs;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    info!("using data file {}", config.data_path.display());
    let store = JsonFileStore::open(&config.data_path).await;
    let clock: Arc<dyn ClockSource> = Arc::new(SystemClock);
    let engine = Engine::load(Box::new(store), clock.clone(), config.default_goal_ml).await;
    let state = AppState::new(engine, config.allow_day_skip);

    let rollover = spawn_rollover_task(state.engine.clone(), clock);
    let app = aqua_ticker::router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    rollover.abort();
    if let Err(err) = state.engine.lock().await.flush().await {
        error!("final save incomplete: {err}");
    }
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}
