use std::{net::SocketAddr, sync::Arc};
use tokio::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use water_tracker::{
    clock::{Clock, FixedClock, SystemClock},
    load_data, router, AppState, Config, Tracker,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let data = load_data(&config.data_path).await;
    let clock: Arc<dyn Clock> = match config.fixed_today {
        Some(date) => {
            info!("clock pinned to {date}");
            Arc::new(FixedClock::new(date))
        }
        None => Arc::new(SystemClock),
    };
    if config.debug {
        info!("debug routes enabled");
    }

    let state = AppState::new(
        config.data_path.clone(),
        Tracker::from_data(data),
        clock,
        config.debug,
    );
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
