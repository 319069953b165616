use std::net::{IpAddr, SocketAddr};

use anyhow::Context;
use platform_mock_api::{COLLECTION_PATH, Collection, router, seed_users};
use tracing::{info, warn};

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
    seed: usize,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16, seed: usize) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
            seed,
        }
    }
}

/// Serve an in-memory collection seeded with `config.seed` users of `sector`
/// until Ctrl+C or SIGTERM.
pub async fn serve(config: ServeConfig, sector: i64) -> anyhow::Result<()> {
    let collection = Collection::shared(seed_users(sector, config.seed));
    let app = router(collection);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(
        %config.addr,
        seed = config.seed,
        sector,
        "mock collection listening on http://{}{}",
        config.addr,
        COLLECTION_PATH
    );
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    info!("mock collection stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(%err, "failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(%err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
}
