use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use webstep::config::{RunnerConfig, ServerConfig};
use webstep::server;
use webstep::session::SessionRunner;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let runner_config = RunnerConfig::from_env();
    let server_config = ServerConfig::from_env();

    std::fs::create_dir_all(&runner_config.artifact_root)?;
    info!(root = %runner_config.artifact_root.display(), "artifact root ready");

    let runner = Arc::new(SessionRunner::new(runner_config));
    let app = server::router(runner, &server_config);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], server_config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "server running");
    axum::serve(listener, app).await?;
    Ok(())
}
