use anyhow::Context;
use mock_server::ServerConfig;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mock_server=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let router = mock_server::app_with_config(&config)?;
    let listener = TcpListener::bind(config.addr())
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    let addr = listener.local_addr()?;
    info!(%addr, cors_origin = %config.cors_origin, "listening");
    mock_server::serve(listener, router).await?;
    Ok(())
}
