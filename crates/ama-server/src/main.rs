use tracing_subscriber::{fmt, EnvFilter};

use ama_server::{serve, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::load()?;
    serve(config).await
}
