/// Blog server entry point
use blog_server::{config::ServerConfig, context::AppContext, error::BlogResult, server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> BlogResult<()> {
    // Load configuration
    let config = ServerConfig::from_env()?;

    // Initialize logging from the configured filter (RUST_LOG)
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Create application context
    let ctx = AppContext::new(config).await?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}
