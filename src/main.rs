//! Entry point for the Brick Quote binary.
//!
//! Running this binary starts an HTTP server exposing the estimation
//! and pricing API.  Configuration comes from the environment (or a
//! `.env` file); see [`brick_quote::config::ServerConfig`].

use brick_quote::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;
    brick_quote::logging::init_logging(config.env)?;
    if let Err(err) = brick_quote::api::serve(&config).await {
        tracing::error!("{:#}", err);
        std::process::exit(1);
    }
    Ok(())
}
