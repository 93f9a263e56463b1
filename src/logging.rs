//! Tracing setup for the server binary.
//!
//! `RUST_LOG` wins when set.  Otherwise the crate logs at `debug` in
//! development and `info` in production, with everything else at the
//! level below.  Development output is human-readable; production emits
//! one JSON object per event for the log shipper.

use crate::config::Environment;
use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(env: Environment) -> &'static str {
    match env {
        Environment::Dev => "brick_quote=debug,info",
        Environment::Prod => "brick_quote=info,warn",
    }
}

/// Install the global subscriber.  Fails if one is already installed.
pub fn init_logging(env: Environment) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(env)));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if env.is_dev() {
        registry
            .with(tracing_subscriber::fmt::layer().pretty().with_file(true).with_line_number(true))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init()
    };
    installed.context("installing tracing subscriber")?;

    tracing::debug!(?env, "logging ready");
    Ok(())
}
