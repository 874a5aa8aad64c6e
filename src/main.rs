//! Telegram Post Collector — Binary Entrypoint
//! Boots the headless browser, wires the run configuration, and drives the
//! time-boxed collection loop.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use telegram_post_collector::collect::{self, chrome::ChromeFeedSource};
use telegram_post_collector::config::RunConfig;

/// Compact tracing output; `RUST_LOG` overrides the default `info` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = RunConfig::from_env()?;
    let mut source = ChromeFeedSource::launch().await?;

    let outcome = collect::run(&cfg, &mut source).await;

    // Release the browser on the failure path too.
    if let Err(error) = source.close().await {
        tracing::warn!(%error, "failed to shut the browser down cleanly");
    }

    let summary = outcome?;
    tracing::info!(
        posts = summary.accepted,
        path = %summary.output_path.display(),
        "finished collecting unique posts"
    );
    Ok(())
}
