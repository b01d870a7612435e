use anyhow::Result;
use reqwest::Client;
use std::io;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use wikitables::{config::CONFIG_FILE, run, Config, RunOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();
    info!("startup");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) configure ────────────────────────────────────────────────
    let config = Config::load(CONFIG_FILE)?;
    config.validate()?;
    let client = Client::new();

    // ─── 3) run ──────────────────────────────────────────────────────
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run(&config, &client, &mut out).await? {
        RunOutcome::Completed(summary) => {
            info!(rows = summary.rows, downloaded = summary.downloaded, "all done")
        }
        // already reported; the exit status stays 0
        RunOutcome::PageUnavailable(e) => info!(error = %e, "stopped early"),
    }
    Ok(())
}
