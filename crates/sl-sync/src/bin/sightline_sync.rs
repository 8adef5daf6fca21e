//! One-shot synchronizer: mounts a session, runs a single round against the
//! configured backend and prints the resulting view model as JSON.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sl_sync::{SyncConfig, SyncSession};

#[derive(Debug, Parser)]
#[command(name = "sightline-sync", about = "Fetch dashboard data and print the view model")]
struct Cli {
    /// Backend base URL, e.g. http://127.0.0.1:8000 [env: SIGHTLINE_BASE_URL]
    #[arg(long)]
    base_url: Option<String>,

    /// JSON config file [env: SIGHTLINE_CONFIG]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,
}

impl Cli {
    fn sync_config(&self) -> Result<SyncConfig> {
        // Flags beat the environment, which beats the config file.
        let mut config = match &self.config {
            Some(path) => SyncConfig::from_file(path)?.with_env_overrides(),
            None => SyncConfig::from_env()?,
        };
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.sync_config()?;

    // Single-threaded: every merge runs on the task that polled the fetches.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let output = runtime.block_on(async {
        let session = SyncSession::from_config(&config);
        let report = session.sync().await;
        let view_model = session.snapshot();
        session.unmount();

        serde_json::json!({
            "session": session.id(),
            "risk_stats": view_model.risk_stats(),
            "view_model": view_model,
            "report": report,
        })
    });

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");
    Ok(())
}
