//! kvbench - benchmark every registered key-value backend.

use std::io;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kvbench::{AdapterRegistry, Args, Harness};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout carries only the report.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kvbench=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Args::parse().into_config();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        data_dir = %config.data_dir.display(),
        "starting kvbench"
    );

    let mut registry = AdapterRegistry::standard(&config.data_dir);
    let mut harness = Harness::new(config, io::stdout().lock());

    if let Err(e) = harness.run(&mut registry) {
        tracing::error!(error = %e, kind = ?e.kind(), "benchmark aborted");
        return Err(e.into());
    }

    Ok(())
}
