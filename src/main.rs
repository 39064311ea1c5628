mod app;

use anyhow::Result;
use clap::Parser;
use std::io::Write;

use app::{Cli, load_config, run};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    tracing::info!(
        "Limits: filter depth {}, XML depth {}",
        config.max_depth,
        config.max_xml_depth
    );

    let output = run(&cli, &config)?;
    std::io::stdout().write_all(output.as_bytes())?;

    Ok(())
}
