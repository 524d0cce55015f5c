//! stage-config
//!
//! Prints the merged configuration stream for one or more staged YAML
//! configuration trees.

use anyhow::{Context, Result};
use clap::Parser;
use stage_config::cli::{Cli, failure_context, format_listing};
use stage_config::config::ConfigCollector;
use stage_config::env::Environment;
use stage_config::logging::{self, LogTarget};
use std::io::Write;
use tracing::{debug, info};

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let env = Environment::capture();
    let options = cli.collect_options(&env);
    debug!(
        stage = options.stage().unwrap_or(""),
        in_container = env.in_container,
        "Resolved collection options"
    );

    let collector = ConfigCollector::new(options);
    let collection = collector.collect(&cli.roots).map_err(|e| {
        let context = failure_context(&e);
        anyhow::Error::new(e).context(context)
    })?;
    info!(files = collection.len(), "Collected configuration fragments");

    let output = if cli.list {
        format_listing(&collection).into_bytes()
    } else {
        let stream = collection.read().map_err(|e| {
            let context = failure_context(&e);
            anyhow::Error::new(e).context(context)
        })?;
        cli.format.render(stream)?
    };

    match &cli.output {
        Some(path) => std::fs::write(path, &output)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&output)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
