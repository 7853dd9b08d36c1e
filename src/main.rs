//! Main entry point for the explore-zim CLI application.
//!
//! This binary opens a ZIM archive from the local filesystem or a remote
//! HTTP URL, builds its link graph and runs one of three modes.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use explore_zim::format::{format_exploration, format_listing};
use explore_zim::{Cli, Explorer, HttpRangeReader, LocalFileReader, Mode, repl};

/// Application entry point.
///
/// Everything runs on a single thread; each archive read completes before
/// the next one starts.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let options = cli.explorer_options();

    let explorer = if cli.is_http_url() {
        // Remote archive via HTTP Range requests
        let reader = Arc::new(HttpRangeReader::new(cli.zim.clone()).await?);
        let explorer = Explorer::open(reader.clone(), &options)
            .await
            .with_context(|| format!("Failed to read {}", cli.zim))?;

        tracing::info!(
            "Total bytes transferred: {}",
            format_size(reader.transferred_bytes())
        );
        explorer
    } else {
        let reader = Arc::new(LocalFileReader::new(Path::new(&cli.zim))?);
        Explorer::open(reader, &options)
            .await
            .with_context(|| format!("Failed to read {}", cli.zim))?
    };

    match cli.mode {
        None => {
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout().lock();
            repl::run(&explorer, stdin, &mut stdout).await?;
        }
        Some(Mode::List) => list_articles(&explorer)?,
        Some(Mode::Explore) => explore_articles(&explorer)?,
    }

    Ok(())
}

/// Print every article grouped by category.
fn list_articles(explorer: &Explorer) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(
        stdout,
        "{}",
        format_listing(explorer.listing(), explorer.graph())
    )?;
    Ok(())
}

/// Print the summary followed by every article with its links, in ID order.
fn explore_articles(explorer: &Explorer) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{}", format_exploration(explorer))?;
    Ok(())
}

/// Format a byte size into a human-readable string.
///
/// Automatically selects the appropriate unit (bytes, KB, MB, GB)
/// based on the size magnitude.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
