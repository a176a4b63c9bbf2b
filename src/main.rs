use anyhow::{Context, Result};
use clap::Parser;
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;

use feednorm::{Config, FeedParser};

#[derive(Parser, Debug)]
#[command(
    name = "feednorm",
    about = "Normalize RSS and Atom documents into one JSON feed shape"
)]
struct Args {
    /// Feed documents to normalize
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Config file (TOML); defaults apply when absent
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Print the generic XML tree instead of the normalized feed
    #[arg(long)]
    tree: bool,
}

/// Reads and converts one document, returning its JSON rendering.
async fn normalize_file(
    parser: Arc<FeedParser>,
    path: PathBuf,
    tree: bool,
    pretty: bool,
) -> Result<String> {
    let xml = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read feed file: {}", path.display()))?;

    // Normalization is CPU-bound; keep it off the async workers.
    let shown = path.display().to_string();
    let value = tokio::task::spawn_blocking(move || -> Result<serde_json::Value> {
        if tree {
            let doc = parser
                .tree(&xml)
                .with_context(|| format!("Failed to parse XML in {}", shown))?;
            return Ok(serde_json::to_value(doc)?);
        }
        let feed = parser
            .parse(&xml)
            .with_context(|| format!("Failed to parse XML in {}", shown))?;
        if feed.is_none() {
            tracing::warn!(path = %shown, "Document is neither RSS nor Atom");
        }
        Ok(serde_json::to_value(feed)?)
    })
    .await
    .context("Normalization task panicked")??;

    let rendered = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(rendered)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Config::default(),
    };
    let pretty = args.pretty || config.pretty;
    let parser = Arc::new(FeedParser::from_config(&config));

    let tasks = args
        .files
        .iter()
        .cloned()
        .map(|path| normalize_file(Arc::clone(&parser), path, args.tree, pretty));
    let results = join_all(tasks).await;

    let mut failures = 0usize;
    for (path, result) in args.files.iter().zip(results) {
        match result {
            Ok(json) => println!("{}", json),
            Err(e) => {
                failures += 1;
                tracing::error!(path = %path.display(), error = %e, "Failed to normalize feed");
                eprintln!("Error: {:#}", e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} feed(s) failed", failures, args.files.len());
    }
    Ok(())
}
