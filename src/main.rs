//! # Trackback CLI
//!
//! Command-line interface for recovering titles of deleted YouTube videos
//! from Wayback Machine snapshots.
//!
//! ## Usage
//!
//! ```bash
//! # Resolve one or more videos (bare IDs or watch URLs)
//! trackback resolve dQw4w9WgXcQ "https://www.youtube.com/watch?v=abc123xyz00"
//!
//! # Machine-readable output, one JSON object per video
//! trackback resolve --json dQw4w9WgXcQ
//!
//! # Just list the candidate snapshots the CDX index knows about
//! trackback snapshots dQw4w9WgXcQ
//! ```
//!
//! Settings (archive endpoints, retry policy) are read from an optional
//! TOML file; see `--config`. Diagnostics go to stderr via `RUST_LOG`.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use trackback::cdx;
use trackback::config::{load_config, Config};
use trackback::fetch::HttpTransport;
use trackback::models::Resolution;
use trackback::resolve::resolve;

#[derive(Parser)]
#[command(
    name = "trackback",
    about = "Recover titles of deleted YouTube videos from Wayback Machine snapshots",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./trackback.toml`; when the default is absent the
    /// built-in settings are used.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the historical title of one or more videos.
    ///
    /// Each argument may be a bare 11-character video ID or a full
    /// watch/youtu.be URL. Videos are resolved sequentially.
    Resolve {
        /// Video IDs or URLs.
        #[arg(required = true)]
        videos: Vec<String>,

        /// Emit one JSON object per video instead of human-readable text.
        #[arg(long)]
        json: bool,
    },

    /// List the candidate snapshots the CDX index holds for a video.
    ///
    /// Runs only the index query — no snapshot is fetched and no title
    /// extraction happens. Useful for checking what the archive has
    /// before resolving.
    Snapshots {
        /// Video ID or URL.
        video: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // An explicitly passed config file must exist; the default path is
    // optional.
    let config = match &cli.config {
        Some(path) => load_config(path, true)?,
        None => load_config(&PathBuf::from("./trackback.toml"), false)?,
    };

    match cli.command {
        Commands::Resolve { videos, json } => run_resolve(&config, &videos, json).await,
        Commands::Snapshots { video } => run_snapshots(&config, &video).await,
    }
}

fn video_id_from_arg(arg: &str) -> Result<String> {
    cdx::parse_video_id(arg)
        .with_context(|| format!("not a video ID or recognizable YouTube URL: {}", arg))
}

async fn run_resolve(config: &Config, videos: &[String], json: bool) -> Result<()> {
    let transport = HttpTransport::new(config.retry.timeout())?;
    let mut any_failed = false;

    for arg in videos {
        let video_id = video_id_from_arg(arg)?;
        let resolution = resolve(&transport, config, &video_id).await;

        if json {
            let mut value = serde_json::to_value(&resolution)?;
            value["video_id"] = serde_json::Value::String(video_id.clone());
            println!("{}", value);
        } else {
            print_resolution(&video_id, &resolution);
        }

        if matches!(resolution, Resolution::Failed { .. }) {
            any_failed = true;
        }
    }

    if any_failed {
        std::process::exit(1);
    }
    Ok(())
}

fn print_resolution(video_id: &str, resolution: &Resolution) {
    match resolution {
        Resolution::Found {
            title,
            rule,
            timestamp,
            url,
        } => {
            println!("{}: {}", video_id, title);
            println!("  rule:      {}", rule);
            println!("  snapshot:  {}", timestamp);
            println!("  url:       {}", url);
        }
        Resolution::NotFound => {
            println!("{}: no title found", video_id);
        }
        Resolution::Failed { error } => {
            eprintln!("{}: resolution failed: {}", video_id, error);
        }
    }
}

async fn run_snapshots(config: &Config, video: &str) -> Result<()> {
    let video_id = video_id_from_arg(video)?;
    let transport = HttpTransport::new(config.retry.timeout())?;
    let policy = config.retry.policy();

    let records = match cdx::query_index(&transport, &config.archive, &policy, &video_id).await {
        Ok(records) => records,
        Err(e) => bail!("{}", e),
    };

    if records.is_empty() {
        println!("No snapshots found for {}", video_id);
        return Ok(());
    }

    println!("{:<16} {:<34} URL", "TIMESTAMP", "DIGEST");
    for record in &records {
        println!(
            "{:<16} {:<34} {}",
            record.timestamp,
            record.digest,
            record.retrieval_url(&config.archive.wayback_api)
        );
    }
    Ok(())
}
