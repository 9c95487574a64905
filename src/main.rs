//! `vidscout` CLI - exercise the detection heuristics from the terminal

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use vidscout::DetectorConfig;

mod cmd;

#[derive(Parser)]
#[command(name = "vidscout")]
#[command(about = "Passive media-stream detection for browsing sessions")]
#[command(version)]
struct Cli {
    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Detector configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one URL through the classification funnel
    Classify {
        /// URL to classify
        url: String,

        /// Observed content-type header
        #[arg(short = 't', long)]
        content_type: Option<String>,

        /// Resource kind (document, script, stylesheet, image, font, media, xhr, other)
        #[arg(short, long, default_value = "other")]
        kind: String,

        /// Observed content-length in bytes
        #[arg(short, long)]
        size: Option<u64>,
    },

    /// Scan an HTML document for media candidates
    Scan {
        /// HTML file to scan, or '-' for stdin
        file: PathBuf,

        /// URL of the page the document came from
        #[arg(short, long)]
        page_url: String,

        /// Emit candidates as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay a JSONL capture of response/lifecycle records through a session store
    Replay {
        /// JSONL capture file, or '-' for stdin
        file: PathBuf,

        /// Only report this session id
        #[arg(short, long)]
        session: Option<u64>,

        /// Emit retained streams as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &cli.config {
        Some(path) => DetectorConfig::load(path)?,
        None => DetectorConfig::default(),
    };

    match cli.command {
        Commands::Classify {
            url,
            content_type,
            kind,
            size,
        } => cmd::classify::cmd_classify(&config, &url, content_type.as_deref(), &kind, size),
        Commands::Scan { file, page_url, json } => cmd::scan::cmd_scan(&config, &file, &page_url, json),
        Commands::Replay { file, session, json } => cmd::replay::cmd_replay(&config, &file, session, json),
    }
}
