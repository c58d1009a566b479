use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod config;
mod engine;
mod error;
mod ocr;
mod preprocessing;
mod server;

#[derive(Parser, Debug)]
#[command(name = "snaptext")]
#[command(about = "SnapText - Extract text from images using OCR")]
#[command(version)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract text from an image file
    Extract(ExtractArgs),
    /// Run the HTTP upload service
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Path to the image file to process
    pub image_path: PathBuf,

    /// Output file to save extracted text (default: print to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Show OCR confidence information
    #[arg(long)]
    pub confidence: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Language for OCR (e.g., "eng", "deu", "fra")
    #[arg(long, env = "SNAPTEXT_LANGUAGE", default_value = "eng")]
    pub language: String,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Host address to bind to
    #[arg(long, env = "SNAPTEXT_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "SNAPTEXT_PORT", default_value = "5000")]
    pub port: u16,

    /// Language for OCR (e.g., "eng", "deu", "fra")
    #[arg(long, env = "SNAPTEXT_LANGUAGE", default_value = "eng")]
    pub language: String,

    /// Maximum upload size in bytes (default: 50MB)
    #[arg(long, env = "SNAPTEXT_MAX_FILE_SIZE", default_value = "52428800")]
    pub max_file_size: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; extracted text owns stdout.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Extract(args) => cli::run(args),
        Commands::Serve(args) => {
            let config = config::Config::from(args);
            tracing::info!("Starting snaptext server v{}", env!("CARGO_PKG_VERSION"));
            tracing::info!("Binding to {}:{}", config.host, config.port);
            server::run(config).await
        }
    }
}
