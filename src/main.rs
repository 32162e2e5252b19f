use clap::Parser;
use receipt_ocr_server::{config, server};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "receipt-ocr-server")]
#[command(about = "HTTP server that extracts text from photographed receipts")]
#[command(version)]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "RECEIPT_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "RECEIPT_PORT", default_value = "8080")]
    pub port: u16,

    /// Maximum upload size in bytes (default: 50MB)
    #[arg(long, env = "RECEIPT_MAX_FILE_SIZE", default_value = "52428800")]
    pub max_file_size: usize,

    /// Maximum width of the working image after resize
    #[arg(long, env = "RECEIPT_MAX_WIDTH", default_value = "1920")]
    pub max_width: u32,

    /// Maximum height of the working image after resize
    #[arg(long, env = "RECEIPT_MAX_HEIGHT", default_value = "1080")]
    pub max_height: u32,

    /// Minimum contour area (px^2) for a candidate receipt boundary
    #[arg(long, env = "RECEIPT_MIN_CONTOUR_AREA", default_value = "10000")]
    pub min_contour_area: f64,

    /// Gamma exponent applied during contrast enhancement
    #[arg(long, env = "RECEIPT_GAMMA", default_value = "1.2")]
    pub gamma: f32,

    /// Directory where per-request crop/enhancement artifacts are kept.
    /// When unset, artifacts are temp files removed after each request.
    #[arg(long, env = "RECEIPT_ARTIFACT_DIR")]
    pub artifact_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl From<Args> for config::Config {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            max_file_size: args.max_file_size,
            max_width: args.max_width,
            max_height: args.max_height,
            min_contour_area: args.min_contour_area,
            gamma: args.gamma,
            artifact_dir: args.artifact_dir,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from(args);

    tracing::info!("Starting receipt-ocr-server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Binding to {}:{}", config.host, config.port);

    server::run(config).await
}
