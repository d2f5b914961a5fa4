//! Silo - artifact repository server over flat object storage
//!
//! Serves a bucket of flat keys as a browsable Maven/npm style repository:
//! hierarchical directory listings, conditional artifact fetches, and
//! duplicate-guarded uploads.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::sync::watch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use common::storage::StorageConfig;
use service::{Config, ServiceState};

/// Silo - artifact repository server over flat object storage
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on for HTTP requests
    #[arg(short, long, default_value = "8080", env = "SILO_PORT")]
    port: u16,

    /// Application id; the default bucket name derives from it
    #[arg(long, default_value = "silo", env = "SILO_APP_ID")]
    app_id: String,

    /// Storage backend to serve artifacts from
    #[arg(long, value_enum, default_value_t = StorageBackend::Memory)]
    storage: StorageBackend,

    /// Root directory for the local backend
    #[arg(long, required_if_eq("storage", "local"))]
    local_root: Option<PathBuf>,

    /// S3 endpoint URL
    #[arg(long, env = "SILO_S3_ENDPOINT", required_if_eq("storage", "s3"))]
    s3_endpoint: Option<String>,

    /// S3 access key
    #[arg(long, env = "AWS_ACCESS_KEY_ID", required_if_eq("storage", "s3"))]
    s3_access_key: Option<String>,

    /// S3 secret key
    #[arg(
        long,
        env = "AWS_SECRET_ACCESS_KEY",
        required_if_eq("storage", "s3"),
        hide_env_values = true
    )]
    s3_secret_key: Option<String>,

    /// S3 region
    #[arg(long, env = "AWS_REGION")]
    s3_region: Option<String>,

    /// Bucket name; defaults to "<app-id>.artifacts"
    #[arg(long, env = "SILO_BUCKET")]
    bucket: Option<String>,

    /// Path to the TOML credentials file
    #[arg(long, env = "SILO_CREDENTIALS")]
    credentials: Option<PathBuf>,

    /// Reject uploads that would overwrite an existing artifact
    #[arg(long, env = "SILO_UNIQUE_ARTIFACTS")]
    unique_artifacts: bool,

    /// Cache-Control header applied to listing responses
    #[arg(long, env = "SILO_CACHE_CONTROL_LIST")]
    cache_control_list: Option<String>,

    /// Cache-Control header applied to fetch responses
    #[arg(long, env = "SILO_CACHE_CONTROL_FETCH")]
    cache_control_fetch: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", env = "SILO_LOG_LEVEL")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StorageBackend {
    /// Volatile in-process store, for development
    Memory,
    /// Directory on the local filesystem
    Local,
    /// S3-compatible object store
    S3,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let (non_blocking_writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    let log_level: tracing::Level = args.log_level.parse().unwrap_or(tracing::Level::INFO);
    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(non_blocking_writer)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stdout_layer).init();

    tracing::info!(
        unique_artifacts = args.unique_artifacts,
        "Starting Silo repository server"
    );

    let listen_addr = SocketAddr::from_str(&format!("0.0.0.0:{}", args.port))?;
    let config = Config {
        listen_addr: Some(listen_addr),
        storage: storage_config(&args)?,
        credentials_path: args.credentials.clone(),
        unique_artifacts: args.unique_artifacts,
        cache_control_list: args.cache_control_list.clone(),
        cache_control_fetch: args.cache_control_fetch.clone(),
        log_level,
    };

    let state = match ServiceState::from_config(&config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to create service state: {}", e);
            std::process::exit(1);
        }
    };

    // Set up graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let graceful_shutdown = async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl+c");
        tracing::info!("Received shutdown signal");
        let _ = shutdown_tx.send(());
    };
    tokio::spawn(graceful_shutdown);

    service::http::run(config.listen_addr(), state, config.log_level, shutdown_rx).await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Map the backend selection flags onto a storage configuration.
fn storage_config(args: &Args) -> Result<StorageConfig> {
    match args.storage {
        StorageBackend::Memory => Ok(StorageConfig::Memory),
        StorageBackend::Local => {
            let root = args
                .local_root
                .clone()
                .context("--local-root is required for local storage")?;
            Ok(StorageConfig::Local { root })
        }
        StorageBackend::S3 => {
            let bucket = args
                .bucket
                .clone()
                .unwrap_or_else(|| Config::default_bucket(&args.app_id));
            Ok(StorageConfig::S3 {
                endpoint: args
                    .s3_endpoint
                    .clone()
                    .context("--s3-endpoint is required for s3 storage")?,
                access_key: args
                    .s3_access_key
                    .clone()
                    .context("--s3-access-key is required for s3 storage")?,
                secret_key: args
                    .s3_secret_key
                    .clone()
                    .context("--s3-secret-key is required for s3 storage")?,
                bucket,
                region: args.s3_region.clone(),
            })
        }
    }
}
