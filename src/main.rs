use bucketview::browser::DEFAULT_PRESIGN_TTL;
use bucketview::config::{
    BackendConfig, Config, S3BackendConfig, parse_page_size_range, validate_timings,
};
use bucketview::preview::{
    DEFAULT_CHECKPOINT_INTERVAL, DEFAULT_INDEX_CACHE_ENTRIES, DEFAULT_MAX_PREVIEW_SIZE,
    DEFAULT_PAGE_SIZE, DEFAULT_STREAMING_THRESHOLD, PageSizeLimits, PreviewSettings,
};
use bucketview::{
    AppState, BucketBrowser, InMemoryStorage, S3Backend, StorageBackend, TimeoutBackend,
    create_app,
};

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// Server configuration
const HOST: &str = "0.0.0.0";
const PORT: u16 = 3000;

// Default configuration values
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// bucketview: browse object storage and preview delimited-text files page by page
#[derive(Parser, Debug)]
#[command(name = "bucketview")]
#[command(about = "Browse S3 buckets and preview large CSV files page by page", long_about = None)]
struct Cli {
    /// Optional configuration file (JSON or YAML)
    #[arg(short, long, env = "CONFIG_PATH")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "HOST", default_value = HOST)]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = PORT)]
    port: u16,

    /// S3 region, used when the config file names no backend
    #[arg(long, env = "REGION_NAME", default_value = DEFAULT_REGION)]
    region: String,

    /// Custom S3 endpoint (MinIO, LocalStack, ...)
    #[arg(long, env = "S3_ENDPOINT")]
    endpoint: Option<String>,

    /// Use path-style bucket addressing
    #[arg(long, env = "S3_FORCE_PATH_STYLE")]
    force_path_style: bool,

    /// Static access key id; the default AWS credential chain is used when absent
    #[arg(long, env = "AWS_ACCESS_KEY")]
    access_key_id: Option<String>,

    /// Static secret access key
    #[arg(long, env = "AWS_SECRET_KEY", hide_env_values = true)]
    secret_access_key: Option<String>,

    /// Objects above this many bytes are offered for download only
    #[arg(long, env = "MAX_PREVIEW_SIZE", default_value_t = DEFAULT_MAX_PREVIEW_SIZE)]
    max_preview_size: u64,

    /// Rows per page when the caller does not ask for a page size
    #[arg(long, env = "DEFAULT_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    default_page_size: u64,

    /// Accepted page sizes, as MIN-MAX
    #[arg(long, env = "PAGE_SIZE_RANGE", default_value = "10000-50000", value_parser = parse_page_size_range)]
    page_size_range: PageSizeLimits,

    /// Lifetime of download links in seconds
    #[arg(long, env = "PRESIGN_TTL_SECONDS", default_value_t = DEFAULT_PRESIGN_TTL.as_secs())]
    presign_ttl_seconds: u64,

    /// Deadline for each object store call in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    request_timeout_secs: u64,

    /// Objects above this many bytes are paged through a row index
    #[arg(long, env = "STREAMING_THRESHOLD", default_value_t = DEFAULT_STREAMING_THRESHOLD)]
    streaming_threshold: u64,

    /// Always decode whole objects
    #[arg(long, env = "DISABLE_STREAMING")]
    disable_streaming: bool,

    /// Lines between row index checkpoints
    #[arg(long, env = "CHECKPOINT_INTERVAL", default_value_t = DEFAULT_CHECKPOINT_INTERVAL)]
    checkpoint_interval: u64,

    /// Field delimiter of previewed files
    #[arg(long, env = "DELIMITER", default_value_t = ',')]
    delimiter: char,
}

impl Cli {
    fn preview_settings(&self) -> PreviewSettings {
        PreviewSettings {
            max_preview_size: self.max_preview_size,
            default_page_size: self.default_page_size,
            page_size_limits: self.page_size_range,
            streaming_threshold: (!self.disable_streaming).then_some(self.streaming_threshold),
            checkpoint_interval: self.checkpoint_interval,
            index_cache_entries: DEFAULT_INDEX_CACHE_ENTRIES,
            delimiter: self.delimiter,
        }
    }

    fn default_backend(&self) -> BackendConfig {
        BackendConfig::S3(S3BackendConfig {
            name: "s3".to_string(),
            region: self.region.clone(),
            endpoint: self.endpoint.clone(),
            force_path_style: self.force_path_style,
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
        })
    }
}

async fn init_backend(
    backend_config: BackendConfig,
) -> Result<Arc<dyn StorageBackend>, Box<dyn std::error::Error>> {
    match backend_config {
        BackendConfig::S3(s3_config) => {
            tracing::info!(
                "Initializing S3 backend: {} ({})",
                s3_config.name,
                s3_config.region
            );
            let backend = S3Backend::new(
                s3_config.name,
                s3_config.region,
                s3_config.endpoint,
                s3_config.force_path_style,
                s3_config.access_key_id,
                s3_config.secret_access_key,
            )
            .await?;
            tracing::info!("✓ S3 backend '{}' initialized", backend.name());
            Ok(Arc::new(backend))
        }
        BackendConfig::Memory(mem_config) => {
            tracing::info!("Initializing in-memory backend: {}", mem_config.name);
            let storage = InMemoryStorage::new();
            for bucket in &mem_config.buckets {
                storage.create_bucket(bucket).await;
            }
            tracing::info!("✓ In-memory backend '{}' initialized", mem_config.name);
            Ok(Arc::new(storage))
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Parse command line arguments
    let cli = Cli::parse();

    // Load the optional configuration file
    let config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(cfg) => {
                tracing::info!("Loaded configuration from {}", path);
                cfg
            }
            Err(e) => {
                tracing::error!("Failed to load config file '{}': {}", path, e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    // Preview settings: config file > command line / environment
    let settings = config
        .preview
        .clone()
        .unwrap_or_else(|| cli.preview_settings());
    if let Err(e) = settings.validate() {
        tracing::error!("Invalid preview settings: {}", e);
        std::process::exit(1);
    }
    tracing::info!(
        "Preview limit {} bytes, page sizes {}-{} (default {})",
        settings.max_preview_size,
        settings.page_size_limits.min,
        settings.page_size_limits.max,
        settings.default_page_size
    );

    let presign_ttl =
        Duration::from_secs(config.presign_ttl_seconds.unwrap_or(cli.presign_ttl_seconds));
    let request_timeout = Duration::from_secs(
        config
            .request_timeout_secs
            .unwrap_or(cli.request_timeout_secs),
    );
    if let Err(e) = validate_timings(presign_ttl, request_timeout) {
        tracing::error!("Invalid timing settings: {}", e);
        std::process::exit(1);
    }

    let backend_config = config
        .backend
        .clone()
        .unwrap_or_else(|| cli.default_backend());
    let backend = match init_backend(backend_config).await {
        Ok(backend) => backend,
        Err(e) => {
            tracing::error!("✗ Failed to initialize storage backend: {}", e);
            std::process::exit(1);
        }
    };

    let storage: Arc<dyn StorageBackend> = Arc::new(TimeoutBackend::new(backend, request_timeout));
    let browser = BucketBrowser::new(storage, settings, presign_ttl);
    let app = create_app(AppState::new(browser));

    // Start server
    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Bucket browser API listening on {}", addr);
    tracing::info!(
        "Example: curl 'http://localhost:{}/api/buckets'",
        cli.port
    );

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
