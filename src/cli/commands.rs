//! CLI command implementations
//!
//! Boot sequence for `serve`:
//! 1. Configuration load and validation
//! 2. Log level applied
//! 3. Document store opened (file log replayed, or in-memory)
//! 4. Search index client built, index provisioned if `setup` is set
//! 5. Service wired with hooks and observers
//! 6. HTTP API activated

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::core::{ObserverSet, SaveHook};
use crate::http_server::{HttpServer, HttpServerConfig};
use crate::index::{ElasticsearchIndex, SearchIndex, SearchIndexConfig, SecondaryIndexHook};
use crate::observability::{
    log_event, log_event_with_fields, Event, LogObserver, Logger, MetricsObserver, MetricsRegistry,
    Severity,
};
use crate::service::{DocumentService, ServiceConfig};
use crate::storage::{DocumentStore, FileDocumentStore, InMemoryDocumentStore, TimedStore};

use super::args::Command;
use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Root of the file store; in-memory store when absent
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Bound on every document store call
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    #[serde(default)]
    pub serialize_same_id: bool,

    /// trace, info, warn, error or fatal
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub http: HttpServerConfig,

    /// Search index mirroring; disabled when absent
    #[serde(default)]
    pub search_index: Option<SearchIndexConfig>,
}

fn default_store_timeout_ms() -> u64 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            store_timeout_ms: default_store_timeout_ms(),
            serialize_same_id: false,
            log_level: default_log_level(),
            http: HttpServerConfig::default(),
            search_index: None,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.store_timeout_ms == 0 {
            return Err(CliError::config_error("store_timeout_ms must be > 0"));
        }

        self.severity()?;

        if let Some(index) = &self.search_index {
            index
                .validate()
                .map_err(|e| CliError::config_error(format!("search_index: {}", e)))?;
        }

        Ok(())
    }

    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level
            .parse()
            .map_err(|e: String| CliError::config_error(format!("log_level: {}", e)))
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            serialize_same_id: self.serialize_same_id,
        }
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(config.as_deref(), port),
        Command::Init { config } => init(&config),
        Command::SetupIndex { config } => setup_index(&config),
    }
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))
}

/// Create `<data_dir>/data`
///
/// Fails when a document log already exists there.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let data_dir = config
        .data_dir
        .as_deref()
        .ok_or_else(|| CliError::config_error("init requires data_dir"))?;

    let data_subdir = data_dir.join("data");
    if data_subdir.join("documents.dat").exists() {
        return Err(CliError::already_initialized());
    }

    fs::create_dir_all(&data_subdir).map_err(|e| {
        CliError::config_error(format!("Failed to create directory {:?}: {}", data_subdir, e))
    })?;

    println!("{}", json!({"initialized": true}));
    Ok(())
}

/// Provision the configured search index and exit
pub fn setup_index(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);

    let index_config = config
        .search_index
        .as_ref()
        .ok_or_else(|| CliError::config_error("setup-index requires a search_index section"))?;
    let index = ElasticsearchIndex::new(index_config)?;

    let created = runtime()?.block_on(index.ensure_index())?;
    println!("{}", json!({"index": index.index_name(), "created": created}));
    Ok(())
}

/// Start the HTTP API
///
/// Without a config path the built-in defaults apply: in-memory store, no
/// search index, port 8080.
pub fn serve(config_path: Option<&Path>, port: Option<u16>) -> CliResult<()> {
    let mut config = match config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(port) = port {
        config.http.port = port;
    }
    Logger::set_min_severity(config.severity()?);

    log_event(Event::BootStart);
    let port = config.http.port.to_string();
    let data_dir = config
        .data_dir
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<memory>".to_string());
    log_event_with_fields(
        Event::ConfigLoaded,
        &[("data_dir", data_dir.as_str()), ("port", port.as_str())],
    );

    runtime()?.block_on(async {
        let metrics = Arc::new(MetricsRegistry::new());
        let service = build_service(&config, metrics.clone()).await?;
        let server = HttpServer::new(config.http.clone(), Arc::new(service), metrics);

        log_event(Event::BootComplete);
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Wire store, hooks and observers from configuration
pub async fn build_service(config: &Config, metrics: Arc<MetricsRegistry>) -> CliResult<DocumentService> {
    let store: Arc<dyn DocumentStore> = match &config.data_dir {
        Some(dir) => Arc::new(TimedStore::new(
            FileDocumentStore::open(dir).await?,
            config.store_timeout(),
        )),
        None => Arc::new(TimedStore::new(
            InMemoryDocumentStore::new(),
            config.store_timeout(),
        )),
    };

    let mut hooks: Vec<Arc<dyn SaveHook>> = Vec::new();
    if let Some(index_config) = &config.search_index {
        let index = ElasticsearchIndex::new(index_config)?;
        if index_config.setup {
            index.ensure_index().await?;
        }
        let index: Arc<dyn SearchIndex> = Arc::new(index);
        hooks.push(Arc::new(SecondaryIndexHook::new(index).with_metrics(metrics.clone())));
    }

    let observers = ObserverSet::new()
        .with(LogObserver)
        .with(MetricsObserver::new(metrics));

    Ok(DocumentService::new(store, hooks)
        .with_observer(observers)
        .with_config(config.service_config()))
}
