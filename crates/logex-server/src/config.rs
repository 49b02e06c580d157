//! Server configuration from command-line flags and environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use logex_engine::{IndexPatterns, SearchConfig};

use crate::error::{ServerError, ServerResult};

/// Highest `maxlogs` value accepted over HTTP.
pub const MAX_LOGS_LIMIT: u64 = 1000;

/// Which executor answers queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Live search cluster.
    Search,
    /// In-memory reference engine.
    Reference,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "logex")]
#[command(about = "Filtered log query API for Kubernetes logs")]
#[command(version)]
pub struct Args {
    /// Search cluster address
    #[arg(long, env = "LOGEX_ES_ADDR", default_value = logex_engine::config::DEFAULT_ADDRESS)]
    pub es_addr: String,

    /// Client certificate (PEM)
    #[arg(long, env = "LOGEX_ES_CERT")]
    pub es_cert: Option<PathBuf>,

    /// Client private key (PKCS#8 PEM)
    #[arg(long, env = "LOGEX_ES_KEY")]
    pub es_key: Option<PathBuf>,

    /// Authenticate to the search cluster with the client certificate
    #[arg(long, env = "LOGEX_ES_TLS")]
    pub es_tls: bool,

    /// Search request timeout in seconds
    #[arg(long, env = "LOGEX_ES_TIMEOUT_SECS", default_value_t = 30)]
    pub es_timeout_secs: u64,

    /// Index pattern for application logs
    #[arg(long, env = "LOGEX_INDEX_APP", default_value = "app-*")]
    pub index_app: String,

    /// Index pattern for infrastructure logs
    #[arg(long, env = "LOGEX_INDEX_INFRA", default_value = "infra-*")]
    pub index_infra: String,

    /// Index pattern for audit logs
    #[arg(long, env = "LOGEX_INDEX_AUDIT", default_value = "audit-*")]
    pub index_audit: String,

    /// Address to serve the API on
    #[arg(long, env = "LOGEX_LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Query executor
    #[arg(long, env = "LOGEX_BACKEND", value_enum, default_value_t = BackendKind::Search)]
    pub backend: BackendKind,

    /// JSON-lines file loaded into the reference engine at startup
    #[arg(long, env = "LOGEX_SEED")]
    pub seed: Option<PathBuf>,

    /// Default log filter directive
    #[arg(long, env = "LOGEX_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOGEX_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Validated server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP server to.
    pub bind_addr: SocketAddr,
    /// Selected executor.
    pub backend: BackendKind,
    /// Search backend settings.
    pub search: SearchConfig,
    /// Per-query deadline.
    pub query_timeout: Duration,
    /// Seed file for the reference engine.
    pub seed: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            backend: BackendKind::Search,
            search: SearchConfig::default(),
            query_timeout: logex_engine::config::DEFAULT_TIMEOUT,
            seed: None,
        }
    }
}

impl ServerConfig {
    /// Create a configuration for the given backend.
    #[must_use]
    pub fn new(backend: BackendKind) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    /// Set the bind address.
    #[must_use]
    pub const fn with_bind_addr(mut self, bind_addr: SocketAddr) -> Self {
        self.bind_addr = bind_addr;
        self
    }

    /// Set the search backend settings.
    #[must_use]
    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    /// Set the seed file.
    #[must_use]
    pub fn with_seed(mut self, seed: impl Into<PathBuf>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the search settings are invalid while the search
    /// backend is selected, or a seed file is given for the search backend.
    pub fn validate(&self) -> ServerResult<()> {
        match self.backend {
            BackendKind::Search => {
                if self.seed.is_some() {
                    return Err(ServerError::InvalidConfig(
                        "--seed requires --backend reference".to_string(),
                    ));
                }
                self.search.validate()?;
            }
            BackendKind::Reference => {}
        }

        if self.query_timeout.is_zero() {
            return Err(ServerError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl TryFrom<&Args> for ServerConfig {
    type Error = ServerError;

    fn try_from(args: &Args) -> ServerResult<Self> {
        let timeout = Duration::from_secs(args.es_timeout_secs);
        let mut search = SearchConfig::new(&args.es_addr)
            .with_indices(IndexPatterns {
                app: args.index_app.clone(),
                infra: args.index_infra.clone(),
                audit: args.index_audit.clone(),
            })
            .with_timeout(timeout);

        if args.es_tls {
            match (&args.es_cert, &args.es_key) {
                (Some(cert), Some(key)) => search = search.with_identity(cert, key),
                _ => {
                    return Err(ServerError::InvalidConfig(
                        "--es-tls requires --es-cert and --es-key".to_string(),
                    ));
                }
            }
        }

        let config = Self {
            bind_addr: args.listen,
            backend: args.backend,
            search,
            query_timeout: timeout,
            seed: args.seed.clone(),
        };
        config.validate()?;
        Ok(config)
    }
}
