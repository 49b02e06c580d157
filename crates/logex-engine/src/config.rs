//! Search backend configuration.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;
use crate::types::Partition;

/// Default backend address.
pub const DEFAULT_ADDRESS: &str = "https://localhost:9200";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Index patterns backing each partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPatterns {
    /// Pattern for application logs.
    pub app: String,
    /// Pattern for infrastructure logs.
    pub infra: String,
    /// Pattern for audit logs.
    pub audit: String,
}

impl Default for IndexPatterns {
    fn default() -> Self {
        Self {
            app: "app-*".to_string(),
            infra: "infra-*".to_string(),
            audit: "audit-*".to_string(),
        }
    }
}

impl IndexPatterns {
    /// Returns the pattern for a partition.
    #[must_use]
    pub fn get(&self, partition: Partition) -> &str {
        match partition {
            Partition::App => &self.app,
            Partition::Infra => &self.infra,
            Partition::Audit => &self.audit,
        }
    }
}

/// PEM client certificate and key for mutual TLS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsIdentity {
    /// Path to the PEM certificate.
    pub cert_path: PathBuf,
    /// Path to the PKCS#8 PEM private key.
    pub key_path: PathBuf,
}

/// Configuration for [`SearchBackend`](crate::search::SearchBackend).
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Base address of the search cluster.
    pub address: String,
    /// Partition index patterns.
    pub indices: IndexPatterns,
    /// Client identity, if the cluster requires one.
    pub identity: Option<TlsIdentity>,
    /// Skip server certificate verification.
    pub accept_invalid_certs: bool,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            indices: IndexPatterns::default(),
            identity: None,
            accept_invalid_certs: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SearchConfig {
    /// Creates a configuration for the given address.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    /// Sets the index patterns.
    #[must_use]
    pub fn with_indices(mut self, indices: IndexPatterns) -> Self {
        self.indices = indices;
        self
    }

    /// Sets the client identity.
    #[must_use]
    pub fn with_identity(mut self, cert_path: impl Into<PathBuf>, key_path: impl Into<PathBuf>) -> Self {
        self.identity = Some(TlsIdentity {
            cert_path: cert_path.into(),
            key_path: key_path.into(),
        });
        self
    }

    /// Sets whether invalid server certificates are accepted.
    #[must_use]
    pub const fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the index pattern for a partition.
    #[must_use]
    pub fn index_for(&self, partition: Partition) -> &str {
        self.indices.get(partition)
    }

    /// Parses and checks the backend address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAddress`] if the address is not an
    /// absolute http or https URL.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidAddress(self.address.clone(), reason.to_string());

        let url = Url::parse(self.address.trim()).map_err(|e| invalid(&e.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(invalid(&format!("unsupported scheme '{other}'"))),
        }
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(invalid("missing host"));
        }
        Ok(url)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or an index pattern is
    /// empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        for partition in Partition::ALL {
            if self.index_for(partition).trim().is_empty() {
                return Err(ConfigError::InvalidAddress(
                    self.address.clone(),
                    format!("empty index pattern for {partition}"),
                ));
            }
        }
        Ok(())
    }
}
