//! Live search backend over HTTP.

use std::time::Duration;

use reqwest::{Client, Identity};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::{IndexPatterns, SearchConfig, TlsIdentity};
use crate::dsl::search_body;
use crate::error::{ConfigError, TransportError};
use crate::query::Query;
use crate::traits::Executor;
use crate::types::{LogRecord, Partition};

/// Timeout for reachability probes.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Longest error body kept from a failed response.
const MAX_ERROR_BODY: usize = 512;

/// Executes queries against a search cluster.
///
/// The HTTP client is built once and shared by every request.
#[derive(Debug, Clone)]
pub struct SearchBackend {
    client: Client,
    base: Url,
    indices: IndexPatterns,
}

impl SearchBackend {
    /// Builds a backend from configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration is invalid, the TLS
    /// identity cannot be loaded, or the client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let base = config.base_url()?;

        let mut builder = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs);
        if let Some(identity) = &config.identity {
            builder = builder.identity(load_identity(identity)?);
        }
        let client = builder.build().map_err(ConfigError::Client)?;

        debug!(address = %base, tls_identity = config.identity.is_some(), "search backend configured");
        Ok(Self {
            client,
            base,
            indices: config.indices.clone(),
        })
    }

    /// Returns the search endpoint for a set of partitions.
    fn search_url(&self, partitions: &[Partition]) -> Url {
        let targets = partitions
            .iter()
            .map(|p| self.indices.get(*p))
            .collect::<Vec<_>>()
            .join(",");

        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&targets).push("_search");
        }
        url.query_pairs_mut().append_pair("ignore_unavailable", "true");
        url
    }
}

fn load_identity(identity: &TlsIdentity) -> Result<Identity, ConfigError> {
    let read = |path: &std::path::Path| {
        std::fs::read(path).map_err(|e| ConfigError::ReadIdentity(path.display().to_string(), e))
    };
    let cert = read(&identity.cert_path)?;
    let key = read(&identity.key_path)?;
    Identity::from_pkcs8_pem(&cert, &key).map_err(ConfigError::InvalidIdentity)
}

/// Extracts records from a search response.
///
/// Each hit contributes its `_source`, or the whole hit when the source is
/// absent.
pub(crate) fn extract_hits(mut response: Value) -> Result<Vec<LogRecord>, TransportError> {
    let hits = response
        .get_mut("hits")
        .and_then(|hits| hits.get_mut("hits"))
        .and_then(Value::as_array_mut)
        .ok_or_else(|| TransportError::MalformedResponse("missing hits.hits".to_string()))?;

    Ok(hits
        .drain(..)
        .map(|mut hit| {
            let source = hit.get_mut("_source").map(Value::take);
            LogRecord::new(source.unwrap_or(hit))
        })
        .collect())
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}

impl Executor for SearchBackend {
    async fn execute(&self, query: &Query) -> Result<Vec<LogRecord>, TransportError> {
        let partitions = query.partitions();
        if partitions.is_empty() {
            debug!("query targets no known index, skipping request");
            return Ok(Vec::new());
        }

        let url = self.search_url(&partitions);
        let body = search_body(query);
        debug!(%url, size = query.size_limit(), "sending search request");

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: truncate(body),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(TransportError::from_reqwest)?;
        let decoded: Value = serde_json::from_slice(&bytes)?;
        let records = extract_hits(decoded)?;

        debug!(hits = records.len(), "search request completed");
        Ok(records)
    }

    async fn can_reach_backend(&self) -> bool {
        match self
            .client
            .head(self.base.clone())
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(error = %e, "search backend unreachable");
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "search"
    }
}
