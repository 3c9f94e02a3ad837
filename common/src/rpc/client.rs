use super::{ControlChannel, RpcError, RpcRequest, RpcResponse};
use crate::config::{DEFAULT_RPC_URL, ENV_REQUEST_TIMEOUT_SECS, ENV_RPC_URL};
use async_trait::async_trait;
use log::{debug, trace};
use reqwest::Client;
use serde_json::Value;
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

/// Connection settings of an [`HttpControlChannel`]
///
/// No timeout is applied unless configured: a local development node is
/// expected to answer, and a hung request blocks its caller.
#[derive(Debug, Clone)]
pub struct HttpChannelConfig {
    pub url: String,
    pub request_timeout: Option<Duration>,
    pub connection_timeout: Option<Duration>,
}

impl Default for HttpChannelConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_RPC_URL.to_string(),
            request_timeout: None,
            connection_timeout: None,
        }
    }
}

impl HttpChannelConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Read `EVMCTL_RPC_URL` and `EVMCTL_REQUEST_TIMEOUT_SECS`, falling back to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(ENV_RPC_URL) {
            config.url = url;
        }
        if let Some(secs) = std::env::var(ENV_REQUEST_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.request_timeout = Some(Duration::from_secs(secs));
        }
        config
    }
}

/// JSON RPC over HTTP POST, one request per call, no retries
pub struct HttpControlChannel {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpControlChannel {
    pub fn new(url: &str) -> Result<Self, RpcError> {
        Self::with_config(HttpChannelConfig::new(url))
    }

    pub fn with_config(config: HttpChannelConfig) -> Result<Self, RpcError> {
        let url = if config.url.starts_with("http://") || config.url.starts_with("https://") {
            config.url
        } else {
            format!("http://{}", config.url)
        };

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connection_timeout {
            builder = builder.connect_timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            url,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ControlChannel for HttpControlChannel {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, method, params);
        debug!("JSON-RPC request #{} to {}: {}", id, self.url, method);

        let response = self.client.post(&self.url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Status(status.as_u16()));
        }

        let body: RpcResponse = response.json().await?;
        trace!("JSON-RPC response #{}: {:?}", id, body);
        body.into_result()
    }
}
