//! Transports carry an already-encoded JSON-RPC body to the node and return
//! the raw response body.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};

use crate::backoff::calculate_backoff;
use crate::config::RpcConfig;
use crate::error::{ConfigError, RpcError};

pub trait RpcTransport: Send + Sync {
    /// Where requests go. Used for logging only.
    fn endpoint(&self) -> &str;

    /// Send one JSON-RPC body (single request or batch) and return the body
    /// of the reply.
    fn send(&self, body: String) -> impl Future<Output = Result<String, RpcError>> + Send;
}

impl<T: RpcTransport> RpcTransport for Arc<T> {
    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }

    fn send(&self, body: String) -> impl Future<Output = Result<String, RpcError>> + Send {
        (**self).send(body)
    }
}

/// JSON over HTTP POST.
///
/// Connection failures, timeouts, HTTP 429 and 5xx replies are retried with
/// capped exponential backoff. Any other non-2xx status is returned as
/// [`RpcError::HttpStatus`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    max_retries: u32,
    retry_base_ms: u64,
    retry_max_ms: u64,
}

impl HttpTransport {
    pub fn new(config: &RpcConfig) -> Result<Self, RpcError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut invalid = Vec::new();
        for (name, value) in &config.extra_headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => invalid.push(format!("invalid header {name:?}")),
            }
        }
        if !invalid.is_empty() {
            return Err(ConfigError::Validation(invalid).into());
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| RpcError::Transport(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            max_retries: config.max_retries,
            retry_base_ms: config.retry_base_ms,
            retry_max_ms: config.retry_max_ms,
        })
    }

    async fn send_once(&self, body: &str) -> Result<String, RpcError> {
        let response = self
            .client
            .post(&self.endpoint)
            .body(body.to_owned())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_reqwest_error)?;
        tracing::trace!(endpoint = %self.endpoint, status = status.as_u16(), body = %text, "rpc response");

        if !status.is_success() {
            return Err(RpcError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> RpcError {
    if e.is_timeout() {
        RpcError::Timeout
    } else {
        RpcError::Transport(e.to_string())
    }
}

impl RpcTransport for HttpTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, body: String) -> Result<String, RpcError> {
        tracing::trace!(endpoint = %self.endpoint, body = %body, "rpc request");
        let mut attempt = 0;
        loop {
            match self.send_once(&body).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = calculate_backoff(attempt, self.retry_base_ms, self.retry_max_ms);
                    tracing::warn!(
                        endpoint = %self.endpoint,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient rpc failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_config() {
        let config = RpcConfig::new("ftp://example.com");
        assert!(matches!(
            HttpTransport::new(&config),
            Err(RpcError::Config(ConfigError::Validation(_)))
        ));
    }

    #[test]
    fn rejects_invalid_header() {
        let mut config = RpcConfig::new("http://localhost:8899");
        config.extra_headers.insert("bad header".into(), "v".into());
        assert!(matches!(
            HttpTransport::new(&config),
            Err(RpcError::Config(ConfigError::Validation(_)))
        ));
    }

    #[test]
    fn keeps_endpoint() {
        let transport = HttpTransport::new(&RpcConfig::new("https://api.devnet.solana.com")).unwrap();
        assert_eq!(transport.endpoint(), "https://api.devnet.solana.com");
    }
}
