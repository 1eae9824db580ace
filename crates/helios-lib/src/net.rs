//! HTTP capability shared by the loader and the index processors.

use crate::config::CoreConfig;
use crate::error::NetworkFailure;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Thin wrapper over one pooled `reqwest::Client`.
///
/// Every call is a single attempt; failures are categorised, never retried.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .pool_max_idle_per_host(8)
            .tcp_keepalive(Some(Duration::from_secs(30)))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    pub fn from_config(config: &CoreConfig) -> Result<Self, reqwest::Error> {
        Self::new(config.request_timeout())
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// GET a URL and return the raw body.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, NetworkFailure> {
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        if !response.status().is_success() {
            return Err(NetworkFailure::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| classify(url, e))?;
        Ok(bytes.to_vec())
    }

    /// GET a URL and decode the body as JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, NetworkFailure> {
        let bytes = self.get_bytes(url).await?;
        parse_json(url, &bytes)
    }
}

pub(crate) fn parse_json<T: DeserializeOwned>(url: &str, bytes: &[u8]) -> Result<T, NetworkFailure> {
    serde_json::from_slice(bytes).map_err(|e| NetworkFailure::Parse {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

fn classify(url: &str, error: reqwest::Error) -> NetworkFailure {
    if error.is_timeout() {
        NetworkFailure::Timeout {
            url: url.to_string(),
        }
    } else if let Some(status) = error.status() {
        NetworkFailure::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        }
    } else if error.is_decode() {
        NetworkFailure::Parse {
            url: url.to_string(),
            reason: error.to_string(),
        }
    } else {
        NetworkFailure::NoResponse {
            url: url.to_string(),
            reason: error.to_string(),
        }
    }
}

/// Log a failed request in the shared "remote fetch failed" shape.
pub(crate) fn log_fetch_failure(operation: &str, failure: &NetworkFailure) {
    log::warn!(
        "Remote fetch failed [{}] ({}): {}",
        operation,
        failure.category(),
        failure
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn categorises_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = HttpClient::new(Duration::from_secs(5)).unwrap();
        let err = client
            .get_bytes(&format!("{}/missing.json", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, NetworkFailure::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn categorises_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bad.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let client = HttpClient::new(Duration::from_secs(5)).unwrap();
        let err = client
            .get_json::<serde_json::Value>(&format!("{}/bad.json", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err.category(), "parse-error");
    }

    #[tokio::test]
    async fn categorises_timeouts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow.json"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client = HttpClient::new(Duration::from_millis(50)).unwrap();
        let err = client
            .get_bytes(&format!("{}/slow.json", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err.category(), "timeout");
    }

    #[tokio::test]
    async fn unreachable_host_is_no_response() {
        let client = HttpClient::new(Duration::from_secs(2)).unwrap();
        // Port 9 (discard) on localhost is essentially never listening
        let err = client
            .get_bytes("http://127.0.0.1:9/distribution.json")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            NetworkFailure::NoResponse { .. } | NetworkFailure::Timeout { .. }
        ));
    }
}
