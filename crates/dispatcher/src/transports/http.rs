//! HttpTransport - requests against the real feed API

use std::time::Duration;

use contracts::{
    API_KEY_HEADER, ContractError, HttpMethod, Transport, TransportConfig, TransportRequest,
    TransportResponse,
};
use tracing::{debug, instrument};

/// Configuration for HttpTransport
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Whole-request timeout
    pub timeout: Duration,
    /// Overrides the default `User-Agent`
    pub user_agent: Option<String>,
}

impl HttpTransportConfig {
    /// Create config from the transport section
    pub fn from_config(config: &TransportConfig) -> Self {
        Self {
            timeout: Duration::from_millis(config.timeout_ms),
            user_agent: config.params.get("user_agent").cloned(),
        }
    }
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: None,
        }
    }
}

/// Transport backed by a pooled `reqwest` client
pub struct HttpTransport {
    name: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a new HttpTransport
    pub fn new(name: impl Into<String>, config: HttpTransportConfig) -> Result<Self, ContractError> {
        let name = name.into();
        let user_agent = config
            .user_agent
            .unwrap_or_else(|| concat!("feed-relay/", env!("CARGO_PKG_VERSION")).to_string());

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ContractError::transport(&name, format!("building client: {e}")))?;

        Ok(Self { name, client })
    }

    fn method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Get => reqwest::Method::GET,
        }
    }
}

impl Transport for HttpTransport {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "http_transport_send",
        skip(self, request),
        fields(transport = %self.name, method = %request.method, url = %request.url)
    )]
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ContractError> {
        let TransportRequest {
            method,
            url,
            api_key,
            body,
        } = request;
        let body_len = body.len();

        let mut builder = self
            .client
            .request(Self::method(method), &url)
            .header(API_KEY_HEADER, api_key);
        if !body.is_empty() {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| ContractError::transport(&self.name, e.to_string()))?;

        let status = resp.status();
        // Drain body for connection reuse.
        let body = resp
            .bytes()
            .await
            .map_err(|e| ContractError::transport(&self.name, format!("reading body: {e}")))?;

        if !status.is_success() {
            return Err(ContractError::http_status(method, url, status.as_u16()));
        }

        debug!(status = status.as_u16(), bytes = body_len, "Request accepted");

        Ok(TransportResponse {
            status: status.as_u16(),
            body,
        })
    }
}
