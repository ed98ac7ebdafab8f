//! LogTransport - logs requests instead of sending them (dry run)

use bytes::Bytes;
use contracts::{ContractError, HttpMethod, Transport, TransportRequest, TransportResponse};
use tracing::{info, instrument};

/// Transport that reports every request as accepted
pub struct LogTransport {
    name: String,
}

impl LogTransport {
    /// Create a new LogTransport with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Transport for LogTransport {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_transport_send",
        skip(self, request),
        fields(transport = %self.name)
    )]
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ContractError> {
        info!(
            method = %request.method,
            url = %request.url,
            bytes = request.body.len(),
            body = request.body_text(),
            "Request (dry run)"
        );

        // An empty feed keeps a best-effort bootstrap quiet.
        let body = match request.method {
            HttpMethod::Get => Bytes::from_static(br#"{"datastreams":[]}"#),
            HttpMethod::Put | HttpMethod::Post => Bytes::new(),
        };

        Ok(TransportResponse { status: 200, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_transport_accepts_everything() {
        let transport = LogTransport::new("dry_run");
        let resp = transport
            .send(TransportRequest {
                method: HttpMethod::Post,
                url: "http://api.cosm.com/v2/feeds/1/datastreams/8/datapoints".into(),
                api_key: String::new(),
                body: Bytes::from_static(b"{}"),
            })
            .await
            .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(transport.name(), "dry_run");
    }
}
