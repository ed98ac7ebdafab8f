//! AnyTransport - transport chosen at runtime from configuration

use contracts::{ContractError, Transport, TransportRequest, TransportResponse};

use super::{HttpTransport, LogTransport, RecordingTransport};

/// One of the built-in transports
pub enum AnyTransport {
    Http(HttpTransport),
    Log(LogTransport),
    Recording(RecordingTransport),
}

impl From<HttpTransport> for AnyTransport {
    fn from(transport: HttpTransport) -> Self {
        Self::Http(transport)
    }
}

impl From<LogTransport> for AnyTransport {
    fn from(transport: LogTransport) -> Self {
        Self::Log(transport)
    }
}

impl From<RecordingTransport> for AnyTransport {
    fn from(transport: RecordingTransport) -> Self {
        Self::Recording(transport)
    }
}

impl Transport for AnyTransport {
    fn name(&self) -> &str {
        match self {
            Self::Http(t) => t.name(),
            Self::Log(t) => t.name(),
            Self::Recording(t) => t.name(),
        }
    }

    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ContractError> {
        match self {
            Self::Http(t) => t.send(request).await,
            Self::Log(t) => t.send(request).await,
            Self::Recording(t) => t.send(request).await,
        }
    }
}
