//! RelayHandle - runs a registry on its own worker task
//!
//! Producers talk to the worker through a bounded queue. Commands are applied
//! one at a time, so appends and flushes of a stream never overlap.

use std::sync::Arc;

use contracts::Transport;
use dispatcher::{DispatchMetrics, FlushReport};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use crate::error::RegistryError;
use crate::registry::{Registry, SubmitOutcome};

type Reply<T> = oneshot::Sender<Result<T, RegistryError>>;

enum Command {
    Submit {
        stream_id: String,
        value: String,
        reply: Reply<SubmitOutcome>,
    },
    Flush {
        stream_id: String,
        reply: Reply<FlushReport>,
    },
    FlushAll {
        reply: Reply<FlushReport>,
    },
    Shutdown {
        reply: Reply<FlushReport>,
    },
}

/// Cloneable producer side of a running relay
#[derive(Clone)]
pub struct RelaySender {
    tx: mpsc::Sender<Command>,
}

impl RelaySender {
    /// Submit a value and wait until the worker applied it
    pub async fn submit(
        &self,
        stream_id: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<SubmitOutcome, RegistryError> {
        let stream_id = stream_id.into();
        let value = value.into();
        self.request(|reply| Command::Submit {
            stream_id,
            value,
            reply,
        })
        .await
    }

    pub async fn flush(&self, stream_id: impl Into<String>) -> Result<FlushReport, RegistryError> {
        let stream_id = stream_id.into();
        self.request(|reply| Command::Flush { stream_id, reply })
            .await
    }

    pub async fn flush_all(&self) -> Result<FlushReport, RegistryError> {
        self.request(|reply| Command::FlushAll { reply }).await
    }

    async fn request<R>(
        &self,
        command: impl FnOnce(Reply<R>) -> Command,
    ) -> Result<R, RegistryError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| RegistryError::Closed)?;
        rx.await.map_err(|_| RegistryError::Closed)?
    }
}

/// Handle to a running relay worker
pub struct RelayHandle {
    sender: RelaySender,
    metrics: Arc<DispatchMetrics>,
    worker_handle: JoinHandle<()>,
}

impl RelayHandle {
    /// Move `registry` into a worker task
    pub fn spawn<T>(registry: Registry<T>, queue_capacity: usize) -> Self
    where
        T: Transport + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let metrics = Arc::clone(registry.dispatcher().metrics());

        let worker_handle = tokio::spawn(async move {
            relay_worker(registry, rx).await;
        });

        Self {
            sender: RelaySender { tx },
            metrics,
            worker_handle,
        }
    }

    /// A new producer handle
    pub fn sender(&self) -> RelaySender {
        self.sender.clone()
    }

    /// Dispatch counters of the worker's registry
    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        &self.metrics
    }

    pub async fn submit(
        &self,
        stream_id: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<SubmitOutcome, RegistryError> {
        self.sender.submit(stream_id, value).await
    }

    pub async fn flush(&self, stream_id: impl Into<String>) -> Result<FlushReport, RegistryError> {
        self.sender.flush(stream_id).await
    }

    pub async fn flush_all(&self) -> Result<FlushReport, RegistryError> {
        self.sender.flush_all().await
    }

    /// Stop the worker after a final `flush_all`.
    ///
    /// Commands queued before this call are applied first. Senders still
    /// held elsewhere get `RegistryError::Closed` afterwards.
    #[instrument(name = "relay_handle_shutdown", skip(self))]
    pub async fn shutdown(self) -> Result<FlushReport, RegistryError> {
        let result = self
            .sender
            .request(|reply| Command::Shutdown { reply })
            .await;

        if let Err(e) = self.worker_handle.await {
            error!(error = ?e, "Relay worker panicked");
        }
        debug!("RelayHandle shutdown complete");
        result
    }
}

#[instrument(name = "relay_worker_loop", skip_all)]
async fn relay_worker<T: Transport + Sync>(
    mut registry: Registry<T>,
    mut rx: mpsc::Receiver<Command>,
) {
    debug!("Relay worker started");

    while let Some(command) = rx.recv().await {
        match command {
            Command::Submit {
                stream_id,
                value,
                reply,
            } => {
                let _ = reply.send(registry.submit(&stream_id, &value).await);
            }
            Command::Flush { stream_id, reply } => {
                let result = registry.flush(&stream_id).await.map_err(Into::into);
                let _ = reply.send(result);
            }
            Command::FlushAll { reply } => {
                let _ = reply.send(registry.flush_all().await.map_err(Into::into));
            }
            Command::Shutdown { reply } => {
                let _ = reply.send(registry.flush_all().await.map_err(Into::into));
                debug!("Relay worker stopped");
                return;
            }
        }
    }

    // Every sender dropped without an explicit shutdown
    if let Err(e) = registry.flush_all().await {
        warn!(
            error = %e,
            pending = registry.total_buffered(),
            "Final flush failed, points dropped with the worker"
        );
    }
    debug!("Relay worker stopped");
}
