//! `reqwest`-backed session with its own I/O runtime.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tokio::runtime::{Handle, Runtime};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::body::BodyStream;
use crate::config::SessionConfig;
use crate::error::RequestError;
use crate::session::{
    BufferedResponse, HttpSession, OutgoingRequest, SessionTask, StreamingResponse,
};

/// Production session: pooled `reqwest` client plus a dedicated runtime.
///
/// At most `max_connections` requests are in flight at once; streaming
/// requests keep their slot until the body stream is finished or dropped.
pub struct ReqwestSession {
    client: Client,
    runtime: Option<Runtime>,
    handle: Handle,
    slots: Arc<Semaphore>,
}

impl ReqwestSession {
    pub fn new(config: &SessionConfig) -> Result<Self, RequestError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .pool_max_idle_per_host(config.max_connections)
            .build()
            .map_err(|e| RequestError::SessionUnavailable(format!("build http client: {e}")))?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.worker_threads.max(1))
            .thread_name("euterpe-http")
            .enable_all()
            .build()
            .map_err(|e| RequestError::SessionUnavailable(format!("start http runtime: {e}")))?;
        tracing::info!(
            user_agent = config.user_agent.as_str(),
            max_connections = config.max_connections,
            "http session ready"
        );
        Ok(Self {
            client,
            handle: runtime.handle().clone(),
            runtime: Some(runtime),
            slots: Arc::new(Semaphore::new(config.max_connections.max(1))),
        })
    }

    async fn acquire_slot(&self) -> Result<OwnedSemaphorePermit, RequestError> {
        self.slots
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| RequestError::SessionUnavailable("connection slots closed".to_string()))
    }

    fn build(&self, request: OutgoingRequest) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        builder
    }
}

#[async_trait]
impl HttpSession for ReqwestSession {
    async fn send_buffered(
        &self,
        request: OutgoingRequest,
    ) -> Result<BufferedResponse, RequestError> {
        let _slot = self.acquire_slot().await?;
        let url = request.url.clone();
        let resp = self.build(request).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        tracing::debug!(url = %url, status = status.as_u16(), bytes = body.len(), "http response");
        Ok(BufferedResponse { status, body })
    }

    async fn send_streaming(
        &self,
        request: OutgoingRequest,
        cancel: CancellationToken,
    ) -> Result<StreamingResponse, RequestError> {
        let slot = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RequestError::Cancelled),
            slot = self.acquire_slot() => slot?,
        };
        let url = request.url.clone();
        let resp = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RequestError::Cancelled),
            resp = self.build(request).send() => resp?,
        };
        let status = resp.status();
        tracing::debug!(url = %url, status = status.as_u16(), "http response headers");
        let chunks = resp
            .bytes_stream()
            .map(|chunk| chunk.map_err(RequestError::from));
        Ok(StreamingResponse {
            status,
            body: BodyStream::new(chunks, cancel).with_permit(slot),
        })
    }

    fn dispatch(&self, task: SessionTask) -> Result<(), RequestError> {
        self.handle.spawn(task);
        Ok(())
    }
}

impl Drop for ReqwestSession {
    fn drop(&mut self) {
        // The last handle may be released from one of our own workers.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
