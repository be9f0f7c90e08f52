//! In-memory session used by the request tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream;
use reqwest::StatusCode;
use tokio::runtime::{Handle, Runtime};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::body::BodyStream;
use crate::error::RequestError;
use crate::report::ErrorReporter;
use crate::session::{
    BufferedResponse, HttpSession, OutgoingRequest, SessionProvider, SessionTask,
    StreamingResponse,
};

type ChunkRx = mpsc::UnboundedReceiver<Result<Bytes, RequestError>>;

pub(crate) struct MockSession {
    runtime: Option<Runtime>,
    handle: Option<Handle>,
    status: StatusCode,
    body: Bytes,
    transport_error: Option<String>,
    hold_headers: bool,
    chunks: Mutex<Option<ChunkRx>>,
    pub(crate) requests: Mutex<Vec<OutgoingRequest>>,
    pub(crate) sends: AtomicUsize,
    pub(crate) send_dropped: Arc<AtomicBool>,
}

impl MockSession {
    pub(crate) fn ok(status: u16, body: &'static [u8]) -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        Self {
            handle: Some(runtime.handle().clone()),
            runtime: Some(runtime),
            status: StatusCode::from_u16(status).unwrap(),
            body: Bytes::from_static(body),
            transport_error: None,
            hold_headers: false,
            chunks: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
            sends: AtomicUsize::new(0),
            send_dropped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Session whose executor refuses every task.
    pub(crate) fn without_executor(mut self) -> Self {
        self.handle = None;
        self
    }

    pub(crate) fn with_transport_error(mut self, msg: &str) -> Self {
        self.transport_error = Some(msg.to_string());
        self
    }

    /// Never deliver headers for streaming sends.
    pub(crate) fn holding_headers(mut self) -> Self {
        self.hold_headers = true;
        self
    }

    /// Feed the streaming body from a channel instead of the canned body.
    pub(crate) fn with_body_channel(
        self,
    ) -> (Self, mpsc::UnboundedSender<Result<Bytes, RequestError>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.chunks.lock().unwrap() = Some(rx);
        (self, tx)
    }

    pub(crate) fn into_dyn(self) -> Arc<dyn HttpSession> {
        Arc::new(self)
    }

    pub(crate) fn provider(
        self: &Arc<Self>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Arc<SessionProvider> {
        let session = self.clone();
        Arc::new(
            SessionProvider::with_factory(move || Ok(session.clone() as Arc<dyn HttpSession>))
                .with_reporter(reporter),
        )
    }

    fn record(&self, request: OutgoingRequest) {
        self.sends.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl HttpSession for MockSession {
    async fn send_buffered(
        &self,
        request: OutgoingRequest,
    ) -> Result<BufferedResponse, RequestError> {
        self.record(request);
        if let Some(msg) = self.transport_error.as_ref() {
            return Err(RequestError::Transport(msg.clone()));
        }
        Ok(BufferedResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }

    async fn send_streaming(
        &self,
        request: OutgoingRequest,
        cancel: CancellationToken,
    ) -> Result<StreamingResponse, RequestError> {
        self.record(request);
        if self.hold_headers {
            let _guard = DropFlag(self.send_dropped.clone());
            std::future::pending::<()>().await;
        }
        if let Some(msg) = self.transport_error.as_ref() {
            return Err(RequestError::Transport(msg.clone()));
        }
        let chunks = self.chunks.lock().unwrap().take();
        let body = match chunks {
            Some(mut rx) => BodyStream::new(
                stream::poll_fn(move |cx| rx.poll_recv(cx)),
                cancel,
            ),
            None => BodyStream::new(stream::iter(vec![Ok(self.body.clone())]), cancel),
        };
        Ok(StreamingResponse {
            status: self.status,
            body,
        })
    }

    fn dispatch(&self, task: SessionTask) -> Result<(), RequestError> {
        let Some(handle) = self.handle.as_ref() else {
            return Err(RequestError::SessionUnavailable("executor stopped".to_string()));
        };
        handle.spawn(task);
        Ok(())
    }
}
