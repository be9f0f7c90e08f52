//! Session collaborator interface and the lazily initialised provider.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode, Url};
use tokio_util::sync::CancellationToken;

use crate::body::BodyStream;
use crate::client::ReqwestSession;
use crate::config::SessionConfig;
use crate::error::RequestError;
use crate::report::{ErrorReporter, LogReporter};

/// Work submitted to the session's executor.
pub type SessionTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

type SessionFactory = Box<dyn Fn() -> Result<Arc<dyn HttpSession>, RequestError> + Send + Sync>;

/// A fully staged request, ready for the session.
#[derive(Clone, Debug)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// Response whose body has been read to the end.
#[derive(Clone, Debug)]
pub struct BufferedResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Response delivered as soon as headers arrived.
pub struct StreamingResponse {
    pub status: StatusCode,
    pub body: BodyStream,
}

impl fmt::Debug for StreamingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Shared HTTP client context: connection pool, identity, executor.
#[async_trait]
pub trait HttpSession: Send + Sync {
    /// Send a request and buffer the whole response body.
    async fn send_buffered(&self, request: OutgoingRequest)
    -> Result<BufferedResponse, RequestError>;

    /// Send a request and resolve once response headers are available.
    async fn send_streaming(
        &self,
        request: OutgoingRequest,
        cancel: CancellationToken,
    ) -> Result<StreamingResponse, RequestError>;

    /// Run a task on the session's executor.
    fn dispatch(&self, task: SessionTask) -> Result<(), RequestError>;
}

/// Hands out one shared session, created on first use.
pub struct SessionProvider {
    factory: SessionFactory,
    session: Mutex<Option<Arc<dyn HttpSession>>>,
    reporter: Arc<dyn ErrorReporter>,
}

impl SessionProvider {
    /// Provider backed by a [`ReqwestSession`] built from `config`.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_factory(move || {
            ReqwestSession::new(&config).map(|s| Arc::new(s) as Arc<dyn HttpSession>)
        })
    }

    /// Provider backed by an arbitrary session constructor.
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn HttpSession>, RequestError> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            session: Mutex::new(None),
            reporter: Arc::new(LogReporter),
        }
    }

    /// Replace the unhandled-error reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Return the shared session, constructing it on the first call.
    ///
    /// Concurrent first calls construct at most one session. A failed
    /// construction is not cached; the next call tries again.
    pub fn session(&self) -> Result<Arc<dyn HttpSession>, RequestError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| RequestError::SessionUnavailable("session lock poisoned".to_string()))?;
        if let Some(session) = guard.as_ref() {
            return Ok(session.clone());
        }
        let session = (self.factory)()?;
        tracing::debug!("http session created");
        *guard = Some(session.clone());
        Ok(session)
    }

    /// Sink for dispatch and callback failures.
    pub fn reporter(&self) -> Arc<dyn ErrorReporter> {
        self.reporter.clone()
    }
}

impl Default for SessionProvider {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
