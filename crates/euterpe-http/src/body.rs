//! Incrementally readable response body.

use std::fmt;
use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use tokio::sync::OwnedSemaphorePermit;
use tokio_util::sync::CancellationToken;

use crate::error::RequestError;

type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, RequestError>> + Send + 'static>>;

/// Live response body handed to streaming callbacks.
///
/// The stream watches the request's cancellation token: once it fires, reads
/// fail with [`RequestError::Cancelled`] and the underlying connection is
/// released. Dropping the stream releases it as well.
pub struct BodyStream {
    inner: Option<ChunkStream>,
    cancel: CancellationToken,
    permit: Option<OwnedSemaphorePermit>,
    received: u64,
}

impl BodyStream {
    /// Wrap a chunk stream so reads observe `cancel`.
    pub fn new<S>(inner: S, cancel: CancellationToken) -> Self
    where
        S: Stream<Item = Result<Bytes, RequestError>> + Send + 'static,
    {
        Self {
            inner: Some(Box::pin(inner)),
            cancel,
            permit: None,
            received: 0,
        }
    }

    /// Keep a connection slot reserved until the body is finished.
    pub(crate) fn with_permit(mut self, permit: OwnedSemaphorePermit) -> Self {
        self.permit = Some(permit);
        self
    }

    /// Read the next chunk; `Ok(None)` marks the end of the body.
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>, RequestError> {
        let next = {
            let Some(inner) = self.inner.as_mut() else {
                return Ok(None);
            };
            let cancel = &self.cancel;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                next = inner.next() => Some(next),
            }
        };
        let Some(next) = next else {
            self.release();
            return Err(RequestError::Cancelled);
        };
        match next {
            Some(Ok(chunk)) => {
                self.received = self.received.saturating_add(chunk.len() as u64);
                Ok(Some(chunk))
            }
            Some(Err(err)) => {
                self.release();
                Err(err)
            }
            None => {
                tracing::trace!(bytes = self.received, "response body finished");
                self.release();
                Ok(None)
            }
        }
    }

    /// Read everything that is left into one buffer.
    pub async fn read_to_end(mut self) -> Result<Bytes, RequestError> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.next_chunk().await? {
            buf.extend_from_slice(&chunk);
        }
        Ok(buf.freeze())
    }

    /// Stop reading and release the connection.
    pub fn close(mut self) {
        self.release();
    }

    /// Bytes handed out so far.
    pub fn received(&self) -> u64 {
        self.received
    }

    /// True once the body ended, failed, was cancelled or closed.
    pub fn is_finished(&self) -> bool {
        self.inner.is_none()
    }

    fn release(&mut self) {
        self.inner = None;
        self.permit = None;
    }
}

impl fmt::Debug for BodyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyStream")
            .field("received", &self.received)
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}
