//! Streaming requests: the callback fires once headers arrive.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use tokio_util::sync::CancellationToken;

use crate::body::BodyStream;
use crate::callback::Callback;
use crate::error::RequestError;
use crate::request::Staging;
use crate::session::SessionProvider;

/// Result handed to a streaming request's callback.
#[derive(Debug)]
pub enum StreamCompletion<C> {
    /// Headers arrived. The body has not been read yet.
    Headers {
        status: StatusCode,
        body: BodyStream,
        cancel: CancellationToken,
        context: C,
    },
    /// The request was sent but no HTTP response came back.
    TransportError {
        error: RequestError,
        cancel: CancellationToken,
        context: C,
    },
    /// The request never reached the network. Neither the token nor the
    /// context is returned.
    DispatchFailed(RequestError),
}

impl<C> StreamCompletion<C> {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            StreamCompletion::Headers { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn context(&self) -> Option<&C> {
        match self {
            StreamCompletion::Headers { context, .. }
            | StreamCompletion::TransportError { context, .. } => Some(context),
            StreamCompletion::DispatchFailed(_) => None,
        }
    }
}

/// A single-use GET whose body is handed over as a live stream.
///
/// Cancelling the token before headers arrive drops the in-flight request
/// and the callback never runs. Cancelling later makes pending and future
/// reads on the [`BodyStream`] fail with [`RequestError::Cancelled`].
pub struct StreamRequest<C> {
    provider: Arc<SessionProvider>,
    staging: Staging,
    cancel: CancellationToken,
    callback: Box<dyn FnOnce(StreamCompletion<C>) + Send + 'static>,
}

impl<C: Send + 'static> StreamRequest<C> {
    pub fn new<F>(
        provider: Arc<SessionProvider>,
        address: impl Into<String>,
        cancel: CancellationToken,
        callback: F,
    ) -> Self
    where
        F: FnOnce(StreamCompletion<C>) + Send + 'static,
    {
        Self {
            provider,
            staging: Staging::new(address.into()),
            cancel,
            callback: Box::new(callback),
        }
    }

    /// Stage a header. Repeated names are sent as repeated headers.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.staging.push(name.into(), value.into());
        self
    }

    pub fn get(self, context: C) {
        let StreamRequest {
            provider,
            staging,
            cancel,
            callback,
        } = self;
        let callback = Callback::new(callback, provider.reporter());

        let prepared = staging
            .build(Method::GET, None)
            .and_then(|request| provider.session().map(|session| (session, request)));
        let (session, request) = match prepared {
            Ok(prepared) => prepared,
            Err(error) => {
                callback.reporter().report(&error);
                callback.fire(StreamCompletion::DispatchFailed(error));
                return;
            }
        };

        let url = request.url.clone();
        tracing::debug!(url = %url, "dispatching streaming request");

        let task_session = session.clone();
        let task_callback = callback.clone();
        let task = Box::pin(async move {
            let sent = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(RequestError::Cancelled),
                sent = task_session.send_streaming(request, cancel.clone()) => sent,
            };
            let completion = match sent {
                Ok(resp) => StreamCompletion::Headers {
                    status: resp.status,
                    body: resp.body,
                    cancel,
                    context,
                },
                Err(RequestError::Cancelled) => {
                    tracing::debug!(url = %url, "streaming request cancelled before headers");
                    return;
                }
                Err(error) => {
                    tracing::warn!(url = %url, error = %error, "streaming request failed");
                    StreamCompletion::TransportError {
                        error,
                        cancel,
                        context,
                    }
                }
            };
            task_callback.fire(completion);
        });
        if let Err(error) = session.dispatch(task) {
            callback.reporter().report(&error);
            callback.fire(StreamCompletion::DispatchFailed(error));
        }
    }
}
