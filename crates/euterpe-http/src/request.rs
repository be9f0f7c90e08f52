//! Buffered requests: the callback fires once the whole body is in memory.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode, Url};

use crate::callback::Callback;
use crate::error::RequestError;
use crate::session::{OutgoingRequest, SessionProvider};

/// Result handed to a buffered request's callback.
#[derive(Debug)]
pub enum Completion<C> {
    /// The server answered; any status code, including 4xx/5xx.
    Response {
        status: StatusCode,
        body: Bytes,
        context: C,
    },
    /// The request was sent but no HTTP response came back.
    TransportError { error: RequestError, context: C },
    /// The request never reached the network. The context is not returned.
    DispatchFailed(RequestError),
}

impl<C> Completion<C> {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Completion::Response { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn context(&self) -> Option<&C> {
        match self {
            Completion::Response { context, .. } | Completion::TransportError { context, .. } => {
                Some(context)
            }
            Completion::DispatchFailed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&RequestError> {
        match self {
            Completion::Response { .. } => None,
            Completion::TransportError { error, .. } | Completion::DispatchFailed(error) => {
                Some(error)
            }
        }
    }
}

/// Address and headers collected before dispatch.
#[derive(Clone, Debug, Default)]
pub(crate) struct Staging {
    address: String,
    headers: Vec<(String, String)>,
}

impl Staging {
    pub(crate) fn new(address: String) -> Self {
        Self {
            address,
            headers: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, name: String, value: String) {
        self.headers.push((name, value));
    }

    /// Validate everything staged and build the outgoing message.
    pub(crate) fn build(
        &self,
        method: Method,
        entity: Option<(String, Bytes)>,
    ) -> Result<OutgoingRequest, RequestError> {
        let url = Url::parse(&self.address).map_err(|e| RequestError::InvalidAddress {
            address: self.address.clone(),
            reason: e.to_string(),
        })?;
        let mut headers = HeaderMap::with_capacity(self.headers.len() + 1);
        for (name, value) in &self.headers {
            let header = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| RequestError::InvalidHeaderName(name.clone()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| RequestError::InvalidHeaderValue(name.clone()))?;
            headers.append(header, value);
        }
        let body = match entity {
            Some((content_type, body)) => {
                let value = HeaderValue::from_str(&content_type)
                    .map_err(|_| RequestError::InvalidHeaderValue(CONTENT_TYPE.to_string()))?;
                headers.insert(CONTENT_TYPE, value);
                Some(body)
            }
            None => None,
        };
        Ok(OutgoingRequest {
            method,
            url,
            headers,
            body,
        })
    }
}

/// A single-use HTTP request whose body is buffered before completion.
///
/// The callback receives a [`Completion`] carrying the caller's context
/// value, and runs on the session's executor. Dispatch failures are the
/// exception: they are reported and the callback runs synchronously on the
/// caller's thread, without the context.
pub struct Request<C> {
    provider: Arc<SessionProvider>,
    staging: Staging,
    callback: Box<dyn FnOnce(Completion<C>) + Send + 'static>,
}

impl<C: Send + 'static> Request<C> {
    pub fn new<F>(provider: Arc<SessionProvider>, address: impl Into<String>, callback: F) -> Self
    where
        F: FnOnce(Completion<C>) + Send + 'static,
    {
        Self {
            provider,
            staging: Staging::new(address.into()),
            callback: Box::new(callback),
        }
    }

    /// Stage a header. Repeated names are sent as repeated headers.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.staging.push(name.into(), value.into());
        self
    }

    pub fn get(self, context: C) {
        self.dispatch(Method::GET, None, context);
    }

    pub fn post(self, content_type: impl Into<String>, body: impl Into<Bytes>, context: C) {
        self.dispatch(Method::POST, Some((content_type.into(), body.into())), context);
    }

    fn dispatch(self, method: Method, entity: Option<(String, Bytes)>, context: C) {
        let Request {
            provider,
            staging,
            callback,
        } = self;
        let callback = Callback::new(callback, provider.reporter());

        let prepared = staging
            .build(method, entity)
            .and_then(|request| provider.session().map(|session| (session, request)));
        let (session, request) = match prepared {
            Ok(prepared) => prepared,
            Err(error) => return fail(&callback, error),
        };

        let method = request.method.clone();
        let url = request.url.clone();
        tracing::debug!(%method, url = %url, "dispatching http request");

        let task_session = session.clone();
        let task_callback = callback.clone();
        let task = Box::pin(async move {
            let completion = match task_session.send_buffered(request).await {
                Ok(resp) => Completion::Response {
                    status: resp.status,
                    body: resp.body,
                    context,
                },
                Err(error) => {
                    tracing::warn!(%method, url = %url, error = %error, "http request failed");
                    Completion::TransportError { error, context }
                }
            };
            task_callback.fire(completion);
        });
        if let Err(error) = session.dispatch(task) {
            fail(&callback, error);
        }
    }
}

fn fail<C>(callback: &Callback<Completion<C>>, error: RequestError) {
    callback.reporter().report(&error);
    callback.fire(Completion::DispatchFailed(error));
}
