//! Asynchronous HTTP request helpers for the Euterpe desktop client.
//!
//! Requests are handed to a shared [`HttpSession`] that performs all I/O on
//! its own worker threads; results come back through a one-shot callback so
//! the caller's thread never blocks.

pub mod body;
mod callback;
pub mod client;
pub mod config;
pub mod error;
pub mod report;
pub mod request;
pub mod session;
pub mod stream;

#[cfg(test)]
mod mock;

pub use body::BodyStream;
pub use client::ReqwestSession;
pub use config::SessionConfig;
pub use error::RequestError;
pub use report::{ErrorReporter, LogReporter};
pub use request::{Completion, Request};
pub use session::{
    BufferedResponse, HttpSession, OutgoingRequest, SessionProvider, StreamingResponse,
};
pub use stream::{StreamCompletion, StreamRequest};

pub use bytes::Bytes;
pub use reqwest::{Method, StatusCode};
pub use tokio_util::sync::CancellationToken;
