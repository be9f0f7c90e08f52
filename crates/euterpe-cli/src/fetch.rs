//! Request commands.
//!
//! Completions arrive on the session's worker threads and are forwarded over
//! a channel to the calling thread, which owns the output.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use crossbeam_channel::{Sender, bounded, unbounded};
use euterpe_http::{
    Bytes, CancellationToken, Completion, Request, RequestError, SessionProvider, StatusCode,
    StreamCompletion, StreamRequest,
};

/// Parse `Name: value` pairs given on the command line.
pub(crate) fn parse_headers(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter().map(|h| parse_header(h)).collect()
}

fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("header {raw:?} must look like \"Name: value\""))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("header {raw:?} has an empty name"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Run a buffered GET (or POST when `entity` is set) and write the body to `out`.
pub(crate) fn buffered(
    provider: Arc<SessionProvider>,
    url: &str,
    headers: Vec<(String, String)>,
    entity: Option<(String, String)>,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let (tx, rx) = bounded::<Completion<Instant>>(1);
    let mut req = Request::new(provider, url, move |completion| {
        let _ = tx.send(completion);
    });
    for (name, value) in headers {
        req.set_header(name, value);
    }
    match entity {
        Some((content_type, data)) => req.post(content_type, data, Instant::now()),
        None => req.get(Instant::now()),
    }

    match rx.recv().context("request dropped without completing")? {
        Completion::Response {
            status,
            body,
            context: started,
        } => {
            tracing::info!(
                status = status.as_u16(),
                bytes = body.len(),
                took_ms = started.elapsed().as_millis() as u64,
                "{}",
                status_line(status)
            );
            out.write_all(&render_body(&body, json))
                .context("write response body")?;
            out.flush().context("flush output")?;
            Ok(())
        }
        Completion::TransportError { error, context: started } => Err(anyhow!(error)).context(
            format!("request failed after {} ms", started.elapsed().as_millis()),
        ),
        Completion::DispatchFailed(error) => {
            Err(anyhow!(error)).context("request could not be dispatched")
        }
    }
}

enum StreamEvent {
    Headers(StatusCode),
    Chunk(Bytes),
    Finished(Result<(), RequestError>),
}

/// Run a streaming GET, copying the body to `out` as it arrives.
///
/// Cancelling `cancel` ends the transfer early without an error; so does
/// reaching `max_bytes`, which cancels the token itself.
pub(crate) fn stream(
    provider: Arc<SessionProvider>,
    url: &str,
    headers: Vec<(String, String)>,
    max_bytes: Option<u64>,
    cancel: CancellationToken,
    out: &mut impl Write,
) -> Result<()> {
    let (tx, rx) = unbounded::<StreamEvent>();
    let mut req = StreamRequest::new(provider, url, cancel.clone(), move |completion| {
        on_stream_completion(completion, tx)
    });
    for (name, value) in headers {
        req.set_header(name, value);
    }
    req.get(());

    let mut written = 0u64;
    let mut got_headers = false;
    for event in rx.iter() {
        match event {
            StreamEvent::Headers(status) => {
                got_headers = true;
                tracing::info!(status = status.as_u16(), "{}", status_line(status));
            }
            StreamEvent::Chunk(chunk) => {
                let take = match max_bytes {
                    Some(limit) => limit.saturating_sub(written).min(chunk.len() as u64) as usize,
                    None => chunk.len(),
                };
                out.write_all(&chunk[..take]).context("write body chunk")?;
                written += take as u64;
                if max_bytes.is_some_and(|limit| written >= limit) {
                    tracing::info!(bytes = written, "byte limit reached; cancelling");
                    cancel.cancel();
                    break;
                }
            }
            StreamEvent::Finished(Ok(())) => break,
            StreamEvent::Finished(Err(RequestError::Cancelled)) => {
                tracing::info!(bytes = written, "stream cancelled");
                break;
            }
            StreamEvent::Finished(Err(error)) => {
                return Err(anyhow!(error)).context(format!("stream failed after {written} bytes"));
            }
        }
    }
    out.flush().context("flush output")?;

    if !got_headers && !cancel.is_cancelled() {
        return Err(anyhow!("stream ended before response headers"));
    }
    tracing::debug!(bytes = written, "stream done");
    Ok(())
}

fn on_stream_completion(completion: StreamCompletion<()>, tx: Sender<StreamEvent>) {
    match completion {
        StreamCompletion::Headers {
            status, mut body, ..
        } => {
            let _ = tx.send(StreamEvent::Headers(status));
            // Runs on the session's executor, so the body is read there too.
            tokio::spawn(async move {
                loop {
                    let event = match body.next_chunk().await {
                        Ok(Some(chunk)) => StreamEvent::Chunk(chunk),
                        Ok(None) => StreamEvent::Finished(Ok(())),
                        Err(error) => StreamEvent::Finished(Err(error)),
                    };
                    let done = matches!(event, StreamEvent::Finished(_));
                    if tx.send(event).is_err() || done {
                        break;
                    }
                }
            });
        }
        StreamCompletion::TransportError { error, .. } | StreamCompletion::DispatchFailed(error) => {
            let _ = tx.send(StreamEvent::Finished(Err(error)));
        }
    }
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("HTTP {} {reason}", status.as_u16()),
        None => format!("HTTP {}", status.as_u16()),
    }
}

/// Pretty-print JSON when asked and possible; otherwise pass bytes through.
fn render_body(body: &Bytes, json: bool) -> Vec<u8> {
    if json {
        if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
            if let Ok(mut pretty) = serde_json::to_string_pretty(&value) {
                pretty.push('\n');
                return pretty.into_bytes();
            }
        }
    }
    body.to_vec()
}
