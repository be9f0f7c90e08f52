//! Sink for errors nobody else can handle.
//!
//! Dispatch failures and panicking callbacks end up here instead of
//! unwinding through the session's executor.

use crate::error::RequestError;

/// Receives errors raised by dispatch code or by completion callbacks.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &RequestError);
}

/// Default reporter: logs through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, error: &RequestError) {
        tracing::error!(error = %error, "unhandled http request error");
    }
}

impl<F> ErrorReporter for F
where
    F: Fn(&RequestError) + Send + Sync,
{
    fn report(&self, error: &RequestError) {
        self(error)
    }
}

/// Extract a printable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn closures_can_act_as_reporters() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = seen.clone();
            move |err: &RequestError| seen.lock().unwrap().push(err.to_string())
        };
        sink.report(&RequestError::Cancelled);
        assert_eq!(seen.lock().unwrap().as_slice(), ["request cancelled"]);
    }

    #[test]
    fn panic_message_handles_str_and_string() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("static");
        assert_eq!(panic_message(boxed.as_ref()), "static");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(boxed.as_ref()), "non-string panic payload");
    }
}
