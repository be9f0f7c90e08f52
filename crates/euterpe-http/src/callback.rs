//! One-shot completion callbacks with panic containment.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use crate::error::RequestError;
use crate::report::{ErrorReporter, panic_message};

type BoxedCallback<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// Shared slot holding a callback until it fires.
///
/// Both the dispatched task and the synchronous failure path hold a clone;
/// whichever fires first takes the callback, so it runs at most once.
pub(crate) struct Callback<T> {
    slot: Arc<Mutex<Option<BoxedCallback<T>>>>,
    reporter: Arc<dyn ErrorReporter>,
}

impl<T> Clone for Callback<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
            reporter: self.reporter.clone(),
        }
    }
}

impl<T> Callback<T> {
    pub(crate) fn new(callback: BoxedCallback<T>, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(callback))),
            reporter,
        }
    }

    pub(crate) fn reporter(&self) -> &dyn ErrorReporter {
        self.reporter.as_ref()
    }

    /// Invoke the callback if it has not run yet. Returns false otherwise.
    pub(crate) fn fire(&self, value: T) -> bool {
        let callback = match self.slot.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let Some(callback) = callback else {
            tracing::warn!("completion callback already fired");
            return false;
        };
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(move || callback(value))) {
            let error = RequestError::CallbackPanicked(panic_message(payload.as_ref()));
            self.reporter.report(&error);
        }
        true
    }
}
