//! Single-terminal-write guard for the outbound response.
//!
//! Every request owns one [`ResponseGuard`]. Handlers and error handlers
//! finish the response through it; once the first terminal write lands,
//! every later finisher is a silent no-op. The transport flushes the
//! buffered [`Finished`] payload exactly once after dispatch completes.

use serde::Serialize;
use serde_json::Value;
use std::cell::{Cell, RefCell};

use crate::dispatcher::{DispatchResult, Fault};

pub(crate) const CT_JSON: &str = "application/json";
pub(crate) const CT_HTML: &str = "text/html";
pub(crate) const CT_TEXT: &str = "text/plain";

/// The terminal payload buffered by the guard, written to the transport once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finished {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// Per-request response state: pending status code, headers-sent flag,
/// completed flag, and the buffered terminal payload.
///
/// `status()` only records the intended code and performs no I/O; later
/// calls before the first write silently override it. `json()` and
/// `send()` perform the single terminal write and never double-write or
/// panic when called after the response finished.
#[derive(Debug)]
pub struct ResponseGuard {
    status: Cell<u16>,
    headers_sent: Cell<bool>,
    completed: Cell<bool>,
    written: RefCell<Option<Finished>>,
}

impl Default for ResponseGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseGuard {
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: Cell::new(200),
            headers_sent: Cell::new(false),
            completed: Cell::new(false),
            written: RefCell::new(None),
        }
    }

    /// Record the status code for the upcoming terminal write. Chains.
    pub fn status(&self, code: u16) -> &Self {
        if !self.headers_sent.get() {
            self.status.set(code);
        }
        self
    }

    /// Finish the response with a JSON body. No-op once headers are sent.
    pub fn json<T: Serialize>(&self, value: &T) -> DispatchResult {
        if self.headers_sent.get() {
            return Ok(());
        }
        let body = serde_json::to_vec(value).map_err(Fault::from)?;
        self.write(self.status.get(), CT_JSON, body);
        Ok(())
    }

    /// Finish the response, inferring the content type from the value:
    /// string payloads go out as `text/html`, everything else serializes
    /// as `application/json`.
    pub fn send(&self, value: Value) -> DispatchResult {
        if self.headers_sent.get() {
            return Ok(());
        }
        match value {
            Value::String(text) => {
                self.write(self.status.get(), CT_HTML, text.into_bytes());
            }
            other => {
                let body = serde_json::to_vec(&other).map_err(Fault::from)?;
                self.write(self.status.get(), CT_JSON, body);
            }
        }
        Ok(())
    }

    /// The `404 Not Found` default emitted when the stack exhausts without
    /// a response. Guarded, so at most one terminal write ever happens.
    pub(crate) fn not_found(&self) {
        if !self.headers_sent.get() {
            self.write(404, CT_TEXT, b"Not Found".to_vec());
        }
    }

    /// The fixed `500` fallback emitted when the error chain exhausts.
    pub(crate) fn fallback_error(&self, message: &str) {
        if !self.headers_sent.get() {
            self.write(
                500,
                CT_TEXT,
                format!("Internal Server Error: {message}").into_bytes(),
            );
        }
    }

    fn write(&self, status: u16, content_type: &'static str, body: Vec<u8>) {
        self.headers_sent.set(true);
        self.completed.set(true);
        *self.written.borrow_mut() = Some(Finished {
            status,
            content_type,
            body,
        });
    }

    #[must_use]
    pub fn headers_sent(&self) -> bool {
        self.headers_sent.get()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed.get()
    }

    /// Status of the terminal write, if one happened yet.
    #[must_use]
    pub fn finished_status(&self) -> Option<u16> {
        self.written.borrow().as_ref().map(|w| w.status)
    }

    /// Take the buffered terminal payload for flushing to the transport.
    #[must_use]
    pub fn take_finished(&self) -> Option<Finished> {
        self.written.borrow_mut().take()
    }
}
