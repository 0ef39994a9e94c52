//! # Dispatcher Module
//!
//! The execution engine behind every request: stack assembly, the
//! `next()`-driven continuation protocol, and the error-handler chain.
//!
//! ## Execution protocol
//!
//! 1. The route table is consulted once; the effective stack is the global
//!    middleware (registration order) followed by the matched route's
//!    handler chain (empty when nothing matched).
//! 2. A shared cursor walks the stack through [`Next::advance`]. Exactly
//!    one handler runs between two advance calls; a handler may respond,
//!    suspend inside its coroutine, or delegate.
//! 3. A handler returning `Err`, or calling [`Next::fail`], transfers
//!    control to the error chain; the normal stack never resumes.
//! 4. Stack exhausted without a response ⇒ terminal `404`. Error chain
//!    exhausted ⇒ terminal `500` carrying the last fault's message.
//!
//! The response guard makes every terminal write idempotent, so however
//! many handlers misbehave, the client sees exactly one response.

mod core;
mod errors;

pub use self::core::{handler_fn, DispatchResult, Dispatcher, FnHandler, Handler, Next};
pub use errors::{error_handler_fn, ErrorChain, ErrorHandler, ErrorNext, Fault, FnErrorHandler};
