//! Bundled middleware: JSON body parsing, request logging, and metrics.
//!
//! Each of these is an ordinary [`Handler`](crate::dispatcher::Handler);
//! register them with `App::middleware` like any user-written middleware.

mod body_parser;
mod logging;
mod metrics;

pub use body_parser::JsonBodyParser;
pub use logging::RequestLogger;
pub use metrics::Metrics;
