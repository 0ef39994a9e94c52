//! # cascade
//!
//! **cascade** is an Express-style HTTP routing and middleware dispatch
//! engine for Rust, running on the [`may`] coroutine runtime with
//! `may_minihttp` as the transport.
//!
//! ## Overview
//!
//! Requests flow through an ordered stack of middleware and route
//! handlers driven by a `next()` continuation. Routes are plain pattern
//! strings (`/users/:id`, `/items/:id?`, `/files/*`) compiled once into
//! regex matchers; precedence is registration order, first match wins.
//! Routers nest: mounting a router under a prefix re-derives its routes
//! against the combined path and scopes its middleware to the prefix with
//! a rebased view of the request. A per-request response guard makes the
//! terminal write idempotent, so exactly one response reaches the client
//! no matter how many handlers fault or double-advance.
//!
//! ## Architecture
//!
//! - **[`router`]** - pattern compilation, the first-match-wins route
//!   table, and nestable routers
//! - **[`dispatcher`]** - the per-request execution engine and the
//!   error-handler chain
//! - **[`response`]** - the single-terminal-write response guard
//! - **[`context`]** - per-request state (params, query, headers, body)
//! - **[`server`]** - the `may_minihttp` transport adapter
//! - **[`middleware`]** - bundled JSON body parser, request logger, and
//!   metrics
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cascade::{handler_fn, App, DispatchResult, Next, RequestContext, ResponseGuard};
//! use serde_json::json;
//!
//! fn get_user(ctx: &RequestContext, res: &ResponseGuard, _next: Next<'_>) -> DispatchResult {
//!     res.json(&json!({ "id": ctx.param("id") }))
//! }
//!
//! let mut app = App::new();
//! app.middleware(cascade::middleware::JsonBodyParser);
//! app.get("/users/:id", handler_fn(get_user));
//! let server = app.listen("0.0.0.0:3000")?;
//! server.join().ok();
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Runtime Considerations
//!
//! cascade runs on the `may` coroutine runtime, not tokio. Each request is
//! handled inside one coroutine and its dispatch state never leaves it;
//! handlers of a single request run strictly sequentially, while different
//! requests interleave freely. The only cross-request shared state is the
//! route table, middleware list, and error chain, all frozen before
//! serving begins.

pub mod app;
pub mod context;
pub mod dispatcher;
pub mod ids;
pub mod middleware;
pub mod response;
pub mod router;
pub mod server;

pub use app::App;
pub use context::{parse_query, ParamVec, QueryValue, RequestContext, MAX_INLINE_PARAMS};
pub use dispatcher::{
    error_handler_fn, handler_fn, DispatchResult, Dispatcher, ErrorHandler, ErrorNext, Fault,
    FnErrorHandler, FnHandler, Handler, Next,
};
pub use ids::RequestId;
pub use response::{Finished, ResponseGuard};
pub use router::{CompiledPattern, RouteTable, Router};
pub use server::{AppService, ServerHandle};

/// Install a global `tracing` subscriber honoring `RUST_LOG`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
