//! The registration surface and the build phase.
//!
//! An [`App`] collects routes, middleware, and error handlers while the
//! process starts up, then freezes into an immutable [`Dispatcher`],
//! either explicitly via [`App::build`] or implicitly via [`App::listen`].
//! After the build there is no registration and no locking: request
//! coroutines share the dispatcher behind a plain `Arc`.

use http::Method;
use std::net::ToSocketAddrs;
use std::sync::Arc;
use tracing::info;

use crate::dispatcher::{Dispatcher, ErrorChain, ErrorHandler, Handler};
use crate::router::Router;
use crate::server::{start_server, AppService, ServerHandle};

/// An application under construction: a root router plus the
/// error-handler chain.
#[derive(Default)]
pub struct App {
    root: Router,
    error_handlers: Vec<Arc<dyn ErrorHandler>>,
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<H: Handler>(&mut self, pattern: &str, handler: H) {
        self.root.get(pattern, handler);
    }

    pub fn post<H: Handler>(&mut self, pattern: &str, handler: H) {
        self.root.post(pattern, handler);
    }

    pub fn put<H: Handler>(&mut self, pattern: &str, handler: H) {
        self.root.put(pattern, handler);
    }

    pub fn delete<H: Handler>(&mut self, pattern: &str, handler: H) {
        self.root.delete(pattern, handler);
    }

    /// Register a route with an explicit method and a multi-handler chain.
    pub fn route(&mut self, method: Method, pattern: &str, handlers: Vec<Arc<dyn Handler>>) {
        self.root.route(method, pattern, handlers);
    }

    /// Register middleware that runs for every request, in registration
    /// order, ahead of any route handlers.
    pub fn middleware<H: Handler>(&mut self, handler: H) {
        self.root.middleware(handler);
    }

    /// Register middleware gated behind a path prefix.
    pub fn middleware_at<H: Handler>(&mut self, prefix: &str, handler: H) {
        self.root.middleware_at(prefix, handler);
    }

    /// Mount a router under a prefix; its routes recompile against the
    /// combined path and its middleware fires only under the prefix.
    pub fn mount(&mut self, prefix: &str, router: Router) {
        self.root.mount(prefix, router);
    }

    /// Append an error handler to the chain. Handlers run in registration
    /// order when a fault crosses out of the normal stack.
    pub fn set_error_handler<E: ErrorHandler>(&mut self, handler: E) {
        self.error_handlers.push(Arc::new(handler));
    }

    /// Freeze registration into the immutable dispatch engine.
    #[must_use]
    pub fn build(self) -> Dispatcher {
        let (table, middleware) = self.root.into_table_and_middleware();
        table.log_summary();
        info!(
            routes = table.len(),
            middleware = middleware.len(),
            error_handlers = self.error_handlers.len(),
            "application built"
        );
        Dispatcher::new(table, middleware, ErrorChain::new(self.error_handlers))
    }

    /// Build the dispatcher and start serving on the given address.
    ///
    /// # Errors
    ///
    /// Fails when the listen address is invalid or the port cannot be
    /// bound.
    pub fn listen<A: ToSocketAddrs>(self, addr: A) -> anyhow::Result<ServerHandle> {
        let dispatcher = Arc::new(self.build());
        let handle = start_server(AppService::new(dispatcher), addr)?;
        info!(addr = %handle.addr(), "listening");
        Ok(handle)
    }
}
