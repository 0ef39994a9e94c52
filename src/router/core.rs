//! The route table: ordered `(method, pattern, handler chain)` entries.

use http::Method;
use std::sync::Arc;
use tracing::{debug, info};

use super::pattern::CompiledPattern;
use crate::context::ParamVec;
use crate::dispatcher::Handler;

/// A registered route. Immutable once registered; owned by its table.
struct Route {
    method: Method,
    pattern: CompiledPattern,
    source: String,
    handlers: Vec<Arc<dyn Handler>>,
}

/// Result of a successful table lookup: the matched route's handler chain
/// and the parameters extracted from the path.
pub struct TableMatch<'a> {
    pub handlers: &'a [Arc<dyn Handler>],
    pub params: ParamVec,
    pub pattern: &'a str,
}

/// Ordered collection of routes with first-match-wins lookup.
///
/// Lookup is a linear scan in registration order, so the first registered
/// route wins on overlapping patterns. Registration order is the
/// precedence contract; the table never reorders.
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Compile the pattern once and append the route.
    pub fn register(&mut self, method: Method, pattern: &str, handlers: Vec<Arc<dyn Handler>>) {
        let compiled = CompiledPattern::compile(pattern);
        debug!(
            method = %method,
            pattern = %pattern,
            params = ?compiled.param_names(),
            handlers = handlers.len(),
            "route registered"
        );
        self.routes.push(Route {
            method,
            pattern: compiled,
            source: pattern.to_string(),
            handlers,
        });
    }

    /// Find the first route whose method matches and whose pattern accepts
    /// the path. `None` is normal control flow (a 404), never a fault.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Option<TableMatch<'_>> {
        for route in &self.routes {
            if route.method != *method {
                continue;
            }
            if let Some(params) = route.pattern.matches(path) {
                return Some(TableMatch {
                    handlers: &route.handlers,
                    params,
                    pattern: &route.source,
                });
            }
        }
        None
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Log a summary of the loaded table, mirroring what the server prints
    /// at startup.
    pub fn log_summary(&self) {
        let summary: Vec<String> = self
            .routes
            .iter()
            .take(10)
            .map(|r| format!("{} {}", r.method, r.source))
            .collect();
        info!(
            routes_count = self.routes.len(),
            routes_summary = ?summary,
            "routing table loaded"
        );
    }
}
