//! # Router Module
//!
//! Path-pattern compilation, the ordered route table, and nestable
//! routers.
//!
//! Patterns are compiled once at build time into anchored regexes
//! (`:name` → a capturing segment, `:name?` → an optional trailing
//! segment, `*` → a greedy remainder capture). Matching is a linear scan
//! in registration order with first-match-wins precedence: registering
//! `GET /users/:id` before `GET /users/new` means `/users/new` resolves
//! to the first route with `id = "new"`.
//!
//! [`Router`] instances are standalone until mounted; mounting is a
//! compile-time transformation that re-derives routes and middleware under
//! the mount prefix rather than a runtime delegation chain.

mod core;
mod pattern;
mod scope;

pub use self::core::{RouteTable, TableMatch};
pub use pattern::CompiledPattern;
pub use scope::Router;
