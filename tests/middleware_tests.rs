//! Tests for the bundled middleware: JSON body parsing, metrics, and
//! request logging.

use std::collections::HashMap;

use cascade::context::RequestContext;
use cascade::dispatcher::{DispatchResult, Handler, Next};
use cascade::middleware::{JsonBodyParser, Metrics, RequestLogger};
use cascade::response::ResponseGuard;
use cascade::App;
use http::Method;
use serde_json::{json, Value};

struct EchoBody;

impl Handler for EchoBody {
    fn handle(&self, ctx: &RequestContext, res: &ResponseGuard, _next: Next<'_>) -> DispatchResult {
        res.json(&json!({ "body": ctx.body() }))
    }
}

fn post_json(path: &str, payload: &[u8]) -> RequestContext {
    let mut headers = HashMap::new();
    headers.insert("content-type".to_string(), "application/json".to_string());
    headers.insert("content-length".to_string(), payload.len().to_string());
    RequestContext::new(Method::POST, path)
        .with_headers(headers)
        .with_raw_body(payload.to_vec())
}

#[test]
fn body_parser_populates_ctx_body_for_post() {
    let mut app = App::new();
    app.middleware(JsonBodyParser);
    app.post("/users", EchoBody);
    let dispatcher = app.build();

    let guard = ResponseGuard::new();
    dispatcher.dispatch(post_json("/users", br#"{"name": "ada"}"#), &guard);

    let finished = guard.take_finished().unwrap();
    assert_eq!(finished.status, 200);
    let body: Value = serde_json::from_slice(&finished.body).unwrap();
    assert_eq!(body, json!({"body": {"name": "ada"}}));
}

#[test]
fn body_parser_skips_get_requests() {
    let mut app = App::new();
    app.middleware(JsonBodyParser);
    app.get("/users", EchoBody);
    let dispatcher = app.build();

    let guard = ResponseGuard::new();
    // a GET with stray payload bytes: the parser must not touch them
    let ctx = RequestContext::new(Method::GET, "/users").with_raw_body(b"{not json".to_vec());
    dispatcher.dispatch(ctx, &guard);

    let finished = guard.take_finished().unwrap();
    assert_eq!(finished.status, 200);
    let body: Value = serde_json::from_slice(&finished.body).unwrap();
    assert_eq!(body, json!({"body": null}));
}

#[test]
fn body_parser_skips_zero_content_length() {
    let mut app = App::new();
    app.middleware(JsonBodyParser);
    app.post("/users", EchoBody);
    let dispatcher = app.build();

    let mut headers = HashMap::new();
    headers.insert("content-length".to_string(), "0".to_string());
    let ctx = RequestContext::new(Method::POST, "/users").with_headers(headers);

    let guard = ResponseGuard::new();
    dispatcher.dispatch(ctx, &guard);

    let finished = guard.take_finished().unwrap();
    let body: Value = serde_json::from_slice(&finished.body).unwrap();
    assert_eq!(body, json!({"body": null}));
}

#[test]
fn malformed_json_body_diverts_to_error_chain() {
    let mut app = App::new();
    app.middleware(JsonBodyParser);
    app.post("/users", EchoBody);
    let dispatcher = app.build();

    let guard = ResponseGuard::new();
    dispatcher.dispatch(post_json("/users", b"{broken"), &guard);

    let finished = guard.take_finished().unwrap();
    assert_eq!(finished.status, 500);
    let body = String::from_utf8(finished.body).unwrap();
    assert!(body.starts_with("Internal Server Error:"), "body was {body:?}");
}

#[test]
fn metrics_middleware_counts_requests() {
    struct Ok200;
    impl Handler for Ok200 {
        fn handle(
            &self,
            _ctx: &RequestContext,
            res: &ResponseGuard,
            _next: Next<'_>,
        ) -> DispatchResult {
            res.json(&json!({"ok": true}))
        }
    }

    let metrics = Metrics::new();
    let mut app = App::new();
    app.middleware(metrics.clone());
    app.get("/pets", Ok200);
    let dispatcher = app.build();

    for i in 0..5 {
        let guard = ResponseGuard::new();
        dispatcher.dispatch(RequestContext::new(Method::GET, "/pets"), &guard);
        assert_eq!(guard.finished_status(), Some(200));
        assert_eq!(metrics.request_count(), i + 1);
    }
    assert!(metrics.average_latency().as_nanos() > 0);
}

#[test]
fn metrics_count_includes_404s() {
    let metrics = Metrics::new();
    let mut app = App::new();
    app.middleware(metrics.clone());
    let dispatcher = app.build();

    let guard = ResponseGuard::new();
    dispatcher.dispatch(RequestContext::new(Method::GET, "/missing"), &guard);
    assert_eq!(guard.finished_status(), Some(404));
    assert_eq!(metrics.request_count(), 1);
}

#[test]
fn request_logger_is_transparent() {
    let mut app = App::new();
    app.middleware(RequestLogger);
    app.get("/ping", {
        struct Pong;
        impl Handler for Pong {
            fn handle(
                &self,
                _ctx: &RequestContext,
                res: &ResponseGuard,
                _next: Next<'_>,
            ) -> DispatchResult {
                res.send(Value::String("pong".to_string()))
            }
        }
        Pong
    });
    let dispatcher = app.build();

    let guard = ResponseGuard::new();
    dispatcher.dispatch(RequestContext::new(Method::GET, "/ping"), &guard);

    let finished = guard.take_finished().unwrap();
    assert_eq!(finished.status, 200);
    assert_eq!(finished.content_type, "text/html");
    assert_eq!(finished.body, b"pong".to_vec());
}

#[test]
fn middleware_chain_composes() {
    let metrics = Metrics::new();
    let mut app = App::new();
    app.middleware(RequestLogger);
    app.middleware(metrics.clone());
    app.middleware(JsonBodyParser);
    app.post("/users", EchoBody);
    let dispatcher = app.build();

    let guard = ResponseGuard::new();
    dispatcher.dispatch(post_json("/users", br#"{"n": 1}"#), &guard);

    assert_eq!(guard.finished_status(), Some(200));
    assert_eq!(metrics.request_count(), 1);
}

// the Arc<dyn Handler> clone in the stack shares counters with the local
// handle; this pins that Clone stays shallow
#[test]
fn metrics_clones_share_counters() {
    let metrics = Metrics::new();
    let clone = metrics.clone();
    let mut app = App::new();
    app.middleware(clone);
    let dispatcher = app.build();

    let guard = ResponseGuard::new();
    dispatcher.dispatch(RequestContext::new(Method::GET, "/x"), &guard);
    assert_eq!(metrics.request_count(), 1);
}
