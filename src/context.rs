//! Per-request mutable state handed to every handler in the stack.
//!
//! A [`RequestContext`] is owned by exactly one in-flight request and never
//! shared across requests. Interior mutability is limited to the parsed
//! body cell so middleware can populate it without threading `&mut`
//! borrows through the continuation protocol.

use http::Method;
use serde_json::Value;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use crate::ids::RequestId;

/// Maximum number of path parameters before spilling to the heap.
/// Most routes carry well under eight (e.g. `/users/:id/posts/:post_id`).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the dispatch hot path.
///
/// Parameter names are `Arc<str>` because they come from the compiled
/// route table (known at startup); cloning them per request is an O(1)
/// refcount bump. Values are per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// A query-string value: a single occurrence or the ordered list of a
/// repeated key (`?tag=a&tag=b`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Single(String),
    Many(Vec<String>),
}

impl QueryValue {
    /// The first occurrence of the key.
    #[must_use]
    pub fn first(&self) -> &str {
        match self {
            QueryValue::Single(value) => value,
            QueryValue::Many(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// Every occurrence of the key, in query-string order.
    #[must_use]
    pub fn all(&self) -> Vec<&str> {
        match self {
            QueryValue::Single(value) => vec![value.as_str()],
            QueryValue::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            QueryValue::Single(first) => {
                *self = QueryValue::Many(vec![std::mem::take(first), value]);
            }
            QueryValue::Many(values) => values.push(value),
        }
    }
}

/// Parse a raw query string into a key → value-or-list map.
///
/// Percent-decoding is delegated to `url::form_urlencoded`; repeated keys
/// fold into [`QueryValue::Many`] preserving order.
#[must_use]
pub fn parse_query(query: &str) -> HashMap<String, QueryValue> {
    let mut out: HashMap<String, QueryValue> = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match out.entry(key.into_owned()) {
            Entry::Occupied(mut entry) => entry.get_mut().push(value.into_owned()),
            Entry::Vacant(entry) => {
                entry.insert(QueryValue::Single(value.into_owned()));
            }
        }
    }
    out
}

/// Per-request record: method, path, extracted parameters, query map,
/// headers, and the (raw and parsed) body.
#[derive(Debug, Clone)]
pub struct RequestContext {
    id: RequestId,
    method: Method,
    path: String,
    base_path: String,
    params: ParamVec,
    query: HashMap<String, QueryValue>,
    headers: HashMap<String, String>,
    raw_body: Option<Vec<u8>>,
    body: RefCell<Option<Value>>,
}

impl RequestContext {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            id: RequestId::new(),
            method,
            path: path.into(),
            base_path: String::new(),
            params: ParamVec::new(),
            query: HashMap::new(),
            headers: HashMap::new(),
            raw_body: None,
            body: RefCell::new(None),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: RequestId) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn with_query(mut self, raw_query: &str) -> Self {
        self.query = parse_query(raw_query);
        self
    }

    /// Header names are expected lowercased, as the transport parser emits them.
    #[must_use]
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn with_raw_body(mut self, raw_body: Vec<u8>) -> Self {
        self.raw_body = Some(raw_body);
        self
    }

    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The mount prefix accumulated so far; empty outside any mount.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Get a path parameter by name.
    ///
    /// Uses "last write wins" semantics: with duplicate names at different
    /// path depths the deepest occurrence is returned.
    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn params(&self) -> &ParamVec {
        &self.params
    }

    /// Convert params to a HashMap. This allocates - use `param()` in hot paths.
    #[must_use]
    pub fn params_map(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[must_use]
    pub fn query(&self, name: &str) -> Option<&QueryValue> {
        self.query.get(name)
    }

    #[must_use]
    pub fn query_map(&self) -> &HashMap<String, QueryValue> {
        &self.query
    }

    /// Get a header by name (stored lowercased).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn raw_body(&self) -> Option<&[u8]> {
        self.raw_body.as_deref()
    }

    /// The parsed body, if a body-parsing middleware has populated it.
    #[must_use]
    pub fn body(&self) -> Option<Value> {
        self.body.borrow().clone()
    }

    pub fn set_body(&self, body: Value) {
        *self.body.borrow_mut() = Some(body);
    }

    pub(crate) fn set_params(&mut self, params: ParamVec) {
        self.params = params;
    }

    /// A view of this request rebased under a mount prefix: the path becomes
    /// the suffix after the prefix and the base path accumulates it. The
    /// original context is left untouched, so outer stack entries never
    /// observe the rewrite.
    pub(crate) fn rebased(&self, prefix: &str) -> RequestContext {
        if prefix.is_empty() || prefix == "/" {
            return self.clone();
        }
        let suffix = self.path.strip_prefix(prefix).unwrap_or(&self.path);
        let mut scoped = self.clone();
        scoped.path = if suffix.is_empty() {
            "/".to_string()
        } else {
            suffix.to_string()
        };
        scoped.base_path = format!("{}{}", self.base_path, prefix);
        scoped
    }
}
