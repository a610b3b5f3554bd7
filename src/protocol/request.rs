//! Request data shapes handed from the session to route handlers.
//!
//! [`RequestHead`] wraps a bodyless `http::Request` produced by the request
//! decoder. [`Request`] is what a resolved handler receives: the head, the
//! fully accumulated body and the path parameters extracted during route
//! resolution.

use bytes::Bytes;
use http::request::Parts;
use http::{HeaderMap, Method, Request as HttpRequest, Uri, Version};

use crate::protocol::query::Query;

/// The parsed head of an inbound request, without its body.
#[derive(Debug)]
pub struct RequestHead {
    inner: HttpRequest<()>,
}

impl RequestHead {
    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    /// Returns a reference to the request's URI.
    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    /// Returns the path component of the request target.
    pub fn path(&self) -> &str {
        self.inner.uri().path()
    }

    /// Returns the request's HTTP version.
    pub fn version(&self) -> Version {
        self.inner.version()
    }

    /// Returns a reference to the request's headers.
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }
}

impl From<Parts> for RequestHead {
    #[inline]
    fn from(parts: Parts) -> Self {
        Self { inner: HttpRequest::from_parts(parts, ()) }
    }
}

impl From<HttpRequest<()>> for RequestHead {
    #[inline]
    fn from(inner: HttpRequest<()>) -> Self {
        Self { inner }
    }
}

/// Path parameters captured while matching a parameterized route pattern.
///
/// Insertion order follows the pattern's segment order.
#[derive(Debug, Default)]
pub struct PathParams {
    pairs: Vec<(String, String)>,
}

impl PathParams {
    /// An empty parameter set, used for exact-match routes.
    pub fn empty() -> Self {
        Self { pairs: Vec::new() }
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// Looks up a captured segment by parameter name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// A complete inbound request as seen by a route handler.
#[derive(Debug)]
pub struct Request {
    head: RequestHead,
    body: Bytes,
    params: PathParams,
}

impl Request {
    pub fn new(head: RequestHead, body: Bytes, params: PathParams) -> Self {
        Self { head, body, params }
    }

    pub fn method(&self) -> &Method {
        self.head.method()
    }

    pub fn uri(&self) -> &Uri {
        self.head.uri()
    }

    pub fn path(&self) -> &str {
        self.head.path()
    }

    pub fn version(&self) -> Version {
        self.head.version()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.head.headers()
    }

    /// Returns the request body, fully accumulated by the decoder.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consumes the request, returning its body.
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Returns the path parameters captured during route resolution.
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// Shorthand for looking up one captured path parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Parses the query-string portion of the request target.
    ///
    /// Parsing happens on demand; the router never looks at the query.
    pub fn query(&self) -> Query<'_> {
        Query::from(self.head.uri().query().unwrap_or(""))
    }
}
