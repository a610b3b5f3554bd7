//! Route registration and two-phase request resolution.
//!
//! Routes are registered once, before the server starts accepting, through
//! [`RouterBuilder`]; the built [`Router`] is immutable and shared across
//! workers behind an `Arc`, so resolution runs lock-free.
//!
//! Resolution is two-phase: an exact string lookup on the registration table
//! handles literal routes in O(1), and a linear scan over the patterns in
//! registration order handles parameterized paths. The first pattern that
//! matches the path and has the requested method registered wins.

mod pattern;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::Method;
use tracing::debug;

use crate::handler::Handler;
use crate::protocol::PathParams;
use pattern::PathPattern;

/// The route dispatcher: maps (path, method) to a registered handler.
pub struct Router {
    routes: Vec<RouteEntry>,
    exact: HashMap<String, usize>,
}

struct RouteEntry {
    raw: String,
    pattern: PathPattern,
    handlers: HashMap<Method, Arc<dyn Handler>>,
}

/// A successful resolution: the matched handler plus captured path params.
pub struct Match {
    handler: Arc<dyn Handler>,
    params: PathParams,
}

impl Match {
    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn into_parts(self) -> (Arc<dyn Handler>, PathParams) {
        (self.handler, self.params)
    }
}

impl fmt::Debug for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Match").field("params", &self.params).finish_non_exhaustive()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let patterns = self.routes.iter().map(|entry| entry.raw.as_str()).collect::<Vec<_>>();
        f.debug_struct("Router").field("routes", &patterns).finish()
    }
}

impl fmt::Debug for RouterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let patterns = self.routes.iter().map(|entry| entry.raw.as_str()).collect::<Vec<_>>();
        f.debug_struct("RouterBuilder").field("routes", &patterns).finish()
    }
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Resolves a request path and method to a handler, or `None`.
    ///
    /// Phase 1 is an exact lookup against the registration table; phase 2
    /// scans patterns in registration order. Resolution never panics on
    /// unknown paths.
    pub fn resolve(&self, path: &str, method: &Method) -> Option<Match> {
        if let Some(&index) = self.exact.get(path) {
            let entry = &self.routes[index];
            if let Some(handler) = entry.handlers.get(method) {
                return Some(Match { handler: Arc::clone(handler), params: PathParams::empty() });
            }
        }

        for entry in &self.routes {
            if entry.pattern.is_literal() {
                continue;
            }
            if let Some(params) = entry.pattern.matches(path) {
                if let Some(handler) = entry.handlers.get(method) {
                    return Some(Match { handler: Arc::clone(handler), params });
                }
            }
        }

        None
    }
}

/// Accumulates route registrations before the server starts.
pub struct RouterBuilder {
    routes: Vec<RouteEntry>,
}

impl RouterBuilder {
    fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registers a handler for a (pattern, method) pair.
    ///
    /// Registering the same pair twice replaces the previous handler; the
    /// pattern keeps its original position in registration order.
    pub fn route(mut self, pattern: impl Into<String>, method: Method, handler: impl Handler + 'static) -> Self {
        let raw = pattern.into();
        debug!(pattern = %raw, method = %method, "registered route");

        let handler: Arc<dyn Handler> = Arc::new(handler);
        match self.routes.iter_mut().find(|entry| entry.raw == raw) {
            Some(entry) => {
                entry.handlers.insert(method, handler);
            }
            None => {
                let pattern = PathPattern::parse(&raw);
                let mut handlers = HashMap::new();
                handlers.insert(method, handler);
                self.routes.push(RouteEntry { raw, pattern, handlers });
            }
        }
        self
    }

    pub fn build(self) -> Router {
        let exact = self
            .routes
            .iter()
            .enumerate()
            .map(|(index, entry)| (entry.raw.clone(), index))
            .collect::<HashMap<_, _>>();

        Router { routes: self.routes, exact }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{HandlerError, handler_fn};
    use crate::protocol::response::{self, Response};
    use crate::protocol::{Request, RequestHead};
    use bytes::Bytes;
    use http::StatusCode;

    fn tagged(tag: &'static str) -> impl Handler + 'static {
        handler_fn(move |_req| async move { Ok::<Response, HandlerError>(response::text(StatusCode::OK, tag)) })
    }

    fn request_for(path: &str, params: PathParams) -> Request {
        let head: RequestHead = http::Request::builder().uri(path).body(()).unwrap().into();
        Request::new(head, Bytes::new(), params)
    }

    async fn invoke(matched: Match, path: &str) -> String {
        let (handler, params) = matched.into_parts();
        let response = handler.handle(request_for(path, params)).await.unwrap();
        String::from_utf8(response.into_body().to_vec()).unwrap()
    }

    #[tokio::test]
    async fn exact_match_wins_over_pattern() {
        let router = Router::builder()
            .route("/api/documents/{id}", Method::GET, tagged("by-id"))
            .route("/api/documents/search", Method::GET, tagged("search"))
            .build();

        let matched = router.resolve("/api/documents/search", &Method::GET).unwrap();
        assert_eq!(invoke(matched, "/api/documents/search").await, "search");

        let matched = router.resolve("/api/documents/42", &Method::GET).unwrap();
        assert_eq!(invoke(matched, "/api/documents/42").await, "by-id");
    }

    #[tokio::test]
    async fn last_registration_wins() {
        let router = Router::builder()
            .route("/api/documents", Method::GET, tagged("first"))
            .route("/api/documents", Method::GET, tagged("second"))
            .build();

        let matched = router.resolve("/api/documents", &Method::GET).unwrap();
        assert_eq!(invoke(matched, "/api/documents").await, "second");
    }

    #[tokio::test]
    async fn first_matching_pattern_in_registration_order_wins() {
        let router = Router::builder()
            .route("/api/{first}", Method::GET, tagged("first"))
            .route("/api/{second}", Method::GET, tagged("second"))
            .build();

        let matched = router.resolve("/api/anything", &Method::GET).unwrap();
        assert_eq!(invoke(matched, "/api/anything").await, "first");
    }

    #[tokio::test]
    async fn pattern_without_method_is_skipped() {
        let router = Router::builder()
            .route("/api/{first}", Method::POST, tagged("post-only"))
            .route("/api/{second}", Method::GET, tagged("get"))
            .build();

        let matched = router.resolve("/api/x", &Method::GET).unwrap();
        assert_eq!(invoke(matched, "/api/x").await, "get");
    }

    #[test]
    fn methods_are_independent_registrations() {
        let router = Router::builder()
            .route("/api/documents", Method::GET, tagged("get"))
            .route("/api/documents", Method::POST, tagged("post"))
            .build();

        assert!(router.resolve("/api/documents", &Method::GET).is_some());
        assert!(router.resolve("/api/documents", &Method::POST).is_some());
        assert!(router.resolve("/api/documents", &Method::DELETE).is_none());
    }

    #[test]
    fn unknown_path_resolves_to_none() {
        let router = Router::builder().route("/api/documents", Method::GET, tagged("get")).build();

        assert!(router.resolve("/nope", &Method::GET).is_none());
        assert!(router.resolve("", &Method::GET).is_none());
    }

    #[tokio::test]
    async fn pattern_params_reach_the_handler() {
        let router = Router::builder()
            .route(
                "/api/documents/{id}",
                Method::GET,
                handler_fn(|req: Request| async move {
                    let id = req.param("id").unwrap_or("missing").to_string();
                    Ok::<Response, HandlerError>(response::text(StatusCode::OK, id))
                }),
            )
            .build();

        let matched = router.resolve("/api/documents/42", &Method::GET).unwrap();
        assert_eq!(invoke(matched, "/api/documents/42").await, "42");
    }
}
