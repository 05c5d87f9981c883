//! Router core module - registration and the per-request hot path.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use http::Method;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::trie::{split_segments, Outcome, Slot, TrieNode};
use crate::error::RouteError;
use crate::handler::{Handler, HandlerFn};
use crate::responder::{accept_json, MethodNotAllowed, Negotiator, NotFound};
use crate::runtime_config::MuxConfig;
use crate::server::{HandlerRequest, HandlerResponse, ParamVec};

/// Result of walking the trie for one request.
#[derive(Debug)]
pub struct Lookup<'a> {
    /// Wildcard bindings, each under `{name}` and `name`. Empty unless a
    /// handler (or the 405 responder) was reached.
    pub params: ParamVec,
    pub outcome: Outcome<'a>,
}

/// A registration as reported by [`TrieServeMux::routes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// `None` for namespace registrations
    pub method: Option<Method>,
    pub pattern: String,
}

/// What [`TrieServeMux::resolve`] hands back for the request.
pub enum Route<'a> {
    /// A registered handler (method or namespace)
    Handler(&'a Arc<dyn Handler>),
    /// The path matched but the method did not
    MethodNotAllowed(MethodNotAllowed<'a>),
    /// Nothing matched
    NotFound(NotFound<'a>),
}

impl Route<'_> {
    /// Invoke the resolved handler or responder.
    pub fn serve(&self, req: &HandlerRequest, res: &mut HandlerResponse) {
        match self {
            Route::Handler(handler) => handler.serve(req, res),
            Route::MethodNotAllowed(responder) => responder.serve(req, res),
            Route::NotFound(responder) => responder.serve(req, res),
        }
    }

    /// `true` when a registered handler was reached.
    #[must_use]
    pub fn is_handler(&self) -> bool {
        matches!(self, Route::Handler(_))
    }
}

/// HTTP request multiplexer over a segment trie.
///
/// Patterns are `/`-separated; a segment written `{name}` matches any single
/// segment and binds it under both `{name}` and `name`. Registration happens
/// up front through `&mut self`; serving only needs `&self`, so a finished mux
/// can be shared across threads (see [`SharedMux`](super::SharedMux) for
/// swapping in a rebuilt one).
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use triemux::{HandlerRequest, HandlerResponse, TrieServeMux};
///
/// let mut mux = TrieServeMux::new();
/// mux.handle_fn(Method::GET, "/users/{id}", |req: &HandlerRequest, res: &mut HandlerResponse| {
///     let id = req.get_query_param("id").unwrap_or_default();
///     res.write_text(200, id);
/// })
/// .unwrap();
///
/// let mut req = HandlerRequest::new(Method::GET, "/users/42");
/// let mut res = HandlerResponse::new();
/// mux.serve(&mut req, &mut res);
/// assert_eq!(res.body_text(), "42");
/// ```
pub struct TrieServeMux {
    root: TrieNode,
    config: MuxConfig,
    accept_json: Negotiator,
    not_found: Option<Arc<dyn Handler>>,
}

impl Default for TrieServeMux {
    fn default() -> Self {
        Self::new()
    }
}

impl TrieServeMux {
    /// Empty mux with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MuxConfig::default())
    }

    /// Empty mux with an explicit configuration.
    #[must_use]
    pub fn with_config(config: MuxConfig) -> Self {
        Self {
            root: TrieNode::new(),
            config,
            accept_json,
            not_found: None,
        }
    }

    /// Replace the built-in 404 responder.
    #[must_use]
    pub fn with_not_found<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.not_found = Some(Arc::new(handler));
        self
    }

    /// Replace the JSON-vs-text negotiation predicate.
    #[must_use]
    pub fn with_negotiator(mut self, negotiator: Negotiator) -> Self {
        self.accept_json = negotiator;
        self
    }

    #[must_use]
    pub fn config(&self) -> &MuxConfig {
        &self.config
    }

    /// Register `handler` for `method` requests matching `pattern`.
    ///
    /// Registering the same method and pattern again replaces the handler.
    pub fn handle<H: Handler + 'static>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: H,
    ) -> Result<(), RouteError> {
        self.handle_shared(method, pattern, Arc::new(handler))
    }

    /// Like [`handle`](Self::handle) for a handler that is already shared,
    /// e.g. one registered under several methods.
    pub fn handle_shared(
        &mut self,
        method: Method,
        pattern: &str,
        handler: Arc<dyn Handler>,
    ) -> Result<(), RouteError> {
        validate_pattern(pattern)?;
        info!(method = %method, pattern = %pattern, "Route registered");
        self.root.insert(
            &split_segments(pattern),
            Slot::Method(method),
            handler,
            pattern,
        );
        Ok(())
    }

    /// Register a closure as the handler for `method` and `pattern`.
    pub fn handle_fn<F>(&mut self, method: Method, pattern: &str, f: F) -> Result<(), RouteError>
    where
        F: Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync + 'static,
    {
        self.handle(method, pattern, HandlerFn::new(f))
    }

    /// Register `handler` as the fallback for every otherwise-unmatched path
    /// under `namespace`, for any method.
    ///
    /// The handler sees the request path with the namespace stripped:
    /// `/admin/reports/2023` under `/admin` arrives as `/reports/2023`. A
    /// single trailing `/` on `namespace` is ignored, so `/` catches
    /// everything that nothing else matches.
    pub fn handle_namespace<H: Handler + 'static>(
        &mut self,
        namespace: &str,
        handler: H,
    ) -> Result<(), RouteError> {
        validate_pattern(namespace)?;
        let prefix = namespace.strip_suffix('/').unwrap_or(namespace);
        info!(namespace = %namespace, "Namespace registered");
        self.root.insert(
            &split_segments(prefix),
            Slot::Namespace,
            Arc::new(handler),
            namespace,
        );
        Ok(())
    }

    /// Walk the trie for `method` and `path` without touching any request.
    #[must_use]
    pub fn lookup<'a>(&'a self, method: &Method, path: &str) -> Lookup<'a> {
        let match_start = Instant::now();
        let mut params = ParamVec::new();
        let outcome = self.root.find(method, &split_segments(path), &mut params);
        if matches!(outcome, Outcome::NotFound) {
            params.clear();
        }
        debug!(
            method = %method,
            path = %path,
            outcome = ?outcome,
            path_params = ?params,
            duration_us = match_start.elapsed().as_micros(),
            "Route lookup"
        );
        Lookup { params, outcome }
    }

    /// Resolve `req` to a handler and the pattern that matched.
    ///
    /// Wildcard bindings are appended to `req.query_params` (existing
    /// parameters are kept). For namespace matches `req.path` is rewritten
    /// to the unmatched suffix. The pattern is empty for 404 and 405
    /// outcomes.
    pub fn resolve<'a>(&'a self, req: &mut HandlerRequest) -> (Route<'a>, &'a str) {
        let Lookup { params, outcome } = self.lookup(&req.method, &req.path);
        req.merge_params(params);
        match outcome {
            Outcome::Matched { handler, pattern } => (Route::Handler(handler), pattern),
            Outcome::Namespace {
                handler,
                pattern,
                path,
            } => {
                debug!(namespace = %pattern, from = %req.path, to = %path, "Namespace path rewritten");
                req.path = path;
                (Route::Handler(handler), pattern)
            }
            Outcome::MethodNotAllowed { node } => (
                Route::MethodNotAllowed(MethodNotAllowed::new(
                    node,
                    &self.config,
                    self.accept_json,
                )),
                "",
            ),
            Outcome::NotFound => (
                Route::NotFound(NotFound::new(
                    self.not_found.as_ref(),
                    &self.config,
                    self.accept_json,
                )),
                "",
            ),
        }
    }

    /// Resolve `req` and invoke whatever it resolved to.
    pub fn serve(&self, req: &mut HandlerRequest, res: &mut HandlerResponse) {
        let (route, _pattern) = self.resolve(req);
        route.serve(req, res);
    }

    /// Every registration, sorted by pattern then method.
    #[must_use]
    pub fn routes(&self) -> Vec<RouteEntry> {
        let mut raw = Vec::new();
        self.root.collect_routes(&mut raw);
        let mut routes: Vec<RouteEntry> = raw
            .into_iter()
            .map(|(method, pattern)| RouteEntry { method, pattern })
            .collect();
        routes.sort_by(|a, b| {
            a.pattern.cmp(&b.pattern).then_with(|| {
                let a = a.method.as_ref().map_or("", Method::as_str);
                let b = b.method.as_ref().map_or("", Method::as_str);
                a.cmp(b)
            })
        });
        routes
    }

    /// Log every registration at `info`.
    pub fn dump_routes(&self) {
        let routes = self.routes();
        info!(routes_count = routes.len(), "Routing table");
        for route in &routes {
            match &route.method {
                Some(method) => info!(method = %method, pattern = %route.pattern, "route"),
                None => info!(namespace = %route.pattern, "namespace"),
            }
        }
    }
}

/// A mux can itself be mounted, e.g. as a namespace handler of another mux.
impl Handler for TrieServeMux {
    fn serve(&self, req: &HandlerRequest, res: &mut HandlerResponse) {
        let mut req = req.clone();
        TrieServeMux::serve(self, &mut req, res);
    }
}

fn validate_pattern(pattern: &str) -> Result<(), RouteError> {
    if pattern.starts_with('/') {
        return Ok(());
    }
    warn!(pattern = %pattern, "Rejected route pattern without leading '/'");
    Err(RouteError::InvalidPattern {
        pattern: pattern.to_string(),
    })
}
