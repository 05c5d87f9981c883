use http::Method;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Maximum number of path/query parameters before heap allocation.
/// Most routes bind ≤4 wildcards, and each wildcard produces two entries
/// (`{id}` and `id`).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Maximum inline headers before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated parameter storage for the hot path.
///
/// Param names use `Arc<str>` because wildcard names come from the static
/// trie (known at registration) and `Arc::clone()` is an atomic increment
/// rather than a string copy. Values remain `String` as they're per-request
/// data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Stack-allocated header storage for the hot path.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Request data handed to a [`Handler`](crate::Handler).
///
/// The mux reads `method`, `path` and `headers`; `resolve` rewrites `path`
/// for namespace handlers and appends wildcard bindings to `query_params`.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerRequest {
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request path without the query string
    pub path: String,
    /// Query string parameters followed by any wildcard bindings
    pub query_params: ParamVec,
    /// HTTP headers as received
    pub headers: HeaderVec,
    /// Raw request body
    pub body: Vec<u8>,
}

impl HandlerRequest {
    /// Build a request from a method and a request target such as
    /// `/users/42?expand=posts`.
    ///
    /// Everything after the first `?` is parsed as a form-urlencoded query.
    /// The path itself is kept verbatim (no percent-decoding).
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        };
        let query_params = query.map(parse_query_params).unwrap_or_default();
        debug!(
            method = %method,
            path = %path,
            param_count = query_params.len(),
            "Request target parsed"
        );
        Self {
            method,
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            query_params,
            headers: HeaderVec::new(),
            body: Vec::new(),
        }
    }

    /// Builder-style header insertion, mostly for tests and adapters.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((Arc::from(name), value.to_string()));
        self
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name
    ///
    /// Returns the first occurrence, so parameters that arrived on the query
    /// string shadow wildcard bindings merged in later by the mux.
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value bound to `name`, in arrival order.
    pub fn get_query_params<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.query_params
            .iter()
            .filter(move |(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Append `params` after the existing query parameters. Nothing already
    /// present is removed or replaced.
    pub fn merge_params(&mut self, params: ParamVec) {
        self.query_params.extend(params);
    }

    /// Convert query_params to HashMap for compatibility
    /// Note: This allocates - use get_query_param() in hot paths
    #[must_use]
    pub fn query_params_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::with_capacity(self.query_params.len());
        for (k, v) in &self.query_params {
            map.entry(k.to_string()).or_insert_with(|| v.clone());
        }
        map
    }
}

/// Parse a raw query string (without the leading `?`)
///
/// URL-decodes parameter names and values and preserves their order,
/// including repeated keys.
#[must_use]
pub fn parse_query_params(query: &str) -> ParamVec {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_params() {
        let q = parse_query_params("x=1&y=hello%20world&x=2");
        assert_eq!(q.len(), 3);
        assert_eq!(q[0].1, "1");
        assert_eq!(q[1].1, "hello world");
        assert_eq!(q[2].1, "2");
    }

    #[test]
    fn test_new_splits_query() {
        let req = HandlerRequest::new(Method::GET, "/users/42?expand=posts");
        assert_eq!(req.path, "/users/42");
        assert_eq!(req.get_query_param("expand"), Some("posts"));
    }

    #[test]
    fn test_new_without_query() {
        let req = HandlerRequest::new(Method::POST, "/users");
        assert_eq!(req.path, "/users");
        assert!(req.query_params.is_empty());
    }

    #[test]
    fn test_merge_is_additive() {
        let mut req = HandlerRequest::new(Method::GET, "/users/42?id=query");
        let mut extra = ParamVec::new();
        extra.push((Arc::from("id"), "42".to_string()));
        req.merge_params(extra);

        assert_eq!(req.get_query_param("id"), Some("query"));
        let all: Vec<&str> = req.get_query_params("id").collect();
        assert_eq!(all, vec!["query", "42"]);
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let req = HandlerRequest::new(Method::GET, "/").with_header("Accept", "text/plain");
        assert_eq!(req.get_header("accept"), Some("text/plain"));
        assert_eq!(req.get_header("origin"), None);
    }
}
