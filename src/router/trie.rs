//! Segment trie with method-sensitive leaves.
//!
//! Each node owns its literal children and at most one wildcard edge. A path
//! is split on `/` with the leading empty element dropped, so `/` is a single
//! empty segment and `/users/` ends in an empty segment distinct from
//! `/users`.
//!
//! Matching priority at every depth is: literal child, then wildcard child,
//! then the node's namespace handler. A literal match is final; lookup never
//! backtracks into the wildcard edge when the literal subtree fails.

use http::Method;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use crate::handler::Handler;
use crate::server::ParamVec;

/// Split a path or pattern into trie segments.
pub(crate) fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').skip(1).collect()
}

/// `{name}` segments are wildcards.
pub(crate) fn is_wildcard(segment: &str) -> bool {
    segment.len() >= 2 && segment.starts_with('{') && segment.ends_with('}')
}

/// Where a registration lands on the terminal node.
#[derive(Debug, Clone)]
pub(crate) enum Slot {
    Method(Method),
    Namespace,
}

/// The single wildcard edge out of a node.
struct WildcardEdge {
    /// Token as written, e.g. `{id}`
    token: Arc<str>,
    /// Token with its braces stripped, e.g. `id`
    name: Arc<str>,
    child: Box<TrieNode>,
}

impl WildcardEdge {
    fn new(token: &str) -> Self {
        let mut edge = Self {
            token: Arc::from(""),
            name: Arc::from(""),
            child: Box::default(),
        };
        edge.rekey(token);
        edge
    }

    fn rekey(&mut self, token: &str) {
        self.token = Arc::from(token);
        self.name = Arc::from(token.trim_start_matches('{').trim_end_matches('}'));
    }
}

/// One path-segment position in the trie.
#[derive(Default)]
pub struct TrieNode {
    children: HashMap<String, TrieNode>,
    wildcard: Option<WildcardEdge>,
    methods: HashMap<Method, Arc<dyn Handler>>,
    namespace: Option<Arc<dyn Handler>>,
    pattern: Option<String>,
}

/// What a lookup resolved to.
pub enum Outcome<'a> {
    /// A handler is registered for the request method on the matched node
    Matched {
        handler: &'a Arc<dyn Handler>,
        pattern: &'a str,
    },
    /// A namespace handler caught the request; `path` is the unconsumed
    /// suffix the handler should see
    Namespace {
        handler: &'a Arc<dyn Handler>,
        pattern: &'a str,
        path: String,
    },
    /// The path matched a node but the method did not
    MethodNotAllowed { node: &'a TrieNode },
    /// Nothing matched
    NotFound,
}

impl fmt::Debug for Outcome<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Matched { pattern, .. } => {
                f.debug_struct("Matched").field("pattern", pattern).finish()
            }
            Outcome::Namespace { pattern, path, .. } => f
                .debug_struct("Namespace")
                .field("pattern", pattern)
                .field("path", path)
                .finish(),
            Outcome::MethodNotAllowed { node } => f
                .debug_struct("MethodNotAllowed")
                .field("allow", &node.allowed_methods())
                .finish(),
            Outcome::NotFound => f.write_str("NotFound"),
        }
    }
}

impl TrieNode {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Descend along `segments`, creating nodes as needed, and store
    /// `handler` in `slot` on the terminal node.
    pub(crate) fn insert(
        &mut self,
        segments: &[&str],
        slot: Slot,
        handler: Arc<dyn Handler>,
        pattern: &str,
    ) {
        let Some((segment, rest)) = segments.split_first() else {
            match slot {
                Slot::Method(method) => {
                    self.methods.insert(method, handler);
                }
                Slot::Namespace => self.namespace = Some(handler),
            }
            self.pattern = Some(pattern.to_string());
            return;
        };

        if is_wildcard(segment) {
            let edge = self
                .wildcard
                .get_or_insert_with(|| WildcardEdge::new(segment));
            if edge.token.as_ref() != *segment {
                warn!(
                    previous = %edge.token,
                    replacement = %segment,
                    pattern = %pattern,
                    "Wildcard re-keyed at existing trie position"
                );
                edge.rekey(segment);
            }
            edge.child.insert(rest, slot, handler, pattern);
            return;
        }

        self.children
            .entry((*segment).to_string())
            .or_default()
            .insert(rest, slot, handler, pattern);
    }

    /// Resolve `segments` below this node.
    ///
    /// Wildcard bindings are appended to `params` as the recursion unwinds,
    /// deepest first, each under both its raw token and its bare name.
    pub(crate) fn find<'a>(
        &'a self,
        method: &Method,
        segments: &[&str],
        params: &mut ParamVec,
    ) -> Outcome<'a> {
        let Some((segment, rest)) = segments.split_first() else {
            if let Some(handler) = self.methods.get(method) {
                return Outcome::Matched {
                    handler,
                    pattern: self.registered_pattern(),
                };
            }
            if self.methods.is_empty() {
                if let Some(handler) = &self.namespace {
                    return Outcome::Namespace {
                        handler,
                        pattern: self.registered_pattern(),
                        path: "/".to_string(),
                    };
                }
            }
            // The path matched; only the method did not. Interior nodes
            // with no methods still answer here, advertising `OPTIONS`.
            return Outcome::MethodNotAllowed { node: self };
        };

        if let Some(child) = self.children.get(*segment) {
            return child.find(method, rest, params);
        }

        if let Some(edge) = &self.wildcard {
            let outcome = edge.child.find(method, rest, params);
            bind(params, &edge.token, segment);
            bind(params, &edge.name, segment);
            return outcome;
        }

        if let Some(handler) = &self.namespace {
            return Outcome::Namespace {
                handler,
                pattern: self.registered_pattern(),
                path: format!("/{}", segments.join("/")),
            };
        }

        Outcome::NotFound
    }

    /// Pattern that last terminated at this node, or `""`.
    #[must_use]
    pub fn registered_pattern(&self) -> &str {
        self.pattern.as_deref().unwrap_or("")
    }

    /// Handler registered for `method` on this node.
    #[must_use]
    pub fn handler_for(&self, method: &Method) -> Option<&Arc<dyn Handler>> {
        self.methods.get(method)
    }

    /// Sorted `Allow` list: registered methods, `HEAD` when `GET` is
    /// registered, and always `OPTIONS`.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<&str> {
        let mut allowed: Vec<&str> = Vec::with_capacity(self.methods.len() + 2);
        allowed.push("OPTIONS");
        if self.methods.contains_key(&Method::GET) {
            allowed.push("HEAD");
        }
        allowed.extend(self.methods.keys().map(Method::as_str));
        allowed.sort_unstable();
        allowed.dedup();
        allowed
    }

    /// Collect every registration below this node as
    /// `(method, pattern)`; namespace registrations report `None`.
    pub(crate) fn collect_routes(&self, out: &mut Vec<(Option<Method>, String)>) {
        let pattern = self.registered_pattern();
        for method in self.methods.keys() {
            out.push((Some(method.clone()), pattern.to_string()));
        }
        if self.namespace.is_some() {
            out.push((None, pattern.to_string()));
        }
        for child in self.children.values() {
            child.collect_routes(out);
        }
        if let Some(edge) = &self.wildcard {
            edge.child.collect_routes(out);
        }
    }
}

impl fmt::Debug for TrieNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&str> = self.methods.keys().map(Method::as_str).collect();
        methods.sort_unstable();
        let mut children: Vec<&String> = self.children.keys().collect();
        children.sort_unstable();
        f.debug_struct("TrieNode")
            .field("pattern", &self.pattern)
            .field("methods", &methods)
            .field("namespace", &self.namespace.is_some())
            .field("children", &children)
            .field("wildcard", &self.wildcard.as_ref().map(|e| &e.token))
            .finish()
    }
}

/// Record `key = value`, replacing an earlier binding of the same key so
/// the shallower wildcard wins when a name repeats along one path.
fn bind(params: &mut ParamVec, key: &Arc<str>, value: &str) {
    params.retain(|(k, _)| &**k != &**key);
    params.push((Arc::clone(key), value.to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::HandlerFn;
    use crate::server::{HandlerRequest, HandlerResponse};

    fn named(body: &'static str) -> Arc<dyn Handler> {
        Arc::new(HandlerFn::new(
            move |_req: &HandlerRequest, res: &mut HandlerResponse| res.write_text(200, body),
        ))
    }

    fn add(root: &mut TrieNode, method: Method, pattern: &str, body: &'static str) {
        root.insert(
            &split_segments(pattern),
            Slot::Method(method),
            named(body),
            pattern,
        );
    }

    fn body_of(outcome: &Outcome<'_>) -> Option<String> {
        let handler = match outcome {
            Outcome::Matched { handler, .. } | Outcome::Namespace { handler, .. } => handler,
            _ => return None,
        };
        let mut res = HandlerResponse::new();
        handler.serve(&HandlerRequest::new(Method::GET, "/"), &mut res);
        Some(res.body_text())
    }

    fn find<'a>(root: &'a TrieNode, method: Method, path: &str) -> (Outcome<'a>, ParamVec) {
        let mut params = ParamVec::new();
        let outcome = root.find(&method, &split_segments(path), &mut params);
        (outcome, params)
    }

    #[test]
    fn test_split_segments() {
        assert_eq!(split_segments("/"), vec![""]);
        assert_eq!(split_segments("/a/b"), vec!["a", "b"]);
        assert_eq!(split_segments("/a/"), vec!["a", ""]);
        assert!(split_segments("").is_empty());
    }

    #[test]
    fn test_is_wildcard() {
        assert!(is_wildcard("{id}"));
        assert!(is_wildcard("{}"));
        assert!(!is_wildcard("{"));
        assert!(!is_wildcard("id"));
        assert!(!is_wildcard("{id"));
    }

    #[test]
    fn test_literal_match() {
        let mut root = TrieNode::new();
        add(&mut root, Method::GET, "/health", "health");
        let (outcome, params) = find(&root, Method::GET, "/health");
        assert!(matches!(outcome, Outcome::Matched { pattern: "/health", .. }));
        assert_eq!(body_of(&outcome).as_deref(), Some("health"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_root_pattern() {
        let mut root = TrieNode::new();
        add(&mut root, Method::GET, "/", "root");
        let (outcome, _) = find(&root, Method::GET, "/");
        assert_eq!(body_of(&outcome).as_deref(), Some("root"));
    }

    #[test]
    fn test_wildcard_binds_both_forms() {
        let mut root = TrieNode::new();
        add(&mut root, Method::GET, "/users/{id}", "user");
        let (outcome, params) = find(&root, Method::GET, "/users/42");
        assert!(matches!(outcome, Outcome::Matched { pattern: "/users/{id}", .. }));
        assert_eq!(params.len(), 2);
        assert!(params.iter().any(|(k, v)| k.as_ref() == "{id}" && v == "42"));
        assert!(params.iter().any(|(k, v)| k.as_ref() == "id" && v == "42"));
    }

    #[test]
    fn test_bindings_unwind_deepest_first() {
        let mut root = TrieNode::new();
        add(&mut root, Method::GET, "/users/{user}/posts/{post}", "post");
        let (_, params) = find(&root, Method::GET, "/users/7/posts/9");
        let keys: Vec<&str> = params.iter().map(|(k, _)| k.as_ref()).collect();
        assert_eq!(keys, vec!["{post}", "post", "{user}", "user"]);
    }

    #[test]
    fn test_repeated_wildcard_name_shallowest_wins() {
        let mut root = TrieNode::new();
        add(&mut root, Method::GET, "/org/{id}/user/{id}", "nested");
        let (_, params) = find(&root, Method::GET, "/org/1/user/2");
        let ids: Vec<&str> = params
            .iter()
            .filter(|(k, _)| k.as_ref() == "id")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[test]
    fn test_literal_beats_wildcard() {
        let mut root = TrieNode::new();
        add(&mut root, Method::GET, "/users/{id}", "by-id");
        add(&mut root, Method::GET, "/users/me", "me");
        let (outcome, params) = find(&root, Method::GET, "/users/me");
        assert_eq!(body_of(&outcome).as_deref(), Some("me"));
        assert!(params.is_empty());

        let (outcome, _) = find(&root, Method::GET, "/users/you");
        assert_eq!(body_of(&outcome).as_deref(), Some("by-id"));
    }

    #[test]
    fn test_literal_does_not_backtrack() {
        let mut root = TrieNode::new();
        add(&mut root, Method::GET, "/users/me", "me");
        add(&mut root, Method::GET, "/users/{id}/posts", "posts");
        let (outcome, _) = find(&root, Method::GET, "/users/me/posts");
        assert!(matches!(outcome, Outcome::NotFound));
    }

    #[test]
    fn test_wildcard_rekey_keeps_subtree() {
        let mut root = TrieNode::new();
        add(&mut root, Method::GET, "/users/{id}/posts", "posts");
        add(&mut root, Method::GET, "/users/{uid}/comments", "comments");

        let (outcome, params) = find(&root, Method::GET, "/users/5/posts");
        assert_eq!(body_of(&outcome).as_deref(), Some("posts"));
        assert!(params.iter().any(|(k, v)| k.as_ref() == "uid" && v == "5"));
        assert!(!params.iter().any(|(k, _)| k.as_ref() == "id"));

        let (outcome, _) = find(&root, Method::GET, "/users/5/comments");
        assert_eq!(body_of(&outcome).as_deref(), Some("comments"));
    }

    #[test]
    fn test_method_not_allowed_on_leaf() {
        let mut root = TrieNode::new();
        add(&mut root, Method::GET, "/items", "list");
        add(&mut root, Method::POST, "/items", "create");
        let (outcome, _) = find(&root, Method::DELETE, "/items");
        match outcome {
            Outcome::MethodNotAllowed { node } => {
                assert_eq!(node.allowed_methods(), vec!["GET", "HEAD", "OPTIONS", "POST"]);
            }
            other => panic!("expected MethodNotAllowed, got {other:?}"),
        }
    }

    #[test]
    fn test_interior_node_is_method_not_allowed() {
        let mut root = TrieNode::new();
        add(&mut root, Method::GET, "/users/{id}", "user");
        for method in [Method::GET, Method::OPTIONS] {
            let (outcome, params) = find(&root, method, "/users");
            match outcome {
                Outcome::MethodNotAllowed { node } => {
                    assert_eq!(node.allowed_methods(), vec!["OPTIONS"]);
                }
                other => panic!("expected MethodNotAllowed, got {other:?}"),
            }
            assert!(params.is_empty());
        }
    }

    #[test]
    fn test_interior_namespace_served_before_method_not_allowed() {
        let mut root = TrieNode::new();
        root.insert(&["api"], Slot::Namespace, named("ns"), "/api");
        add(&mut root, Method::GET, "/api/{id}/status", "status");
        let (outcome, _) = find(&root, Method::GET, "/api");
        assert!(matches!(outcome, Outcome::Namespace { ref path, .. } if path == "/"));
    }

    #[test]
    fn test_namespace_rewrites_suffix() {
        let mut root = TrieNode::new();
        root.insert(&["admin"], Slot::Namespace, named("admin"), "/admin");
        let (outcome, _) = find(&root, Method::GET, "/admin/reports/2023");
        match outcome {
            Outcome::Namespace { pattern, path, .. } => {
                assert_eq!(pattern, "/admin");
                assert_eq!(path, "/reports/2023");
            }
            other => panic!("expected Namespace, got {other:?}"),
        }

        let (outcome, _) = find(&root, Method::GET, "/admin");
        assert!(matches!(outcome, Outcome::Namespace { ref path, .. } if path == "/"));
    }

    #[test]
    fn test_deeper_match_beats_namespace() {
        let mut root = TrieNode::new();
        root.insert(&["api"], Slot::Namespace, named("ns"), "/api");
        add(&mut root, Method::GET, "/api/status", "status");
        let (outcome, _) = find(&root, Method::GET, "/api/status");
        assert_eq!(body_of(&outcome).as_deref(), Some("status"));
        let (outcome, _) = find(&root, Method::GET, "/api/other");
        assert_eq!(body_of(&outcome).as_deref(), Some("ns"));
    }

    #[test]
    fn test_allowed_methods_without_get() {
        let mut root = TrieNode::new();
        add(&mut root, Method::PUT, "/x", "put");
        add(&mut root, Method::OPTIONS, "/x", "options");
        assert_eq!(root.children["x"].allowed_methods(), vec!["OPTIONS", "PUT"]);
    }

    #[test]
    fn test_collect_routes() {
        let mut root = TrieNode::new();
        add(&mut root, Method::GET, "/a/{id}", "a");
        root.insert(&["b"], Slot::Namespace, named("b"), "/b");
        let mut routes = Vec::new();
        root.collect_routes(&mut routes);
        routes.sort_by(|a, b| a.1.cmp(&b.1));
        assert_eq!(
            routes,
            vec![
                (Some(Method::GET), "/a/{id}".to_string()),
                (None, "/b".to_string()),
            ]
        );
    }
}
