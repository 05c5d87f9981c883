//! # Router Module
//!
//! Method-aware request multiplexing over a trie of path segments.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Building the trie from registered `(method, pattern, handler)` triples
//! - Matching incoming requests to handlers, literal segments before wildcards
//! - Extracting wildcard segments as raw strings
//! - Falling back to namespace handlers with the namespace prefix stripped
//! - Handing unmatched methods to the 405/OPTIONS responder
//!
//! ## Architecture
//!
//! 1. **Registration**: patterns are split on `/` and inserted into the trie
//!    once, at startup. Each terminal node keeps a handler per method, an
//!    optional namespace handler, and the pattern that produced it.
//!
//! 2. **Lookup**: each request walks the trie one segment per level. The walk
//!    returns the outcome plus the wildcard bindings; [`TrieServeMux::resolve`]
//!    merges those into the request's query parameters.
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use triemux::router::TrieServeMux;
//! use triemux::{HandlerRequest, HandlerResponse};
//!
//! let mut mux = TrieServeMux::new();
//! mux.handle_fn(Method::GET, "/users/me", |_: &HandlerRequest, res: &mut HandlerResponse| {
//!     res.write_text(200, "me");
//! })
//! .unwrap();
//! mux.handle_fn(Method::GET, "/users/{id}", |_: &HandlerRequest, res: &mut HandlerResponse| {
//!     res.write_text(200, "someone");
//! })
//! .unwrap();
//!
//! let lookup = mux.lookup(&Method::GET, "/users/42");
//! assert_eq!(lookup.params.len(), 2);
//! ```
//!
//! ## Performance
//!
//! Lookup is O(k) in the number of path segments. Parameter storage stays
//! inline for routes with up to four wildcards.

mod core;
mod shared;
mod trie;

pub use self::core::{Lookup, Route, RouteEntry, TrieServeMux};
pub use shared::SharedMux;
pub use trie::{Outcome, TrieNode};
