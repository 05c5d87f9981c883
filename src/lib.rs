//! # triemux
//!
//! **triemux** is a method-aware HTTP request multiplexer built on a trie of
//! URL path segments.
//!
//! ## Overview
//!
//! Handlers are registered against an HTTP method and a `/`-separated
//! pattern. A segment written `{name}` is a wildcard: it matches any single
//! segment and its value becomes a request parameter, readable under both
//! `{name}` and `name`. Lookup walks the trie one segment at a time, so the
//! cost depends on path depth, not on how many routes are registered.
//!
//! When a path matches but the method does not, the mux answers on its own:
//!
//! - `OPTIONS` gets `200` with an `Allow` list (plus the CORS preflight
//!   headers the browser asked for, resolved from the CORS policy of the
//!   handler registered for the preflighted method)
//! - anything else gets `405 Method Not Allowed` with the same `Allow` list
//!
//! A path that is only a prefix of longer routes counts as a match with no
//! methods, so its `Allow` list is just `OPTIONS`.
//!
//! Both, and the built-in `404`, negotiate between a JSON and a plain-text
//! body from the `Accept` header.
//!
//! ## Architecture
//!
//! - **[`router`]** - the segment trie, [`TrieServeMux`] and [`SharedMux`]
//! - **[`responder`]** - `405`/`OPTIONS` and `404` responders, content negotiation
//! - **[`handler`]** - the [`Handler`] trait and the [`CorsPolicy`] capability
//! - **[`middleware`]** - the CORS-capable handler wrapper
//! - **[`server`]** - request and response value types
//! - **[`runtime_config`]** - error-code style, from env or YAML
//! - **[`logging`]** - `tracing-subscriber` setup
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use triemux::{HandlerRequest, HandlerResponse, TrieServeMux};
//!
//! let mut mux = TrieServeMux::new();
//! mux.handle_fn(Method::GET, "/zoo/animals/{id}", |req: &HandlerRequest, res: &mut HandlerResponse| {
//!     res.write_text(200, req.get_query_param("id").unwrap_or_default());
//! })
//! .unwrap();
//!
//! let mut req = HandlerRequest::new(Method::DELETE, "/zoo/animals/7");
//! let mut res = HandlerResponse::new();
//! mux.serve(&mut req, &mut res);
//! assert_eq!(res.status, 405);
//! assert_eq!(res.get_header("Allow"), Some("GET, HEAD, OPTIONS"));
//! ```
//!
//! ## Lifecycle
//!
//! Registration takes `&mut self` and is meant to finish before serving
//! starts. A finished mux is `Send + Sync`; to replace the routing table of
//! a running service, build a new mux and publish it through [`SharedMux`].
//! The HTTP transport itself is out of scope: adapt your server's request
//! into a [`HandlerRequest`] and write the [`HandlerResponse`] back.

pub mod error;
pub mod handler;
pub mod logging;
pub mod middleware;
pub mod responder;
pub mod router;
pub mod runtime_config;
pub mod server;

pub use error::RouteError;
pub use handler::{CorsPolicy, Handler, HandlerFn};
pub use middleware::{CorsConfigError, CorsHandler, CorsHandlerBuilder};
pub use router::{Route, RouteEntry, SharedMux, TrieServeMux};
pub use runtime_config::{ErrorCodeStyle, MuxConfig};
pub use server::{HandlerRequest, HandlerResponse};
