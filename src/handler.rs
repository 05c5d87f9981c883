//! Handler abstraction served by the mux.

use std::fmt;

use crate::server::{HandlerRequest, HandlerResponse};

/// A request handler registered on a [`TrieServeMux`](crate::TrieServeMux).
///
/// Handlers are shared across concurrently served requests, so they must be
/// `Send + Sync` and take `&self`.
pub trait Handler: Send + Sync {
    /// Write the response for `req` into `res`.
    fn serve(&self, req: &HandlerRequest, res: &mut HandlerResponse);

    /// CORS capability of this handler, if any.
    ///
    /// The unmatched-method responder asks the handler registered for the
    /// preflighted method for its allowed origin and headers through this.
    fn cors_policy(&self) -> Option<&dyn CorsPolicy> {
        None
    }
}

/// The two CORS queries the preflight responder needs from a handler.
pub trait CorsPolicy: Send + Sync {
    /// Origin to echo in `Access-Control-Allow-Origin` for a request coming
    /// from `request_origin`, or `None` when that origin is not allowed.
    fn allowed_origin(&self, request_origin: &str) -> Option<String>;

    /// Value for `Access-Control-Allow-Headers`.
    fn allowed_headers(&self) -> String;
}

/// Adapter turning a closure into a [`Handler`].
///
/// ```rust
/// use triemux::{Handler, HandlerFn, HandlerRequest, HandlerResponse};
///
/// let hello = HandlerFn::new(|_req: &HandlerRequest, res: &mut HandlerResponse| {
///     res.write_text(200, "hello");
/// });
/// let mut res = HandlerResponse::new();
/// hello.serve(&HandlerRequest::new(http::Method::GET, "/"), &mut res);
/// assert_eq!(res.body_text(), "hello");
/// ```
#[derive(Clone)]
pub struct HandlerFn<F>(F);

impl<F> HandlerFn<F>
where
    F: Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync,
{
    fn serve(&self, req: &HandlerRequest, res: &mut HandlerResponse) {
        (self.0)(req, res)
    }
}

impl<F> fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HandlerFn(<closure>)")
    }
}
