mod builder;
mod error;

pub use builder::CorsHandlerBuilder;
pub use error::CorsConfigError;

use std::sync::Arc;

use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_EXPOSE_HEADERS, HOST, ORIGIN, VARY,
};
use regex::Regex;
use tracing::{debug, warn};

use crate::handler::{CorsPolicy, Handler};
use crate::server::{HandlerRequest, HandlerResponse};

/// Origin validation strategy
#[derive(Clone)]
pub enum OriginValidation {
    /// Exact string matching
    Exact(Vec<String>),
    /// Wildcard (allow all origins)
    Wildcard,
    /// Regex pattern matching
    Regex(Vec<Regex>),
    /// Custom validation function
    Custom(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl std::fmt::Debug for OriginValidation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OriginValidation::Exact(origins) => f.debug_tuple("Exact").field(origins).finish(),
            OriginValidation::Wildcard => write!(f, "Wildcard"),
            OriginValidation::Regex(patterns) => f
                .debug_tuple("Regex")
                .field(&patterns.iter().map(|re| re.as_str()).collect::<Vec<_>>())
                .finish(),
            OriginValidation::Custom(_) => write!(f, "Custom(<function>)"),
        }
    }
}

impl OriginValidation {
    /// Check if an origin is allowed
    pub fn is_allowed(&self, origin: &str) -> bool {
        match self {
            OriginValidation::Exact(origins) => origins.iter().any(|o| o == origin),
            OriginValidation::Wildcard => true,
            OriginValidation::Regex(patterns) => patterns.iter().any(|re| re.is_match(origin)),
            OriginValidation::Custom(validator) => validator(origin),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, OriginValidation::Wildcard)
    }
}

/// A CORS-capable handler.
///
/// Wraps an inner handler. On actual (non-preflight) cross-origin requests it
/// checks `Origin` against the configured rules: an allowed origin gets
/// `Access-Control-Allow-Origin`, `Vary: Origin` and the optional credentials
/// and expose headers added after the inner handler ran; a disallowed origin
/// is answered `403` without reaching the inner handler. Same-origin requests
/// and requests without `Origin` pass straight through.
///
/// Preflight `OPTIONS` requests are answered by the mux itself, which asks
/// the handler registered for the preflighted method for its
/// [`CorsPolicy`]; this type is that policy.
///
/// Build one with [`CorsHandlerBuilder`].
pub struct CorsHandler {
    pub(crate) inner: Arc<dyn Handler>,
    pub(crate) origin_validation: OriginValidation,
    pub(crate) allowed_headers: Vec<String>,
    pub(crate) allow_credentials: bool,
    pub(crate) expose_headers: Vec<String>,
}

impl std::fmt::Debug for CorsHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorsHandler")
            .field("origin_validation", &self.origin_validation)
            .field("allowed_headers", &self.allowed_headers)
            .field("allow_credentials", &self.allow_credentials)
            .field("expose_headers", &self.expose_headers)
            .finish_non_exhaustive()
    }
}

impl CorsHandler {
    /// Wrap `inner` allowing every origin, without credentials.
    ///
    /// Intended for development; production configurations should go
    /// through [`CorsHandlerBuilder`] with explicit origins.
    pub fn permissive<H: Handler + 'static>(inner: H) -> Self {
        Self {
            inner: Arc::new(inner),
            origin_validation: OriginValidation::Wildcard,
            allowed_headers: vec!["Content-Type".into(), "Authorization".into()],
            allow_credentials: false,
            expose_headers: vec![],
        }
    }

    pub fn origin_validation(&self) -> &OriginValidation {
        &self.origin_validation
    }

    /// Validate an origin against the configured rules
    ///
    /// Returns the value for `Access-Control-Allow-Origin`: `*` under the
    /// wildcard rule, otherwise the origin itself. `None` when not allowed.
    fn validate_origin(&self, origin: &str) -> Option<String> {
        if !self.origin_validation.is_allowed(origin) {
            return None;
        }
        if self.origin_validation.is_wildcard() {
            Some("*".to_string())
        } else {
            Some(origin.to_string())
        }
    }

    /// Same-origin requests carry an `Origin` whose host (with or without
    /// port) equals the `Host` header.
    fn is_same_origin(req: &HandlerRequest, origin: &str) -> bool {
        let Some(host) = req.get_header(HOST.as_str()) else {
            return false;
        };
        let Some((_, origin_host_port)) = origin.split_once("://") else {
            return false;
        };
        let origin_host = origin_host_port
            .split(':')
            .next()
            .unwrap_or(origin_host_port);
        host.eq_ignore_ascii_case(origin_host) || host.eq_ignore_ascii_case(origin_host_port)
    }
}

impl Handler for CorsHandler {
    fn serve(&self, req: &HandlerRequest, res: &mut HandlerResponse) {
        let Some(origin) = req.get_header(ORIGIN.as_str()) else {
            self.inner.serve(req, res);
            return;
        };

        if Self::is_same_origin(req, origin) {
            debug!("CORS: same-origin request, skipping CORS headers");
            self.inner.serve(req, res);
            return;
        }

        let Some(allowed) = self.validate_origin(origin) else {
            warn!(origin = %origin, path = %req.path, "CORS: origin not allowed");
            res.write_text(403, "");
            return;
        };

        self.inner.serve(req, res);

        res.set_header(ACCESS_CONTROL_ALLOW_ORIGIN.as_str(), allowed);
        if self.allow_credentials {
            res.set_header(ACCESS_CONTROL_ALLOW_CREDENTIALS.as_str(), "true".to_string());
        }
        if !self.expose_headers.is_empty() {
            res.set_header(
                ACCESS_CONTROL_EXPOSE_HEADERS.as_str(),
                self.expose_headers.join(", "),
            );
        }
        res.set_header(VARY.as_str(), "Origin".to_string());
    }

    fn cors_policy(&self) -> Option<&dyn CorsPolicy> {
        Some(self)
    }
}

impl CorsPolicy for CorsHandler {
    fn allowed_origin(&self, request_origin: &str) -> Option<String> {
        self.validate_origin(request_origin)
    }

    fn allowed_headers(&self) -> String {
        self.allowed_headers.join(", ")
    }
}
