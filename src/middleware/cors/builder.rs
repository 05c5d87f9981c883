use std::sync::Arc;

use regex::Regex;
use tracing::info;
use url::Url;

use super::{CorsConfigError, CorsHandler, OriginValidation};
use crate::handler::Handler;

/// Builder for [`CorsHandler`] with a fluent API
///
/// Origins are configured one of three ways; the last call wins:
/// exact origins (`allowed_origins`, where `"*"` allows any origin),
/// regular expressions (`allowed_origin_patterns`), or a predicate
/// (`origin_validator`).
///
/// # Example
///
/// ```rust
/// use triemux::middleware::cors::CorsHandlerBuilder;
/// use triemux::{HandlerFn, HandlerRequest, HandlerResponse};
///
/// let cors = CorsHandlerBuilder::new()
///     .allowed_origins(&["https://example.com", "https://api.example.com"])
///     .allowed_headers(&["Content-Type", "Authorization", "X-Custom-Header"])
///     .allow_credentials(true)
///     .expose_headers(&["X-Total-Count"])
///     .build(HandlerFn::new(|_req: &HandlerRequest, res: &mut HandlerResponse| {
///         res.write_text(200, "ok");
///     }))
///     .unwrap();
/// # let _ = cors;
/// ```
pub struct CorsHandlerBuilder {
    origins: OriginSource,
    allowed_headers: Vec<String>,
    allow_credentials: bool,
    expose_headers: Vec<String>,
}

enum OriginSource {
    Exact(Vec<String>),
    Patterns(Vec<String>),
    Custom(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl CorsHandlerBuilder {
    /// Create a new builder with secure defaults
    ///
    /// Default configuration:
    /// - No origins allowed (empty list)
    /// - Headers: `["Content-Type", "Authorization"]`
    /// - Credentials: `false`
    /// - Exposed headers: empty
    pub fn new() -> Self {
        Self {
            origins: OriginSource::Exact(vec![]),
            allowed_headers: vec!["Content-Type".into(), "Authorization".into()],
            allow_credentials: false,
            expose_headers: vec![],
        }
    }

    /// Allow exactly these origins. `&["*"]` allows every origin and cannot
    /// be combined with credentials.
    pub fn allowed_origins(mut self, origins: &[&str]) -> Self {
        self.origins = OriginSource::Exact(origins.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Allow origins matching any of these regular expressions
    /// (e.g. `r"^https://.*\.example\.com$"`).
    pub fn allowed_origin_patterns(mut self, patterns: &[&str]) -> Self {
        self.origins = OriginSource::Patterns(patterns.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Allow origins for which `validator` returns `true`.
    pub fn origin_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.origins = OriginSource::Custom(Arc::new(validator));
        self
    }

    /// Headers reported in `Access-Control-Allow-Headers` on preflight.
    pub fn allowed_headers(mut self, headers: &[&str]) -> Self {
        self.allowed_headers = headers.iter().map(|s| s.to_string()).collect();
        self
    }

    /// When enabled, sets `Access-Control-Allow-Credentials: true`.
    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.allow_credentials = allow;
        self
    }

    /// Headers readable from JavaScript, sent as `Access-Control-Expose-Headers`.
    pub fn expose_headers(mut self, headers: &[&str]) -> Self {
        self.expose_headers = headers.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Validate the configuration and wrap `inner`.
    ///
    /// # Errors
    ///
    /// - [`CorsConfigError::WildcardWithCredentials`] for `"*"` with credentials
    /// - [`CorsConfigError::EmptyOriginsWithCredentials`] for credentials with no origins
    /// - [`CorsConfigError::InvalidOriginFormat`] for an exact origin that is not `scheme://host[:port]`
    /// - [`CorsConfigError::InvalidOriginPattern`] for a pattern that does not compile
    pub fn build<H: Handler + 'static>(self, inner: H) -> Result<CorsHandler, CorsConfigError> {
        self.build_shared(Arc::new(inner))
    }

    /// Like [`build`](Self::build) for an already shared handler.
    pub fn build_shared(self, inner: Arc<dyn Handler>) -> Result<CorsHandler, CorsConfigError> {
        let origin_validation = match self.origins {
            OriginSource::Exact(origins) => {
                if origins.iter().any(|o| o == "*") {
                    if self.allow_credentials {
                        return Err(CorsConfigError::WildcardWithCredentials);
                    }
                    OriginValidation::Wildcard
                } else {
                    if self.allow_credentials && origins.is_empty() {
                        return Err(CorsConfigError::EmptyOriginsWithCredentials);
                    }
                    for origin in &origins {
                        validate_origin_format(origin)?;
                    }
                    OriginValidation::Exact(origins)
                }
            }
            OriginSource::Patterns(patterns) => {
                let compiled = patterns
                    .iter()
                    .map(|p| {
                        Regex::new(p).map_err(|e| CorsConfigError::InvalidOriginPattern {
                            pattern: p.clone(),
                            reason: e.to_string(),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                OriginValidation::Regex(compiled)
            }
            OriginSource::Custom(validator) => OriginValidation::Custom(validator),
        };

        info!(
            origins = ?origin_validation,
            allow_credentials = self.allow_credentials,
            "CORS handler configured"
        );

        Ok(CorsHandler {
            inner,
            origin_validation,
            allowed_headers: self.allowed_headers,
            allow_credentials: self.allow_credentials,
            expose_headers: self.expose_headers,
        })
    }
}

impl Default for CorsHandlerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An origin is a bare `scheme://host[:port]`: no path, query, fragment or
/// credentials.
fn validate_origin_format(origin: &str) -> Result<(), CorsConfigError> {
    let invalid = || CorsConfigError::InvalidOriginFormat {
        origin: origin.to_string(),
    };
    let url = Url::parse(origin).map_err(|_| invalid())?;
    let bare = url.host_str().is_some()
        && url.username().is_empty()
        && url.password().is_none()
        && url.query().is_none()
        && url.fragment().is_none()
        && url.path() == "/"
        && !origin.ends_with('/');
    if bare {
        Ok(())
    } else {
        Err(invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_format() {
        assert!(validate_origin_format("https://example.com").is_ok());
        assert!(validate_origin_format("http://localhost:8080").is_ok());
        assert!(validate_origin_format("example.com").is_err());
        assert!(validate_origin_format("https://example.com/").is_err());
        assert!(validate_origin_format("https://example.com/app").is_err());
        assert!(validate_origin_format("https://user@example.com").is_err());
        assert!(validate_origin_format("https://example.com?x=1").is_err());
    }
}
