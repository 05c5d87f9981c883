use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use super::Negotiator;
use crate::handler::Handler;
use crate::runtime_config::{ErrorKind, MuxConfig};
use crate::server::{HandlerRequest, HandlerResponse};

/// Not-found outcome of a lookup.
///
/// Delegates to the not-found handler installed on the mux, or writes the
/// built-in `404` (`"<path> not found"`) when none is installed.
pub struct NotFound<'a> {
    fallback: Option<&'a Arc<dyn Handler>>,
    config: &'a MuxConfig,
    accept_json: Negotiator,
}

impl<'a> NotFound<'a> {
    #[must_use]
    pub fn new(
        fallback: Option<&'a Arc<dyn Handler>>,
        config: &'a MuxConfig,
        accept_json: Negotiator,
    ) -> Self {
        Self {
            fallback,
            config,
            accept_json,
        }
    }
}

impl Handler for NotFound<'_> {
    fn serve(&self, req: &HandlerRequest, res: &mut HandlerResponse) {
        if let Some(handler) = self.fallback {
            handler.serve(req, res);
            return;
        }

        debug!(method = %req.method, path = %req.path, "No route matched");
        let description = format!("{} not found", req.path);
        if (self.accept_json)(req) {
            res.write_json(
                404,
                &json!({
                    "description": description,
                    "error": self.config.error_code(ErrorKind::NotFound),
                }),
            );
        } else {
            res.write_text(404, &description);
        }
    }
}
