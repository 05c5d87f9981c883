use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, ALLOW, ORIGIN,
};
use http::Method;
use serde_json::json;
use tracing::debug;

use super::Negotiator;
use crate::handler::{CorsPolicy, Handler};
use crate::router::TrieNode;
use crate::runtime_config::{ErrorKind, MuxConfig};
use crate::server::{HandlerRequest, HandlerResponse};

/// Origin sent back when no CORS policy allows the requesting origin.
const NULL_ORIGIN: &str = "null";

/// Responder bound to a trie node whose path matched but whose registered
/// methods do not include the request method.
///
/// `OPTIONS` requests are answered `200` with `Allow` (and the CORS
/// preflight headers when asked for); anything else gets
/// `405 Method Not Allowed`.
pub struct MethodNotAllowed<'a> {
    node: &'a TrieNode,
    config: &'a MuxConfig,
    accept_json: Negotiator,
}

impl<'a> MethodNotAllowed<'a> {
    #[must_use]
    pub fn new(node: &'a TrieNode, config: &'a MuxConfig, accept_json: Negotiator) -> Self {
        Self {
            node,
            config,
            accept_json,
        }
    }

    /// The node this responder reports on.
    #[must_use]
    pub fn node(&self) -> &'a TrieNode {
        self.node
    }

    /// CORS policy of the handler registered for the preflighted method.
    fn policy_for(&self, requested: &str) -> Option<&'a dyn CorsPolicy> {
        let method = requested.trim().parse::<Method>().ok()?;
        self.node.handler_for(&method)?.cors_policy()
    }

    fn preflight(&self, req: &HandlerRequest, res: &mut HandlerResponse, allow: &str) {
        let Some(requested) = header(req, ACCESS_CONTROL_REQUEST_METHOD.as_str()) else {
            return;
        };
        res.set_header(ACCESS_CONTROL_ALLOW_METHODS.as_str(), allow.to_string());
        let policy = self.policy_for(requested);

        if let Some(origin) = header(req, ORIGIN.as_str()) {
            let allowed = policy
                .and_then(|p| p.allowed_origin(origin))
                .filter(|o| !o.is_empty())
                .unwrap_or_else(|| NULL_ORIGIN.to_string());
            debug!(
                requested_method = %requested,
                origin = %origin,
                allowed_origin = %allowed,
                "CORS preflight origin resolved"
            );
            res.set_header(ACCESS_CONTROL_ALLOW_ORIGIN.as_str(), allowed);
        }

        if header(req, ACCESS_CONTROL_REQUEST_HEADERS.as_str()).is_some() {
            let allowed = policy.map(|p| p.allowed_headers()).unwrap_or_default();
            res.set_header(ACCESS_CONTROL_ALLOW_HEADERS.as_str(), allowed);
        }
    }
}

impl Handler for MethodNotAllowed<'_> {
    fn serve(&self, req: &HandlerRequest, res: &mut HandlerResponse) {
        let methods = self.node.allowed_methods();
        let allow = methods.join(", ");
        res.set_header(ALLOW.as_str(), allow.clone());
        let as_json = (self.accept_json)(req);

        if req.method == Method::OPTIONS {
            self.preflight(req, res, &allow);
            debug!(
                path = %req.path,
                allow = %allow,
                "Answering OPTIONS from registered methods"
            );
            if as_json {
                res.write_json(200, &json!({ "allow": methods }));
            } else {
                res.write_text(200, &allow);
            }
            return;
        }

        let description = format!("only {} are allowed", allow);
        debug!(
            method = %req.method,
            path = %req.path,
            allow = %allow,
            "Method not allowed"
        );
        if as_json {
            res.write_json(
                405,
                &json!({
                    "description": description,
                    "error": self.config.error_code(ErrorKind::MethodNotAllowed),
                }),
            );
        } else {
            res.write_text(405, &description);
        }
    }
}

/// Non-empty header value.
fn header<'r>(req: &'r HandlerRequest, name: &str) -> Option<&'r str> {
    req.get_header(name).filter(|v| !v.is_empty())
}
