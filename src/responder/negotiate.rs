use http::header::ACCEPT;

use crate::server::HandlerRequest;

/// Content-negotiation predicate: `true` selects a JSON body, `false` plain
/// text.
pub type Negotiator = fn(&HandlerRequest) -> bool;

/// Default negotiation: JSON unless the client sent an `Accept` header that
/// names neither `application/json` nor `*/*`.
#[must_use]
pub fn accept_json(req: &HandlerRequest) -> bool {
    match req.get_header(ACCEPT.as_str()) {
        None => true,
        Some(accept) => {
            let accept = accept.trim();
            accept.is_empty() || accept.contains("*/*") || accept.contains("application/json")
        }
    }
}
