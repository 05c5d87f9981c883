//! Responses the mux writes on its own: `405 Method Not Allowed`, `OPTIONS`
//! (including CORS preflight negotiation) and the default `404 Not Found`.
//!
//! Every body comes in two shapes chosen per request by a [`Negotiator`]:
//! a JSON document or plain text.

mod method_not_allowed;
mod negotiate;
mod not_found;

pub use method_not_allowed::MethodNotAllowed;
pub use negotiate::{accept_json, Negotiator};
pub use not_found::NotFound;
