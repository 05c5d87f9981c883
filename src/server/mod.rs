//! Request and response value types exchanged between the mux and handlers.
//!
//! The transport that produces a [`HandlerRequest`] and consumes a
//! [`HandlerResponse`] lives outside this crate.

pub mod request;
pub mod response;

pub use request::{
    parse_query_params, HandlerRequest, HeaderVec, ParamVec, MAX_INLINE_HEADERS,
    MAX_INLINE_PARAMS,
};
pub use response::{status_reason, HandlerResponse};
