//! Handler wrappers layered around registered handlers.

pub mod cors;

pub use cors::{CorsConfigError, CorsHandler, CorsHandlerBuilder, OriginValidation};
