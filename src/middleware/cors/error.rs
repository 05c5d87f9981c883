use std::fmt;

/// Rejected CORS policy
///
/// Returned by [`CorsHandlerBuilder::build`](super::CorsHandlerBuilder::build)
/// before any handler is wrapped, so a bad policy never reaches the mux.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsConfigError {
    /// `*` was listed while `allow_credentials` is set
    WildcardWithCredentials,
    /// An exact origin that is not `scheme://host[:port]`
    InvalidOriginFormat {
        /// The origin as given to the builder
        origin: String,
    },
    /// `allow_credentials` is set but no origin can ever match
    EmptyOriginsWithCredentials,
    /// A regex origin pattern did not compile
    InvalidOriginPattern {
        /// The pattern as given to the builder
        pattern: String,
        /// Compiler message from `regex`
        reason: String,
    },
}

impl fmt::Display for CorsConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorsConfigError::WildcardWithCredentials => {
                write!(f, "cors: wildcard origin '*' cannot be combined with credentials")
            }
            CorsConfigError::InvalidOriginFormat { origin } => {
                write!(
                    f,
                    "cors: origin '{}' is not of the form scheme://host[:port]",
                    origin
                )
            }
            CorsConfigError::EmptyOriginsWithCredentials => {
                write!(f, "cors: credentials require at least one allowed origin")
            }
            CorsConfigError::InvalidOriginPattern { pattern, reason } => {
                write!(f, "cors: origin pattern '{}' does not compile: {}", pattern, reason)
            }
        }
    }
}

impl std::error::Error for CorsConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_value() {
        let err = CorsConfigError::InvalidOriginFormat {
            origin: "example.com".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cors: origin 'example.com' is not of the form scheme://host[:port]"
        );

        let err = CorsConfigError::InvalidOriginPattern {
            pattern: "(".to_string(),
            reason: "unclosed group".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cors: origin pattern '(' does not compile: unclosed group"
        );
        assert!(CorsConfigError::WildcardWithCredentials
            .to_string()
            .starts_with("cors: wildcard"));
    }
}
