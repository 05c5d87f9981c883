use std::fmt;

/// Registration error
///
/// Returned by [`TrieServeMux::handle`](crate::TrieServeMux::handle) and
/// friends when a pattern cannot be placed in the trie. Conflicting or
/// repeated registrations are not errors; they overwrite silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The pattern does not start with `/`
    InvalidPattern {
        /// The rejected pattern
        pattern: String,
    },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::InvalidPattern { pattern } => {
                write!(
                    f,
                    "invalid route pattern '{}': patterns must begin with '/'",
                    pattern
                )
            }
        }
    }
}

impl std::error::Error for RouteError {}
