//! # Runtime Configuration Module
//!
//! Configuration for the responses the mux synthesizes itself (405, OPTIONS
//! and the default 404).
//!
//! ## Environment Variables
//!
//! ### `TRIEMUX_SNAKE_CASE_ERRORS`
//!
//! When set to `1`, `true` or `yes`, JSON error bodies carry snake_case error
//! codes (`method_not_allowed`, `not_found`). Otherwise the dotted namespace
//! style is used (`triemux.MethodNotAllowed`, `triemux.NotFound`).
//!
//! ### `TRIEMUX_ERROR_NAMESPACE`
//!
//! Namespace prefix for dotted error codes. Default: `triemux`.
//!
//! ## YAML
//!
//! ```yaml
//! error_style: snake_case   # or: namespaced
//! error_namespace: billing
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use triemux::runtime_config::{ErrorCodeStyle, MuxConfig};
//!
//! let config = MuxConfig::from_yaml_str("error_style: snake_case").unwrap();
//! assert_eq!(config.error_style, ErrorCodeStyle::SnakeCase);
//! ```

use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Default namespace for dotted error codes.
pub const DEFAULT_ERROR_NAMESPACE: &str = "triemux";

/// Which string form JSON error codes take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCodeStyle {
    /// `<namespace>.MethodNotAllowed`
    #[default]
    Namespaced,
    /// `method_not_allowed`
    SnakeCase,
}

/// The HTTP-equivalent errors the mux reports on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    MethodNotAllowed,
}

impl ErrorKind {
    fn type_name(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::MethodNotAllowed => "MethodNotAllowed",
        }
    }

    fn snake_name(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::MethodNotAllowed => "method_not_allowed",
        }
    }
}

/// Mux configuration, passed explicitly at construction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MuxConfig {
    /// Error-code style for JSON error bodies
    pub error_style: ErrorCodeStyle,
    /// Namespace used by [`ErrorCodeStyle::Namespaced`]
    pub error_namespace: String,
}

impl Default for MuxConfig {
    fn default() -> Self {
        Self {
            error_style: ErrorCodeStyle::Namespaced,
            error_namespace: DEFAULT_ERROR_NAMESPACE.to_string(),
        }
    }
}

impl MuxConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let snake = env::var("TRIEMUX_SNAKE_CASE_ERRORS")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        let error_namespace = env::var("TRIEMUX_ERROR_NAMESPACE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ERROR_NAMESPACE.to_string());
        Self {
            error_style: if snake {
                ErrorCodeStyle::SnakeCase
            } else {
                ErrorCodeStyle::Namespaced
            },
            error_namespace,
        }
    }

    /// Parse configuration from a YAML document. Missing keys take defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).context("failed to parse mux configuration")
    }

    /// Read and parse a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read mux configuration {}", path.display()))?;
        Self::from_yaml_str(&raw)
            .with_context(|| format!("invalid mux configuration in {}", path.display()))
    }

    /// Error code string for `kind` under this configuration.
    #[must_use]
    pub fn error_code(&self, kind: ErrorKind) -> String {
        match self.error_style {
            ErrorCodeStyle::Namespaced => format!("{}.{}", self.error_namespace, kind.type_name()),
            ErrorCodeStyle::SnakeCase => kind.snake_name().to_string(),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
