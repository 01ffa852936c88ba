//! Error types for gateway operations.
//!
//! Request-time variants map one-to-one onto the error kinds carried in the
//! JSON envelope; startup variants (config, credentials, registry) never reach
//! a client.

use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;

/// Main error type for gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Missing or incorrect Basic credentials
    #[error("authentication required")]
    Authentication,

    /// No route matches the request method and path
    #[error("no route for {method} {path}")]
    RouteNotFound { method: String, path: String },

    /// Missing parameter, type mismatch, or disallowed input
    #[error("{0}")]
    Validation(String),

    /// Route refused by the access guard
    #[error("{0}")]
    AccessDenied(String),

    /// Node command exceeded its allotted time and was killed
    #[error("'{verb}' did not complete within {}s", .timeout.as_secs_f64())]
    ExecutionTimeout { verb: String, timeout: Duration },

    /// Node command exited non-zero
    #[error("{message}")]
    UpstreamCommand {
        message: String,
        exit_code: Option<i32>,
    },

    /// Node front-end could not be started
    #[error("failed to launch '{program}': {reason}")]
    Launch { program: String, reason: String },

    /// Node command succeeded but its output does not fit the declared shape
    #[error("{0}")]
    UpstreamProtocol(String),

    /// Invalid configuration, detected at startup
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A credential environment variable is unset or empty
    #[error("credential variable '{0}' is unset or empty")]
    MissingCredential(String),

    /// A route declaration violates a registry invariant
    #[error("invalid route {0}: {1}")]
    InvalidRoute(String, String),
}

impl GatewayError {
    /// Error kind carried in the JSON envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Authentication => "AuthenticationError",
            GatewayError::RouteNotFound { .. } => "RouteNotFoundError",
            GatewayError::Validation(_) => "ValidationError",
            GatewayError::AccessDenied(_) => "AccessDeniedError",
            GatewayError::ExecutionTimeout { .. } => "ExecutionTimeoutError",
            GatewayError::UpstreamCommand { .. } | GatewayError::Launch { .. } => {
                "UpstreamCommandError"
            }
            GatewayError::UpstreamProtocol(_) => "UpstreamProtocolError",
            GatewayError::InvalidConfig(_)
            | GatewayError::MissingCredential(_)
            | GatewayError::InvalidRoute(..) => "InternalError",
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Authentication => StatusCode::UNAUTHORIZED,
            GatewayError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::AccessDenied(_) => StatusCode::FORBIDDEN,
            GatewayError::ExecutionTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::UpstreamCommand { .. }
            | GatewayError::Launch { .. }
            | GatewayError::UpstreamProtocol(_) => StatusCode::BAD_GATEWAY,
            GatewayError::InvalidConfig(_)
            | GatewayError::MissingCredential(_)
            | GatewayError::InvalidRoute(..) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
