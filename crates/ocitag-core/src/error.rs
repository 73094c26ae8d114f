use thiserror::Error;

/// Error types for tag reconciliation and the cloud calls around it
#[derive(Debug, Error)]
pub enum TaggerError {
    #[error("Service error (HTTP {status}, {code}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
        opc_request_id: Option<String>,
    },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid tag target: {0}")]
    InvalidTarget(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl TaggerError {
    /// Create a new Service error from an HTTP status and the OCI error body fields
    pub fn service(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            status,
            code: code.into(),
            message: message.into(),
            opc_request_id: None,
        }
    }

    /// Attach the `opc-request-id` of the failing call to a Service error
    pub fn with_request_id(self, request_id: Option<String>) -> Self {
        match self {
            Self::Service {
                status,
                code,
                message,
                ..
            } => Self::Service {
                status,
                code,
                message,
                opc_request_id: request_id,
            },
            other => other,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn invalid_target(message: impl Into<String>) -> Self {
        Self::InvalidTarget(message.into())
    }

    /// Service errors are the only ones a compartment listing recovers from
    pub fn is_service_error(&self) -> bool {
        matches!(self, Self::Service { .. })
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Service { .. } => ErrorCategory::Service,
            Self::Transport { .. } => ErrorCategory::Transport,
            Self::InvalidResponse { .. } | Self::JsonError(_) => ErrorCategory::Serialization,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::InvalidTarget(_) => ErrorCategory::Validation,
        }
    }
}

/// Error categories for log classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Service,
    Transport,
    Serialization,
    Configuration,
    Validation,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service => write!(f, "service"),
            Self::Transport => write!(f, "transport"),
            Self::Serialization => write!(f, "serialization"),
            Self::Configuration => write!(f, "configuration"),
            Self::Validation => write!(f, "validation"),
        }
    }
}

/// Convenience result type for tagging operations
pub type Result<T> = std::result::Result<T, TaggerError>;
