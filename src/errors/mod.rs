//! # Error Handling
//!
//! Crate-wide error types for the Gateplane control plane using `thiserror`.
//! Entity-store and validation failures are structured results, never
//! panics; callers map them onto API responses via `api::error`.

/// Custom result type for Gateplane operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Gateplane control plane
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Referenced entity or revision is absent
    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    /// Uniqueness or cascading-delete violation
    #[error("{0}")]
    Conflict(String),

    /// Malformed field on a single mutation (bad CIDR, bad hostname, ...)
    #[error("{0}")]
    InvalidArgument(String),

    /// Aggregate verdict from the configuration validator
    #[error("configuration failed validation with {} error(s)", errors.len())]
    ValidationFailed { errors: Vec<String> },

    /// A deploy or rollback is already holding the deployment lock
    #[error("another deployment is already in progress")]
    Busy,

    /// The revision was validated and recorded, but the enforcement
    /// engine did not acknowledge the new table
    #[error("revision {revision} committed but activation failed: {reason}")]
    ActivationFailed { revision: u64, reason: String },

    /// Startup / environment configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Network transport errors (enforcement engine, HTTP server)
    #[error("transport error: {0}")]
    Transport(String),

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    /// Serialization/deserialization errors
    #[error("serialization error: {context}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: String,
    },

    /// Internal server errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a not found error
    pub fn not_found<I: Into<String>>(resource: &'static str, id: I) -> Self {
        Self::NotFound { resource, id: id.into() }
    }

    /// Create a conflict error
    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict(message.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Attach context to an I/O error
    pub fn io<S: Into<String>>(source: std::io::Error, context: S) -> Self {
        Self::Io { source, context: context.into() }
    }

    /// Attach context to a JSON error
    pub fn serialization<S: Into<String>>(source: serde_json::Error, context: S) -> Self {
        Self::Serialization { source, context: context.into() }
    }

    /// Get the HTTP status code that should be returned for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::Conflict(_) => 409,
            Error::InvalidArgument(_) => 400,
            Error::ValidationFailed { .. } => 422,
            Error::Busy => 409,
            Error::ActivationFailed { .. } => 502,
            Error::Config(_) => 500,
            Error::Transport(_) => 502,
            Error::Io { .. } => 500,
            Error::Serialization { .. } => 400,
            Error::Internal(_) => 500,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io { source: error, context: "I/O operation failed".to_string() }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization { source: error, context: "JSON serialization failed".to_string() }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let details: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, details.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::invalid_argument(message)
    }
}
