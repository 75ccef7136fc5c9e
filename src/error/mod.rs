use crate::database::DatabaseBackend;
use crate::tenant::BusinessDateType;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sqldialect
#[derive(Error, Debug)]
pub enum Error {
    /// The active backend has no rule for the requested operation.
    #[error("Database type is not supported for {operation}: {backend}")]
    UnsupportedDialectOperation {
        operation: &'static str,
        backend: DatabaseBackend,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown database backend: {0}")]
    UnknownBackend(String),

    #[error("Unknown tenant: {0}")]
    UnknownTenant(String),

    /// A business-date fragment was requested but the context holds no date
    /// of the type the current action needs.
    #[error("No {0} bound to the current execution context")]
    MissingBusinessDate(BusinessDateType),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid sort specification: {0}")]
    InvalidSort(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Error with context chain
    #[error("{message}")]
    WithContext {
        message: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn unsupported(operation: &'static str, backend: DatabaseBackend) -> Self {
        Self::UnsupportedDialectOperation { operation, backend }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn unknown_backend(msg: impl Into<String>) -> Self {
        Self::UnknownBackend(msg.into())
    }

    pub fn unknown_tenant(msg: impl Into<String>) -> Self {
        Self::UnknownTenant(msg.into())
    }

    pub fn invalid_timezone(msg: impl Into<String>) -> Self {
        Self::InvalidTimezone(msg.into())
    }

    pub fn invalid_sort(msg: impl Into<String>) -> Self {
        Self::InvalidSort(msg.into())
    }

    // Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            message: context.into(),
            source: Box::new(self),
        }
    }

    /// Fatal errors are deployment defects: retrying the same call under the
    /// same configuration will fail the same way.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::UnsupportedDialectOperation { .. }
            | Error::Configuration(_)
            | Error::UnknownBackend(_)
            | Error::UnknownTenant(_)
            | Error::MissingBusinessDate(_)
            | Error::InvalidTimezone(_) => true,
            Error::WithContext { source, .. } => source.is_fatal(),
            _ => false,
        }
    }

    /// Get error code for logs and API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::UnsupportedDialectOperation { .. } => "E_UNSUPPORTED_DIALECT_OPERATION",
            Error::Configuration(_) => "E_CONFIGURATION",
            Error::UnknownBackend(_) => "E_UNKNOWN_BACKEND",
            Error::UnknownTenant(_) => "E_UNKNOWN_TENANT",
            Error::MissingBusinessDate(_) => "E_MISSING_BUSINESS_DATE",
            Error::InvalidTimezone(_) => "E_INVALID_TIMEZONE",
            Error::InvalidSort(_) => "E_INVALID_SORT",
            Error::Io(_) => "E_IO",
            Error::Json(_) => "E_JSON",
            Error::WithContext { source, .. } => source.error_code(),
        }
    }
}
