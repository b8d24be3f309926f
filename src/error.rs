//! Unified error types for Roster.
//!
//! Defines [`RosterError`] (startup and CLI failures), [`ValidationError`]
//! for config validation failures, and [`ServiceError`], the closed set of
//! failures the request pipeline knows how to translate into a client
//! response. All use `thiserror` for `Display` and `Error` derives.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub location: String,
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  {}: {} ({})", self.location, self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            buf.push('\n');
        }
        // write! to String is infallible (only fails on OOM which is unrecoverable)
        let _ = write!(buf, "{e}");
    }
    buf
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RosterError {
    #[error("Config file not found: {}", path.display())]
    ConfigFileNotFound { path: PathBuf },

    #[error("Config parse error in {path}:\n  {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Config validation failed:\n{}", format_errors(.errors))]
    ConfigValidation { errors: Vec<ValidationError> },

    #[error("Unsupported config format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Health check failed with status {0}")]
    HealthCheckFailed(hyper::StatusCode),
}

/// A failure raised while serving a request.
///
/// The variants form the closed vocabulary understood by
/// [`ExceptionTranslator`](crate::middleware::exception::ExceptionTranslator):
/// `NotFound` and the two argument variants are expected, client-facing
/// conditions whose message is returned verbatim; everything else is
/// reported with a generic message.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{message} (Parameter '{param}')")]
    ArgumentNull {
        param: &'static str,
        message: String,
    },

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn internal(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Internal(source.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_null_names_the_parameter() {
        let err = ServiceError::ArgumentNull {
            param: "employee",
            message: "Employee cannot be null".into(),
        };
        assert_eq!(
            err.to_string(),
            "Employee cannot be null (Parameter 'employee')"
        );
    }

    #[test]
    fn internal_is_transparent() {
        let err = ServiceError::internal("disk on fire");
        assert_eq!(err.to_string(), "disk on fire");
    }

    #[test]
    fn validation_errors_are_listed_one_per_line() {
        let err = RosterError::ConfigValidation {
            errors: vec![
                ValidationError {
                    location: "employees[0]".into(),
                    field: "name".into(),
                    message: "name cannot be empty".into(),
                    suggestion: None,
                },
                ValidationError {
                    location: "employees[1]".into(),
                    field: "manager_id".into(),
                    message: "unknown manager 9".into(),
                    suggestion: Some("define manager 9 under `managers`".into()),
                },
            ],
        };
        let rendered = err.to_string();
        assert_eq!(rendered.lines().count(), 3);
        assert!(rendered.contains("define manager 9"));
    }
}
