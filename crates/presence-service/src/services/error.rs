//! Service layer error types
//!
//! Per-message failures stay [`DomainError`]s; this type only adds the
//! failures of wiring the services together.

use presence_common::AppError;
use presence_core::DomainError;
use std::fmt;

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Failure of a pipeline stage
    Domain(DomainError),

    /// A required dependency was not provided
    MissingDependency(&'static str),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::MissingDependency(name) => write!(f, "{name} is required"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::MissingDependency(_) => None,
        }
    }
}

impl ServiceError {
    /// Get the error code for logs
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::MissingDependency(_) => "MISSING_DEPENDENCY",
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::MissingDependency(name) => {
                AppError::Config(format!("{name} is required"))
            }
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dependency_error() {
        let err = ServiceError::MissingDependency("directory");
        assert_eq!(err.error_code(), "MISSING_DEPENDENCY");
        assert_eq!(err.to_string(), "directory is required");
    }

    #[test]
    fn test_domain_error_code() {
        let err = ServiceError::from(DomainError::NoCanonicalConnection);
        assert_eq!(err.error_code(), DomainError::NoCanonicalConnection.code());
    }

    #[test]
    fn test_convert_to_app_error() {
        let app_err: AppError = ServiceError::MissingDependency("registry").into();
        assert!(matches!(app_err, AppError::Config(_)));

        let app_err: AppError = ServiceError::from(DomainError::NoCanonicalConnection).into();
        assert!(matches!(app_err, AppError::Domain(_)));
    }
}
