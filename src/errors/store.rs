use thiserror::Error;

/// Errors reported by a document store client.
///
/// These mirror the failure classes a managed document database surfaces to
/// its SDK callers. The data access layer never creates them on its own; it
/// only passes them through.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Document store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Permission denied on '{collection}': {message}")]
    PermissionDenied { collection: String, message: String },

    #[error("Failed precondition: {message}")]
    FailedPrecondition { message: String },

    #[error("No document '{id}' in collection '{collection}'")]
    NotFound { collection: String, id: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Internal store error: {message}")]
    Internal { message: String },
}

impl StoreError {
    /// Stable code for callers that branch on the failure class
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::Unavailable { .. } => "STORE_UNAVAILABLE",
            StoreError::PermissionDenied { .. } => "STORE_PERMISSION_DENIED",
            StoreError::FailedPrecondition { .. } => "STORE_FAILED_PRECONDITION",
            StoreError::NotFound { .. } => "STORE_NOT_FOUND",
            StoreError::InvalidArgument { .. } => "STORE_INVALID_ARGUMENT",
            StoreError::Internal { .. } => "STORE_INTERNAL",
        }
    }

    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::Unavailable { message: message.into() }
    }

    pub fn permission_denied<S: Into<String>>(collection: S, message: S) -> Self {
        Self::PermissionDenied {
            collection: collection.into(),
            message: message.into(),
        }
    }

    pub fn failed_precondition<S: Into<String>>(message: S) -> Self {
        Self::FailedPrecondition { message: message.into() }
    }

    pub fn not_found<S: Into<String>>(collection: S, id: S) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument { message: message.into() }
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal { message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            StoreError::unavailable("offline"),
            StoreError::permission_denied("users", "rules"),
            StoreError::failed_precondition("index"),
            StoreError::not_found("users", "u1"),
            StoreError::invalid_argument("bad"),
            StoreError::internal("boom"),
        ];

        let mut codes: Vec<_> = errors.iter().map(StoreError::error_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_not_found_message_names_document() {
        let err = StoreError::not_found("services", "s1");
        assert_eq!(err.to_string(), "No document 's1' in collection 'services'");
    }
}
