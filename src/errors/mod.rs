use thiserror::Error;

pub mod store;

pub use store::StoreError;

/// Errors returned by the data access facade.
///
/// Store failures are carried unchanged in [`DataError::Store`]; the other
/// variants cover converting between raw documents and typed records.
#[derive(Error, Debug)]
pub enum DataError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Malformed document '{id}' in collection '{collection}': {source}")]
    Decode {
        collection: String,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot encode fields for collection '{collection}': {source}")]
    Encode {
        collection: String,
        #[source]
        source: serde_json::Error,
    },
}

impl DataError {
    pub fn error_code(&self) -> &'static str {
        match self {
            DataError::Store(e) => e.error_code(),
            DataError::Decode { .. } => "DATA_DECODE_FAILED",
            DataError::Encode { .. } => "DATA_ENCODE_FAILED",
        }
    }

    /// The underlying store error, if this failure came from the store
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            DataError::Store(e) => Some(e),
            _ => None,
        }
    }

    pub fn decode<C: Into<String>, I: Into<String>>(collection: C, id: I, source: serde_json::Error) -> Self {
        Self::Decode {
            collection: collection.into(),
            id: id.into(),
            source,
        }
    }

    pub fn encode<C: Into<String>>(collection: C, source: serde_json::Error) -> Self {
        Self::Encode {
            collection: collection.into(),
            source,
        }
    }
}
