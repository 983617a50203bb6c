//! Error types shared by the query builder, the metadata cache and the row mapper.
//!
//! Every failure is scoped to one query construction or one row materialization;
//! nothing here is fatal to the process.

use thiserror::Error;

use crate::crypto::CryptoError;

/// Result type for data-access operations.
pub type DataResult<T> = Result<T, DataError>;

/// Errors raised while building statements or materializing rows.
#[derive(Debug, Error)]
pub enum DataError {
    /// Descriptor metadata is missing or inconsistent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The descriptor provider knows nothing about the requested entity.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// A caller passed arguments the builder cannot render.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A row value could not be turned into the declared field.
    #[error("conversion error in {entity}: {message}")]
    Conversion { entity: String, message: String },

    /// An encrypted column could not be decrypted with the configured key.
    #[error("{entity}.{column} cannot be decrypted using the configured key")]
    Decryption { entity: String, column: String },

    /// Encryption failed while encoding a bound value.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The statement gateway reported a failure.
    #[error("gateway error: {0}")]
    Gateway(String),
}

impl DataError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        DataError::Configuration(message.into())
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        DataError::InvalidArgument(message.into())
    }

    pub(crate) fn conversion(entity: &str, message: impl Into<String>) -> Self {
        DataError::Conversion {
            entity: entity.to_string(),
            message: message.into(),
        }
    }

    /// Whether this error came from a failed decryption.
    pub fn is_decryption(&self) -> bool {
        matches!(self, DataError::Decryption { .. })
    }
}
