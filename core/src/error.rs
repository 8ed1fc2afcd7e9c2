// commune_cart/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Failure reported by a storage gateway. `operation` names the gateway call
/// that failed; the backend error (driver error, injected fault) is kept as the source.
#[derive(Debug, Error)]
#[error("Storage operation '{operation}' failed. Source: {source}")]
pub struct StorageError {
  pub operation: &'static str,
  #[source]
  pub source: AnyhowError,
}

impl StorageError {
  pub fn new(operation: &'static str, source: impl Into<AnyhowError>) -> Self {
    StorageError {
      operation,
      source: source.into(),
    }
  }
}

#[derive(Debug, Error)]
pub enum CoreError {
  /// Missing or malformed fields. Raised before any storage access.
  #[error("Invalid input: {0}")]
  InvalidInput(String),

  /// The referenced user or product does not exist.
  #[error("Invalid reference: {0}")]
  InvalidReference(String),

  /// Anything that went wrong inside the checkout transaction. The transaction
  /// has been rolled back by the time this is returned.
  #[error("Order placement failed")]
  OrderPlacementFailed {
    #[source]
    source: StorageError,
  },

  #[error("Storage fault: {0}")]
  Storage(#[from] StorageError),
}

impl CoreError {
  pub fn invalid_input(message: impl Into<String>) -> Self {
    CoreError::InvalidInput(message.into())
  }

  pub fn invalid_reference(message: impl Into<String>) -> Self {
    CoreError::InvalidReference(message.into())
  }
}

pub type CoreResult<T, E = CoreError> = std::result::Result<T, E>;
pub type StorageResult<T> = std::result::Result<T, StorageError>;
