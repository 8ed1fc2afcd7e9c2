// apps/marketplace_app/src/errors.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use commune_cart::{CoreError, StorageError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Invalid Reference: {0}")]
  InvalidReference(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  // The transaction has already been rolled back when this is constructed.
  #[error("Order placement failed: {source}")]
  OrderPlacement {
    #[source]
    source: StorageError,
  },

  #[error("Storage Error: {0}")]
  Storage(#[from] StorageError),
}

impl From<CoreError> for AppError {
  fn from(err: CoreError) -> Self {
    match err {
      CoreError::InvalidInput(m) => AppError::Validation(m),
      CoreError::InvalidReference(m) => AppError::InvalidReference(m),
      CoreError::OrderPlacementFailed { source } => AppError::OrderPlacement { source },
      CoreError::Storage(e) => AppError::Storage(e),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) | AppError::InvalidReference(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Config(_)
      | AppError::OrderPlacement { .. }
      | AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    // Full detail goes to the log only; server-side failures get a fixed message.
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Responding with error");
    }

    let message = match self {
      AppError::Validation(m) | AppError::InvalidReference(m) | AppError::Auth(m) | AppError::NotFound(m) => m.as_str(),
      AppError::OrderPlacement { .. } => "Order placement failed",
      AppError::Storage(_) => "Database operation failed",
      AppError::Config(_) => "Configuration issue",
    };
    HttpResponse::build(status).json(json!({ "error": message }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
