// apps/marketplace_app/src/web/extractors.rs

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;

/// Header carrying the user id injected by the upstream auth layer.
pub const USER_ID_HEADER: &str = "X-User-ID";

/// The caller's identity. Token validation happens upstream; by the time a
/// request reaches this service the header is trusted.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
  pub user_id: Uuid,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let parsed = req
      .headers()
      .get(USER_ID_HEADER)
      .and_then(|value| value.to_str().ok())
      .and_then(|raw| Uuid::parse_str(raw.trim()).ok());

    ready(match parsed {
      Some(user_id) => Ok(AuthenticatedUser { user_id }),
      None => {
        warn!("AuthenticatedUser extractor: missing or invalid {} header.", USER_ID_HEADER);
        Err(AppError::Auth(format!(
          "User authentication required. Missing or invalid {} header.",
          USER_ID_HEADER
        )))
      }
    })
  }
}
