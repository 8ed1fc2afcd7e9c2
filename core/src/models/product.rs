// commune_cart/src/models/product.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog entry. Owned by the catalog service; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
  pub product_id: Uuid,
  pub product_name: String,
  pub description: Option<String>,
  pub price_cents: i64,
  pub product_image: Option<String>,
  pub commune_id: Uuid,
}
