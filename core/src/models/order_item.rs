// commune_cart/src/models/order_item.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted order line. `price_cents` is the price captured at checkout and
/// does not follow later catalog changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub price_cents: i64,
}

/// An order line joined with product metadata, as returned by commune-scoped reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItemDetail {
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub price_cents: i64,
  pub product_name: String,
  pub product_image: Option<String>,
  pub commune_id: Uuid,
}

/// A validated checkout line (see `PlaceOrderCommand`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderLine {
  pub product_id: Uuid,
  pub quantity: i32,
  pub price_cents: i64,
}

impl OrderLine {
  /// `price_cents * quantity`, or `None` on overflow.
  pub fn line_total_cents(&self) -> Option<i64> {
    self.price_cents.checked_mul(i64::from(self.quantity))
  }
}
