// commune_cart/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::order_item::{OrderItem, OrderItemDetail};

/// Written once per successful checkout, never updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
  pub order_id: Uuid,
  pub user_id: Uuid,
  pub total_amount_cents: i64,
  pub created_at: DateTime<Utc>,
}

/// An order restricted to the items of a single commune.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommuneOrder {
  #[serde(flatten)]
  pub order: Order,
  pub items: Vec<OrderItemDetail>,
}

/// Result of a committed checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedOrder {
  pub order: Order,
  pub items: Vec<OrderItem>,
}
