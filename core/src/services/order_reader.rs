// commune_cart/src/services/order_reader.rs

//! Commune-scoped view of a user's order history.
//!
//! There is no per-commune order table. The view is derived: load the user's
//! orders, load the items of those orders whose product is in the commune, group
//! the items under their order and drop every order left without items.

use crate::error::CoreResult;
use crate::models::{CommuneOrder, Order, OrderItemDetail};
use crate::storage::StorageGateway;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct OrderReader {
  storage: Arc<dyn StorageGateway>,
}

impl OrderReader {
  pub fn new(storage: Arc<dyn StorageGateway>) -> Self {
    Self { storage }
  }

  /// Orders of `user_id` that contain at least one item of `commune_id`, most
  /// recent first, each carrying only that commune's items.
  #[instrument(name = "order_reader::get_orders", skip(self), err(Display))]
  pub async fn get_orders(&self, user_id: Uuid, commune_id: Uuid) -> CoreResult<Vec<CommuneOrder>> {
    let orders = self.storage.list_orders(user_id).await?;
    if orders.is_empty() {
      return Ok(Vec::new());
    }

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.order_id).collect();
    let items = self
      .storage
      .list_order_items_in_commune(&order_ids, commune_id)
      .await?;
    debug!(orders = orders.len(), items = items.len(), "Loaded orders and commune items.");

    Ok(assemble_commune_orders(orders, items))
  }
}

/// Groups `items` under `orders`, keeping the order of `orders` and of the items
/// within each order. Orders without items and items of unknown orders are dropped.
pub fn assemble_commune_orders(orders: Vec<Order>, items: Vec<OrderItemDetail>) -> Vec<CommuneOrder> {
  let mut by_order: HashMap<Uuid, Vec<OrderItemDetail>> = HashMap::with_capacity(orders.len());
  for item in items {
    by_order.entry(item.order_id).or_default().push(item);
  }

  orders
    .into_iter()
    .filter_map(|order| {
      let items = by_order.remove(&order.order_id)?;
      Some(CommuneOrder { order, items })
    })
    .collect()
}
