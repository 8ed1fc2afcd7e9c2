// commune_cart/src/storage/mod.rs

//! The storage gateway seam.
//!
//! Components never reach for a global pool. They receive an
//! `Arc<dyn StorageGateway>` at construction time and talk to it through these
//! traits. Reads run directly against the gateway; the checkout writes run inside a
//! `StorageTransaction` obtained from `begin()`.
//!
//! Transactions are scoped resources: `commit` and `rollback` consume the boxed
//! handle, and a handle dropped without `commit` (early return, panic, cancelled
//! request future) must discard everything it wrote and give its connection back.

pub mod memory;

use crate::error::StorageResult;
use crate::models::{CartItem, CartLine, Order, OrderItem, OrderItemDetail, OrderLine, Product};
use async_trait::async_trait;
use uuid::Uuid;

pub use memory::{InMemoryStorage, StorageOperation};

#[async_trait]
pub trait StorageGateway: Send + Sync + 'static {
  async fn user_exists(&self, user_id: Uuid) -> StorageResult<bool>;

  async fn find_product(&self, product_id: Uuid) -> StorageResult<Option<Product>>;

  /// Inserts the (user, product) row with `quantity`, or adds `quantity` to the
  /// existing row. Returns the row as stored afterwards.
  async fn increment_cart_item(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> StorageResult<CartItem>;

  /// Cart rows joined with their products, oldest first. `commune_id` restricts the
  /// result to products of that commune.
  async fn list_cart_lines(&self, user_id: Uuid, commune_id: Option<Uuid>) -> StorageResult<Vec<CartLine>>;

  /// Returns the number of rows deleted.
  async fn delete_cart_item(&self, user_id: Uuid, cart_id: Uuid) -> StorageResult<u64>;

  /// Returns the number of rows deleted.
  async fn delete_cart_item_for_product(&self, user_id: Uuid, product_id: Uuid) -> StorageResult<u64>;

  /// Overwrites the quantity of the matching row. `None` when no row matched.
  async fn set_cart_item_quantity(
    &self,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
  ) -> StorageResult<Option<CartItem>>;

  /// All orders of the user, most recent first.
  async fn list_orders(&self, user_id: Uuid) -> StorageResult<Vec<Order>>;

  /// Items of the given orders whose product belongs to `commune_id`.
  async fn list_order_items_in_commune(
    &self,
    order_ids: &[Uuid],
    commune_id: Uuid,
  ) -> StorageResult<Vec<OrderItemDetail>>;

  async fn begin(&self) -> StorageResult<Box<dyn StorageTransaction>>;
}

/// Writes performed by the checkout. Nothing written here is visible to other
/// readers until `commit` succeeds.
#[async_trait]
pub trait StorageTransaction: Send {
  async fn insert_order(&mut self, user_id: Uuid, total_amount_cents: i64) -> StorageResult<Order>;

  /// Writes every line of the order as one unit.
  async fn insert_order_items(&mut self, order_id: Uuid, lines: &[OrderLine]) -> StorageResult<Vec<OrderItem>>;

  /// Deletes all cart rows of the user. Returns the number of rows deleted.
  async fn clear_cart(&mut self, user_id: Uuid) -> StorageResult<u64>;

  async fn commit(self: Box<Self>) -> StorageResult<()>;

  async fn rollback(self: Box<Self>) -> StorageResult<()>;
}
