// commune_cart/src/storage/memory.rs

//! In-process storage gateway.
//!
//! Backs the server when no database is configured and backs the test suites. It
//! keeps the same contract as the SQL gateway: cart upserts increment, commune reads
//! are inner joins on products, and checkout writes are staged on the transaction
//! and only applied to the shared tables on `commit`. Orders must reference a known
//! user and order items a known product, as the foreign keys require in SQL. Clearing
//! a cart removes the rows present at that moment; rows added before the commit stay.
//!
//! Every gateway call is counted and can be made to fail through
//! [`InMemoryStorage::fail_on`], which is how the atomicity guarantees of the
//! checkout are exercised.

use crate::error::{StorageError, StorageResult};
use crate::models::{CartItem, CartLine, Order, OrderItem, OrderItemDetail, OrderLine, Product};
use crate::storage::{StorageGateway, StorageTransaction};
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Names of the gateway calls, used for fault injection and in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageOperation {
  UserExists,
  FindProduct,
  IncrementCartItem,
  ListCartLines,
  DeleteCartItem,
  DeleteCartItemForProduct,
  SetCartItemQuantity,
  ListOrders,
  ListOrderItemsInCommune,
  Begin,
  InsertOrder,
  InsertOrderItems,
  ClearCart,
  Commit,
  Rollback,
}

impl StorageOperation {
  pub fn as_str(&self) -> &'static str {
    match self {
      StorageOperation::UserExists => "user_exists",
      StorageOperation::FindProduct => "find_product",
      StorageOperation::IncrementCartItem => "increment_cart_item",
      StorageOperation::ListCartLines => "list_cart_lines",
      StorageOperation::DeleteCartItem => "delete_cart_item",
      StorageOperation::DeleteCartItemForProduct => "delete_cart_item_for_product",
      StorageOperation::SetCartItemQuantity => "set_cart_item_quantity",
      StorageOperation::ListOrders => "list_orders",
      StorageOperation::ListOrderItemsInCommune => "list_order_items_in_commune",
      StorageOperation::Begin => "begin",
      StorageOperation::InsertOrder => "insert_order",
      StorageOperation::InsertOrderItems => "insert_order_items",
      StorageOperation::ClearCart => "clear_cart",
      StorageOperation::Commit => "commit",
      StorageOperation::Rollback => "rollback",
    }
  }
}

impl fmt::Display for StorageOperation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Default)]
struct Tables {
  users: HashSet<Uuid>,
  products: HashMap<Uuid, Product>,
  // Insertion order doubles as `added_at` order.
  cart_items: Vec<CartItem>,
  // Insertion order is commit order.
  orders: Vec<Order>,
  order_items: Vec<OrderItem>,
}

#[derive(Debug, Default)]
struct Instrumentation {
  faults: Mutex<HashSet<StorageOperation>>,
  calls: AtomicUsize,
}

impl Instrumentation {
  fn record(&self, op: StorageOperation) -> StorageResult<()> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if self.faults.lock().contains(&op) {
      debug!(operation = %op, "Injected storage fault triggered.");
      return Err(StorageError::new(op.as_str(), anyhow!("injected fault at '{}'", op)));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
  tables: Arc<Mutex<Tables>>,
  instrumentation: Arc<Instrumentation>,
}

impl InMemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  // --- Reference data (owned by the user and catalog services) ---

  pub fn insert_user(&self, user_id: Uuid) {
    self.tables.lock().users.insert(user_id);
  }

  pub fn insert_product(&self, product: Product) {
    self.tables.lock().products.insert(product.product_id, product);
  }

  /// Changes a catalog price. Existing order items keep their captured price.
  pub fn set_product_price(&self, product_id: Uuid, price_cents: i64) -> bool {
    match self.tables.lock().products.get_mut(&product_id) {
      Some(product) => {
        product.price_cents = price_cents;
        true
      }
      None => false,
    }
  }

  // --- Fault injection and call accounting ---

  /// Makes every subsequent call of `op` fail until [`clear_faults`](Self::clear_faults).
  pub fn fail_on(&self, op: StorageOperation) {
    self.instrumentation.faults.lock().insert(op);
  }

  pub fn clear_faults(&self) {
    self.instrumentation.faults.lock().clear();
  }

  /// Number of gateway and transaction calls issued so far.
  pub fn operation_count(&self) -> usize {
    self.instrumentation.calls.load(Ordering::SeqCst)
  }

  // --- Committed state snapshots ---

  pub fn cart_items(&self) -> Vec<CartItem> {
    self.tables.lock().cart_items.clone()
  }

  pub fn orders(&self) -> Vec<Order> {
    self.tables.lock().orders.clone()
  }

  pub fn order_items(&self) -> Vec<OrderItem> {
    self.tables.lock().order_items.clone()
  }

  fn record(&self, op: StorageOperation) -> StorageResult<()> {
    self.instrumentation.record(op)
  }
}

#[async_trait]
impl StorageGateway for InMemoryStorage {
  async fn user_exists(&self, user_id: Uuid) -> StorageResult<bool> {
    self.record(StorageOperation::UserExists)?;
    Ok(self.tables.lock().users.contains(&user_id))
  }

  async fn find_product(&self, product_id: Uuid) -> StorageResult<Option<Product>> {
    self.record(StorageOperation::FindProduct)?;
    Ok(self.tables.lock().products.get(&product_id).cloned())
  }

  async fn increment_cart_item(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> StorageResult<CartItem> {
    self.record(StorageOperation::IncrementCartItem)?;
    let mut tables = self.tables.lock();
    if let Some(existing) = tables
      .cart_items
      .iter_mut()
      .find(|item| item.user_id == user_id && item.product_id == product_id)
    {
      existing.quantity = existing.quantity.checked_add(quantity).ok_or_else(|| {
        StorageError::new(
          StorageOperation::IncrementCartItem.as_str(),
          anyhow!("quantity overflow for product {}", product_id),
        )
      })?;
      return Ok(existing.clone());
    }
    let item = CartItem {
      cart_id: Uuid::new_v4(),
      user_id,
      product_id,
      quantity,
      added_at: Utc::now(),
    };
    tables.cart_items.push(item.clone());
    Ok(item)
  }

  async fn list_cart_lines(&self, user_id: Uuid, commune_id: Option<Uuid>) -> StorageResult<Vec<CartLine>> {
    self.record(StorageOperation::ListCartLines)?;
    let tables = self.tables.lock();
    let lines = tables
      .cart_items
      .iter()
      .filter(|item| item.user_id == user_id)
      .filter_map(|item| {
        let product = tables.products.get(&item.product_id)?;
        if commune_id.map_or(false, |c| c != product.commune_id) {
          return None;
        }
        Some(CartLine {
          cart_id: item.cart_id,
          user_id: item.user_id,
          product_id: item.product_id,
          quantity: item.quantity,
          product_name: product.product_name.clone(),
          description: product.description.clone(),
          price_cents: product.price_cents,
          product_image: product.product_image.clone(),
          commune_id: product.commune_id,
        })
      })
      .collect();
    Ok(lines)
  }

  async fn delete_cart_item(&self, user_id: Uuid, cart_id: Uuid) -> StorageResult<u64> {
    self.record(StorageOperation::DeleteCartItem)?;
    let mut tables = self.tables.lock();
    let before = tables.cart_items.len();
    tables
      .cart_items
      .retain(|item| !(item.user_id == user_id && item.cart_id == cart_id));
    Ok((before - tables.cart_items.len()) as u64)
  }

  async fn delete_cart_item_for_product(&self, user_id: Uuid, product_id: Uuid) -> StorageResult<u64> {
    self.record(StorageOperation::DeleteCartItemForProduct)?;
    let mut tables = self.tables.lock();
    let before = tables.cart_items.len();
    tables
      .cart_items
      .retain(|item| !(item.user_id == user_id && item.product_id == product_id));
    Ok((before - tables.cart_items.len()) as u64)
  }

  async fn set_cart_item_quantity(
    &self,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
  ) -> StorageResult<Option<CartItem>> {
    self.record(StorageOperation::SetCartItemQuantity)?;
    let mut tables = self.tables.lock();
    Ok(tables
      .cart_items
      .iter_mut()
      .find(|item| item.user_id == user_id && item.product_id == product_id)
      .map(|item| {
        item.quantity = quantity;
        item.clone()
      }))
  }

  async fn list_orders(&self, user_id: Uuid) -> StorageResult<Vec<Order>> {
    self.record(StorageOperation::ListOrders)?;
    let tables = self.tables.lock();
    // Newest commit first; the stable sort keeps that for equal timestamps.
    let mut orders: Vec<Order> = tables
      .orders
      .iter()
      .rev()
      .filter(|order| order.user_id == user_id)
      .cloned()
      .collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(orders)
  }

  async fn list_order_items_in_commune(
    &self,
    order_ids: &[Uuid],
    commune_id: Uuid,
  ) -> StorageResult<Vec<OrderItemDetail>> {
    self.record(StorageOperation::ListOrderItemsInCommune)?;
    let wanted: HashSet<&Uuid> = order_ids.iter().collect();
    let tables = self.tables.lock();
    let details = tables
      .order_items
      .iter()
      .filter(|item| wanted.contains(&item.order_id))
      .filter_map(|item| {
        let product = tables.products.get(&item.product_id)?;
        if product.commune_id != commune_id {
          return None;
        }
        Some(OrderItemDetail {
          order_id: item.order_id,
          product_id: item.product_id,
          quantity: item.quantity,
          price_cents: item.price_cents,
          product_name: product.product_name.clone(),
          product_image: product.product_image.clone(),
          commune_id: product.commune_id,
        })
      })
      .collect();
    Ok(details)
  }

  async fn begin(&self) -> StorageResult<Box<dyn StorageTransaction>> {
    self.record(StorageOperation::Begin)?;
    Ok(Box::new(InMemoryTransaction {
      tables: self.tables.clone(),
      instrumentation: self.instrumentation.clone(),
      staged_orders: Vec::new(),
      staged_items: Vec::new(),
      cleared_cart_ids: HashSet::new(),
    }))
  }
}

/// Staged checkout writes. Dropping the value discards them.
struct InMemoryTransaction {
  tables: Arc<Mutex<Tables>>,
  instrumentation: Arc<Instrumentation>,
  staged_orders: Vec<Order>,
  staged_items: Vec<OrderItem>,
  // Cart rows that existed when `clear_cart` ran. Rows added later survive the commit.
  cleared_cart_ids: HashSet<Uuid>,
}

#[async_trait]
impl StorageTransaction for InMemoryTransaction {
  async fn insert_order(&mut self, user_id: Uuid, total_amount_cents: i64) -> StorageResult<Order> {
    self.instrumentation.record(StorageOperation::InsertOrder)?;
    if !self.tables.lock().users.contains(&user_id) {
      return Err(StorageError::new(
        StorageOperation::InsertOrder.as_str(),
        anyhow!("order references unknown user {}", user_id),
      ));
    }
    let order = Order {
      order_id: Uuid::new_v4(),
      user_id,
      total_amount_cents,
      created_at: Utc::now(),
    };
    self.staged_orders.push(order.clone());
    Ok(order)
  }

  async fn insert_order_items(&mut self, order_id: Uuid, lines: &[OrderLine]) -> StorageResult<Vec<OrderItem>> {
    self.instrumentation.record(StorageOperation::InsertOrderItems)?;
    if !self.staged_orders.iter().any(|order| order.order_id == order_id) {
      return Err(StorageError::new(
        StorageOperation::InsertOrderItems.as_str(),
        anyhow!("order items reference unknown order {}", order_id),
      ));
    }
    {
      let tables = self.tables.lock();
      if let Some(missing) = lines.iter().find(|line| !tables.products.contains_key(&line.product_id)) {
        return Err(StorageError::new(
          StorageOperation::InsertOrderItems.as_str(),
          anyhow!("order item references unknown product {}", missing.product_id),
        ));
      }
    }
    let items: Vec<OrderItem> = lines
      .iter()
      .map(|line| OrderItem {
        order_id,
        product_id: line.product_id,
        quantity: line.quantity,
        price_cents: line.price_cents,
      })
      .collect();
    self.staged_items.extend(items.iter().cloned());
    Ok(items)
  }

  async fn clear_cart(&mut self, user_id: Uuid) -> StorageResult<u64> {
    self.instrumentation.record(StorageOperation::ClearCart)?;
    let tables = self.tables.lock();
    let mut newly_cleared = 0u64;
    for item in tables.cart_items.iter().filter(|item| item.user_id == user_id) {
      if self.cleared_cart_ids.insert(item.cart_id) {
        newly_cleared += 1;
      }
    }
    Ok(newly_cleared)
  }

  async fn commit(self: Box<Self>) -> StorageResult<()> {
    self.instrumentation.record(StorageOperation::Commit)?;
    let InMemoryTransaction {
      tables,
      staged_orders,
      staged_items,
      cleared_cart_ids,
      ..
    } = *self;
    let mut tables = tables.lock();
    tables.orders.extend(staged_orders);
    tables.order_items.extend(staged_items);
    tables
      .cart_items
      .retain(|item| !cleared_cart_ids.contains(&item.cart_id));
    Ok(())
  }

  async fn rollback(self: Box<Self>) -> StorageResult<()> {
    // Staged writes go away with `self` whether or not the call is recorded as failed.
    self.instrumentation.record(StorageOperation::Rollback)
  }
}
