// apps/marketplace_app/src/db/pg_storage.rs

//! PostgreSQL implementation of the storage gateway.

use async_trait::async_trait;
use commune_cart::{
  CartItem, CartLine, Order, OrderItem, OrderItemDetail, OrderLine, Product, StorageError, StorageGateway,
  StorageResult, StorageTransaction,
};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgStorage {
  pool: PgPool,
}

impl PgStorage {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

fn db_err(operation: &'static str) -> impl FnOnce(sqlx::Error) -> StorageError {
  move |e| StorageError::new(operation, e)
}

#[async_trait]
impl StorageGateway for PgStorage {
  async fn user_exists(&self, user_id: Uuid) -> StorageResult<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE user_id = $1)")
      .bind(user_id)
      .fetch_one(&self.pool)
      .await
      .map_err(db_err("user_exists"))
  }

  async fn find_product(&self, product_id: Uuid) -> StorageResult<Option<Product>> {
    sqlx::query_as::<_, Product>(
      r#"
      SELECT product_id, product_name, description, price_cents, product_image, commune_id
      FROM products
      WHERE product_id = $1
      "#,
    )
    .bind(product_id)
    .fetch_optional(&self.pool)
    .await
    .map_err(db_err("find_product"))
  }

  async fn increment_cart_item(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> StorageResult<CartItem> {
    sqlx::query_as::<_, CartItem>(
      r#"
      INSERT INTO cart_items (cart_id, user_id, product_id, quantity)
      VALUES ($1, $2, $3, $4)
      ON CONFLICT (user_id, product_id) DO UPDATE
      SET quantity = cart_items.quantity + EXCLUDED.quantity
      RETURNING cart_id, user_id, product_id, quantity, added_at
      "#,
    )
    .bind(Uuid::new_v4()) // Only used if the row is new
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_one(&self.pool)
    .await
    .map_err(db_err("increment_cart_item"))
  }

  async fn list_cart_lines(&self, user_id: Uuid, commune_id: Option<Uuid>) -> StorageResult<Vec<CartLine>> {
    sqlx::query_as::<_, CartLine>(
      r#"
      SELECT c.cart_id, c.user_id, c.product_id, c.quantity,
             p.product_name, p.description, p.price_cents, p.product_image, p.commune_id
      FROM cart_items c
      JOIN products p ON p.product_id = c.product_id
      WHERE c.user_id = $1
        AND ($2::uuid IS NULL OR p.commune_id = $2)
      ORDER BY c.added_at, c.cart_id
      "#,
    )
    .bind(user_id)
    .bind(commune_id)
    .fetch_all(&self.pool)
    .await
    .map_err(db_err("list_cart_lines"))
  }

  async fn delete_cart_item(&self, user_id: Uuid, cart_id: Uuid) -> StorageResult<u64> {
    sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND user_id = $2")
      .bind(cart_id)
      .bind(user_id)
      .execute(&self.pool)
      .await
      .map(|done| done.rows_affected())
      .map_err(db_err("delete_cart_item"))
  }

  async fn delete_cart_item_for_product(&self, user_id: Uuid, product_id: Uuid) -> StorageResult<u64> {
    sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
      .bind(user_id)
      .bind(product_id)
      .execute(&self.pool)
      .await
      .map(|done| done.rows_affected())
      .map_err(db_err("delete_cart_item_for_product"))
  }

  async fn set_cart_item_quantity(
    &self,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
  ) -> StorageResult<Option<CartItem>> {
    sqlx::query_as::<_, CartItem>(
      r#"
      UPDATE cart_items SET quantity = $3
      WHERE user_id = $1 AND product_id = $2
      RETURNING cart_id, user_id, product_id, quantity, added_at
      "#,
    )
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_optional(&self.pool)
    .await
    .map_err(db_err("set_cart_item_quantity"))
  }

  async fn list_orders(&self, user_id: Uuid) -> StorageResult<Vec<Order>> {
    sqlx::query_as::<_, Order>(
      r#"
      SELECT order_id, user_id, total_amount_cents, created_at
      FROM orders
      WHERE user_id = $1
      ORDER BY created_at DESC, order_id
      "#,
    )
    .bind(user_id)
    .fetch_all(&self.pool)
    .await
    .map_err(db_err("list_orders"))
  }

  async fn list_order_items_in_commune(
    &self,
    order_ids: &[Uuid],
    commune_id: Uuid,
  ) -> StorageResult<Vec<OrderItemDetail>> {
    sqlx::query_as::<_, OrderItemDetail>(
      r#"
      SELECT oi.order_id, oi.product_id, oi.quantity, oi.price_cents,
             p.product_name, p.product_image, p.commune_id
      FROM order_items oi
      JOIN products p ON p.product_id = oi.product_id
      WHERE oi.order_id = ANY($1)
        AND p.commune_id = $2
      ORDER BY oi.order_item_id
      "#,
    )
    .bind(order_ids)
    .bind(commune_id)
    .fetch_all(&self.pool)
    .await
    .map_err(db_err("list_order_items_in_commune"))
  }

  async fn begin(&self) -> StorageResult<Box<dyn StorageTransaction>> {
    let tx = self.pool.begin().await.map_err(db_err("begin"))?;
    debug!("Postgres transaction opened.");
    Ok(Box::new(PgStorageTransaction { tx }))
  }
}

/// Wraps a sqlx transaction. sqlx rolls back on drop, which covers every exit
/// path that does not reach `commit`.
pub struct PgStorageTransaction {
  tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StorageTransaction for PgStorageTransaction {
  async fn insert_order(&mut self, user_id: Uuid, total_amount_cents: i64) -> StorageResult<Order> {
    sqlx::query_as::<_, Order>(
      r#"
      INSERT INTO orders (order_id, user_id, total_amount_cents, created_at)
      VALUES ($1, $2, $3, NOW())
      RETURNING order_id, user_id, total_amount_cents, created_at
      "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(total_amount_cents)
    .fetch_one(&mut *self.tx)
    .await
    .map_err(db_err("insert_order"))
  }

  async fn insert_order_items(&mut self, order_id: Uuid, lines: &[OrderLine]) -> StorageResult<Vec<OrderItem>> {
    if lines.is_empty() {
      return Ok(Vec::new());
    }
    // One multi-row INSERT for the whole order.
    let mut builder: QueryBuilder<Postgres> =
      QueryBuilder::new("INSERT INTO order_items (order_id, product_id, quantity, price_cents) ");
    builder.push_values(lines, |mut row, line| {
      row
        .push_bind(order_id)
        .push_bind(line.product_id)
        .push_bind(line.quantity)
        .push_bind(line.price_cents);
    });
    builder.push(" RETURNING order_id, product_id, quantity, price_cents");

    builder
      .build_query_as::<OrderItem>()
      .fetch_all(&mut *self.tx)
      .await
      .map_err(db_err("insert_order_items"))
  }

  async fn clear_cart(&mut self, user_id: Uuid) -> StorageResult<u64> {
    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
      .bind(user_id)
      .execute(&mut *self.tx)
      .await
      .map(|done| done.rows_affected())
      .map_err(db_err("clear_cart"))
  }

  async fn commit(self: Box<Self>) -> StorageResult<()> {
    let PgStorageTransaction { tx } = *self;
    tx.commit().await.map_err(db_err("commit"))
  }

  async fn rollback(self: Box<Self>) -> StorageResult<()> {
    let PgStorageTransaction { tx } = *self;
    tx.rollback().await.map_err(db_err("rollback"))
  }
}
