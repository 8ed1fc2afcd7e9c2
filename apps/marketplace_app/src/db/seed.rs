// apps/marketplace_app/src/db/seed.rs

//! Demo reference data: two communes, one shopper, a few products per commune.
//!
//! Ids are fixed so a freshly seeded server can be driven with curl straight away
//! (`X-User-ID: 00000000-0000-0000-0000-0000000000a1`).

use commune_cart::{InMemoryStorage, Product};
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

pub const DEMO_USER_ID: Uuid = Uuid::from_u128(0xa1);
pub const DEMO_USER_EMAIL: &str = "shopper@example.com";
pub const COMMUNE_RIVERSIDE: Uuid = Uuid::from_u128(0xc1);
pub const COMMUNE_HILLTOP: Uuid = Uuid::from_u128(0xc2);

pub fn demo_products() -> Vec<Product> {
  let product = |id: u128, name: &str, price_cents: i64, commune_id: Uuid| Product {
    product_id: Uuid::from_u128(id),
    product_name: name.to_string(),
    description: Some(format!("{} from the weekly market", name)),
    price_cents,
    product_image: Some(format!("/images/{}.jpg", name.to_lowercase().replace(' ', "-"))),
    commune_id,
  };
  vec![
    product(0x01, "Wildflower Honey", 850, COMMUNE_RIVERSIDE),
    product(0x02, "Sourdough Loaf", 420, COMMUNE_RIVERSIDE),
    product(0x03, "Goat Cheese", 610, COMMUNE_HILLTOP),
    product(0x04, "Apple Cider", 390, COMMUNE_HILLTOP),
  ]
}

/// Idempotent: rows that already exist are left untouched.
#[instrument(name = "seed::seed_postgres", skip(pool), err(Display))]
pub async fn seed_postgres(pool: &PgPool) -> Result<(), sqlx::Error> {
  let mut tx = pool.begin().await?;

  sqlx::query("INSERT INTO users (user_id, email) VALUES ($1, $2) ON CONFLICT DO NOTHING")
    .bind(DEMO_USER_ID)
    .bind(DEMO_USER_EMAIL)
    .execute(&mut *tx)
    .await?;

  for p in demo_products() {
    sqlx::query(
      r#"
      INSERT INTO products (product_id, product_name, description, price_cents, product_image, commune_id)
      VALUES ($1, $2, $3, $4, $5, $6)
      ON CONFLICT (product_id) DO NOTHING
      "#,
    )
    .bind(p.product_id)
    .bind(&p.product_name)
    .bind(&p.description)
    .bind(p.price_cents)
    .bind(&p.product_image)
    .bind(p.commune_id)
    .execute(&mut *tx)
    .await?;
  }

  tx.commit().await?;
  info!("Demo data seeded into Postgres.");
  Ok(())
}

pub fn seed_in_memory(storage: &InMemoryStorage) {
  storage.insert_user(DEMO_USER_ID);
  for p in demo_products() {
    storage.insert_product(p);
  }
  info!("Demo data seeded into the in-memory store.");
}
