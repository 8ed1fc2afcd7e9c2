// tests/common/mod.rs
#![allow(dead_code)] // Not every test file uses every fixture

use commune_cart::{
  CartStore, CheckoutPipeline, InMemoryStorage, OrderReader, PlaceOrderCommand, Product, RawOrderLine,
  StorageGateway,
};
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

// --- Tracing ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Marketplace fixture ---

/// Two communes, one user, a product in each commune.
pub struct Market {
  pub storage: InMemoryStorage,
  pub cart: CartStore,
  pub reader: OrderReader,
  pub checkout: CheckoutPipeline,
  pub user: Uuid,
  pub commune_a: Uuid,
  pub commune_b: Uuid,
  /// Commune A, 10 cents.
  pub p1: Product,
  /// Commune B, 5 cents.
  pub p2: Product,
}

pub fn product(name: &str, price_cents: i64, commune_id: Uuid) -> Product {
  Product {
    product_id: Uuid::new_v4(),
    product_name: name.to_string(),
    description: Some(format!("{} from the market", name)),
    price_cents,
    product_image: None,
    commune_id,
  }
}

impl Market {
  pub fn new() -> Self {
    setup_tracing();
    let storage = InMemoryStorage::new();
    let gateway: Arc<dyn StorageGateway> = Arc::new(storage.clone());

    let user = Uuid::new_v4();
    let commune_a = Uuid::new_v4();
    let commune_b = Uuid::new_v4();
    let p1 = product("Honey", 10, commune_a);
    let p2 = product("Cider", 5, commune_b);
    storage.insert_user(user);
    storage.insert_product(p1.clone());
    storage.insert_product(p2.clone());

    Market {
      cart: CartStore::new(gateway.clone()),
      reader: OrderReader::new(gateway.clone()),
      checkout: CheckoutPipeline::new(gateway),
      storage,
      user,
      commune_a,
      commune_b,
      p1,
      p2,
    }
  }

  pub fn add_product(&self, name: &str, price_cents: i64, commune_id: Uuid) -> Product {
    let p = product(name, price_cents, commune_id);
    self.storage.insert_product(p.clone());
    p
  }

  pub fn add_user(&self) -> Uuid {
    let user = Uuid::new_v4();
    self.storage.insert_user(user);
    user
  }
}

pub fn line(product: &Product, quantity: i32, price_cents: i64) -> RawOrderLine {
  RawOrderLine {
    product_id: Some(product.product_id),
    quantity: Some(quantity),
    price_cents: Some(price_cents),
  }
}

pub fn order_cmd(user: Uuid, lines: &[RawOrderLine]) -> PlaceOrderCommand {
  PlaceOrderCommand::new(Some(user), lines).expect("valid checkout command")
}
