// apps/marketplace_app/src/state.rs
use commune_cart::{CartStore, CheckoutPipeline, OrderReader, StorageGateway};
use std::sync::Arc;

/// Shared by every request. The components all hold the same injected gateway.
#[derive(Clone)]
pub struct AppState {
  pub cart_store: CartStore,
  pub order_reader: OrderReader,
  pub checkout: CheckoutPipeline,
}

impl AppState {
  pub fn new(storage: Arc<dyn StorageGateway>) -> Self {
    Self {
      cart_store: CartStore::new(storage.clone()),
      order_reader: OrderReader::new(storage.clone()),
      checkout: CheckoutPipeline::new(storage),
    }
  }
}
