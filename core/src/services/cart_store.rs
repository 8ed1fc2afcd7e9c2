// commune_cart/src/services/cart_store.rs

//! The per-user cart: (user, product) -> quantity.

use crate::commands::{AddToCartCommand, UpdateQuantityCommand};
use crate::error::{CoreError, CoreResult};
use crate::models::{CartItem, CartLine};
use crate::storage::StorageGateway;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Outcome of a delete. Zero affected rows is a normal result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
  Removed(u64),
  NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
  Updated(CartItem),
  NotFound,
}

#[derive(Clone)]
pub struct CartStore {
  storage: Arc<dyn StorageGateway>,
}

impl CartStore {
  pub fn new(storage: Arc<dyn StorageGateway>) -> Self {
    Self { storage }
  }

  /// Adds `quantity` of the product to the user's cart, creating the row on first add.
  #[instrument(
    name = "cart_store::add_to_cart",
    skip(self, cmd),
    fields(user_id = %cmd.user_id, product_id = %cmd.product_id, quantity = cmd.quantity.get()),
    err(Display)
  )]
  pub async fn add_to_cart(&self, cmd: AddToCartCommand) -> CoreResult<CartItem> {
    if !self.storage.user_exists(cmd.user_id).await? {
      warn!("Add to cart rejected: unknown user.");
      return Err(CoreError::invalid_reference(format!(
        "User {} does not exist.",
        cmd.user_id
      )));
    }
    if self.storage.find_product(cmd.product_id).await?.is_none() {
      warn!("Add to cart rejected: unknown product.");
      return Err(CoreError::invalid_reference(format!(
        "Product {} does not exist.",
        cmd.product_id
      )));
    }

    let item = self
      .storage
      .increment_cart_item(cmd.user_id, cmd.product_id, cmd.quantity.get())
      .await?;
    info!(cart_id = %item.cart_id, new_quantity = item.quantity, "Cart item stored.");
    Ok(item)
  }

  #[instrument(name = "cart_store::get_cart", skip(self), err(Display))]
  pub async fn get_cart(&self, user_id: Uuid, commune_id: Option<Uuid>) -> CoreResult<Vec<CartLine>> {
    Ok(self.storage.list_cart_lines(user_id, commune_id).await?)
  }

  /// Removes one cart row by id. Only rows of `user_id` are considered.
  #[instrument(name = "cart_store::remove_cart_item", skip(self), err(Display))]
  pub async fn remove_cart_item(&self, user_id: Uuid, cart_id: Uuid) -> CoreResult<RemovalOutcome> {
    let removed = self.storage.delete_cart_item(user_id, cart_id).await?;
    Ok(removal_outcome(removed))
  }

  #[instrument(name = "cart_store::remove_by_user_and_product", skip(self), err(Display))]
  pub async fn remove_by_user_and_product(&self, user_id: Uuid, product_id: Uuid) -> CoreResult<RemovalOutcome> {
    let removed = self.storage.delete_cart_item_for_product(user_id, product_id).await?;
    Ok(removal_outcome(removed))
  }

  /// Sets (does not add to) the quantity of an existing cart row.
  #[instrument(
    name = "cart_store::update_quantity",
    skip(self, cmd),
    fields(user_id = %cmd.user_id, product_id = %cmd.product_id, quantity = cmd.quantity.get()),
    err(Display)
  )]
  pub async fn update_quantity(&self, cmd: UpdateQuantityCommand) -> CoreResult<UpdateOutcome> {
    match self
      .storage
      .set_cart_item_quantity(cmd.user_id, cmd.product_id, cmd.quantity.get())
      .await?
    {
      Some(item) => Ok(UpdateOutcome::Updated(item)),
      None => {
        info!("No cart row to update.");
        Ok(UpdateOutcome::NotFound)
      }
    }
  }
}

fn removal_outcome(removed: u64) -> RemovalOutcome {
  if removed == 0 {
    RemovalOutcome::NotFound
  } else {
    RemovalOutcome::Removed(removed)
  }
}
