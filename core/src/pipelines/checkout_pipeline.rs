// commune_cart/src/pipelines/checkout_pipeline.rs

//! Order placement: turn a submitted cart into an order, its items and an empty
//! cart, all inside one storage transaction.
//!
//! Validation and the total are handled before the transaction is opened. The
//! transactional steps run in the order of `CHECKOUT_STEPS`; the first failing
//! step aborts the pipeline, the transaction is rolled back and the caller gets a
//! single `OrderPlacementFailed`. A pipeline future dropped half way (client went
//! away) drops the transaction handle, which rolls back as well.

use crate::commands::PlaceOrderCommand;
use crate::error::{CoreError, CoreResult, StorageResult};
use crate::models::{OrderLine, PlacedOrder};
use crate::storage::{StorageGateway, StorageTransaction};
use std::sync::Arc;
use tracing::{error, info, info_span, instrument, Instrument};

/// Transactional steps, in execution order.
const CHECKOUT_STEPS: [&str; 4] = [
  "insert_order_record",
  "insert_order_item_rows",
  "clear_user_cart",
  "commit_checkout",
];

#[derive(Clone)]
pub struct CheckoutPipeline {
  storage: Arc<dyn StorageGateway>,
}

impl CheckoutPipeline {
  pub fn new(storage: Arc<dyn StorageGateway>) -> Self {
    Self { storage }
  }

  #[instrument(
    name = "checkout_pipeline::place_order",
    skip(self, cmd),
    fields(user_id = %cmd.user_id(), lines = cmd.lines().len()),
    err(Display)
  )]
  pub async fn place_order(&self, cmd: PlaceOrderCommand) -> CoreResult<PlacedOrder> {
    // Prices come from the submitted lines, not from the catalog.
    let total_amount_cents = compute_total_amount(cmd.lines())?;

    let mut tx = self.storage.begin().await.map_err(|source| {
      error!(error = %source, "Checkout could not open a transaction.");
      CoreError::OrderPlacementFailed { source }
    })?;

    let placed = match write_checkout(tx.as_mut(), &cmd, total_amount_cents).await {
      Ok(placed) => placed,
      Err(source) => {
        error!(error = %source, "Checkout step failed, rolling back.");
        if let Err(rollback_err) = tx.rollback().await {
          // The handle is gone either way; the backend discards the work.
          error!(error = %rollback_err, "Explicit rollback failed.");
        }
        return Err(CoreError::OrderPlacementFailed { source });
      }
    };

    tx.commit()
      .instrument(info_span!("checkout_step", step = CHECKOUT_STEPS[3]))
      .await
      .map_err(|source| {
        error!(error = %source, "Checkout commit failed.");
        CoreError::OrderPlacementFailed { source }
      })?;

    info!(
      order_id = %placed.order.order_id,
      total_amount_cents = placed.order.total_amount_cents,
      items = placed.items.len(),
      "Order placed."
    );
    Ok(placed)
  }
}

async fn write_checkout(
  tx: &mut dyn StorageTransaction,
  cmd: &PlaceOrderCommand,
  total_amount_cents: i64,
) -> StorageResult<PlacedOrder> {
  let order = tx
    .insert_order(cmd.user_id(), total_amount_cents)
    .instrument(info_span!("checkout_step", step = CHECKOUT_STEPS[0]))
    .await?;

  let items = tx
    .insert_order_items(order.order_id, cmd.lines())
    .instrument(info_span!("checkout_step", step = CHECKOUT_STEPS[1]))
    .await?;

  let cleared = tx
    .clear_cart(cmd.user_id())
    .instrument(info_span!("checkout_step", step = CHECKOUT_STEPS[2]))
    .await?;
  info!(order_id = %order.order_id, cleared_cart_rows = cleared, "Checkout writes staged.");

  Ok(PlacedOrder { order, items })
}

/// Sum of `price_cents * quantity` over all lines.
pub fn compute_total_amount(lines: &[OrderLine]) -> CoreResult<i64> {
  lines.iter().try_fold(0i64, |acc, line| {
    line
      .line_total_cents()
      .and_then(|line_total| acc.checked_add(line_total))
      .ok_or_else(|| CoreError::invalid_input("order total is out of range"))
  })
}
