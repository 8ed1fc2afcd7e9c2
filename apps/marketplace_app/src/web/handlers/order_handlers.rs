// apps/marketplace_app/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use commune_cart::{PlaceOrderCommand, RawOrderLine};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

// --- Request DTOs ---

#[derive(Deserialize, Debug, Default)]
pub struct CheckoutLinePayload {
  pub product_id: Option<Uuid>,
  pub quantity: Option<i32>,
  /// Price the shopper saw when adding the product. Stored as-is on the order.
  pub price_cents: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct PlaceOrderRequestPayload {
  #[serde(default)]
  pub cart: Vec<CheckoutLinePayload>,
}

#[derive(Deserialize, Debug)]
pub struct OrdersQuery {
  pub commune_id: Uuid,
}

// --- Handlers ---

#[instrument(
  name = "handler::place_order",
  skip(app_state, req_payload, auth_user),
  fields(user_id = %auth_user.user_id, lines = req_payload.cart.len())
)]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<PlaceOrderRequestPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let raw_lines: Vec<RawOrderLine> = req_payload
    .cart
    .iter()
    .map(|line| RawOrderLine {
      product_id: line.product_id,
      quantity: line.quantity,
      price_cents: line.price_cents,
    })
    .collect();
  let cmd = PlaceOrderCommand::new(Some(auth_user.user_id), &raw_lines)?;

  let placed = app_state.checkout.place_order(cmd).await?;

  info!(
    order_id = %placed.order.order_id,
    total_amount_cents = placed.order.total_amount_cents,
    "Checkout completed."
  );
  Ok(HttpResponse::Created().json(json!({
    "message": "Order placed successfully.",
    "order": placed.order,
    "items": placed.items
  })))
}

#[instrument(
  name = "handler::get_orders",
  skip(app_state, query, auth_user),
  fields(user_id = %auth_user.user_id, commune_id = %query.commune_id)
)]
pub async fn get_orders_handler(
  app_state: web::Data<AppState>,
  query: web::Query<OrdersQuery>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let orders = app_state
    .order_reader
    .get_orders(auth_user.user_id, query.commune_id)
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}
