// apps/marketplace_app/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use commune_cart::{AddToCartCommand, RemovalOutcome, UpdateOutcome, UpdateQuantityCommand};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

// --- Request DTOs ---
// Fields are optional so that a missing value is reported by command validation
// with a specific message instead of a generic deserialization error.

#[derive(Deserialize, Debug)]
pub struct AddToCartRequestPayload {
  pub product_id: Option<Uuid>,
  pub quantity: Option<i32>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateQuantityRequestPayload {
  pub quantity: Option<i32>,
}

#[derive(Deserialize, Debug)]
pub struct CartQuery {
  pub commune_id: Option<Uuid>,
}

// --- Handlers ---

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, req_payload, auth_user),
  fields(user_id = %auth_user.user_id, product_id = ?req_payload.product_id, quantity = ?req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddToCartRequestPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let cmd = AddToCartCommand::new(auth_user.user_id, req_payload.product_id, req_payload.quantity)?;
  let cart_item = app_state.cart_store.add_to_cart(cmd).await?;

  info!(
    cart_id = %cart_item.cart_id,
    new_quantity = cart_item.quantity,
    "Add to cart successful."
  );
  Ok(HttpResponse::Ok().json(json!({
    "message": "Item added to cart successfully.",
    "cartItem": cart_item
  })))
}

#[instrument(
  name = "handler::get_cart",
  skip(app_state, query, auth_user),
  fields(user_id = %auth_user.user_id, commune_id = ?query.commune_id)
)]
pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  query: web::Query<CartQuery>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let items = app_state
    .cart_store
    .get_cart(auth_user.user_id, query.commune_id)
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "items": items })))
}

#[instrument(
  name = "handler::update_cart_quantity",
  skip(app_state, path, req_payload, auth_user),
  fields(user_id = %auth_user.user_id, product_id = %path, quantity = ?req_payload.quantity)
)]
pub async fn update_quantity_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_payload: web::Json<UpdateQuantityRequestPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let cmd = UpdateQuantityCommand::new(auth_user.user_id, product_id, req_payload.quantity)?;

  match app_state.cart_store.update_quantity(cmd).await? {
    UpdateOutcome::Updated(cart_item) => Ok(HttpResponse::Ok().json(json!({
      "message": "Cart quantity updated.",
      "cartItem": cart_item
    }))),
    UpdateOutcome::NotFound => Err(AppError::NotFound(format!(
      "Product {} is not in the cart.",
      product_id
    ))),
  }
}

#[instrument(
  name = "handler::remove_cart_item",
  skip(app_state, path, auth_user),
  fields(user_id = %auth_user.user_id, cart_id = %path)
)]
pub async fn remove_cart_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let cart_id = path.into_inner();
  let outcome = app_state
    .cart_store
    .remove_cart_item(auth_user.user_id, cart_id)
    .await?;
  removal_response(outcome, || format!("Cart item {} not found.", cart_id))
}

#[instrument(
  name = "handler::remove_cart_product",
  skip(app_state, path, auth_user),
  fields(user_id = %auth_user.user_id, product_id = %path)
)]
pub async fn remove_cart_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let outcome = app_state
    .cart_store
    .remove_by_user_and_product(auth_user.user_id, product_id)
    .await?;
  removal_response(outcome, || format!("Product {} is not in the cart.", product_id))
}

fn removal_response(outcome: RemovalOutcome, not_found: impl FnOnce() -> String) -> Result<HttpResponse, AppError> {
  match outcome {
    RemovalOutcome::Removed(removed) => Ok(HttpResponse::Ok().json(json!({
      "message": "Item removed from cart.",
      "removed": removed
    }))),
    RemovalOutcome::NotFound => Err(AppError::NotFound(not_found())),
  }
}
