// apps/marketplace_app/tests/api_tests.rs

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use commune_cart::{InMemoryStorage, StorageOperation};
use marketplace_app::db::seed::{self, COMMUNE_HILLTOP, COMMUNE_RIVERSIDE, DEMO_USER_ID};
use marketplace_app::state::AppState;
use marketplace_app::web::configure_app_routes;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

const HONEY: Uuid = Uuid::from_u128(0x01); // Riverside, 850
const CHEESE: Uuid = Uuid::from_u128(0x03); // Hilltop, 610

fn seeded_storage() -> InMemoryStorage {
  let storage = InMemoryStorage::new();
  seed::seed_in_memory(&storage);
  storage
}

macro_rules! test_app {
  ($storage:expr) => {{
    let state = AppState::new(Arc::new($storage.clone()));
    test::init_service(
      App::new()
        .app_data(web::Data::new(state))
        .configure(configure_app_routes),
    )
    .await
  }};
}

fn as_user(req: test::TestRequest) -> test::TestRequest {
  req.insert_header(("X-User-ID", DEMO_USER_ID.to_string()))
}

#[actix_web::test]
async fn health_check_responds_ok() {
  let storage = seeded_storage();
  let app = test_app!(storage);

  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/v1/health").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn repeated_add_increments_single_cart_row() {
  let storage = seeded_storage();
  let app = test_app!(storage);

  for _ in 0..2 {
    let req = as_user(test::TestRequest::post().uri("/api/v1/cart/add"))
      .set_json(json!({ "product_id": HONEY, "quantity": 2 }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  let req = as_user(test::TestRequest::get().uri("/api/v1/cart")).to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  let items = body["items"].as_array().cloned().unwrap_or_default();
  assert_eq!(items.len(), 1);
  assert_eq!(items[0]["quantity"], 4);
  assert_eq!(items[0]["product_name"], "Wildflower Honey");
  assert_eq!(items[0]["price_cents"], 850);
}

#[actix_web::test]
async fn cart_can_be_filtered_by_commune() {
  let storage = seeded_storage();
  let app = test_app!(storage);

  for product_id in [HONEY, CHEESE] {
    let req = as_user(test::TestRequest::post().uri("/api/v1/cart/add"))
      .set_json(json!({ "product_id": product_id, "quantity": 1 }))
      .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
  }

  let uri = format!("/api/v1/cart?commune_id={}", COMMUNE_HILLTOP);
  let req = as_user(test::TestRequest::get().uri(&uri)).to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  let items = body["items"].as_array().cloned().unwrap_or_default();
  assert_eq!(items.len(), 1);
  assert_eq!(items[0]["product_id"], json!(CHEESE));
}

#[actix_web::test]
async fn missing_user_header_is_unauthorized() {
  let storage = seeded_storage();
  let app = test_app!(storage);

  let req = test::TestRequest::get().uri("/api/v1/cart").to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn invalid_quantity_is_rejected_before_storage() {
  let storage = seeded_storage();
  let app = test_app!(storage);
  let before = storage.operation_count();

  let req = as_user(test::TestRequest::post().uri("/api/v1/cart/add"))
    .set_json(json!({ "product_id": HONEY, "quantity": 0 }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let uri = format!("/api/v1/cart/items/{}", HONEY);
  let req = as_user(test::TestRequest::put().uri(&uri))
    .set_json(json!({ "quantity": -3 }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  assert_eq!(storage.operation_count(), before);
}

#[actix_web::test]
async fn malformed_json_uses_error_shape() {
  let storage = seeded_storage();
  let app = test_app!(storage);

  let req = as_user(test::TestRequest::post().uri("/api/v1/cart/add"))
    .insert_header(("content-type", "application/json"))
    .set_payload("{ not json")
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert!(body["error"].as_str().is_some());
}

#[actix_web::test]
async fn unknown_product_is_a_bad_reference() {
  let storage = seeded_storage();
  let app = test_app!(storage);

  let req = as_user(test::TestRequest::post().uri("/api/v1/cart/add"))
    .set_json(json!({ "product_id": Uuid::new_v4(), "quantity": 1 }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(storage.cart_items().is_empty());
}

#[actix_web::test]
async fn update_and_remove_of_absent_rows_are_not_found() {
  let storage = seeded_storage();
  let app = test_app!(storage);

  let uri = format!("/api/v1/cart/items/{}", HONEY);
  let req = as_user(test::TestRequest::put().uri(&uri))
    .set_json(json!({ "quantity": 3 }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

  let uri = format!("/api/v1/cart/items/{}", Uuid::new_v4());
  let req = as_user(test::TestRequest::delete().uri(&uri)).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

  let uri = format!("/api/v1/cart/products/{}", HONEY);
  let req = as_user(test::TestRequest::delete().uri(&uri)).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn update_overwrites_then_remove_deletes() {
  let storage = seeded_storage();
  let app = test_app!(storage);

  let req = as_user(test::TestRequest::post().uri("/api/v1/cart/add"))
    .set_json(json!({ "product_id": HONEY, "quantity": 2 }))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  let cart_id = body["cartItem"]["cart_id"].as_str().map(str::to_string).unwrap_or_default();

  let uri = format!("/api/v1/cart/items/{}", HONEY);
  let req = as_user(test::TestRequest::put().uri(&uri))
    .set_json(json!({ "quantity": 7 }))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["cartItem"]["quantity"], 7);

  let uri = format!("/api/v1/cart/items/{}", cart_id);
  let req = as_user(test::TestRequest::delete().uri(&uri)).to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["removed"], 1);
  assert!(storage.cart_items().is_empty());
}

#[actix_web::test]
async fn checkout_then_list_orders_per_commune() {
  let storage = seeded_storage();
  let app = test_app!(storage);

  for product_id in [HONEY, CHEESE] {
    let req = as_user(test::TestRequest::post().uri("/api/v1/cart/add"))
      .set_json(json!({ "product_id": product_id, "quantity": 1 }))
      .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
  }

  let req = as_user(test::TestRequest::post().uri("/api/v1/orders"))
    .set_json(json!({ "cart": [
      { "product_id": HONEY, "quantity": 2, "price_cents": 850 },
      { "product_id": CHEESE, "quantity": 1, "price_cents": 610 }
    ]}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["order"]["total_amount_cents"], 2 * 850 + 610);
  assert_eq!(body["items"].as_array().map(Vec::len), Some(2));
  assert!(storage.cart_items().is_empty());

  let uri = format!("/api/v1/orders?commune_id={}", COMMUNE_RIVERSIDE);
  let req = as_user(test::TestRequest::get().uri(&uri)).to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  let orders = body["orders"].as_array().cloned().unwrap_or_default();
  assert_eq!(orders.len(), 1);
  let items = orders[0]["items"].as_array().cloned().unwrap_or_default();
  assert_eq!(items.len(), 1);
  assert_eq!(items[0]["product_id"], json!(HONEY));
  // The order total spans both communes.
  assert_eq!(orders[0]["total_amount_cents"], 2 * 850 + 610);

  let uri = format!("/api/v1/orders?commune_id={}", Uuid::new_v4());
  let req = as_user(test::TestRequest::get().uri(&uri)).to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["orders"], json!([]));
}

#[actix_web::test]
async fn orders_require_commune_filter() {
  let storage = seeded_storage();
  let app = test_app!(storage);

  let req = as_user(test::TestRequest::get().uri("/api/v1/orders")).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn empty_checkout_is_rejected() {
  let storage = seeded_storage();
  let app = test_app!(storage);

  let req = as_user(test::TestRequest::post().uri("/api/v1/orders"))
    .set_json(json!({ "cart": [] }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
  assert!(storage.orders().is_empty());
}

#[actix_web::test]
async fn checkout_storage_failure_has_stable_message_and_no_partial_state() {
  let storage = seeded_storage();
  let app = test_app!(storage);

  let req = as_user(test::TestRequest::post().uri("/api/v1/cart/add"))
    .set_json(json!({ "product_id": HONEY, "quantity": 1 }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

  storage.fail_on(StorageOperation::ClearCart);
  let req = as_user(test::TestRequest::post().uri("/api/v1/orders"))
    .set_json(json!({ "cart": [{ "product_id": HONEY, "quantity": 1, "price_cents": 850 }] }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "Order placement failed");

  assert!(storage.orders().is_empty());
  assert!(storage.order_items().is_empty());
  assert_eq!(storage.cart_items().len(), 1);
}
