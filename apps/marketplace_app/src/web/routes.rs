// apps/marketplace_app/src/web/routes.rs

use actix_web::{error, web, HttpRequest, HttpResponse};

use crate::errors::AppError;
use crate::web::handlers::{cart_handlers, order_handlers};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Malformed bodies, query strings and path segments are caller errors and use the
// same JSON error shape as every other failure.
fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid JSON body: {}", err)).into()
}

fn query_error_handler(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid query string: {}", err)).into()
}

fn path_error_handler(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid path parameter: {}", err)).into()
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
    .app_data(web::QueryConfig::default().error_handler(query_error_handler))
    .app_data(web::PathConfig::default().error_handler(path_error_handler))
    .service(
      web::scope("/api/v1")
        .route("/health", web::get().to(health_check_handler))
        // Cart Routes
        .service(
          web::scope("/cart")
            .route("", web::get().to(cart_handlers::get_cart_handler))
            .route("/add", web::post().to(cart_handlers::add_to_cart_handler))
            .route(
              "/items/{product_id}",
              web::put().to(cart_handlers::update_quantity_handler),
            )
            .route(
              "/items/{cart_id}",
              web::delete().to(cart_handlers::remove_cart_item_handler),
            )
            .route(
              "/products/{product_id}",
              web::delete().to(cart_handlers::remove_cart_product_handler),
            ),
        )
        // Order Routes
        .service(
          web::scope("/orders")
            .route("", web::get().to(order_handlers::get_orders_handler))
            .route("", web::post().to(order_handlers::place_order_handler)),
        ),
    );
}
