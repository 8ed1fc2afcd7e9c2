// apps/marketplace_app/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use marketplace_app::config::{AppConfig, LogFormat};
use marketplace_app::state::AppState;
use marketplace_app::{db, telemetry, web};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  // Load application configuration first; it decides the log format.
  let app_config = match AppConfig::from_env() {
    Ok(cfg) => {
      telemetry::init_tracing(cfg.log_format);
      cfg
    }
    Err(e) => {
      telemetry::init_tracing(LogFormat::Pretty);
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::other(e.to_string()));
    }
  };

  tracing::info!("Starting commune marketplace server...");

  let storage = match db::connect_storage(&app_config).await {
    Ok(storage) => storage,
    Err(e) => {
      tracing::error!(error = format!("{:#}", e), "Failed to initialise storage.");
      return Err(std::io::Error::other(format!("{:#}", e)));
    }
  };

  let app_state = AppState::new(storage);

  let server_address = app_config.bind_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(tracing_actix_web::TracingLogger::default()) // Request spans
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
