// apps/marketplace_app/src/lib.rs

//! HTTP surface and storage wiring for the commune marketplace cart service.

pub mod config;
pub mod db;
pub mod errors;
pub mod state;
pub mod telemetry;
pub mod web;

pub use crate::config::AppConfig;
pub use crate::errors::{AppError, Result};
pub use crate::state::AppState;
