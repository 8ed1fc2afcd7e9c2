// src/lib.rs

//! commune_cart: carts, commune-scoped order views and transactional checkout for a
//! multi-commune marketplace.
//!
//! The crate is organised around an injected storage gateway:
//!  - [`CartStore`] keeps one row per (user, product) and increments on repeated adds.
//!  - [`OrderReader`] returns a user's orders restricted to one commune, dropping
//!    orders that have no item in that commune.
//!  - [`CheckoutPipeline`] writes the order, its items and clears the cart inside a
//!    single transaction; either everything is committed or nothing is.
//!  - [`StorageGateway`] / [`StorageTransaction`] are the only way any of the above
//!    touch data. [`InMemoryStorage`] implements them in-process; SQL backends live
//!    with the application that owns the connection pool.
//!
//! Inputs reach the components as validated commands (see [`commands`]); every
//! precondition on a request is checked there, before storage is involved.

pub mod commands;
pub mod error;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod storage;

// --- Re-exports for the Public API ---

pub use crate::commands::{AddToCartCommand, PlaceOrderCommand, Quantity, RawOrderLine, UpdateQuantityCommand};
pub use crate::error::{CoreError, CoreResult, StorageError, StorageResult};
pub use crate::models::{CartItem, CartLine, CommuneOrder, Order, OrderItem, OrderItemDetail, OrderLine, PlacedOrder, Product};
pub use crate::pipelines::CheckoutPipeline;
pub use crate::services::{CartStore, OrderReader, RemovalOutcome, UpdateOutcome};
pub use crate::storage::{InMemoryStorage, StorageGateway, StorageOperation, StorageTransaction};
