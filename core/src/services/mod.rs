// commune_cart/src/services/mod.rs

pub mod cart_store;
pub mod order_reader;

pub use cart_store::{CartStore, RemovalOutcome, UpdateOutcome};
pub use order_reader::{assemble_commune_orders, OrderReader};
