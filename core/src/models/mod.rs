// commune_cart/src/models/mod.rs

//! Row and view structures shared by the stores, the reader and the storage backends.

pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod product;

pub use cart_item::{CartItem, CartLine};
pub use order::{CommuneOrder, Order, PlacedOrder};
pub use order_item::{OrderItem, OrderItemDetail, OrderLine};
pub use product::Product;
