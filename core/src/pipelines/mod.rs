// commune_cart/src/pipelines/mod.rs

//! Multi-step workflows. Currently only checkout.

pub mod checkout_pipeline;

pub use checkout_pipeline::{compute_total_amount, CheckoutPipeline};
