// storefront/src/lib.rs

//! Storefront: catalog, cart, checkout, coupons and refund requests over
//! actix-web, with every mutating action run as a `shopflow` pipeline.

pub mod config;
pub mod errors;
pub mod forms;
pub mod models;
pub mod notices;
pub mod pipelines;
pub mod seed;
pub mod state;
pub mod store;
pub mod web;
