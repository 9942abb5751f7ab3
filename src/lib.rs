//! Flattened REST adapter for Aruba Cloud subnets
//!
//! Exposes subnet get/create/update/list with the provider's `metadata`
//! object merged into the top level, and translates every call into exactly
//! one request against the Aruba Cloud API.

pub mod aruba;
pub mod config;
pub mod resource;
pub mod server;

pub use server::build_router;
