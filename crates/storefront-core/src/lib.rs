//! storefront-core: order lifecycle application layer (checkout service,
//! checkout session) and the inbound HTTP adapter.

pub mod config;
pub mod errors;

pub mod application;

pub use storefront_types::{domain, ports};

pub mod inbound; // HTTP adapter (server + handlers)
