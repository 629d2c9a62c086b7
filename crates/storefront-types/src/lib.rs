//! storefront-types: domain model and ports for the order lifecycle core.

pub mod domain;
pub mod ports;
