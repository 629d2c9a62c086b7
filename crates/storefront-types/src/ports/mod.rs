pub mod cart_persistence;
pub mod order_store;
pub mod payment_gateway;
