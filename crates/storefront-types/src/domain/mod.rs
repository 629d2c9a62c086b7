pub mod cart;
pub mod intent;
pub mod order;
