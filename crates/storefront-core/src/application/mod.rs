pub mod checkout_service;
pub mod session;
