pub mod allocator;
pub mod balances;
pub mod errors;
pub mod models;
pub mod services;
