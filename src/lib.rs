pub mod api;
pub mod auth;
pub mod config;
pub mod constants;
pub mod core;
pub mod infrastructure;

pub use crate::core::errors::BillsplitError;
pub use crate::core::services::BillsplitService;

#[cfg(test)]
mod tests;
