pub mod activity;
pub mod bill;
pub mod group;
pub mod payment;
pub mod recurring;
pub mod summary;
pub mod user;
pub mod window;
