pub mod aggregate;
pub mod config;
pub mod discover;
pub mod display;
pub mod driver;
pub mod errors;
pub mod naming;
pub mod timing;
pub mod types;
