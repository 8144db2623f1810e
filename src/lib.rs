pub mod app;
pub mod args;
pub mod config;
pub mod error;
pub mod index;
pub mod languages;
pub mod output;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
