pub mod config;
pub mod error;
pub mod frontend;
pub mod logger;
pub mod visualize;
